pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, RadioError};
pub use events::{EventBus, RadioEvent};
pub use id::{new_correlation_id, ChannelId, TenantId, UserId};

pub type Result<T> = std::result::Result<T, RadioError>;
