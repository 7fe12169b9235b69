//! Entry points that mutate radio state: user commands, member presence
//! updates and the periodic health check.

mod commands;
mod health;
mod presence;

pub use commands::CommandReply;
pub use health::HealthReport;
pub use presence::{PresenceOutcome, PresenceUpdate};
