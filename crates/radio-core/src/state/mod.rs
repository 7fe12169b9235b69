//! Per-guild radio state.

mod store;
mod tenant;

pub use store::StateStore;
pub use tenant::{TenantRadioState, TenantSnapshot};
