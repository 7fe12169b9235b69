//! Establishing and tearing down voice sessions.

mod manager;

pub use manager::ConnectionManager;
pub(crate) use manager::sleep_or_cancel;
