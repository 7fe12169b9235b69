//! Bounded exponential-backoff recovery of lost broadcasts.

mod backoff;
mod recovery;

pub use backoff::backoff_delay;
pub use recovery::RecoveryOutcome;
