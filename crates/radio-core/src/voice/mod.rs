//! Contracts for the platform voice transport.
//!
//! The platform client owns voice sessions and their registry; the core
//! only references them. Every call into these objects goes through
//! [`shield`] so a misbehaving client cannot unwind into the core.

pub(crate) mod shield;
mod types;

pub use types::{SessionStatus, VoiceError, VoiceProvider, VoiceSession};
