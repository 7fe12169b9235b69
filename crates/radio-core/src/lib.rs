//! Fault-tolerant orchestration of one radio broadcast per guild.
//!
//! The crate keeps exactly one healthy voice session per guild while
//! commands, presence updates, health checks and transport failures mutate
//! its state concurrently. Platform voice transport, the codec and the audio
//! decoder are supplied by the host through the traits in [`voice`] and
//! [`audio`].

pub mod audio;
pub mod connection;
pub mod radio;
pub mod state;
pub mod supervisor;
pub mod triggers;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

pub use audio::{
    Codec, CodecError, DecodeSource, EncoderCache, FfmpegSource, FrameEncoder, Pipeline,
    PcmStream,
};
pub use connection::ConnectionManager;
pub use radio::{Collaborators, Radio, RadioStatus};
pub use state::{StateStore, TenantRadioState, TenantSnapshot};
pub use supervisor::{backoff_delay, RecoveryOutcome};
pub use triggers::{CommandReply, HealthReport, PresenceOutcome, PresenceUpdate};
pub use voice::{SessionStatus, VoiceError, VoiceProvider, VoiceSession};
