use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config persist error: {0}")]
    PersistError(String),
}

/// Failures of one connection attempt, pipeline run or recovery cycle.
///
/// None of these are fatal to the process; the supervisor turns them into a
/// reconnect-or-give-up decision.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    #[error("voice session did not become ready within {0:?}")]
    ConnectionTimeout(Duration),

    #[error("failed to join voice channel after {attempts} attempts: {reason}")]
    ConnectionFailed { attempts: u32, reason: String },

    #[error("voice session not ready")]
    SessionNotReady,

    #[error("audio stream ended")]
    StreamEnded,

    #[error("error reading audio data: {0}")]
    StreamRead(String),

    #[error("failed to open audio source: {0}")]
    Source(String),

    #[error("timed out sending audio frame after {0:?}")]
    SendTimeout(Duration),

    #[error("gave up after {attempts} reconnect attempts")]
    RecoveryExhausted { attempts: u32 },

    #[error("no target channel recorded")]
    NoChannel,

    #[error("encoder error: {0}")]
    Encoder(String),

    #[error("voice collaborator fault: {0}")]
    Collaborator(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RadioError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RadioError::Cancelled)
    }
}
