//! Codec provider contract.

use radio_config::schema::EncoderProfile;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CodecError(pub String);

/// Stateful encoder turning one frame of interleaved PCM into one packet.
pub trait FrameEncoder: Send {
    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>, CodecError>;
}

/// Factory for encoders. Supplied by the host.
pub trait Codec: Send + Sync {
    fn new_encoder(
        &self,
        sample_rate: u32,
        channels: u16,
        profile: EncoderProfile,
    ) -> Result<Box<dyn FrameEncoder>, CodecError>;
}
