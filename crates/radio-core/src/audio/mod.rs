//! Audio decoding, encoding and frame delivery.

pub mod constants;
mod codec;
mod encoder_cache;
mod pipeline;
mod source;

pub use codec::{Codec, CodecError, FrameEncoder};
pub use encoder_cache::{EncoderCache, SharedEncoder};
pub use pipeline::Pipeline;
pub use source::{ffmpeg_args, DecodeSource, FfmpegSource, PcmStream};
