//! camjpeg core - in-memory JPEG codec adapter
//!
//! This crate compresses raw camera frames into JPEG buffers and decompresses
//! JPEG buffers into BGR pixel matrices, using libjpeg-turbo as the engine.
//! It owns the engine handles, validates pixel formats and maps every engine
//! failure onto [`CodecError`].
//!
//! Start with [`JpegCodec`], which bundles one [`EncoderContext`] and one
//! [`DecoderContext`]. Both contexts are usable on their own as well.

pub mod codec;
pub mod decode;
pub mod encode;
mod engine;
pub mod error;
pub mod types;

pub use codec::JpegCodec;
pub use decode::{DecoderContext, MAX_DECODED_PIXELS};
pub use encode::{EncoderConfig, EncoderContext, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
pub use engine::live_engine_handles;
pub use error::CodecError;
pub use types::{DecodedImage, Image, PixelFormat};
