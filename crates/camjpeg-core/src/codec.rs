//! The codec facade.

use crate::decode::DecoderContext;
use crate::encode::{EncoderConfig, EncoderContext};
use crate::error::CodecError;
use crate::types::{DecodedImage, Image};

/// JPEG encoder and decoder behind one value.
///
/// Construction acquires one compression and one decompression engine
/// handle; dropping the codec releases both. Nothing in between creates or
/// destroys a handle. One codec serves one thread at a time; use separate
/// codecs for parallel work.
#[derive(Debug)]
pub struct JpegCodec {
    encoder: EncoderContext,
    decoder: DecoderContext,
}

impl JpegCodec {
    /// Create a codec. `quality` above 100 is capped at 100.
    pub fn new(quality: u16, faster_compression: bool) -> Result<Self, CodecError> {
        Self::with_config(EncoderConfig::new(quality, faster_compression))
    }

    pub fn with_config(config: EncoderConfig) -> Result<Self, CodecError> {
        Ok(Self {
            encoder: EncoderContext::new(config)?,
            decoder: DecoderContext::new()?,
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        self.encoder.config()
    }

    /// Compression quality, 1 to 100.
    pub fn quality(&self) -> u16 {
        self.encoder.quality()
    }

    /// Set compression quality, clamped to 1..=100.
    pub fn set_quality(&mut self, quality: u16) {
        self.encoder.set_quality(quality);
    }

    /// Whether the faster, less accurate DCT is used.
    pub fn faster_compression(&self) -> bool {
        self.encoder.faster_compression()
    }

    pub fn set_faster_compression(&mut self, faster: bool) {
        self.encoder.set_faster_compression(faster);
    }

    /// See [`EncoderContext::encode_to_memory`].
    pub fn encode_to_memory(
        &mut self,
        image: Option<&Image>,
        buffer: &mut Vec<u8>,
    ) -> Result<usize, CodecError> {
        self.encoder.encode_to_memory(image, buffer)
    }

    /// See [`DecoderContext::decode_to_memory`].
    pub fn decode_to_memory(&mut self, image: Option<&Image>) -> Result<DecodedImage, CodecError> {
        self.decoder.decode_to_memory(image)
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
