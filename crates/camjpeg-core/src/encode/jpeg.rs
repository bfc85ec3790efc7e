//! JPEG compression into a caller-owned buffer.
//!
//! The engine writes straight into the caller's `Vec<u8>`: the vector is grown
//! to the worst-case size the engine reports for the image, compression runs
//! with reallocation disabled, and the vector is truncated to the bytes
//! actually produced. The post-call length is the only size to trust.

use std::ffi::c_int;

use tracing::debug;
use turbojpeg::raw;

use crate::engine::{
    global_error_message, Direction, EngineHandle, PARAM_FAST_DCT, PARAM_NO_REALLOC,
    PARAM_QUALITY, PARAM_SUBSAMP, PIXEL_GRAY, PIXEL_RGB, SUBSAMP_420, SUBSAMP_GRAY,
};
use crate::error::{CodecError, EngineFault};
use crate::types::{Image, PixelFormat};

use super::EncoderConfig;

/// Compression state: settings plus one engine handle reused by every call.
#[derive(Debug)]
pub struct EncoderContext {
    engine: EngineHandle,
    config: EncoderConfig,
}

impl EncoderContext {
    /// Acquire the compression engine handle.
    pub fn new(config: EncoderConfig) -> Result<Self, CodecError> {
        let engine = EngineHandle::new(Direction::Compress)?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn quality(&self) -> u16 {
        self.config.quality
    }

    /// Set quality, clamped to 1..=100. Applies from the next call.
    pub fn set_quality(&mut self, quality: u16) {
        self.config.set_quality(quality);
    }

    pub fn faster_compression(&self) -> bool {
        self.config.faster_compression
    }

    pub fn set_faster_compression(&mut self, faster: bool) {
        self.config.faster_compression = faster;
    }

    /// Compress an image into `buffer`.
    ///
    /// # Arguments
    ///
    /// * `image` - An RGB24 or Grayscale8 record
    /// * `buffer` - Destination; may be grown, and holds exactly the encoded
    ///   stream on success
    ///
    /// # Returns
    ///
    /// The number of bytes written, equal to `buffer.len()`.
    ///
    /// # Errors
    ///
    /// * `CodecError::NullPointer` if `image` or its data is missing
    /// * `CodecError::UnsupportedPixelFormat` for any format other than RGB24
    ///   or Grayscale8
    /// * `CodecError::FailedImageEncoding` if the engine fails; `buffer` is
    ///   left empty
    ///
    /// Precondition failures leave `buffer` untouched.
    pub fn encode_to_memory(
        &mut self,
        image: Option<&Image>,
        buffer: &mut Vec<u8>,
    ) -> Result<usize, CodecError> {
        let image = image.ok_or(CodecError::NullPointer)?;
        let data = image.data().ok_or(CodecError::NullPointer)?;
        let (pixel_format, subsamp) = match image.format() {
            PixelFormat::Rgb24 => (PIXEL_RGB, SUBSAMP_420),
            PixelFormat::Grayscale8 => (PIXEL_GRAY, SUBSAMP_GRAY),
            other => return Err(CodecError::UnsupportedPixelFormat(other)),
        };

        match self.compress(image, data, pixel_format, subsamp, buffer) {
            Ok(size) => {
                debug!(
                    width = image.width(),
                    height = image.height(),
                    quality = self.config.quality,
                    size,
                    "Encoded JPEG image"
                );
                Ok(size)
            }
            Err(fault) => {
                buffer.clear();
                Err(fault.into())
            }
        }
    }

    /// Compress an image into a new buffer.
    pub fn encode(&mut self, image: &Image) -> Result<Vec<u8>, CodecError> {
        let mut buffer = Vec::new();
        self.encode_to_memory(Some(image), &mut buffer)?;
        Ok(buffer)
    }

    fn compress(
        &mut self,
        image: &Image,
        data: &[u8],
        pixel_format: c_int,
        subsamp: c_int,
        buffer: &mut Vec<u8>,
    ) -> Result<usize, EngineFault> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EngineFault::new(format!(
                "cannot compress an empty {}x{} image",
                image.width(),
                image.height()
            )));
        }
        let width = to_c_int(image.width() as usize, "width")?;
        let height = to_c_int(image.height() as usize, "height")?;
        let pitch = to_c_int(image.stride(), "stride")?;

        // Every call sets all per-image parameters again
        self.engine.set(PARAM_SUBSAMP, subsamp)?;
        self.engine
            .set(PARAM_QUALITY, c_int::from(self.config.effective_quality()))?;
        self.engine
            .set(PARAM_FAST_DCT, c_int::from(self.config.faster_compression))?;
        self.engine.set(PARAM_NO_REALLOC, 1)?;

        let capacity = unsafe { raw::tj3JPEGBufSize(width, height, subsamp) } as usize;
        if capacity == 0 || capacity == usize::MAX {
            return Err(EngineFault::new(global_error_message()));
        }
        buffer.resize(capacity, 0);

        let mut jpeg_buf = buffer.as_mut_ptr();
        let mut jpeg_size = 0;
        let status = unsafe {
            raw::tj3Compress8(
                self.engine.as_ptr(),
                data.as_ptr(),
                width,
                pitch,
                height,
                pixel_format,
                &mut jpeg_buf,
                &mut jpeg_size,
            )
        };
        self.engine.check(status)?;

        let written = jpeg_size as usize;
        if !std::ptr::eq(jpeg_buf, buffer.as_ptr()) || written > buffer.len() {
            return Err(EngineFault::new("engine wrote outside the output buffer"));
        }
        buffer.truncate(written);
        Ok(written)
    }
}

fn to_c_int(value: usize, what: &str) -> Result<c_int, EngineFault> {
    c_int::try_from(value)
        .map_err(|_| EngineFault::new(format!("image {} {} is too large", what, value)))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
