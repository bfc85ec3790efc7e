//! JPEG decompression into a BGR pixel matrix.

use std::ffi::c_int;

use tracing::{debug, warn};
use turbojpeg::raw;

use crate::engine::{
    Direction, EngineHandle, PARAM_JPEG_HEIGHT, PARAM_JPEG_WIDTH, PARAM_MAX_PIXELS, PIXEL_BGR,
};
use crate::error::{CodecError, EngineFault};
use crate::types::{DecodedImage, Image, PixelFormat};

use super::header::{scan_header, HeaderStatus};

/// Largest frame, in pixels, the decoder will allocate output for.
pub const MAX_DECODED_PIXELS: u64 = 1 << 27;

/// Decompression state: one engine handle, reused by every call.
#[derive(Debug)]
pub struct DecoderContext {
    engine: EngineHandle,
}

impl DecoderContext {
    /// Acquire the decompression engine handle.
    pub fn new() -> Result<Self, CodecError> {
        let mut engine = EngineHandle::new(Direction::Decompress)?;
        engine.set(PARAM_MAX_PIXELS, MAX_DECODED_PIXELS as c_int)?;
        Ok(Self { engine })
    }

    /// Decode a JPEG record into a freshly allocated BGR matrix.
    ///
    /// # Arguments
    ///
    /// * `image` - A [`PixelFormat::Jpeg`] record; its data length is taken
    ///   as the encoded size
    ///
    /// # Returns
    ///
    /// A [`DecodedImage`] with the dimensions found in the stream, which may
    /// differ from the width and height stored in the record.
    ///
    /// # Errors
    ///
    /// * `CodecError::NullPointer` if `image` or its data is missing
    /// * `CodecError::UnsupportedPixelFormat` if the record is not JPEG
    /// * `CodecError::DamagedJpegImage` if the header is truncated,
    ///   tables-only or unreadable, or declares more than
    ///   [`MAX_DECODED_PIXELS`] pixels
    /// * `CodecError::FailedImageEncoding` if decompression itself fails
    pub fn decode_to_memory(&mut self, image: Option<&Image>) -> Result<DecodedImage, CodecError> {
        let image = image.ok_or(CodecError::NullPointer)?;
        let data = image.data().ok_or(CodecError::NullPointer)?;
        if image.format() != PixelFormat::Jpeg {
            return Err(CodecError::UnsupportedPixelFormat(image.format()));
        }

        let (width, height) = self.read_header(data)?;

        match self.decompress(data, width, height) {
            Ok(decoded) => {
                debug!(width, height, input_bytes = data.len(), "Decoded JPEG image");
                Ok(decoded)
            }
            Err(fault) => {
                warn!(error = %fault, width, height, "JPEG decompression failed");
                Err(fault.into())
            }
        }
    }

    /// Parse the stream header and return the frame dimensions.
    fn read_header(&mut self, data: &[u8]) -> Result<(u32, u32), CodecError> {
        let status = scan_header(data);
        if status != HeaderStatus::Complete {
            debug!(%status, input_bytes = data.len(), "Rejected JPEG header");
            return Err(CodecError::DamagedJpegImage(status.to_string()));
        }

        let status =
            unsafe { raw::tj3DecompressHeader(self.engine.as_ptr(), data.as_ptr(), data.len() as _) };
        self.engine.check(status).map_err(|fault| {
            debug!(error = %fault, input_bytes = data.len(), "JPEG header parsing failed");
            CodecError::DamagedJpegImage(fault.to_string())
        })?;

        let width = self.engine.get(PARAM_JPEG_WIDTH);
        let height = self.engine.get(PARAM_JPEG_HEIGHT);
        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                debug!(width, height, "JPEG header reports invalid dimensions");
                return Err(CodecError::DamagedJpegImage(format!(
                    "header reports invalid dimensions {}x{}",
                    width, height
                )));
            }
        };

        if u64::from(width) * u64::from(height) > MAX_DECODED_PIXELS {
            debug!(width, height, "JPEG frame exceeds the pixel limit");
            return Err(CodecError::DamagedJpegImage(format!(
                "frame of {}x{} exceeds the limit of {} pixels",
                width, height, MAX_DECODED_PIXELS
            )));
        }
        Ok((width, height))
    }

    fn decompress(&mut self, data: &[u8], width: u32, height: u32) -> Result<DecodedImage, EngineFault> {
        let pitch = (width as usize)
            .checked_mul(3)
            .ok_or_else(|| EngineFault::new("output row size overflows"))?;
        let len = pitch
            .checked_mul(height as usize)
            .ok_or_else(|| EngineFault::new("output buffer size overflows"))?;
        let pitch = c_int::try_from(pitch)
            .map_err(|_| EngineFault::new(format!("output row of {} bytes is too wide", pitch)))?;

        let mut pixels = vec![0u8; len];
        let status = unsafe {
            raw::tj3Decompress8(
                self.engine.as_ptr(),
                data.as_ptr(),
                data.len() as _,
                pixels.as_mut_ptr(),
                pitch,
                PIXEL_BGR,
            )
        };
        self.engine.check(status)?;

        Ok(DecodedImage::new(width, height, pixels))
    }
}
