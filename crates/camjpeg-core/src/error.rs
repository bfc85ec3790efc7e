//! Error taxonomy and engine fault translation.
//!
//! Every status the engine reports goes through [`translate`]: fatal reports
//! become an [`EngineFault`] the contexts can propagate with `?`, while
//! warnings and diagnostic text are dropped so they never reach the caller.

use std::ffi::c_int;
use std::fmt;

use thiserror::Error;

use crate::types::PixelFormat;

/// Errors returned by the codec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The image, or the data it should carry, is missing.
    #[error("Required image or image data is missing")]
    NullPointer,

    /// The operation does not accept this pixel format.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedPixelFormat(PixelFormat),

    /// The JPEG header is truncated, tables-only or not a JPEG at all.
    #[error("Damaged JPEG image: {0}")]
    DamagedJpegImage(String),

    /// The engine failed while compressing or decompressing.
    #[error("JPEG coding failure: {0}")]
    FailedImageEncoding(String),
}

/// Severity of a non-zero engine status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Severity {
    /// The call completed; the engine only has something to say about it.
    Warning,
    /// The call was abandoned.
    Fatal,
}

/// A fatal engine report, carried as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EngineFault {
    message: String,
}

impl EngineFault {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<EngineFault> for CodecError {
    fn from(fault: EngineFault) -> Self {
        CodecError::FailedImageEncoding(fault.message)
    }
}

/// Translate an engine status code.
///
/// `report` is only consulted when `status` is non-zero and yields the
/// severity and message the engine recorded for the failed call.
pub(crate) fn translate<F>(status: c_int, report: F) -> Result<(), EngineFault>
where
    F: FnOnce() -> (Severity, String),
{
    if status == 0 {
        return Ok(());
    }

    match report() {
        (Severity::Warning, _) => Ok(()),
        (Severity::Fatal, message) => Err(EngineFault::new(message)),
    }
}
