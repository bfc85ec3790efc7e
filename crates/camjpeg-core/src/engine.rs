//! Owned libjpeg-turbo engine handles.
//!
//! An [`EngineHandle`] wraps one TurboJPEG instance for a single direction.
//! It is acquired once and destroyed exactly once, on drop. Parameter
//! setters and status checks go through the error translator so callers
//! only ever see [`EngineFault`] values.

use std::ffi::{c_int, CStr};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;
use turbojpeg::raw;

use crate::error::{translate, EngineFault, Severity};

pub(crate) const PARAM_STOP_ON_WARNING: c_int = raw::TJPARAM_TJPARAM_STOPONWARNING as c_int;
pub(crate) const PARAM_QUALITY: c_int = raw::TJPARAM_TJPARAM_QUALITY as c_int;
pub(crate) const PARAM_SUBSAMP: c_int = raw::TJPARAM_TJPARAM_SUBSAMP as c_int;
pub(crate) const PARAM_FAST_DCT: c_int = raw::TJPARAM_TJPARAM_FASTDCT as c_int;
pub(crate) const PARAM_NO_REALLOC: c_int = raw::TJPARAM_TJPARAM_NOREALLOC as c_int;
pub(crate) const PARAM_JPEG_WIDTH: c_int = raw::TJPARAM_TJPARAM_JPEGWIDTH as c_int;
pub(crate) const PARAM_JPEG_HEIGHT: c_int = raw::TJPARAM_TJPARAM_JPEGHEIGHT as c_int;
pub(crate) const PARAM_MAX_PIXELS: c_int = raw::TJPARAM_TJPARAM_MAXPIXELS as c_int;

pub(crate) const PIXEL_GRAY: c_int = raw::TJPF_TJPF_GRAY as c_int;
pub(crate) const PIXEL_RGB: c_int = raw::TJPF_TJPF_RGB as c_int;
pub(crate) const PIXEL_BGR: c_int = raw::TJPF_TJPF_BGR as c_int;

pub(crate) const SUBSAMP_420: c_int = raw::TJSAMP_TJSAMP_420 as c_int;
pub(crate) const SUBSAMP_GRAY: c_int = raw::TJSAMP_TJSAMP_GRAY as c_int;

const ERROR_WARNING: c_int = raw::TJERR_TJERR_WARNING as c_int;

static LIVE_HANDLES: AtomicUsize = AtomicUsize::new(0);

/// Number of engine handles currently alive in this process.
///
/// Every encoder or decoder context owns exactly one, so a codec facade
/// accounts for two.
pub fn live_engine_handles() -> usize {
    LIVE_HANDLES.load(Ordering::SeqCst)
}

/// Which half of the engine a handle drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Compress,
    Decompress,
}

impl Direction {
    fn init_type(self) -> c_int {
        match self {
            Direction::Compress => raw::TJINIT_TJINIT_COMPRESS as c_int,
            Direction::Decompress => raw::TJINIT_TJINIT_DECOMPRESS as c_int,
        }
    }
}

#[derive(Debug)]
pub(crate) struct EngineHandle {
    ptr: raw::tjhandle,
    direction: Direction,
}

// A TurboJPEG instance may move between threads; it is never shared because
// every entry point takes `&mut self`.
unsafe impl Send for EngineHandle {}

impl EngineHandle {
    pub(crate) fn new(direction: Direction) -> Result<Self, EngineFault> {
        let ptr = unsafe { raw::tj3Init(direction.init_type()) };
        if ptr.is_null() {
            return Err(EngineFault::new(global_error_message()));
        }
        LIVE_HANDLES.fetch_add(1, Ordering::SeqCst);
        debug!(?direction, "Acquired JPEG engine handle");

        let mut handle = Self { ptr, direction };
        // Warnings never abort a call; the translator drops them afterwards.
        handle.set(PARAM_STOP_ON_WARNING, 0)?;
        Ok(handle)
    }

    pub(crate) fn as_ptr(&self) -> raw::tjhandle {
        self.ptr
    }

    pub(crate) fn set(&mut self, param: c_int, value: c_int) -> Result<(), EngineFault> {
        let status = unsafe { raw::tj3Set(self.ptr, param, value) };
        self.check(status)
    }

    pub(crate) fn get(&self, param: c_int) -> c_int {
        unsafe { raw::tj3Get(self.ptr, param) }
    }

    /// Pass a status returned by an engine call on this handle through the
    /// error translator.
    pub(crate) fn check(&self, status: c_int) -> Result<(), EngineFault> {
        translate(status, || {
            let code = unsafe { raw::tj3GetErrorCode(self.ptr) };
            let severity = if code == ERROR_WARNING {
                Severity::Warning
            } else {
                Severity::Fatal
            };
            (severity, error_message(self.ptr))
        })
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        unsafe { raw::tj3Destroy(self.ptr) };
        LIVE_HANDLES.fetch_sub(1, Ordering::SeqCst);
        debug!(direction = ?self.direction, "Released JPEG engine handle");
    }
}

/// Message for the last failure of a call that has no handle, such as
/// `tj3Init` or `tj3JPEGBufSize`.
pub(crate) fn global_error_message() -> String {
    error_message(std::ptr::null_mut())
}

fn error_message(ptr: raw::tjhandle) -> String {
    let msg = unsafe { raw::tj3GetErrorStr(ptr) };
    if msg.is_null() {
        return "Unknown JPEG engine error".to_string();
    }
    unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_created_for_both_directions() {
        assert!(EngineHandle::new(Direction::Compress).is_ok());
        assert!(EngineHandle::new(Direction::Decompress).is_ok());
    }

    #[test]
    fn test_set_rejects_out_of_range_quality() {
        let mut handle = EngineHandle::new(Direction::Compress).unwrap();
        assert!(handle.set(PARAM_QUALITY, 90).is_ok());
        let fault = handle.set(PARAM_QUALITY, 250).unwrap_err();
        assert!(!fault.message().is_empty());
    }

    #[test]
    fn test_handle_usable_after_fault() {
        let mut handle = EngineHandle::new(Direction::Compress).unwrap();
        assert!(handle.set(PARAM_QUALITY, 0).is_err());
        assert!(handle.set(PARAM_QUALITY, 75).is_ok());
        assert_eq!(handle.get(PARAM_QUALITY), 75);
    }
}
