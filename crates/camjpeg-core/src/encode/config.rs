//! Encoder settings.

use serde::{Deserialize, Serialize};

/// Quality used when none is given.
pub const DEFAULT_QUALITY: u16 = 85;
/// Lowest quality accepted by [`EncoderConfig::set_quality`].
pub const MIN_QUALITY: u16 = 1;
/// Highest quality the encoder accepts.
pub const MAX_QUALITY: u16 = 100;

/// Compression settings, applied on the next encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// JPEG quality (1 to 100)
    pub quality: u16,
    /// Use the fast, less accurate DCT
    pub faster_compression: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            faster_compression: false,
        }
    }
}

impl EncoderConfig {
    /// Create a config, capping `quality` at [`MAX_QUALITY`].
    pub fn new(quality: u16, faster_compression: bool) -> Self {
        Self {
            quality: quality.min(MAX_QUALITY),
            faster_compression,
        }
    }

    /// Builder form of [`set_quality`](Self::set_quality).
    pub fn with_quality(mut self, quality: u16) -> Self {
        self.set_quality(quality);
        self
    }

    /// Set quality, clamped to `MIN_QUALITY..=MAX_QUALITY`.
    pub fn set_quality(&mut self, quality: u16) {
        self.quality = quality.clamp(MIN_QUALITY, MAX_QUALITY);
    }

    /// Quality handed to the engine. Baseline quality scaling treats
    /// anything below 1 as 1.
    pub(crate) fn effective_quality(&self) -> u16 {
        self.quality.clamp(MIN_QUALITY, MAX_QUALITY)
    }
}
