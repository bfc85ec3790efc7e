//! JPEG encoding.
//!
//! This module provides:
//! - [`EncoderContext`], which owns one compression engine handle and
//!   compresses RGB24 or Grayscale8 records into a caller-owned buffer
//! - [`EncoderConfig`], the quality and speed settings applied on each call
//!
//! All operations are synchronous and single-threaded.
//!
//! # Examples
//!
//! ```ignore
//! use camjpeg_core::{EncoderConfig, EncoderContext, Image, PixelFormat};
//!
//! let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
//! let image = Image::from_pixels(PixelFormat::Rgb24, 100, 100, 300, pixels).unwrap();
//! let mut encoder = EncoderContext::new(EncoderConfig::new(90, false)).unwrap();
//! let mut buffer = Vec::new();
//! let size = encoder.encode_to_memory(Some(&image), &mut buffer).unwrap();
//! println!("Encoded {} bytes", size);
//! ```

mod config;
mod jpeg;

pub use config::{EncoderConfig, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
pub use jpeg::EncoderContext;
