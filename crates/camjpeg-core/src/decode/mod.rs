//! JPEG decoding.
//!
//! A [`DecoderContext`] owns one decompression engine handle for its whole
//! lifetime and turns JPEG records into 3-channel BGR matrices.
//!
//! # Pipeline
//!
//! 1. Validate the record (present, carries data, format is JPEG)
//! 2. Scan the marker structure so truncated and tables-only streams are
//!    reported as damaged before the engine sees them
//! 3. Let the engine parse the header and report the frame dimensions
//! 4. Decompress straight into a freshly allocated BGR buffer
//!
//! All operations are synchronous and run on the calling thread.
//!
//! # Examples
//!
//! ```ignore
//! use camjpeg_core::{DecoderContext, Image};
//!
//! let bytes = std::fs::read("frame.jpg").unwrap();
//! let mut decoder = DecoderContext::new().unwrap();
//! let decoded = decoder.decode_to_memory(Some(&Image::from_jpeg(0, 0, bytes))).unwrap();
//! println!("Decoded {}x{} image", decoded.width, decoded.height);
//! ```

mod header;
mod jpeg;

pub use jpeg::{DecoderContext, MAX_DECODED_PIXELS};
