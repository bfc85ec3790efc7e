//! Image records handed to and returned from the codec.
//!
//! [`Image`] is the container the capture side fills in: raw pixels in one of
//! the supported layouts, or an already compressed JPEG frame. [`DecodedImage`]
//! is what decompression produces, a 3-channel matrix in blue-green-red order.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pixel layout of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Layout not known; no codec operation accepts it.
    #[default]
    Unknown,
    /// One byte per pixel.
    Grayscale8,
    /// Three bytes per pixel, red first.
    Rgb24,
    /// Four bytes per pixel, red first, alpha last.
    Rgba32,
    /// Compressed JPEG stream.
    Jpeg,
}

impl PixelFormat {
    /// Bytes occupied by one pixel, or `None` for formats without a fixed
    /// pixel size.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            PixelFormat::Grayscale8 => Some(1),
            PixelFormat::Rgb24 => Some(3),
            PixelFormat::Rgba32 => Some(4),
            PixelFormat::Unknown | PixelFormat::Jpeg => None,
        }
    }

    /// Returns true if the data is a compressed stream rather than pixels.
    pub fn is_compressed(self) -> bool {
        self == PixelFormat::Jpeg
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Unknown => "unknown",
            PixelFormat::Grayscale8 => "8-bit grayscale",
            PixelFormat::Rgb24 => "24-bit RGB",
            PixelFormat::Rgba32 => "32-bit RGBA",
            PixelFormat::Jpeg => "JPEG",
        };
        f.write_str(name)
    }
}

/// An image record: format, geometry and (optionally) its data.
///
/// For raw formats the constructors guarantee `stride >= width * bpp` and
/// `data.len() >= height * stride`. For [`PixelFormat::Jpeg`] the data is the
/// encoded stream, its length is the encoded byte count and the stride is 0.
/// A record without data stands in for one whose buffer was never allocated
/// or has been handed off with [`Image::take_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    format: PixelFormat,
    width: u32,
    height: u32,
    stride: usize,
    data: Option<Vec<u8>>,
}

impl Image {
    /// Wrap raw pixel data.
    ///
    /// # Arguments
    ///
    /// * `format` - Raw pixel layout (not `Jpeg` or `Unknown`)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `stride` - Distance between the starts of two rows, in bytes
    /// * `data` - Pixel bytes, at least `height * stride` long
    ///
    /// # Returns
    ///
    /// `None` if the format has no fixed pixel size, the stride is shorter
    /// than one row of pixels, or the data is too short for `height` rows.
    pub fn from_pixels(
        format: PixelFormat,
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
    ) -> Option<Self> {
        let bpp = format.bytes_per_pixel()?;
        let row_bytes = (width as usize).checked_mul(bpp)?;
        if stride < row_bytes {
            return None;
        }
        let required = stride.checked_mul(height as usize)?;
        if data.len() < required {
            return None;
        }

        Some(Self {
            format,
            width,
            height,
            stride,
            data: Some(data),
        })
    }

    /// Wrap an encoded JPEG stream.
    ///
    /// `width` and `height` describe the frame as the producer announced it;
    /// decoding always reports the dimensions found in the stream itself.
    pub fn from_jpeg(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            format: PixelFormat::Jpeg,
            width,
            height,
            stride: 0,
            data: Some(data),
        }
    }

    /// A record with geometry but no data.
    pub fn unallocated(format: PixelFormat, width: u32, height: u32) -> Self {
        let stride = format
            .bytes_per_pixel()
            .map(|bpp| width as usize * bpp)
            .unwrap_or(0);
        Self {
            format,
            width,
            height,
            stride,
            data: None,
        }
    }

    /// Copy an `image::RgbImage` into a tightly packed RGB24 record.
    pub fn from_rgb_image(img: &image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            format: PixelFormat::Rgb24,
            width,
            height,
            stride: width as usize * 3,
            data: Some(img.as_raw().clone()),
        }
    }

    /// Copy an `image::GrayImage` into a tightly packed Grayscale8 record.
    pub fn from_gray_image(img: &image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            format: PixelFormat::Grayscale8,
            width,
            height,
            stride: width as usize,
            data: Some(img.as_raw().clone()),
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row stride in bytes (0 for compressed records).
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The image bytes, or `None` if the record carries no data.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Detach the data, leaving a record without data behind.
    pub fn take_data(&mut self) -> Option<Vec<u8>> {
        self.data.take()
    }
}

/// A decoded image: 3 bytes per pixel in blue-green-red order, rows packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// BGR pixel data in row-major order (3 bytes per pixel).
    /// Length should be width * height * 3.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a new DecodedImage with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 3
    }

    /// One row of BGR bytes, or `None` past the last row.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride();
        self.pixels.get(start..start + self.stride())
    }

    /// The `[b, g, r]` triple at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width {
            return None;
        }
        let row = self.row(y)?;
        let i = x as usize * 3;
        Some([row[i], row[i + 1], row[i + 2]])
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Convert to an `image::RgbImage`, swapping blue and red.
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let [b, g, r] = self.pixel(x, y).unwrap_or_default();
            image::Rgb([r, g, b])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Grayscale8.bytes_per_pixel(), Some(1));
        assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), Some(3));
        assert_eq!(PixelFormat::Rgba32.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::Jpeg.bytes_per_pixel(), None);
        assert_eq!(PixelFormat::Unknown.bytes_per_pixel(), None);
    }

    #[test]
    fn test_pixel_format_display() {
        assert_eq!(PixelFormat::Rgb24.to_string(), "24-bit RGB");
        assert_eq!(PixelFormat::Jpeg.to_string(), "JPEG");
        assert!(PixelFormat::Jpeg.is_compressed());
        assert!(!PixelFormat::Grayscale8.is_compressed());
    }

    #[test]
    fn test_from_pixels_packed() {
        let img = Image::from_pixels(PixelFormat::Rgb24, 4, 2, 12, vec![0u8; 24]).unwrap();
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 2);
        assert_eq!(img.stride(), 12);
        assert_eq!(img.data().map(<[u8]>::len), Some(24));
    }

    #[test]
    fn test_from_pixels_padded_stride() {
        // 3 pixels of RGB need 9 bytes, rows are padded to 16
        let img = Image::from_pixels(PixelFormat::Rgb24, 3, 5, 16, vec![0u8; 80]);
        assert!(img.is_some());
    }

    #[test]
    fn test_from_pixels_rejects_short_stride() {
        let img = Image::from_pixels(PixelFormat::Rgb24, 4, 2, 11, vec![0u8; 24]);
        assert!(img.is_none());
    }

    #[test]
    fn test_from_pixels_rejects_short_data() {
        let img = Image::from_pixels(PixelFormat::Grayscale8, 10, 10, 10, vec![0u8; 99]);
        assert!(img.is_none());
    }

    #[test]
    fn test_from_pixels_rejects_compressed_formats() {
        assert!(Image::from_pixels(PixelFormat::Jpeg, 1, 1, 1, vec![0u8; 1]).is_none());
        assert!(Image::from_pixels(PixelFormat::Unknown, 1, 1, 1, vec![0u8; 1]).is_none());
    }

    #[test]
    fn test_from_jpeg() {
        let img = Image::from_jpeg(640, 480, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(img.format(), PixelFormat::Jpeg);
        assert_eq!(img.stride(), 0);
        assert_eq!(img.data(), Some(&[0xFF, 0xD8, 0xFF, 0xD9][..]));
    }

    #[test]
    fn test_take_data_leaves_record_without_data() {
        let mut img = Image::from_pixels(PixelFormat::Grayscale8, 2, 2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(img.take_data(), Some(vec![1, 2, 3, 4]));
        assert!(img.data().is_none());
        assert_eq!(img.width(), 2);
    }

    #[test]
    fn test_unallocated() {
        let img = Image::unallocated(PixelFormat::Rgb24, 8, 8);
        assert!(img.data().is_none());
        assert_eq!(img.stride(), 24);
    }

    #[test]
    fn test_from_image_crate_buffers() {
        let rgb = image::RgbImage::from_pixel(5, 3, image::Rgb([1, 2, 3]));
        let img = Image::from_rgb_image(&rgb);
        assert_eq!(img.format(), PixelFormat::Rgb24);
        assert_eq!(img.stride(), 15);
        assert_eq!(&img.data().unwrap()[0..3], &[1, 2, 3]);

        let gray = image::GrayImage::from_pixel(5, 3, image::Luma([7]));
        let img = Image::from_gray_image(&gray);
        assert_eq!(img.format(), PixelFormat::Grayscale8);
        assert_eq!(img.stride(), 5);
    }

    #[test]
    fn test_decoded_image_accessors() {
        // 2x1: blue pixel, then red pixel
        let img = DecodedImage::new(2, 1, vec![255, 0, 0, 0, 0, 255]);
        assert_eq!(img.stride(), 6);
        assert_eq!(img.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(img.pixel(1, 0), Some([0, 0, 255]));
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.row(1), None);
        assert_eq!(img.pixel_count(), 2);
        assert_eq!(img.byte_size(), 6);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_decoded_image_to_rgb_swaps_channels() {
        let img = DecodedImage::new(1, 1, vec![10, 20, 30]);
        let rgb = img.to_rgb_image();
        assert_eq!(rgb.get_pixel(0, 0).0, [30, 20, 10]);
    }

    #[test]
    fn test_decoded_image_empty() {
        let img = DecodedImage::new(0, 0, vec![]);
        assert!(img.is_empty());
    }
}
