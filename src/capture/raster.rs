//! Captured pixel buffers.

use image::RgbaImage;

/// RGBA pixel grid produced by a capture.
///
/// Owned by a single export invocation and dropped once encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBuffer {
    pixels: RgbaImage,
}

impl RasterBuffer {
    /// Wrap a decoded RGBA image.
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// A buffer filled with one colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Total pixel count.
    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Borrow the underlying image.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take the underlying image.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// True when every pixel is white or fully transparent.
    pub fn is_blank(&self) -> bool {
        !self.pixels.pixels().any(|p| {
            let [r, g, b, a] = p.0;
            a > 0 && (r < 255 || g < 255 || b < 255)
        })
    }
}
