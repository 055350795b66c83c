//! Raster encoding with an adaptive quality policy.
//!
//! Lossy output is JPEG. The first encode runs at the configured default
//! quality; when the result is larger than the retry threshold the raster is
//! encoded exactly once more at the fallback quality and that second result
//! is returned whatever its size.

use crate::capture::RasterBuffer;
use crate::config::ExportConfig;
use crate::diagnostics::{Reporter, SharedSink};
use crate::error::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::sync::Arc;

const COMPONENT: &str = "roadmap_export::optimize";

/// Encoding of an [`EncodedImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    /// Lossy, used for document pages
    Jpeg,
    /// Lossless, used for raster exports
    Png,
}

impl ImageEncoding {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "jpg",
            ImageEncoding::Png => "png",
        }
    }
}

/// Encoded raster plus the parameters that produced it.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// Encoded bytes
    pub data: bytes::Bytes,
    /// Quality used; 1.0 for lossless output
    pub quality: f32,
    /// Encoding
    pub encoding: ImageEncoding,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
}

impl EncodedImage {
    /// Encoded size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Turns raster buffers into encoded bytes.
pub trait RasterEncoder: Send + Sync {
    /// Lossy encode at `quality` in `0.0..=1.0`.
    fn encode_lossy(&self, raster: &RasterBuffer, quality: f32) -> Result<Vec<u8>>;

    /// Lossless encode.
    fn encode_lossless(&self, raster: &RasterBuffer) -> Result<Vec<u8>>;
}

/// [`RasterEncoder`] backed by the `image` crate codecs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec;

impl ImageCodec {
    /// Map `0.0..=1.0` onto the JPEG encoder's `1..=100` scale.
    fn jpeg_quality(quality: f32) -> u8 {
        (quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Composite RGBA pixels over white, dropping alpha.
fn flatten_over_white(raster: &RasterBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(raster.pixel_count() as usize * 3);
    for pixel in raster.pixels().pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

impl RasterEncoder for ImageCodec {
    fn encode_lossy(&self, raster: &RasterBuffer, quality: f32) -> Result<Vec<u8>> {
        let rgb = flatten_over_white(raster);
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, Self::jpeg_quality(quality)).encode(
            &rgb,
            raster.width(),
            raster.height(),
            ColorType::Rgb8,
        )?;
        Ok(out)
    }

    fn encode_lossless(&self, raster: &RasterBuffer) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out).write_image(
            raster.pixels().as_raw(),
            raster.width(),
            raster.height(),
            ColorType::Rgba8,
        )?;
        Ok(out)
    }
}

/// Encodes captures under the size-driven quality policy.
pub struct ImageOptimizer {
    encoder: Arc<dyn RasterEncoder>,
    default_quality: f32,
    fallback_quality: f32,
    retry_threshold: usize,
    reporter: Reporter,
}

impl ImageOptimizer {
    /// Optimizer using the `image` crate codecs.
    pub fn new(config: &ExportConfig, sink: SharedSink) -> Self {
        Self::with_encoder(config, sink, Arc::new(ImageCodec))
    }

    /// Optimizer using a caller-supplied encoder.
    pub fn with_encoder(
        config: &ExportConfig,
        sink: SharedSink,
        encoder: Arc<dyn RasterEncoder>,
    ) -> Self {
        Self {
            encoder,
            default_quality: config.default_quality,
            fallback_quality: config.fallback_quality,
            retry_threshold: config.retry_threshold_bytes,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Encode at the default quality.
    pub fn optimize(&self, raster: &RasterBuffer) -> Result<EncodedImage> {
        self.optimize_with_quality(raster, self.default_quality)
    }

    /// Encode at `quality`, falling back once to the fallback quality when
    /// the first result exceeds the retry threshold.
    pub fn optimize_with_quality(
        &self,
        raster: &RasterBuffer,
        quality: f32,
    ) -> Result<EncodedImage> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(Error::Encode(format!("quality {} outside 0.0..=1.0", quality)));
        }

        let first = self.encoder.encode_lossy(raster, quality)?;
        self.reporter.debug(format!(
            "Encoded {}x{} JPEG at quality {}: {} bytes",
            raster.width(),
            raster.height(),
            quality,
            first.len()
        ));
        if first.len() <= self.retry_threshold {
            return Ok(self.wrap(first, quality, ImageEncoding::Jpeg, raster));
        }

        self.reporter.warn(format!(
            "Encoded image is {} bytes, above the {} byte threshold; re-encoding at quality {}",
            first.len(),
            self.retry_threshold,
            self.fallback_quality
        ));
        let second = self.encoder.encode_lossy(raster, self.fallback_quality)?;
        self.reporter.debug(format!(
            "Re-encoded at quality {}: {} bytes",
            self.fallback_quality,
            second.len()
        ));
        Ok(self.wrap(second, self.fallback_quality, ImageEncoding::Jpeg, raster))
    }

    /// Lossless PNG encode for raster exports.
    pub fn encode_lossless(&self, raster: &RasterBuffer) -> Result<EncodedImage> {
        let data = self.encoder.encode_lossless(raster)?;
        self.reporter.debug(format!(
            "Encoded {}x{} PNG: {} bytes",
            raster.width(),
            raster.height(),
            data.len()
        ));
        Ok(self.wrap(data, 1.0, ImageEncoding::Png, raster))
    }

    fn wrap(
        &self,
        data: Vec<u8>,
        quality: f32,
        encoding: ImageEncoding,
        raster: &RasterBuffer,
    ) -> EncodedImage {
        EncodedImage {
            data: bytes::Bytes::from(data),
            quality,
            encoding,
            width: raster.width(),
            height: raster.height(),
        }
    }
}
