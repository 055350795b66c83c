//! Lossless single-image exports.

use super::sink::ArtifactSink;
use crate::capture::RasterBuffer;
use crate::diagnostics::{Reporter, SharedSink};
use crate::error::{Error, Result};
use crate::optimize::{EncodedImage, ImageEncoding, ImageOptimizer};
use std::sync::Arc;

const COMPONENT: &str = "roadmap_export::raster";

/// Delivers a capture as a PNG, without document wrapping.
pub struct RasterExporter {
    optimizer: Arc<ImageOptimizer>,
    reporter: Reporter,
}

impl RasterExporter {
    /// Create an exporter.
    pub fn new(optimizer: Arc<ImageOptimizer>, sink: SharedSink) -> Self {
        Self {
            optimizer,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Encode `raster` losslessly.
    pub fn prepare(&self, raster: &RasterBuffer) -> Result<EncodedImage> {
        self.optimizer.encode_lossless(raster)
    }

    /// Hand `image` to `sink` under `filename`.
    pub async fn export(
        &self,
        image: &EncodedImage,
        filename: &str,
        sink: &dyn ArtifactSink,
    ) -> Result<()> {
        if image.encoding != ImageEncoding::Png {
            return Err(Error::Encode(format!(
                "raster export needs a PNG, got {}",
                image.encoding.extension()
            )));
        }
        self.reporter.debug(format!(
            "Delivering {} ({}x{}, {} bytes)",
            filename,
            image.width,
            image.height,
            image.byte_len()
        ));
        sink.save(filename, &image.data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::diagnostics::MemorySink;
    use crate::export::sink::MemoryArtifactSink;

    fn exporter() -> RasterExporter {
        let sink = Arc::new(MemorySink::new());
        let optimizer = Arc::new(ImageOptimizer::new(&ExportConfig::default(), sink.clone()));
        RasterExporter::new(optimizer, sink)
    }

    #[tokio::test]
    async fn test_png_is_delivered_unchanged() {
        let exporter = exporter();
        let image = exporter
            .prepare(&RasterBuffer::filled(3, 2, [1, 2, 3, 255]))
            .unwrap();
        let artifacts = MemoryArtifactSink::new();

        exporter.export(&image, "roadmap.png", &artifacts).await.unwrap();

        let saved = artifacts.artifacts();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].filename, "roadmap.png");
        assert_eq!(saved[0].data, image.data);
    }

    #[tokio::test]
    async fn test_lossy_image_is_rejected() {
        let exporter = exporter();
        let mut image = exporter
            .prepare(&RasterBuffer::filled(1, 1, [0, 0, 0, 255]))
            .unwrap();
        image.encoding = ImageEncoding::Jpeg;
        let artifacts = MemoryArtifactSink::new();

        assert!(exporter.export(&image, "x.png", &artifacts).await.is_err());
        assert!(artifacts.is_empty());
    }
}
