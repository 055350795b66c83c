//! One capture, one page.

use super::document::Document;
use super::options::ExportOptions;
use super::state::{ExportState, StateTracker};
use crate::capture::{CaptureOverrides, ElementCapture, Surface};
use crate::diagnostics::{Reporter, SharedSink};
use crate::error::Result;
use crate::estimate::SizeEstimator;
use crate::geometry::PageSize;
use crate::optimize::{EncodedImage, ImageOptimizer};
use std::sync::Arc;

const COMPONENT: &str = "roadmap_export::single_page";

/// Builds single-page documents.
pub struct SinglePageDocumentBuilder {
    capture: Arc<ElementCapture>,
    optimizer: Arc<ImageOptimizer>,
    estimator: Arc<SizeEstimator>,
    reporter: Reporter,
}

/// Empty document with the page size and metadata `options` ask for.
pub(crate) fn document_for(options: &ExportOptions) -> Document {
    Document::new(PageSize::a4(options.orientation()), options.title.clone())
        .with_subtitle(options.subtitle.clone())
        .with_keywords(options.keywords())
}

impl SinglePageDocumentBuilder {
    /// Create a builder over shared pipeline components.
    pub fn new(
        capture: Arc<ElementCapture>,
        optimizer: Arc<ImageOptimizer>,
        estimator: Arc<SizeEstimator>,
        sink: SharedSink,
    ) -> Self {
        Self {
            capture,
            optimizer,
            estimator,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Wrap an already encoded image in a one-page document.
    pub fn build(&self, image: EncodedImage, options: &ExportOptions) -> Result<Document> {
        let mut document = document_for(options);
        let page = document.push_image(image)?;
        self.reporter.debug(format!(
            "Placed {}x{} image at ({:.2}, {:.2}) size {:.2}x{:.2} mm",
            page.image.width, page.image.height, page.x, page.y, page.width, page.height
        ));
        Ok(document)
    }

    /// Capture `surface` and build a one-page document from it.
    pub async fn capture_and_build(
        &self,
        surface: &dyn Surface,
        options: &ExportOptions,
        tracker: &mut StateTracker,
    ) -> Result<Document> {
        tracker.enter(ExportState::Capturing);
        let raster = self.capture.capture(surface, &CaptureOverrides::new()).await?;

        let estimate = self.estimator.estimate(raster.width(), raster.height());
        self.estimator.check_page(estimate);
        if raster.is_blank() {
            self.reporter.warn(format!(
                "Capture of '{}' has no visible content",
                surface.name()
            ));
        }

        tracker.enter(ExportState::Optimizing);
        let image = self.optimizer.optimize(&raster)?;
        drop(raster);

        tracker.enter(ExportState::Assembling);
        self.build(image, options)
    }
}
