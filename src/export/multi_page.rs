//! Paginated documents from page sub-surfaces.

use super::document::Document;
use super::options::ExportOptions;
use super::single_page::{document_for, SinglePageDocumentBuilder};
use super::state::{ExportState, StateTracker};
use crate::capture::{CaptureOverrides, ElementCapture, Surface};
use crate::config::ExportConfig;
use crate::diagnostics::{Reporter, SharedSink};
use crate::error::Result;
use crate::estimate::{SizeEstimate, SizeEstimator};
use crate::optimize::ImageOptimizer;
use std::sync::Arc;

const COMPONENT: &str = "roadmap_export::multi_page";

/// Builds one page per page sub-surface, in discovery order.
pub struct MultiPageDocumentBuilder {
    capture: Arc<ElementCapture>,
    optimizer: Arc<ImageOptimizer>,
    estimator: Arc<SizeEstimator>,
    single: Arc<SinglePageDocumentBuilder>,
    page_class: String,
    scale: f32,
    reporter: Reporter,
}

impl MultiPageDocumentBuilder {
    /// Create a builder over shared pipeline components.
    pub fn new(
        config: &ExportConfig,
        capture: Arc<ElementCapture>,
        optimizer: Arc<ImageOptimizer>,
        estimator: Arc<SizeEstimator>,
        single: Arc<SinglePageDocumentBuilder>,
        sink: SharedSink,
    ) -> Self {
        Self {
            capture,
            optimizer,
            estimator,
            single,
            page_class: config.page_container_class.clone(),
            scale: config.multi_page_scale,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Build the document. A surface without page sub-surfaces is exported
    /// as a single page.
    pub async fn build(
        &self,
        surface: &dyn Surface,
        options: &ExportOptions,
        tracker: &mut StateTracker,
    ) -> Result<Document> {
        let pages = surface.page_surfaces(&self.page_class);
        if pages.is_empty() {
            self.reporter.info(format!(
                "No '{}' sections in '{}'; exporting a single page",
                self.page_class,
                surface.name()
            ));
            return self.single.capture_and_build(surface, options, tracker).await;
        }

        let total_pages = pages.len();
        self.reporter.info(format!(
            "Exporting '{}' as {} pages",
            surface.name(),
            total_pages
        ));

        let overrides = CaptureOverrides::new().with_scale(self.scale);
        let mut document = document_for(options);
        let mut total = SizeEstimate::default();

        for (index, page) in pages.iter().enumerate() {
            tracker.enter(ExportState::Capturing);
            self.reporter.debug(format!(
                "Page {}/{}: '{}'",
                index + 1,
                total_pages,
                page.name()
            ));
            let raster = self.capture.capture(page.as_ref(), &overrides).await?;
            let estimate = self.estimator.estimate(raster.width(), raster.height());
            self.estimator.check_page(estimate);
            total = total + estimate;

            tracker.enter(ExportState::Optimizing);
            let image = self.optimizer.optimize(&raster)?;
            drop(raster);

            tracker.enter(ExportState::Assembling);
            document.push_image(image)?;
        }

        self.estimator.check_document(total);
        Ok(document)
    }
}
