//! Top-level export entry points.

use super::filename::artifact_filename;
use super::multi_page::MultiPageDocumentBuilder;
use super::notify::{LogNotifier, UserNotifier};
use super::options::{ExportFormat, ExportMode, ExportOptions};
use super::overlay::{LogOverlayHost, OverlayGuard, OverlayHost};
use super::raster::RasterExporter;
use super::single_page::SinglePageDocumentBuilder;
use super::sink::ArtifactSink;
use super::state::{ExportState, StateTracker};
use crate::capture::{CaptureOverrides, ElementCapture, Surface};
use crate::config::ExportConfig;
use crate::diagnostics::{LogSink, Reporter, SharedSink};
use crate::error::Result;
use crate::estimate::SizeEstimator;
use crate::optimize::{ImageOptimizer, RasterEncoder};
use chrono::{DateTime, Utc};
use std::sync::Arc;

const COMPONENT: &str = "roadmap_export::orchestrator";

/// Source of export timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    /// Artifact filename
    pub filename: String,
    /// Pages in the artifact; 1 for raster exports
    pub page_count: usize,
    /// Artifact size in bytes
    pub byte_len: usize,
    /// States visited, from `Idle` back to `Idle`
    pub transitions: Vec<ExportState>,
}

/// What a run produced before the overlay is torn down.
struct Delivered {
    filename: String,
    page_count: usize,
    byte_len: usize,
}

/// Drives capture, encoding, assembly and delivery for one export at a
/// time per call. Calls may run concurrently.
pub struct ExportOrchestrator {
    capture: Arc<ElementCapture>,
    single: Arc<SinglePageDocumentBuilder>,
    multi: MultiPageDocumentBuilder,
    raster: RasterExporter,
    artifacts: Arc<dyn ArtifactSink>,
    overlays: Arc<dyn OverlayHost>,
    notifier: Arc<dyn UserNotifier>,
    clock: Clock,
    reporter: Reporter,
}

/// Builder for [`ExportOrchestrator`].
pub struct ExportOrchestratorBuilder {
    config: ExportConfig,
    artifacts: Arc<dyn ArtifactSink>,
    diagnostics: Option<SharedSink>,
    encoder: Option<Arc<dyn RasterEncoder>>,
    overlays: Option<Arc<dyn OverlayHost>>,
    notifier: Option<Arc<dyn UserNotifier>>,
    clock: Option<Clock>,
}

impl ExportOrchestratorBuilder {
    /// Pipeline configuration.
    pub fn config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    /// Diagnostics sink; defaults to [`LogSink`].
    pub fn diagnostics(mut self, sink: SharedSink) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Raster encoder; defaults to the `image` crate codecs.
    pub fn encoder(mut self, encoder: Arc<dyn RasterEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    /// Overlay host; defaults to a diagnostics-only host.
    pub fn overlay_host(mut self, host: Arc<dyn OverlayHost>) -> Self {
        self.overlays = Some(host);
        self
    }

    /// User notifier; defaults to a diagnostics-only notifier.
    pub fn notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Timestamp source for filenames; defaults to [`Utc::now`].
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the config and wire up the pipeline.
    pub fn build(self) -> Result<ExportOrchestrator> {
        self.config.validate()?;
        let config = &self.config;
        let sink: SharedSink = self.diagnostics.unwrap_or_else(|| Arc::new(LogSink));

        let capture = Arc::new(ElementCapture::new(config, sink.clone()));
        let optimizer = Arc::new(match self.encoder {
            Some(encoder) => ImageOptimizer::with_encoder(config, sink.clone(), encoder),
            None => ImageOptimizer::new(config, sink.clone()),
        });
        let estimator = Arc::new(SizeEstimator::new(config, sink.clone()));
        let single = Arc::new(SinglePageDocumentBuilder::new(
            capture.clone(),
            optimizer.clone(),
            estimator.clone(),
            sink.clone(),
        ));
        let multi = MultiPageDocumentBuilder::new(
            config,
            capture.clone(),
            optimizer.clone(),
            estimator,
            single.clone(),
            sink.clone(),
        );
        let raster = RasterExporter::new(optimizer, sink.clone());

        Ok(ExportOrchestrator {
            capture,
            single,
            multi,
            raster,
            artifacts: self.artifacts,
            overlays: self
                .overlays
                .unwrap_or_else(|| Arc::new(LogOverlayHost::new(sink.clone()))),
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(LogNotifier::new(sink.clone()))),
            clock: self.clock.unwrap_or_else(|| Arc::new(Utc::now)),
            reporter: Reporter::new(sink, COMPONENT),
        })
    }
}

impl ExportOrchestrator {
    /// Start building an orchestrator delivering into `artifacts`.
    pub fn builder(artifacts: Arc<dyn ArtifactSink>) -> ExportOrchestratorBuilder {
        ExportOrchestratorBuilder {
            config: ExportConfig::default(),
            artifacts,
            diagnostics: None,
            encoder: None,
            overlays: None,
            notifier: None,
            clock: None,
        }
    }

    /// Export the overview: landscape, details hidden, paginated when
    /// exported as a document.
    pub async fn export_overview(
        &self,
        surface: &dyn Surface,
        format: ExportFormat,
        title: impl Into<String>,
    ) -> Result<ExportOutcome> {
        let options = ExportOptions::new(ExportMode::Overview, format, title)
            .with_landscape(true)
            .with_include_details(false);
        self.export(surface, options).await
    }

    /// Export the detailed view: landscape, details shown.
    pub async fn export_detailed(
        &self,
        surface: &dyn Surface,
        format: ExportFormat,
        title: impl Into<String>,
    ) -> Result<ExportOutcome> {
        let options = ExportOptions::new(ExportMode::Detailed, format, title)
            .with_landscape(true)
            .with_include_details(true);
        self.export(surface, options).await
    }

    /// Export one team's track: landscape, filtered to `team`.
    pub async fn export_track(
        &self,
        surface: &dyn Surface,
        format: ExportFormat,
        title: impl Into<String>,
        team: impl Into<String>,
    ) -> Result<ExportOutcome> {
        let options = ExportOptions::new(ExportMode::Track, format, title)
            .with_landscape(true)
            .with_team_filter(team);
        self.export(surface, options).await
    }

    /// Export `surface` as `options` describe.
    ///
    /// The overlay is shown for the duration of the call and removed on
    /// every exit, including when the returned future is dropped. On
    /// failure the user is notified and the error is returned unchanged.
    pub async fn export(
        &self,
        surface: &dyn Surface,
        options: ExportOptions,
    ) -> Result<ExportOutcome> {
        let mut tracker = StateTracker::new(self.reporter.sink());
        self.reporter.info(format!(
            "Starting {} export of '{}' as {}",
            options.mode,
            surface.name(),
            options.format
        ));

        let overlay = OverlayGuard::show(
            self.overlays.clone(),
            &format!("Exporting {} roadmap…", options.mode),
        );
        tracker.enter(ExportState::OverlayShown);

        match self.run(surface, &options, &mut tracker).await {
            Ok(delivered) => {
                overlay.release();
                tracker.enter(ExportState::OverlayRemoved);
                tracker.enter(ExportState::Idle);
                self.reporter.info(format!(
                    "Exported {} ({} page(s), {} bytes)",
                    delivered.filename, delivered.page_count, delivered.byte_len
                ));
                self.notifier
                    .notify_success(&format!("Saved {}", delivered.filename));
                Ok(ExportOutcome {
                    filename: delivered.filename,
                    page_count: delivered.page_count,
                    byte_len: delivered.byte_len,
                    transitions: tracker.into_trail(),
                })
            },
            Err(err) => {
                tracker.enter(ExportState::Error);
                overlay.release();
                tracker.enter(ExportState::OverlayRemoved);
                tracker.enter(ExportState::Idle);
                self.reporter.error(format!(
                    "{} export as {} failed: {}",
                    options.mode, options.format, err
                ));
                self.notifier.notify_error(&format!("Export failed: {}", err));
                Err(err)
            },
        }
    }

    async fn run(
        &self,
        surface: &dyn Surface,
        options: &ExportOptions,
        tracker: &mut StateTracker,
    ) -> Result<Delivered> {
        let filename = artifact_filename(options.mode, options.format, (self.clock)());

        if options.format == ExportFormat::Raster {
            tracker.enter(ExportState::Capturing);
            let raster = self.capture.capture(surface, &CaptureOverrides::new()).await?;
            tracker.enter(ExportState::Optimizing);
            let image = self.raster.prepare(&raster)?;
            drop(raster);

            tracker.enter(ExportState::Saving);
            self.raster
                .export(&image, &filename, self.artifacts.as_ref())
                .await?;
            return Ok(Delivered {
                filename,
                page_count: 1,
                byte_len: image.byte_len(),
            });
        }

        let document = if options.is_paginated() {
            self.multi.build(surface, options, tracker).await?
        } else {
            self.single.capture_and_build(surface, options, tracker).await?
        };
        let bytes = document.to_pdf()?;

        tracker.enter(ExportState::Saving);
        self.artifacts.save(&filename, &bytes).await?;
        Ok(Delivered {
            filename,
            page_count: document.page_count(),
            byte_len: bytes.len(),
        })
    }
}
