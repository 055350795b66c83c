// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::new_without_default)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # roadmap_export
//!
//! Document export engine for roadmap views: turns a rendered visual surface
//! into a multi-page PDF or a single PNG.
//!
//! ## Core Features
//!
//! - **Capture**: rasterize any [`capture::Surface`] at a pixel-count-driven
//!   scale, gated on an explicit readiness signal
//! - **Adaptive encoding**: JPEG at 0.85, one fallback encode at 0.70 when the
//!   result exceeds 5 MB
//! - **Pagination**: one A4 page per `roadmap-export-page` section, each
//!   aspect-fitted and centred
//! - **Size advisories**: per-page and per-document estimate warnings
//! - **Scoped overlays**: every export owns its own "in progress" overlay,
//!   removed on success, failure and cancellation
//! - **Injected diagnostics**: all components report through a
//!   [`diagnostics::DiagnosticSink`]
//!
//! ## Architecture
//!
//! ```text
//! ExportOrchestrator
//!     ├─ ElementCapture  (Surface → RasterBuffer)
//!     ├─ ImageOptimizer  (RasterBuffer → EncodedImage)
//!     ├─ SizeEstimator   (advisory warnings)
//!     ├─ Single/MultiPageDocumentBuilder → Document → writer::PdfWriter
//!     ├─ RasterExporter  (PNG)
//!     └─ ArtifactSink    (file / memory)
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use roadmap_export::export::{ExportFormat, ExportOrchestrator, FileSink};
//! use roadmap_export::scene::SceneSurface;
//! use roadmap_export::diagnostics::LogSink;
//! use std::sync::Arc;
//!
//! # async fn run() -> roadmap_export::Result<()> {
//! let surface = SceneSurface::from_json_file("overview.json")?;
//! let artifacts = Arc::new(FileSink::new("exports", Arc::new(LogSink)));
//! let orchestrator = ExportOrchestrator::builder(artifacts).build()?;
//!
//! let outcome = orchestrator
//!     .export_overview(&surface, ExportFormat::Document, "2026 Roadmap")
//!     .await?;
//! println!("{} ({} pages)", outcome.filename, outcome.page_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration and diagnostics
pub mod config;
pub mod diagnostics;

// Page geometry
pub mod geometry;

// Capture
pub mod capture;
pub mod scene;

// Encoding and estimates
pub mod estimate;
pub mod optimize;

// PDF writing
pub mod writer;

// Export pipeline
pub mod export;

pub use capture::{ElementCapture, RasterBuffer, ReadySignal, Surface};
pub use config::ExportConfig;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportMode, ExportOptions, ExportOrchestrator, ExportOutcome};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is populated from CARGO_PKG_VERSION at compile time
        assert!(VERSION.starts_with("0."));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "roadmap_export");
    }
}
