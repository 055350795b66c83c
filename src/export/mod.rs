//! Export pipeline: routing, document assembly and artifact delivery.
//!
//! ```text
//! ExportOrchestrator::export(surface, options)
//!     ├─ Overview + Document ─→ MultiPageDocumentBuilder ─┐
//!     ├─ other + Document ────→ SinglePageDocumentBuilder ┼─→ Document::to_pdf ─┐
//!     └─ any + Raster ────────→ RasterExporter ───────────────────────────────┼─→ ArtifactSink
//! ```

mod document;
mod filename;
mod multi_page;
mod notify;
mod options;
mod orchestrator;
mod overlay;
mod raster;
mod single_page;
mod sink;
mod state;

pub use document::{Document, DocumentPage};
pub use filename::{artifact_filename, timestamp};
pub use multi_page::MultiPageDocumentBuilder;
pub use notify::{LogNotifier, NotificationKind, RecordingNotifier, UserNotifier};
pub use options::{ExportFormat, ExportMode, ExportOptions};
pub use orchestrator::{Clock, ExportOrchestrator, ExportOrchestratorBuilder, ExportOutcome};
pub use overlay::{InMemoryOverlayHost, LogOverlayHost, OverlayGuard, OverlayHost};
pub use raster::RasterExporter;
pub use single_page::SinglePageDocumentBuilder;
pub use sink::{ArtifactSink, FileSink, MemoryArtifactSink, SavedArtifact};
pub use state::{ExportState, StateTracker};
