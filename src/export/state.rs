//! Export state machine.
//!
//! ```text
//! Idle → OverlayShown → Capturing → Optimizing → Assembling → Saving → OverlayRemoved → Idle
//!                           ↑   ↓         ↓           ↓  │       ↓
//!                           │ Error ──────┴───────────┴──┼───────┴──→ OverlayRemoved → Idle
//!                           └────────────────────────────┘
//! ```
//!
//! `Assembling → Capturing` is the next page of a paginated export, after the
//! previous page was placed. `Optimizing → Saving` is the raster path, which
//! has nothing to assemble.

use crate::diagnostics::{Reporter, SharedSink};
use std::fmt;

const COMPONENT: &str = "roadmap_export::state";

/// A stage of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportState {
    /// Not exporting
    Idle,
    /// Overlay attached
    OverlayShown,
    /// Rasterizing a surface or page
    Capturing,
    /// Encoding a capture
    Optimizing,
    /// Building the document
    Assembling,
    /// Handing the artifact to the sink
    Saving,
    /// A step failed
    Error,
    /// Overlay detached
    OverlayRemoved,
}

impl ExportState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: ExportState) -> bool {
        use ExportState::*;
        matches!(
            (self, next),
            (Idle, OverlayShown)
                | (OverlayShown, Capturing)
                | (OverlayShown, Error)
                | (Capturing, Optimizing)
                | (Capturing, Error)
                | (Optimizing, Assembling)
                | (Optimizing, Saving)
                | (Optimizing, Error)
                | (Assembling, Capturing)
                | (Assembling, Saving)
                | (Assembling, Error)
                | (Saving, OverlayRemoved)
                | (Saving, Error)
                | (Error, OverlayRemoved)
                | (OverlayRemoved, Idle)
        )
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Idle => "idle",
            ExportState::OverlayShown => "overlay-shown",
            ExportState::Capturing => "capturing",
            ExportState::Optimizing => "optimizing",
            ExportState::Assembling => "assembling",
            ExportState::Saving => "saving",
            ExportState::Error => "error",
            ExportState::OverlayRemoved => "overlay-removed",
        };
        f.write_str(name)
    }
}

/// Per-invocation record of state transitions.
pub struct StateTracker {
    trail: Vec<ExportState>,
    reporter: Reporter,
}

impl StateTracker {
    /// A tracker starting at `Idle`.
    pub fn new(sink: SharedSink) -> Self {
        Self {
            trail: vec![ExportState::Idle],
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Current state.
    pub fn current(&self) -> ExportState {
        self.trail.last().copied().unwrap_or(ExportState::Idle)
    }

    /// Move to `next`. Re-entering the current state is a no-op.
    pub fn enter(&mut self, next: ExportState) {
        let current = self.current();
        if current == next {
            return;
        }
        if !current.can_transition_to(next) {
            self.reporter
                .warn(format!("Unexpected export transition {} -> {}", current, next));
        }
        self.reporter.debug(format!("{} -> {}", current, next));
        self.trail.push(next);
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn trail(&self) -> &[ExportState] {
        &self.trail
    }

    pub(crate) fn into_trail(self) -> Vec<ExportState> {
        self.trail
    }
}
