//! The "export in progress" overlay.
//!
//! Each export shows its own overlay through an [`OverlayGuard`]. The guard
//! carries a unique id, so concurrent exports only ever detach their own
//! overlay, and detaching happens on drop if the export never released it.

use crate::diagnostics::{Reporter, SharedSink};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const COMPONENT: &str = "roadmap_export::overlay";

/// Displays and removes overlays.
pub trait OverlayHost: Send + Sync {
    /// Show overlay `id` with `message`.
    fn attach(&self, id: Uuid, message: &str);

    /// Remove overlay `id`. Unknown ids are ignored.
    fn detach(&self, id: Uuid);
}

/// Scoped ownership of one attached overlay.
pub struct OverlayGuard {
    id: Uuid,
    host: Arc<dyn OverlayHost>,
    released: bool,
}

impl OverlayGuard {
    /// Attach a new overlay.
    pub fn show(host: Arc<dyn OverlayHost>, message: &str) -> Self {
        let id = Uuid::new_v4();
        host.attach(id, message);
        Self {
            id,
            host,
            released: false,
        }
    }

    /// This overlay's id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Detach now.
    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.released {
            self.released = true;
            self.host.detach(self.id);
        }
    }
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for OverlayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayGuard")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

/// Overlay host that reports through diagnostics only; used by the CLI.
pub struct LogOverlayHost {
    reporter: Reporter,
}

impl LogOverlayHost {
    /// Report into `sink`.
    pub fn new(sink: SharedSink) -> Self {
        Self {
            reporter: Reporter::new(sink, COMPONENT),
        }
    }
}

impl OverlayHost for LogOverlayHost {
    fn attach(&self, id: Uuid, message: &str) {
        self.reporter.info(format!("{} [{}]", message, id));
    }

    fn detach(&self, id: Uuid) {
        self.reporter.debug(format!("Overlay {} removed", id));
    }
}

/// Tracks attached overlays in memory.
#[derive(Debug, Default)]
pub struct InMemoryOverlayHost {
    attached: Mutex<Vec<(Uuid, String)>>,
}

impl InMemoryOverlayHost {
    /// No overlays attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlays currently attached.
    pub fn attached_count(&self) -> usize {
        self.attached.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Ids of attached overlays, in attach order.
    pub fn attached_ids(&self) -> Vec<Uuid> {
        self.attached
            .lock()
            .map(|a| a.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    /// Messages of attached overlays, in attach order.
    pub fn messages(&self) -> Vec<String> {
        self.attached
            .lock()
            .map(|a| a.iter().map(|(_, m)| m.clone()).collect())
            .unwrap_or_default()
    }
}

impl OverlayHost for InMemoryOverlayHost {
    fn attach(&self, id: Uuid, message: &str) {
        if let Ok(mut attached) = self.attached.lock() {
            attached.push((id, message.to_string()));
        }
    }

    fn detach(&self, id: Uuid) {
        if let Ok(mut attached) = self.attached.lock() {
            attached.retain(|(attached_id, _)| *attached_id != id);
        }
    }
}
