//! Overlay lifecycle across success, failure, cancellation and concurrent
//! exports.

use async_trait::async_trait;
use roadmap_export::capture::{CaptureConfig, RasterBuffer, ReadySignal, Surface};
use roadmap_export::diagnostics::MemorySink;
use roadmap_export::export::{
    ExportFormat, ExportOrchestrator, InMemoryOverlayHost, MemoryArtifactSink,
};
use roadmap_export::geometry::Rect;
use roadmap_export::scene::{SceneNode, SceneSurface};
use roadmap_export::{Error, ExportConfig, Result};
use std::sync::Arc;
use std::time::Duration;

fn orchestrator(overlays: Arc<InMemoryOverlayHost>) -> Arc<ExportOrchestrator> {
    let config = ExportConfig::default().with_settle_timeout(Duration::from_secs(30));
    Arc::new(
        ExportOrchestrator::builder(Arc::new(MemoryArtifactSink::new()))
            .config(config)
            .diagnostics(Arc::new(MemorySink::new()))
            .overlay_host(overlays)
            .build()
            .unwrap(),
    )
}

fn gated_scene(name: &str, ready: ReadySignal) -> Arc<SceneSurface> {
    Arc::new(
        SceneSurface::new(name, 320, 200)
            .with_node(SceneNode::new(Rect::new(10.0, 10.0, 100.0, 50.0), [200, 0, 0, 255]))
            .with_readiness(ready),
    )
}

struct FailingSurface;

#[async_trait]
impl Surface for FailingSurface {
    fn name(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> (u32, u32) {
        (100, 100)
    }

    fn page_surfaces(&self, _page_class: &str) -> Vec<Arc<dyn Surface>> {
        Vec::new()
    }

    async fn rasterize(&self, _config: &CaptureConfig) -> Result<RasterBuffer> {
        Err(Error::capture("failing", "renderer crashed"))
    }
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_overlay_visible_only_while_exporting() {
    let overlays = Arc::new(InMemoryOverlayHost::new());
    let orchestrator = orchestrator(overlays.clone());
    let (handle, ready) = ReadySignal::pair();
    let scene = gated_scene("detailed", ready);

    let task = {
        let orchestrator = orchestrator.clone();
        let scene = scene.clone();
        tokio::spawn(async move {
            orchestrator
                .export_detailed(scene.as_ref(), ExportFormat::Document, "Roadmap")
                .await
        })
    };

    settle().await;
    assert_eq!(overlays.attached_count(), 1);
    assert_eq!(overlays.messages(), vec!["Exporting detailed roadmap…"]);

    handle.mark_ready();
    task.await.unwrap().unwrap();
    assert_eq!(overlays.attached_count(), 0);
}

#[tokio::test]
async fn test_concurrent_exports_keep_separate_overlays() {
    let overlays = Arc::new(InMemoryOverlayHost::new());
    let orchestrator = orchestrator(overlays.clone());
    let (first_handle, first_ready) = ReadySignal::pair();
    let (second_handle, second_ready) = ReadySignal::pair();

    let spawn = |scene: Arc<SceneSurface>| {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            orchestrator
                .export_detailed(scene.as_ref(), ExportFormat::Raster, "Roadmap")
                .await
        })
    };
    let first = spawn(gated_scene("first", first_ready));
    let second = spawn(gated_scene("second", second_ready));

    settle().await;
    let ids = overlays.attached_ids();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    first_handle.mark_ready();
    first.await.unwrap().unwrap();
    assert_eq!(overlays.attached_count(), 1);

    second_handle.mark_ready();
    second.await.unwrap().unwrap();
    assert_eq!(overlays.attached_count(), 0);
}

#[tokio::test]
async fn test_failed_export_leaves_other_overlay_attached() {
    let overlays = Arc::new(InMemoryOverlayHost::new());
    let orchestrator = orchestrator(overlays.clone());
    let (handle, ready) = ReadySignal::pair();

    let pending = {
        let orchestrator = orchestrator.clone();
        let scene = gated_scene("pending", ready);
        tokio::spawn(async move {
            orchestrator
                .export_detailed(scene.as_ref(), ExportFormat::Document, "Roadmap")
                .await
        })
    };
    settle().await;
    assert_eq!(overlays.attached_count(), 1);

    let result = orchestrator
        .export_detailed(&FailingSurface, ExportFormat::Document, "Roadmap")
        .await;
    assert!(matches!(result, Err(Error::Capture { .. })));
    assert_eq!(overlays.attached_count(), 1);

    handle.mark_ready();
    pending.await.unwrap().unwrap();
    assert_eq!(overlays.attached_count(), 0);
}

#[tokio::test]
async fn test_dropped_export_removes_overlay() {
    let overlays = Arc::new(InMemoryOverlayHost::new());
    let orchestrator = orchestrator(overlays.clone());
    let (_handle, ready) = ReadySignal::pair();
    let scene = gated_scene("abandoned", ready);

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        orchestrator.export_detailed(scene.as_ref(), ExportFormat::Document, "Roadmap"),
    )
    .await;

    assert!(outcome.is_err());
    assert_eq!(overlays.attached_count(), 0);
}
