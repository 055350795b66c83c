//! Scene and config files exported to disk.

use log::Level;
use roadmap_export::capture::Surface;
use roadmap_export::config::PAGE_CONTAINER_CLASS;
use roadmap_export::diagnostics::MemorySink;
use roadmap_export::export::{ExportFormat, ExportOrchestrator, FileSink};
use roadmap_export::scene::SceneSurface;
use roadmap_export::ExportConfig;
use std::sync::Arc;

const OVERVIEW_SCENE: &str = r#"{
    "name": "overview",
    "width": 1200,
    "height": 900,
    "background": [248, 250, 252, 255],
    "nodes": [
        { "id": "now", "classes": ["roadmap-export-page"],
          "rect": { "x": 0, "y": 0, "width": 1200, "height": 300 },
          "children": [
              { "rect": { "x": 20, "y": 20, "width": 500, "height": 60 }, "fill": [37, 99, 235, 255] }
          ] },
        { "id": "next", "classes": ["roadmap-export-page"],
          "rect": { "x": 0, "y": 300, "width": 1200, "height": 300 },
          "children": [
              { "rect": { "x": 20, "y": 20, "width": 300, "height": 60 }, "fill": [22, 163, 74, 255] }
          ] },
        { "tag": "iframe", "rect": { "x": 0, "y": 600, "width": 1200, "height": 300 },
          "fill": [0, 0, 0, 255] },
        { "classes": ["toast"], "position": "fixed",
          "rect": { "x": 900, "y": 850, "width": 280, "height": 40 }, "fill": [220, 38, 38, 255] }
    ]
}"#;

#[test]
fn test_scene_file_pages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overview.json");
    std::fs::write(&path, OVERVIEW_SCENE).unwrap();

    let scene = SceneSurface::from_json_file(&path).unwrap();
    assert_eq!(scene.dimensions(), (1200, 900));

    let pages = scene.page_surfaces(PAGE_CONTAINER_CLASS);
    let names: Vec<_> = pages.iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["now", "next"]);
    assert_eq!(pages[1].dimensions(), (1200, 300));
}

#[test]
fn test_malformed_scene_is_json_error() {
    let err = SceneSurface::from_json_str(r#"{ "name": "x", "width": "wide" }"#).unwrap_err();
    assert!(matches!(err, roadmap_export::Error::Json(_)));
}

#[tokio::test]
async fn test_export_scene_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("export.json");
    std::fs::write(&config_path, r#"{ "settle_timeout_ms": 10, "multi_page_scale": 1.0 }"#)
        .unwrap();

    let config = ExportConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.multi_page_scale, 1.0);
    assert_eq!(config.default_quality, 0.85);

    let diagnostics = Arc::new(MemorySink::new());
    let out_dir = dir.path().join("exports");
    let orchestrator = ExportOrchestrator::builder(Arc::new(FileSink::new(
        &out_dir,
        diagnostics.clone(),
    )))
    .config(config)
    .diagnostics(diagnostics.clone())
    .build()
    .unwrap();

    let scene = SceneSurface::from_json_str(OVERVIEW_SCENE).unwrap();
    let outcome = orchestrator
        .export_overview(&scene, ExportFormat::Document, "Now / Next")
        .await
        .unwrap();

    assert_eq!(outcome.page_count, 2);
    let written = std::fs::read(out_dir.join(&outcome.filename)).unwrap();
    assert_eq!(written.len(), outcome.byte_len);
    assert!(written.starts_with(b"%PDF-"));

    let entries = std::fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(entries, 1);
    assert!(diagnostics.contains(Level::Debug, "Capturing 'now': 1200x300 (360000 px) at scale 1"));
    assert!(diagnostics.contains(Level::Info, "Saved "));
}

#[tokio::test]
async fn test_raster_export_skips_ignored_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let diagnostics = Arc::new(MemorySink::new());
    let orchestrator = ExportOrchestrator::builder(Arc::new(FileSink::new(
        dir.path(),
        diagnostics.clone(),
    )))
    .diagnostics(diagnostics)
    .build()
    .unwrap();

    let scene = SceneSurface::from_json_str(OVERVIEW_SCENE).unwrap();
    let outcome = orchestrator
        .export_detailed(&scene, ExportFormat::Raster, "Detailed")
        .await
        .unwrap();

    let png = image::open(dir.path().join(&outcome.filename)).unwrap().to_rgba8();
    // 1,080,000 px captures at 1.0.
    assert_eq!(png.dimensions(), (1200, 900));
    // The iframe band and the fixed toast are left out; the surface
    // background shows through.
    assert_eq!(png.get_pixel(600, 750).0, [248, 250, 252, 255]);
    assert_eq!(png.get_pixel(1000, 870).0, [248, 250, 252, 255]);
    assert_eq!(png.get_pixel(30, 30).0, [37, 99, 235, 255]);
}
