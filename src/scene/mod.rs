//! In-memory box-tree surfaces rasterized with `tiny-skia`.
//!
//! A [`SceneSurface`] is a tree of coloured boxes, each with a tag, classes
//! and positioning, deserializable from JSON. It stands in for a rendered
//! roadmap view: the CLI exports scene files and the tests drive the whole
//! pipeline through it.
//!
//! Node rectangles are relative to their parent. Nodes carrying the
//! page-container class become page sub-surfaces whose origin is the node's
//! own top-left corner.
//!
//! ```json
//! {
//!   "name": "overview",
//!   "width": 1400,
//!   "height": 1000,
//!   "nodes": [
//!     { "classes": ["roadmap-export-page"], "rect": { "x": 0, "y": 0, "width": 1400, "height": 330 },
//!       "fill": [240, 244, 255, 255],
//!       "children": [ { "rect": { "x": 20, "y": 20, "width": 300, "height": 40 }, "fill": [33, 99, 235, 255] } ] }
//!   ]
//! }
//! ```

use crate::capture::{CaptureConfig, NodeInfo, Positioning, RasterBuffer, ReadySignal, Surface};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use async_trait::async_trait;
use image::RgbaImage;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{Color, Paint, Pixmap, Transform};

fn default_tag() -> String {
    "div".to_string()
}

/// One box in a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneNode {
    /// Optional identifier; names page sub-surfaces
    #[serde(default)]
    pub id: Option<String>,
    /// Element tag
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Class list
    #[serde(default)]
    pub classes: Vec<String>,
    /// Positioning scheme
    #[serde(default)]
    pub position: Positioning,
    /// Box relative to the parent's origin
    pub rect: Rect,
    /// Fill colour, RGBA; unfilled boxes only group children
    #[serde(default)]
    pub fill: Option<[u8; 4]>,
    /// Child boxes
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// A filled `div`.
    pub fn new(rect: Rect, fill: [u8; 4]) -> Self {
        Self {
            id: None,
            tag: default_tag(),
            classes: Vec::new(),
            position: Positioning::Static,
            rect,
            fill: Some(fill),
            children: Vec::new(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Add a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Set positioning.
    pub fn with_position(mut self, position: Positioning) -> Self {
        self.position = position;
        self
    }

    /// Append a child.
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    fn info(&self) -> NodeInfo<'_> {
        NodeInfo {
            tag: &self.tag,
            classes: &self.classes,
            position: self.position,
        }
    }
}

/// A rasterizable tree of boxes.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneSurface {
    /// Surface name
    pub name: String,
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Surface's own background, painted over the capture background
    #[serde(default)]
    pub background: Option<[u8; 4]>,
    /// Top-level boxes
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(skip)]
    ready: ReadySignal,
}

impl SceneSurface {
    /// An empty scene.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            background: None,
            nodes: Vec::new(),
            ready: ReadySignal::settled(),
        }
    }

    /// Parse a scene from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Set the surface background.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background = Some(rgba);
        self
    }

    /// Append a top-level node.
    pub fn with_node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Gate captures on a renderer-controlled signal.
    pub fn with_readiness(mut self, ready: ReadySignal) -> Self {
        self.ready = ready;
        self
    }

    fn collect_pages(
        &self,
        nodes: &[SceneNode],
        page_class: &str,
        pages: &mut Vec<Arc<dyn Surface>>,
    ) {
        for node in nodes {
            if !node.classes.iter().any(|c| c == page_class) {
                self.collect_pages(&node.children, page_class, pages);
                continue;
            }
            let name = match &node.id {
                Some(id) => id.clone(),
                None => format!("{}/page-{}", self.name, pages.len() + 1),
            };
            let page = SceneSurface {
                name,
                width: node.rect.width.round().max(0.0) as u32,
                height: node.rect.height.round().max(0.0) as u32,
                background: node.fill.or(self.background),
                nodes: node.children.clone(),
                ready: self.ready.clone(),
            };
            pages.push(Arc::new(page));
        }
    }
}

fn paint_for(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
    paint.anti_alias = false;
    paint
}

fn paint_nodes(
    pixmap: &mut Pixmap,
    nodes: &[SceneNode],
    origin: (f32, f32),
    config: &CaptureConfig,
) {
    let transform = Transform::from_scale(config.scale, config.scale);
    for node in nodes {
        if config.ignores(&node.info()) {
            continue;
        }
        let rect = node.rect.translate(origin.0, origin.1);
        if let Some(fill) = node.fill {
            if let Some(area) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
            {
                pixmap.fill_rect(area, &paint_for(fill), transform, None);
            }
        }
        paint_nodes(pixmap, &node.children, (rect.x, rect.y), config);
    }
}

/// Un-premultiply tiny-skia's pixel storage into a plain RGBA image.
fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut raw = Vec::with_capacity(pixmap.pixels().len() * 4);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

#[async_trait]
impl Surface for SceneSurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn page_surfaces(&self, page_class: &str) -> Vec<Arc<dyn Surface>> {
        let mut pages = Vec::new();
        self.collect_pages(&self.nodes, page_class, &mut pages);
        pages
    }

    fn readiness(&self) -> ReadySignal {
        self.ready.clone()
    }

    async fn rasterize(&self, config: &CaptureConfig) -> Result<RasterBuffer> {
        tokio::task::yield_now().await;

        let (width, height) = (config.pixel_width(), config.pixel_height());
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            Error::capture(&self.name, format!("cannot allocate {}x{} pixmap", width, height))
        })?;

        let [r, g, b, a] = config.background_color;
        pixmap.fill(Color::from_rgba8(r, g, b, a));
        if let Some(background) = self.background {
            let full = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32);
            if let Some(full) = full {
                pixmap.fill_rect(full, &paint_for(background), Transform::identity(), None);
            }
        }

        paint_nodes(&mut pixmap, &self.nodes, (0.0, 0.0), config);
        Ok(RasterBuffer::new(pixmap_to_rgba(&pixmap)))
    }
}
