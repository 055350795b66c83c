//! Surface capture: rasterizing a rendered visual surface into pixels.
//!
//! A [`Surface`] is anything that can paint itself into a [`RasterBuffer`]
//! at a requested scale. [`ElementCapture`] decides the scale, waits for
//! the surface's [`ReadySignal`], and hands the surface a [`CaptureConfig`].
//!
//! ## Scale policy
//!
//! | pixel count (w × h)       | scale |
//! |---------------------------|-------|
//! | > 1,000,000               | 1.0   |
//! | > 500,000 and ≤ 1,000,000 | 1.2   |
//! | ≤ 500,000                 | 1.5   |

mod raster;
mod ready;

pub use raster::RasterBuffer;
pub use ready::{ReadyHandle, ReadySignal};

use crate::config::{ExportConfig, OVERLAY_CLASS};
use crate::diagnostics::{Reporter, SharedSink};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const COMPONENT: &str = "roadmap_export::capture";

/// Capture scale for a surface of `pixel_count` pixels.
pub fn scale_for_pixels(pixel_count: u64) -> f32 {
    if pixel_count > 1_000_000 {
        1.0
    } else if pixel_count > 500_000 {
        1.2
    } else {
        1.5
    }
}

/// `length × scale` rounded up, ignoring f32 noise such as `900 × 1.2`.
fn scaled_extent(length: u32, scale: f32) -> u32 {
    let exact = length as f64 * scale as f64;
    let nearest = exact.round();
    if (exact - nearest).abs() < 1e-3 {
        nearest as u32
    } else {
        exact.ceil() as u32
    }
}

/// CSS-like positioning of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Normal flow
    #[default]
    Static,
    /// Offset from normal flow
    Relative,
    /// Positioned against an ancestor
    Absolute,
    /// Pinned to the viewport
    Fixed,
}

/// What an ignore predicate sees of a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeInfo<'a> {
    /// Element tag, e.g. `div` or `iframe`
    pub tag: &'a str,
    /// Class list
    pub classes: &'a [String],
    /// Positioning scheme
    pub position: Positioning,
}

impl NodeInfo<'_> {
    /// Whether the node carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Decides whether a node (and its subtree) is left out of a capture.
pub type IgnorePredicate = Arc<dyn Fn(&NodeInfo<'_>) -> bool + Send + Sync>;

/// Excludes fixed/absolutely positioned nodes, embedded frames and the
/// export overlay itself.
pub fn default_ignore_predicate() -> IgnorePredicate {
    Arc::new(|node: &NodeInfo<'_>| {
        matches!(node.position, Positioning::Fixed | Positioning::Absolute)
            || node.tag.eq_ignore_ascii_case("iframe")
            || node.has_class(OVERLAY_CLASS)
    })
}

/// Parameters handed to [`Surface::rasterize`].
#[derive(Clone)]
pub struct CaptureConfig {
    /// Device pixels per surface unit
    pub scale: f32,
    /// Whether cross-origin assets may be loaded
    pub use_cross_origin: bool,
    /// Background painted before the surface, RGBA
    pub background_color: [u8; 4],
    /// Surface width in surface units
    pub width: u32,
    /// Surface height in surface units
    pub height: u32,
    /// Nodes for which this returns true are not painted
    pub ignore: IgnorePredicate,
}

impl CaptureConfig {
    /// Output raster width, `width × scale` rounded up.
    pub fn pixel_width(&self) -> u32 {
        scaled_extent(self.width, self.scale)
    }

    /// Output raster height, `height × scale` rounded up.
    pub fn pixel_height(&self) -> u32 {
        scaled_extent(self.height, self.scale)
    }

    /// Whether `node` is excluded.
    pub fn ignores(&self, node: &NodeInfo<'_>) -> bool {
        (self.ignore)(node)
    }
}

impl fmt::Debug for CaptureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureConfig")
            .field("scale", &self.scale)
            .field("use_cross_origin", &self.use_cross_origin)
            .field("background_color", &self.background_color)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Caller overrides applied on top of the derived [`CaptureConfig`].
#[derive(Clone, Default)]
pub struct CaptureOverrides {
    /// Fixed scale instead of the pixel-count policy
    pub scale: Option<f32>,
    /// Cross-origin flag
    pub use_cross_origin: Option<bool>,
    /// Background colour
    pub background_color: Option<[u8; 4]>,
    /// Width instead of the surface's own
    pub width: Option<u32>,
    /// Height instead of the surface's own
    pub height: Option<u32>,
    /// Ignore predicate instead of [`default_ignore_predicate`]
    pub ignore: Option<IgnorePredicate>,
}

impl CaptureOverrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture at a fixed scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Paint a different background.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background_color = Some(rgba);
        self
    }

    /// Use a custom ignore predicate.
    pub fn with_ignore(mut self, ignore: IgnorePredicate) -> Self {
        self.ignore = Some(ignore);
        self
    }
}

/// A rendered visual tree that can be rasterized.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Name used in diagnostics and errors.
    fn name(&self) -> &str;

    /// Size in surface units (CSS pixels).
    fn dimensions(&self) -> (u32, u32);

    /// Sub-surfaces carrying `page_class`, in document order.
    fn page_surfaces(&self, page_class: &str) -> Vec<Arc<dyn Surface>>;

    /// Fired by the renderer once layout and assets have settled.
    fn readiness(&self) -> ReadySignal {
        ReadySignal::settled()
    }

    /// Paint the surface into a pixel buffer of
    /// `config.pixel_width() × config.pixel_height()`.
    async fn rasterize(&self, config: &CaptureConfig) -> Result<RasterBuffer>;
}

/// Rasterizes surfaces at a policy-chosen scale.
pub struct ElementCapture {
    settle_timeout: Duration,
    background_color: [u8; 4],
    use_cross_origin: bool,
    reporter: Reporter,
}

impl ElementCapture {
    /// Create a capture component from the pipeline config.
    pub fn new(config: &ExportConfig, sink: SharedSink) -> Self {
        Self {
            settle_timeout: config.settle_timeout(),
            background_color: config.background_color,
            use_cross_origin: config.use_cross_origin,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Derive the capture config for `surface`.
    pub fn config_for(
        &self,
        surface: &dyn Surface,
        overrides: &CaptureOverrides,
    ) -> Result<CaptureConfig> {
        let (surface_width, surface_height) = surface.dimensions();
        let width = overrides.width.unwrap_or(surface_width);
        let height = overrides.height.unwrap_or(surface_height);
        if width == 0 || height == 0 {
            return Err(Error::InvalidSurface(format!(
                "'{}' has no area ({}x{})",
                surface.name(),
                width,
                height
            )));
        }

        let scale = overrides
            .scale
            .unwrap_or_else(|| scale_for_pixels(width as u64 * height as u64));
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(Error::InvalidSurface(format!(
                "capture scale {} for '{}' is not positive",
                scale,
                surface.name()
            )));
        }

        Ok(CaptureConfig {
            scale,
            use_cross_origin: overrides.use_cross_origin.unwrap_or(self.use_cross_origin),
            background_color: overrides.background_color.unwrap_or(self.background_color),
            width,
            height,
            ignore: overrides
                .ignore
                .clone()
                .unwrap_or_else(default_ignore_predicate),
        })
    }

    /// Capture `surface`. Rasterizer failures are returned unchanged.
    pub async fn capture(
        &self,
        surface: &dyn Surface,
        overrides: &CaptureOverrides,
    ) -> Result<RasterBuffer> {
        let config = self.config_for(surface, overrides)?;
        self.reporter.debug(format!(
            "Capturing '{}': {}x{} ({} px) at scale {}",
            surface.name(),
            config.width,
            config.height,
            config.width as u64 * config.height as u64,
            config.scale
        ));

        if !surface.readiness().wait(self.settle_timeout).await {
            self.reporter.warn(format!(
                "'{}' did not signal readiness within {}ms; capturing anyway",
                surface.name(),
                self.settle_timeout.as_millis()
            ));
        }

        let raster = match surface.rasterize(&config).await {
            Ok(raster) => raster,
            Err(err) => {
                self.reporter
                    .error(format!("Capture of '{}' failed: {}", surface.name(), err));
                return Err(err);
            },
        };

        self.reporter.debug(format!(
            "Captured '{}': {}x{} px",
            surface.name(),
            raster.width(),
            raster.height()
        ));
        Ok(raster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use log::Level;
    use std::sync::Mutex;

    struct FixedSurface {
        width: u32,
        height: u32,
        ready: ReadySignal,
        seen: Mutex<Vec<f32>>,
    }

    impl FixedSurface {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                ready: ReadySignal::settled(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Surface for FixedSurface {
        fn name(&self) -> &str {
            "fixed"
        }

        fn dimensions(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn page_surfaces(&self, _page_class: &str) -> Vec<Arc<dyn Surface>> {
            Vec::new()
        }

        fn readiness(&self) -> ReadySignal {
            self.ready.clone()
        }

        async fn rasterize(&self, config: &CaptureConfig) -> Result<RasterBuffer> {
            self.seen.lock().unwrap().push(config.scale);
            Ok(RasterBuffer::filled(
                config.pixel_width(),
                config.pixel_height(),
                config.background_color,
            ))
        }
    }

    fn capture_with(sink: Arc<MemorySink>) -> ElementCapture {
        let config = ExportConfig::new().with_settle_timeout(Duration::from_millis(10));
        ElementCapture::new(&config, sink)
    }

    #[test]
    fn test_scale_tiers() {
        assert_eq!(scale_for_pixels(1_400_000), 1.0);
        assert_eq!(scale_for_pixels(1_000_001), 1.0);
        assert_eq!(scale_for_pixels(1_000_000), 1.2);
        assert_eq!(scale_for_pixels(500_001), 1.2);
        assert_eq!(scale_for_pixels(500_000), 1.5);
        assert_eq!(scale_for_pixels(240_000), 1.5);
    }

    #[test]
    fn test_default_ignore_predicate() {
        let ignore = default_ignore_predicate();
        let none: Vec<String> = Vec::new();
        let overlay = vec![OVERLAY_CLASS.to_string()];
        fn node<'a>(tag: &'a str, classes: &'a [String], position: Positioning) -> NodeInfo<'a> {
            NodeInfo {
                tag,
                classes,
                position,
            }
        }

        assert!(ignore(&node("div", &none, Positioning::Fixed)));
        assert!(ignore(&node("div", &none, Positioning::Absolute)));
        assert!(ignore(&node("IFRAME", &none, Positioning::Static)));
        assert!(ignore(&node("div", &overlay, Positioning::Static)));
        assert!(!ignore(&node("div", &none, Positioning::Relative)));
    }

    #[tokio::test]
    async fn test_capture_uses_policy_scale() {
        let sink = Arc::new(MemorySink::new());
        let capture = capture_with(sink.clone());
        let surface = FixedSurface::new(900, 800);

        let raster = capture
            .capture(&surface, &CaptureOverrides::new())
            .await
            .unwrap();

        assert_eq!(*surface.seen.lock().unwrap(), vec![1.2]);
        assert_eq!((raster.width(), raster.height()), (1080, 960));
        assert!(sink.contains(Level::Debug, "scale 1.2"));
    }

    #[tokio::test]
    async fn test_override_scale_wins() {
        let capture = capture_with(Arc::new(MemorySink::new()));
        let surface = FixedSurface::new(1400, 1000);
        capture
            .capture(&surface, &CaptureOverrides::new().with_scale(1.5))
            .await
            .unwrap();
        assert_eq!(*surface.seen.lock().unwrap(), vec![1.5]);
    }

    #[tokio::test]
    async fn test_unready_surface_warns_and_proceeds() {
        let sink = Arc::new(MemorySink::new());
        let capture = capture_with(sink.clone());
        let (_handle, signal) = ReadySignal::pair();
        let mut surface = FixedSurface::new(10, 10);
        surface.ready = signal;

        assert!(capture.capture(&surface, &CaptureOverrides::new()).await.is_ok());
        assert!(sink.contains(Level::Warn, "did not signal readiness"));
    }

    #[tokio::test]
    async fn test_zero_area_surface_is_rejected() {
        let capture = capture_with(Arc::new(MemorySink::new()));
        let surface = FixedSurface::new(0, 300);
        let err = capture
            .capture(&surface, &CaptureOverrides::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSurface(_)));
    }
}
