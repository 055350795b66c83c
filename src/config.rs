//! Configuration for the export pipeline.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Class marking sub-surfaces that become individual document pages.
pub const PAGE_CONTAINER_CLASS: &str = "roadmap-export-page";

/// Class carried by the in-progress overlay; always excluded from captures.
pub const OVERLAY_CLASS: &str = "roadmap-export-overlay";

/// Export pipeline configuration.
///
/// Every field has a default matching the production policy, so a config
/// file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Quality of the first lossy encode (0.0..=1.0).
    pub default_quality: f32,

    /// Quality of the single fallback encode.
    pub fallback_quality: f32,

    /// Encoded size above which the fallback encode runs.
    pub retry_threshold_bytes: usize,

    /// Estimated single-page size that triggers a size warning.
    pub page_warning_mb: f64,

    /// Estimated multi-page aggregate size that triggers a size warning.
    pub document_warning_mb: f64,

    /// Fixed capture scale for every page of a multi-page export.
    pub multi_page_scale: f32,

    /// Upper bound on the wait for a surface's readiness signal.
    pub settle_timeout_ms: u64,

    /// Background painted under the surface, RGBA.
    pub background_color: [u8; 4],

    /// Whether cross-origin assets may be loaded during rasterization.
    pub use_cross_origin: bool,

    /// Class identifying page sub-surfaces.
    pub page_container_class: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            default_quality: 0.85,
            fallback_quality: 0.70,
            retry_threshold_bytes: 5_000_000,
            page_warning_mb: 10.0,
            document_warning_mb: 20.0,
            multi_page_scale: 1.5,
            settle_timeout_ms: 250,
            background_color: [255, 255, 255, 255],
            use_cross_origin: true,
            page_container_class: PAGE_CONTAINER_CLASS.to_string(),
        }
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        for (name, q) in [
            ("default_quality", self.default_quality),
            ("fallback_quality", self.fallback_quality),
        ] {
            if !(q > 0.0 && q <= 1.0) {
                return Err(Error::Config(format!("{} must be in (0, 1], got {}", name, q)));
            }
        }
        if self.multi_page_scale <= 0.0 {
            return Err(Error::Config(format!(
                "multi_page_scale must be positive, got {}",
                self.multi_page_scale
            )));
        }
        if self.page_container_class.is_empty() {
            return Err(Error::Config("page_container_class must not be empty".to_string()));
        }
        Ok(())
    }

    /// Readiness wait bound as a [`Duration`].
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Set the first-pass encode quality.
    pub fn with_default_quality(mut self, quality: f32) -> Self {
        self.default_quality = quality;
        self
    }

    /// Set the fallback encode quality.
    pub fn with_fallback_quality(mut self, quality: f32) -> Self {
        self.fallback_quality = quality;
        self
    }

    /// Set the encoded size that triggers the fallback encode.
    pub fn with_retry_threshold(mut self, bytes: usize) -> Self {
        self.retry_threshold_bytes = bytes;
        self
    }

    /// Set the readiness wait bound.
    pub fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the multi-page capture scale.
    pub fn with_multi_page_scale(mut self, scale: f32) -> Self {
        self.multi_page_scale = scale;
        self
    }

    /// Set the capture background colour.
    pub fn with_background(mut self, rgba: [u8; 4]) -> Self {
        self.background_color = rgba;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.retry_threshold_bytes, 5_000_000);
        assert!((config.default_quality - 0.85).abs() < f32::EPSILON);
        assert!((config.fallback_quality - 0.70).abs() < f32::EPSILON);
        assert_eq!(config.settle_timeout(), Duration::from_millis(250));
        assert_eq!(config.page_container_class, PAGE_CONTAINER_CLASS);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ExportConfig::from_json_str(r#"{ "settle_timeout_ms": 50, "page_warning_mb": 4.5 }"#)
                .unwrap();
        assert_eq!(config.settle_timeout_ms, 50);
        assert!((config.page_warning_mb - 4.5).abs() < f64::EPSILON);
        assert_eq!(config.retry_threshold_bytes, 5_000_000);
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let err = ExportConfig::from_json_str(r#"{ "default_quality": 1.5 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ExportConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_builder_methods() {
        let config = ExportConfig::new()
            .with_retry_threshold(1_000)
            .with_settle_timeout(Duration::from_millis(10))
            .with_background([0, 0, 0, 255]);
        assert_eq!(config.retry_threshold_bytes, 1_000);
        assert_eq!(config.settle_timeout_ms, 10);
        assert_eq!(config.background_color, [0, 0, 0, 255]);
    }
}
