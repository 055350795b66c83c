//! Advisory output-size estimates.
//!
//! An estimate is `width × height × 3` bytes, the uncompressed RGB size of a
//! capture. Crossing a threshold yields a [`SizeWarning`]; nothing here ever
//! fails an export.

use crate::config::ExportConfig;
use crate::diagnostics::{Reporter, SharedSink};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

const COMPONENT: &str = "roadmap_export::estimate";

const BYTES_PER_PIXEL: u64 = 3;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Estimated size of one or more captures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeEstimate {
    /// Estimated bytes
    pub bytes: u64,
}

impl SizeEstimate {
    /// Estimate for a `width × height` capture.
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        Self {
            bytes: width as u64 * height as u64 * BYTES_PER_PIXEL,
        }
    }

    /// Size in MB, rounded to two decimals.
    pub fn mb(&self) -> f64 {
        (self.bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
    }
}

impl Add for SizeEstimate {
    type Output = SizeEstimate;

    fn add(self, rhs: SizeEstimate) -> SizeEstimate {
        SizeEstimate {
            bytes: self.bytes + rhs.bytes,
        }
    }
}

impl Sum for SizeEstimate {
    fn sum<I: Iterator<Item = SizeEstimate>>(iter: I) -> Self {
        iter.fold(SizeEstimate::default(), Add::add)
    }
}

/// What a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeScope {
    /// A single page
    Page,
    /// A multi-page document aggregate
    Document,
}

/// Non-fatal notice that an estimate crossed its threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeWarning {
    /// Page or aggregate
    pub scope: SizeScope,
    /// The estimate that crossed the limit
    pub estimate: SizeEstimate,
    /// Limit in MB
    pub limit_mb: f64,
}

impl fmt::Display for SizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self.scope {
            SizeScope::Page => "Page",
            SizeScope::Document => "Document",
        };
        write!(
            f,
            "{} estimate {:.2} MB exceeds {} MB",
            scope,
            self.estimate.mb(),
            self.limit_mb
        )
    }
}

/// Computes estimates and reports threshold breaches.
pub struct SizeEstimator {
    page_limit_mb: f64,
    document_limit_mb: f64,
    reporter: Reporter,
}

impl SizeEstimator {
    /// Create an estimator from the pipeline config.
    pub fn new(config: &ExportConfig, sink: SharedSink) -> Self {
        Self {
            page_limit_mb: config.page_warning_mb,
            document_limit_mb: config.document_warning_mb,
            reporter: Reporter::new(sink, COMPONENT),
        }
    }

    /// Estimate a `width × height` capture.
    pub fn estimate(&self, width: u32, height: u32) -> SizeEstimate {
        let estimate = SizeEstimate::for_dimensions(width, height);
        self.reporter.debug(format!(
            "Estimated {}x{} capture at {:.2} MB",
            width,
            height,
            estimate.mb()
        ));
        estimate
    }

    /// Check a single page against the page limit.
    pub fn check_page(&self, estimate: SizeEstimate) -> Option<SizeWarning> {
        self.check(SizeScope::Page, estimate, self.page_limit_mb)
    }

    /// Check a document aggregate against the document limit.
    pub fn check_document(&self, estimate: SizeEstimate) -> Option<SizeWarning> {
        self.check(SizeScope::Document, estimate, self.document_limit_mb)
    }

    fn check(&self, scope: SizeScope, estimate: SizeEstimate, limit_mb: f64) -> Option<SizeWarning> {
        if estimate.mb() <= limit_mb {
            return None;
        }
        let warning = SizeWarning {
            scope,
            estimate,
            limit_mb,
        };
        self.reporter.warn(warning.to_string());
        Some(warning)
    }
}
