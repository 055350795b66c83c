//! Per-invocation export options.

use crate::error::{Error, Result};
use crate::geometry::Orientation;
use std::fmt;
use std::str::FromStr;

/// Which roadmap view is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportMode {
    /// Quarter-by-quarter overview; paginated when exported as a document
    Overview,
    /// Detailed feature view
    Detailed,
    /// A single team's track
    Track,
}

impl ExportMode {
    /// Lower-case name used in filenames and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Overview => "overview",
            ExportMode::Detailed => "detailed",
            ExportMode::Track => "track",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overview" => Ok(ExportMode::Overview),
            "detailed" => Ok(ExportMode::Detailed),
            "track" => Ok(ExportMode::Track),
            other => Err(Error::Config(format!("unknown export mode '{}'", other))),
        }
    }
}

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Paginated PDF
    Document,
    /// Single PNG image
    Raster,
}

impl ExportFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Document => "pdf",
            ExportFormat::Raster => "png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" | "document" => Ok(ExportFormat::Document),
            "png" | "raster" | "image" => Ok(ExportFormat::Raster),
            other => Err(Error::Config(format!("unknown export format '{}'", other))),
        }
    }
}

/// Options fixed for the lifetime of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// View being exported
    pub mode: ExportMode,
    /// Output kind
    pub format: ExportFormat,
    /// Document title
    pub title: String,
    /// Optional subtitle
    pub subtitle: Option<String>,
    /// Team the export is restricted to
    pub team_filter: Option<String>,
    /// Whether feature details are shown
    pub include_details: Option<bool>,
    /// Page orientation; landscape when unset
    pub landscape: Option<bool>,
}

impl ExportOptions {
    /// Options with no optional fields set.
    pub fn new(mode: ExportMode, format: ExportFormat, title: impl Into<String>) -> Self {
        Self {
            mode,
            format,
            title: title.into(),
            subtitle: None,
            team_filter: None,
            include_details: None,
            landscape: None,
        }
    }

    /// Set the subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Restrict to a team.
    pub fn with_team_filter(mut self, team: impl Into<String>) -> Self {
        self.team_filter = Some(team.into());
        self
    }

    /// Show or hide feature details.
    pub fn with_include_details(mut self, include: bool) -> Self {
        self.include_details = Some(include);
        self
    }

    /// Choose the page orientation.
    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = Some(landscape);
        self
    }

    /// Page orientation.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_landscape(self.landscape.unwrap_or(true))
    }

    /// Whether this export takes the paginated document path.
    pub fn is_paginated(&self) -> bool {
        self.mode == ExportMode::Overview && self.format == ExportFormat::Document
    }

    /// Document keywords describing the filters in effect.
    pub(crate) fn keywords(&self) -> String {
        let mut keywords = vec![format!("mode:{}", self.mode)];
        if let Some(team) = &self.team_filter {
            keywords.push(format!("team:{}", team));
        }
        if let Some(details) = self.include_details {
            keywords.push(format!("details:{}", details));
        }
        keywords.join(" ")
    }
}
