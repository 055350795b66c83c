//! Artifact filenames.

use super::options::{ExportFormat, ExportMode};
use chrono::{DateTime, Utc};

/// Filesystem-safe UTC timestamp: ISO-8601 with `:` replaced by `-` and no
/// sub-second part.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// `roadmap-{mode}-{timestamp}.{ext}`
pub fn artifact_filename(mode: ExportMode, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!("roadmap-{}-{}.{}", mode.as_str(), timestamp(at), format.extension())
}
