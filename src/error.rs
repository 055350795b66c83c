//! Error types for the export engine.
//!
//! Every failure in the capture → optimize → assemble → save pipeline is
//! expressed as one of these variants. Size threshold breaches are not
//! errors; see [`crate::estimate::SizeWarning`].

/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while exporting a surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rasterization of a surface (or page sub-surface) failed
    #[error("Capture failed for surface '{surface}': {reason}")]
    Capture {
        /// Name of the surface being captured
        surface: String,
        /// Underlying rasterizer message
        reason: String,
    },

    /// Image encoding failed
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Page fitting or image embedding failed
    #[error("Document assembly failed: {0}")]
    Assembly(String),

    /// Writing the final artifact failed
    #[error("Failed to save '{filename}': {reason}")]
    Save {
        /// Artifact filename
        filename: String,
        /// Underlying failure
        reason: String,
    },

    /// Surface reported dimensions that cannot be captured
    #[error("Invalid surface: {0}")]
    InvalidSurface(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a capture error for the named surface.
    pub fn capture(surface: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Capture {
            surface: surface.into(),
            reason: reason.into(),
        }
    }

    /// Build a save error for the named artifact.
    pub fn save(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Save {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}
