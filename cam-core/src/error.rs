//! Error types for tool geometry and depth planning.

use std::path::PathBuf;
use thiserror::Error;

/// Error codes for CAM core processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File could not be read or written (-1)
    Io = -1,
    /// Malformed input value (-3)
    ParseError = -3,
    /// Property edit rejected (E100)
    InvalidEdit = 100,
    /// Tool number already used or not positive (E200)
    ToolNumber = 200,
    /// Envelope primitive could not be constructed (E300)
    GeometryConstruction = 300,
    /// Envelope dimension is not a finite number (E301)
    GeometryDomain = 301,
}

/// Main error type for the CAM core.
#[derive(Debug, Error)]
pub enum CamError {
    #[error("Cannot set {property}: {reason}")]
    InvalidEdit { property: String, reason: String },

    #[error("Cannot construct {primitive}: {reason}")]
    GeometryConstruction {
        primitive: &'static str,
        reason: String,
    },

    #[error("Dimension '{dimension}' of {primitive} is not finite ({value})")]
    GeometryDomain {
        primitive: &'static str,
        dimension: &'static str,
        value: f64,
    },

    #[error("Tool number {number} is already in use")]
    DuplicateToolNumber { number: i32 },

    #[error("No tool numbered {number}")]
    UnknownTool { number: i32 },

    #[error("Tool number {number} is not valid; tool numbers must be positive")]
    InvalidToolNumber { number: i32 },

    #[error("Invalid numeric value: '{value}'")]
    InvalidNumber { value: String },

    #[error("Unknown units '{value}'; expected mm or inch")]
    UnknownUnits { value: String },

    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CamError {
    /// Build an edit rejection for the named property.
    pub fn invalid_edit(property: impl Into<String>, reason: impl Into<String>) -> Self {
        CamError::InvalidEdit {
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CamError::InvalidEdit { .. } => ErrorCode::InvalidEdit,
            CamError::GeometryConstruction { .. } => ErrorCode::GeometryConstruction,
            CamError::GeometryDomain { .. } => ErrorCode::GeometryDomain,
            CamError::DuplicateToolNumber { .. } => ErrorCode::ToolNumber,
            CamError::InvalidToolNumber { .. } => ErrorCode::ToolNumber,
            CamError::UnknownTool { .. } => ErrorCode::ToolNumber,
            CamError::InvalidNumber { .. } => ErrorCode::ParseError,
            CamError::UnknownUnits { .. } => ErrorCode::ParseError,
            CamError::Io { .. } => ErrorCode::Io,
            CamError::Json(_) => ErrorCode::ParseError,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }

    /// Whether this error came out of envelope construction.
    ///
    /// Callers on the visualization path skip the envelope for these rather
    /// than aborting.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            CamError::GeometryConstruction { .. } | CamError::GeometryDomain { .. }
        )
    }
}

/// Result type alias for CAM core operations.
pub type Result<T> = std::result::Result<T, CamError>;
