//! Error types for project and taxonomy operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while working with a project or its taxonomy.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// I/O error from the backing store or an image file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error in the project file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding or encoding error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Path class name is empty or contains a reserved character
    #[error("invalid class name: {message}")]
    InvalidName {
        /// Description of the name violation
        message: String,
    },

    /// Color string is not a valid `#RRGGBB` value
    #[error("invalid color: {message}")]
    InvalidColor {
        /// Description of the color format error
        message: String,
    },

    /// Stored class record cannot be rebuilt into a path class
    #[error("invalid class record: {message}")]
    InvalidRecord {
        /// Description of the record error
        message: String,
    },

    /// Target path for a new project is already occupied
    #[error("project path already exists: {path:?}")]
    AlreadyExists {
        /// The occupied path
        path: PathBuf,
    },

    /// No registered image server builder supports the file
    #[error("no image server supports: {path:?}")]
    UnsupportedImage {
        /// Path of the rejected image file
        path: PathBuf,
    },

    /// Operation is declared but not supported
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl ProjectError {
    /// Create an invalid name error with a message.
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }

    /// Create an invalid color error with a message.
    pub fn invalid_color(message: impl Into<String>) -> Self {
        Self::InvalidColor {
            message: message.into(),
        }
    }

    /// Create an invalid record error with a message.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Create an unsupported image error for a path.
    pub fn unsupported_image(path: impl Into<PathBuf>) -> Self {
        Self::UnsupportedImage { path: path.into() }
    }
}
