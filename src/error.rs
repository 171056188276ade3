//! Error types and handling for webimize

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for webimize operations
pub type Result<T> = std::result::Result<T, WebimizeError>;

/// Main error type for webimize operations
#[derive(Debug, Error)]
pub enum WebimizeError {
    /// Source file missing, unreadable, or not a decodable image
    #[error("failed to decode {}: {}", .path.display(), .source)]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Encoder failure or write failure (disk full, permission denied)
    #[error("failed to encode {}: {}", .path.display(), .source)]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// Explicit CLI path argument does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem operations outside decode/encode (rename, metadata)
    #[error("I/O error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Directory traversal errors
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid optimize parameters (zero width, out-of-range quality)
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl WebimizeError {
    /// Create a new decode error
    pub fn decode(path: impl Into<PathBuf>, source: impl Into<image::ImageError>) -> Self {
        Self::Decode {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a new encode error
    pub fn encode(path: impl Into<PathBuf>, source: impl Into<image::ImageError>) -> Self {
        Self::Encode {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a new I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Check if a batch run can continue past this error
    ///
    /// Per-file failures are recoverable: the walker logs them and moves on.
    /// Configuration and parameter errors would fail every remaining file
    /// the same way, so they stop the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Decode { .. }
            | Self::Encode { .. }
            | Self::NotFound(_)
            | Self::Io { .. }
            | Self::Walk(_) => true,

            Self::Config(_) | Self::InvalidParameters(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Decode { path, .. } | Self::Encode { path, .. } | Self::Io { path, .. } => {
                Some(path)
            }
            Self::NotFound(path) => Some(path),
            Self::Walk(e) => e.path(),
            Self::Config(_) | Self::InvalidParameters(_) => None,
        }
    }
}

// Config files are TOML; surface parse failures as configuration errors
impl From<toml::de::Error> for WebimizeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML parsing error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = WebimizeError::config("bad config");
        assert!(matches!(err, WebimizeError::Config(_)));

        let err = WebimizeError::not_found("missing.jpg");
        assert!(matches!(err, WebimizeError::NotFound(_)));
    }

    #[test]
    fn test_recoverable_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(WebimizeError::decode("a.jpg", io_err).is_recoverable());
        assert!(WebimizeError::not_found("a.jpg").is_recoverable());
        assert!(!WebimizeError::invalid_parameters("width is zero").is_recoverable());
        assert!(!WebimizeError::config("bad file").is_recoverable());
    }

    #[test]
    fn test_error_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = WebimizeError::encode("out.jpg", io_err);
        assert_eq!(err.path(), Some(Path::new("out.jpg")));

        assert_eq!(WebimizeError::config("oops").path(), None);
    }

    #[test]
    fn test_display_includes_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let msg = WebimizeError::decode("photos/cat.png", io_err).to_string();
        assert!(msg.contains("photos/cat.png"));
        assert!(msg.contains("decode"));
    }
}
