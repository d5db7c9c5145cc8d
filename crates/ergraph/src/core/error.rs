//! Core error types for schema extraction
//!
//! Only conditions that abort a run live here. Everything the extractors can
//! recover from is reported as a [`Diagnostic`](super::Diagnostic) instead.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal errors raised while generating a diagram
#[derive(Error, Debug)]
pub enum ErGraphError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Config error: {message}")]
    Config { message: String },
}

impl ErGraphError {
    /// Create a new IO error bound to the path that failed
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new config error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<std::fmt::Error> for ErGraphError {
    fn from(_: std::fmt::Error) -> Self {
        Self::render_error("failed to write formatted output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mentions_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = ErGraphError::io("models/employee.entity.ts", source);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("models/employee.entity.ts"));
        assert!(error_msg.contains("missing"));
    }

    #[test]
    fn test_render_error() {
        let error = ErGraphError::render_error("Render failed");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Render error"));
        assert!(error_msg.contains("Render failed"));
    }

    #[test]
    fn test_fmt_error_becomes_render_error() {
        let error = ErGraphError::from(std::fmt::Error);
        assert!(matches!(error, ErGraphError::Render { .. }));
        assert!(format!("{}", error).starts_with("Render error"));
    }

    #[test]
    fn test_config_error() {
        let error = ErGraphError::config_error("empty suffix");
        assert_eq!(format!("{}", error), "Config error: empty suffix");
    }

    #[test]
    fn test_io_error_source_is_preserved() {
        use std::error::Error as _;
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ErGraphError::io("enums", source);
        assert!(error.source().is_some());
    }
}
