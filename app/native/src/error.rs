//! Top-level error type for the `perch` binary.
//!
//! Library modules return their own error enums; the CLI funnels all of them
//! into [`PerchError`] so `main` can print one line and exit.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::shell::ShellError;

/// Errors that can occur while running a CLI command.
#[derive(Debug, Error)]
pub enum PerchError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shell(#[from] ShellError),

    /// A script or other input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<String> for PerchError {
    fn from(msg: String) -> Self { Self::InvalidArguments(msg) }
}

impl From<&str> for PerchError {
    fn from(msg: &str) -> Self { Self::InvalidArguments(msg.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SurfaceHandle;

    #[test]
    fn test_invalid_arguments_display() {
        let err = PerchError::InvalidArguments("width must be positive".to_string());
        assert_eq!(err.to_string(), "width must be positive");
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: PerchError = ConfigError::NotFound.into();
        assert!(err.to_string().starts_with("no configuration file found"));
    }

    #[test]
    fn test_shell_error_from_conversion() {
        let err: PerchError = ShellError::UnknownSurface(SurfaceHandle(3)).into();
        assert!(matches!(err, PerchError::Shell(_)));
        assert_eq!(err.to_string(), "unknown surface surface-3");
    }

    #[test]
    fn test_read_error_names_path() {
        let err = PerchError::Read {
            path: PathBuf::from("/tmp/session.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/tmp/session.json"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let err: PerchError = io_err.into();
        assert!(matches!(err, PerchError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_str() {
        let err: PerchError = "bad input".into();
        assert!(matches!(err, PerchError::InvalidArguments(_)));
    }

    #[test]
    fn test_json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: PerchError = json_err.into();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
