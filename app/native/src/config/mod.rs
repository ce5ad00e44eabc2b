//! Configuration for Perch.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//! Configuration is read once at startup and never written back.

mod schema;
mod types;

use std::path::{Path, PathBuf};

pub use schema::{generate_schema, generate_schema_json};
pub use types::{
    ConfigError, LogConfig, PerchConfig, ScreenConfig, TilingConfig, WindowsConfig, config_paths,
    load_config, load_config_from_path, load_first,
};

/// A loaded configuration and the file it came from, if any.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: PerchConfig,
    pub path: Option<PathBuf>,
    /// Why a discovered file was skipped in favor of the defaults.
    pub warning: Option<String>,
}

/// Loads the configuration for the CLI.
///
/// With `custom`, that file must exist and parse. Without it the default
/// search paths are tried; a missing file yields defaults and a broken one is
/// replaced by defaults with [`LoadedConfig::warning`] set. Loading happens
/// before logging is set up, so the caller reports that warning.
///
/// # Errors
///
/// Only returns an error for an explicit `custom` path.
pub fn load(custom: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = custom {
        let config = load_config_from_path(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        return Ok(LoadedConfig {
            config,
            path: Some(path.to_path_buf()),
            warning: None,
        });
    }

    match load_config() {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "loaded configuration");
            Ok(LoadedConfig {
                config,
                path: Some(path),
                warning: None,
            })
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(LoadedConfig::default())
        }
        Err(err) => Ok(LoadedConfig {
            warning: Some(err.to_string()),
            ..LoadedConfig::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(Some(&dir.path().join("missing.jsonc"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_explicit_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("perch.jsonc");
        std::fs::write(&path, "{ \"windows\": { \"minWidth\": 100 } }").unwrap();

        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.windows.min_width, 100);
    }

    #[test]
    fn test_config_error_message() {
        let msg = ConfigError::NotFound.to_string();
        assert!(msg.contains("no configuration file found"));
    }
}
