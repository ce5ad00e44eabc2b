//! Configuration types and file discovery for Perch.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tiling::EDGE_THRESHOLD;

/// Drag-to-snap settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TilingConfig {
    /// Whether dropping a window near a screen edge snaps it.
    pub enabled: bool,

    /// Distance in pixels from a screen edge that counts as "at the edge".
    pub edge_threshold: f64,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            edge_threshold: EDGE_THRESHOLD,
        }
    }
}

impl TilingConfig {
    /// The threshold to snap with, or `None` when snapping is disabled.
    #[must_use]
    pub fn snap_threshold(&self) -> Option<f64> {
        (self.enabled && self.edge_threshold > 0.0).then_some(self.edge_threshold)
    }
}

/// Size of the screen used by the headless display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Placement and sizing of new windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowsConfig {
    /// Width used when a client does not request one.
    pub default_width: u32,
    /// Height used when a client does not request one.
    pub default_height: u32,
    /// Smallest width a window can be resized to.
    pub min_width: u32,
    /// Smallest height a window can be resized to.
    pub min_height: u32,
    /// Center new windows on the screen instead of placing them at the origin.
    pub center_new_windows: bool,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            min_width: 64,
            min_height: 48,
            center_new_windows: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Filter directive used when `PERCH_LOG` is not set, e.g. `"debug"` or
    /// `"perch_lib::toplevel=trace"`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Root configuration.
///
/// Every field has a default, so an empty object is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PerchConfig {
    /// Optional `$schema` reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    pub tiling: TilingConfig,

    pub screen: ScreenConfig,

    pub windows: WindowsConfig,

    pub log: LogConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "no configuration file found; expected ~/.config/perch/config.jsonc or ~/.perch.jsonc"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file contains invalid JSON.
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Configuration file names in the home directory.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".perch.jsonc", ".perch.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/perch/config.jsonc` or `config.json`, when set
/// 2. `~/.config/perch/config.jsonc` or `config.json`
/// 3. the platform configuration directory, e.g.
///    `~/Library/Application Support/perch/`
/// 4. `~/.perch.jsonc` or `~/.perch.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    fn push_dir(dir: &Path, paths: &mut Vec<PathBuf>) {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(&PathBuf::from(xdg_config).join("perch"), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(&home.join(".config").join("perch"), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(&config_dir.join("perch"), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from a specific file.
///
/// Comments (`//` and `/* */`) are stripped before parsing.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read and
/// `ConfigError::Parse` if it is not valid configuration JSON.
pub fn load_config_from_path(path: &Path) -> Result<PerchConfig, ConfigError> {
    let file = fs::File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = json_comments::StripComments::new(file);
    serde_json::from_reader(reader).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the configuration from the first existing file in `paths`.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if none of the paths exists, or the error
/// from [`load_config_from_path`] for the first one that does.
pub fn load_first(paths: &[PathBuf]) -> Result<(PerchConfig, PathBuf), ConfigError> {
    let path = paths.iter().find(|path| path.exists()).ok_or(ConfigError::NotFound)?;
    let config = load_config_from_path(path)?;
    Ok((config, path.clone()))
}

/// Loads the configuration from the first available file in [`config_paths`].
///
/// # Errors
///
/// See [`load_first`].
pub fn load_config() -> Result<(PerchConfig, PathBuf), ConfigError> { load_first(&config_paths()) }
