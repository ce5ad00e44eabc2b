//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `replay` - Replays a scripted session against a headless scene
//! - `zone` - Tiling-zone lookups

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, LoadedConfig};
use crate::error::PerchError;

pub mod replay;
pub mod zone;

pub use zone::ZoneArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Perch CLI - Drives the Perch window manager core from the command line.
#[derive(Parser, Debug)]
#[command(name = "perch")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Replay a scripted session.
    ///
    /// Runs every step of a JSON script (transport callbacks, input events
    /// and waits) through the run loop against a headless scene, then prints
    /// the resulting toplevels and the notifications that were posted.
    #[command(after_long_help = r#"Examples:
  perch replay session.json          # Table output
  perch replay session.json --json   # JSON report"#)]
    Replay {
        /// The script to replay.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Show the tiling zone under a pointer position.
    ///
    /// Prints the zone a window dropped at that position would snap to and
    /// the frame it would get.
    #[command(after_long_help = r#"Examples:
  perch zone --x 4 --y 500                         # Left half
  perch zone --x 4 --y 4 --width 2560 --height 1440
  perch zone --x 30 --y 500 --threshold 40 --json"#)]
    Zone(ZoneArgs),

    /// Output Perch configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Perch configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   eval "$(perch completions --shell zsh)"
    ///   perch completions --shell bash > ~/.local/share/bash-completion/completions/perch
    ///   perch completions --shell fish > ~/.config/fish/completions/perch.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Loads the configuration this invocation should use.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `--config` file cannot be loaded.
    pub fn load_config(&self) -> Result<LoadedConfig, PerchError> {
        Ok(config::load(self.config_path().as_deref())?)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self, loaded: &LoadedConfig) -> Result<(), PerchError> {
        match &self.command {
            Commands::Replay { file, json } => replay::execute(file, *json, &loaded.config),
            Commands::Zone(args) => zone::execute(args, &loaded.config),

            Commands::Schema => {
                println!("{}", config::generate_schema_json());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "perch", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["perch", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["perch", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_replay() {
        let cli = Cli::try_parse_from(["perch", "replay", "session.json"]).unwrap();
        match cli.command {
            Commands::Replay { file, json } => {
                assert_eq!(file, PathBuf::from("session.json"));
                assert!(!json);
            }
            _ => panic!("Expected Replay command"),
        }
    }

    #[test]
    fn test_cli_parses_replay_json() {
        let cli = Cli::try_parse_from(["perch", "replay", "-j", "session.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Replay { json: true, .. }));
    }

    #[test]
    fn test_cli_replay_requires_file() {
        assert!(Cli::try_parse_from(["perch", "replay"]).is_err());
    }

    #[test]
    fn test_cli_parses_zone() {
        let cli =
            Cli::try_parse_from(["perch", "zone", "--x", "4", "--y", "500", "--width", "2560"])
                .unwrap();
        match cli.command {
            Commands::Zone(args) => {
                assert!((args.x - 4.0).abs() < f64::EPSILON);
                assert!((args.y - 500.0).abs() < f64::EPSILON);
                assert_eq!(args.width, Some(2560.0));
                assert_eq!(args.height, None);
                assert_eq!(args.threshold, None);
            }
            _ => panic!("Expected Zone command"),
        }
    }

    #[test]
    fn test_cli_parses_zone_negative_position() {
        let cli = Cli::try_parse_from(["perch", "zone", "--x", "-5", "--y", "10"]).unwrap();
        match cli.command {
            Commands::Zone(args) => assert!((args.x + 5.0).abs() < f64::EPSILON),
            _ => panic!("Expected Zone command"),
        }
    }

    // ========================================================================
    // --config flag tests
    // ========================================================================

    #[test]
    fn test_cli_parses_config_flag() {
        let cli =
            Cli::try_parse_from(["perch", "--config", "/path/to/config.json", "schema"]).unwrap();
        assert_eq!(cli.config, Some("/path/to/config.json".to_string()));
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_config_flag_after_subcommand() {
        // The --config flag is global so can appear before or after subcommand
        let cli =
            Cli::try_parse_from(["perch", "schema", "-c", "/path/to/config.json"]).unwrap();
        assert_eq!(cli.config_path(), Some(PathBuf::from("/path/to/config.json")));
    }

    #[test]
    fn test_cli_config_path_returns_none_when_not_specified() {
        let cli = Cli::try_parse_from(["perch", "schema"]).unwrap();
        assert!(cli.config_path().is_none());
    }

    #[test]
    fn test_load_config_with_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.jsonc");
        let cli = Cli::try_parse_from(["perch", "--config", path.to_str().unwrap(), "schema"])
            .unwrap();
        assert!(matches!(cli.load_config(), Err(PerchError::Config(_))));
    }

    #[test]
    fn test_app_version_is_not_empty() {
        assert!(!APP_VERSION.is_empty());
    }
}
