//! CLI module for Perch.
//!
//! Parses the command line and runs one command against a freshly built
//! window manager. The binary installs logging between [`Cli::load_config`]
//! and [`Cli::execute`].

mod commands;
mod output;

pub use commands::{Cli, Commands, ZoneArgs};
pub use output::{highlight_json, toplevel_table};
