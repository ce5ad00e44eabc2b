#![allow(clippy::multiple_crate_versions)]

//! Perch - command-line front end for the Perch window manager core.
//!
//! Parses arguments, loads the configuration, installs logging and runs the
//! requested command. Errors are printed as `perch: <error>` with exit status 1.

use clap::Parser;
use perch_lib::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `PERCH_LOG=debug`.
const LOG_ENV: &str = "PERCH_LOG";

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.load_config() {
        Ok(loaded) => loaded,
        Err(err) => fail(&err),
    };

    init_logging(&loaded.config.log.level);
    if let Some(warning) = &loaded.warning {
        tracing::warn!(error = %warning, "failed to load configuration, using defaults");
    }

    if let Err(err) = cli.execute(&loaded) {
        fail(&err);
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn fail(err: &dyn std::fmt::Display) -> ! {
    eprintln!("perch: {err}");
    std::process::exit(1);
}
