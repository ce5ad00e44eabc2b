//! Tiling-zone lookup command.

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::cli::output;
use crate::config::PerchConfig;
use crate::error::PerchError;
use crate::geometry::Rect;
use crate::tiling::{self, TilingZone};

/// Arguments for `perch zone`.
#[derive(Args, Debug)]
pub struct ZoneArgs {
    /// Pointer x coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// Pointer y coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,

    /// Screen width. Defaults to `screen.width` from the configuration.
    #[arg(long)]
    pub width: Option<f64>,

    /// Screen height. Defaults to `screen.height` from the configuration.
    #[arg(long)]
    pub height: Option<f64>,

    /// Edge threshold in pixels. Defaults to `tiling.edgeThreshold`.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Output in JSON format.
    #[arg(long, short = 'j')]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct ZoneLookup {
    zone: TilingZone,
    frame: Rect,
    threshold: f64,
}

fn resolve(args: &ZoneArgs, config: &PerchConfig) -> Result<ZoneLookup, PerchError> {
    let width = args.width.unwrap_or(config.screen.width);
    let height = args.height.unwrap_or(config.screen.height);
    let threshold = args.threshold.unwrap_or(config.tiling.edge_threshold);

    if !(width > 0.0 && height > 0.0) {
        return Err(PerchError::InvalidArguments(format!(
            "screen size must be positive, got {width}x{height}"
        )));
    }
    if threshold.is_nan() || threshold < 0.0 {
        return Err(PerchError::InvalidArguments(format!(
            "threshold must not be negative, got {threshold}"
        )));
    }

    let zone = tiling::zone_at_position_with_threshold(args.x, args.y, width, height, threshold);
    Ok(ZoneLookup {
        zone,
        frame: tiling::frame_for_zone(zone, width, height),
        threshold,
    })
}

/// Execute `perch zone`.
///
/// # Errors
///
/// Returns an error for a non-positive screen size or a negative threshold.
pub fn execute(args: &ZoneArgs, config: &PerchConfig) -> Result<(), PerchError> {
    let lookup = resolve(args, config)?;

    if args.json {
        output::print_highlighted_json(&serde_json::to_value(lookup)?);
        return Ok(());
    }

    if lookup.zone == TilingZone::None {
        println!("{} no zone at ({}, {})", "•".dimmed(), args.x, args.y);
        return Ok(());
    }

    let (x, y, width, height) = lookup.frame.to_pixels();
    println!("{} {}", "Zone:".bold(), lookup.zone.to_string().cyan());
    println!("{} {width}x{height} at {x}, {y}", "Frame:".bold());
    Ok(())
}
