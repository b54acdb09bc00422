//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// geosky command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "geosky", about = "Procedural sky for geospatial scenes")]
pub struct CliArgs {
    /// Star catalog file.
    #[arg(long)]
    pub star_file: Option<PathBuf>,

    /// Discard stars with a magnitude below this value.
    #[arg(long)]
    pub min_star_magnitude: Option<f32>,

    /// Simulated date/time (RFC 3339).
    #[arg(long)]
    pub date_time: Option<String>,

    /// Enable eye/sun driven ambient light.
    #[arg(long)]
    pub auto_ambience: Option<bool>,

    /// Show the moon.
    #[arg(long)]
    pub moon: Option<bool>,

    /// Show the stars.
    #[arg(long)]
    pub stars: Option<bool>,

    /// Additional resource directory (moon texture lookup).
    #[arg(long)]
    pub data_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref path) = args.star_file {
            self.sky.star_file = Some(path.clone());
        }
        if let Some(mag) = args.min_star_magnitude {
            self.sky.min_star_magnitude = Some(mag);
        }
        if let Some(ref dt) = args.date_time {
            self.sky.date_time = Some(dt.clone());
        }
        if let Some(auto) = args.auto_ambience {
            self.sky.auto_ambience = auto;
        }
        if let Some(moon) = args.moon {
            self.sky.moon_visible = moon;
        }
        if let Some(stars) = args.stars {
            self.sky.stars_visible = stars;
        }
        if let Some(ref dir) = args.data_path {
            self.sky.data_paths.insert(0, dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
