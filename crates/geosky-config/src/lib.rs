//! Configuration system for geosky.
//!
//! Provides runtime-configurable sky settings that persist to disk as RON files.
//! Supports CLI overrides via clap, an environment fallback for the star
//! magnitude cutoff, and hot-reload detection.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, EllipsoidConfig, MIN_STAR_MAGNITUDE_ENV, SkyConfig};
pub use error::ConfigError;
