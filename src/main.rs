//! Dupe Minder - duplicate album folder detection for music libraries.
//!
//! Scans a library into folder records, scores folder pairs for
//! similarity, ranks each folder's metadata quality, and classifies which
//! copy of a duplicate pair to keep. Classification only - the tool never
//! deletes or moves files.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod quality;
pub mod resolver;
pub mod scanner;
pub mod similarity;
pub mod store;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("dupe_minder=info".parse().unwrap()))
        .init();

    let config = config::load();

    // Write the defaults on first run so users have a file to edit
    if let Some(path) = config::config_path() {
        if !path.exists() {
            if let Err(e) = config::save(&config) {
                tracing::warn!("Could not write default config: {e}");
            }
        }
    }

    cli::run_command(&args, &config)
}
