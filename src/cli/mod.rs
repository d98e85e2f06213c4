//! Command-line interface for dupe-minder.
//!
//! Three subcommands wire the collaborators to the scoring core:
//! - `scan`: build folder records for a tree and store them
//! - `dupes`: rank similar folder pairs and show keep/discard decisions
//! - `quality`: show per-folder quality breakdowns
//!
//! All printing and process-exit concerns live here; the library modules
//! only compute and log.

mod commands;

pub use commands::{Cli, Commands, run_command};
