//! CLI command definitions and dispatch.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::model::{Decision, QualityBreakdown};
use crate::quality::FolderQualityScorer;
use crate::resolver::DuplicateResolver;
use crate::scanner::FolderRecordBuilder;
use crate::similarity::PairFinder;
use crate::store::Store;

/// Dupe Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory tree and record its album folders
    Scan {
        /// Root of the music library to scan
        path: PathBuf,
        /// Re-scan folders already present in the store
        #[arg(long)]
        rescan: bool,
        /// Store file path (defaults to the config directory)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Find duplicate folder pairs among scanned records
    Dupes {
        /// Minimum weighted score (0-100) to report
        #[arg(long)]
        min_score: Option<f64>,
        /// Store file path (defaults to the config directory)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Show the per-parameter score breakdown for each pair
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show quality scores for scanned folders
    Quality {
        /// Only show folders whose path contains this substring
        path: Option<String>,
        /// Store file path (defaults to the config directory)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Show the per-component breakdown for each folder
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Scan {
            path,
            rescan,
            store,
        } => cmd_scan(config, path, *rescan, store.as_deref()),
        Commands::Dupes {
            min_score,
            store,
            verbose,
        } => cmd_dupes(config, *min_score, store.as_deref(), *verbose),
        Commands::Quality {
            path,
            store,
            verbose,
        } => cmd_quality(config, path.as_deref(), store.as_deref(), *verbose),
    }
}

fn store_path(config: &Config, override_path: Option<&std::path::Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.scan.data_file {
        return Ok(path.clone());
    }
    config::config_dir()
        .map(|d| d.join("scan.json"))
        .context("Could not determine a store location; pass --store")
}

// ============================================================================
// Command implementations
// ============================================================================

fn cmd_scan(
    config: &Config,
    root: &std::path::Path,
    rescan: bool,
    store_override: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let mut store = Store::open(store_path(config, store_override)?)?;
    let builder = FolderRecordBuilder::new(config.scan.clone());

    let folders = builder
        .scan_tree(root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let mut added = 0;
    let mut skipped = 0;
    for folder in folders {
        if !rescan && store.contains(&folder.path) {
            skipped += 1;
            continue;
        }
        store.insert(folder);
        added += 1;
    }
    store.save()?;

    println!("Scan complete: {added} folders recorded, {skipped} already known");
    println!("Store: {} ({} folders total)", store.path().display(), store.len());
    Ok(())
}

fn cmd_dupes(
    config: &Config,
    min_score: Option<f64>,
    store_override: Option<&std::path::Path>,
    verbose: bool,
) -> anyhow::Result<()> {
    let store = Store::open(store_path(config, store_override)?)?;
    if store.is_empty() {
        println!("Store is empty - run `scan` first.");
        return Ok(());
    }

    let folders: Vec<_> = store.records().cloned().collect();
    let min_score = min_score.unwrap_or(config.similarity.min_score);

    let finder = PairFinder::new(config.similarity.clone());
    let pairs = finder.find_pairs(&folders, min_score);

    if pairs.is_empty() {
        println!(
            "No folder pairs at or above score {min_score:.1} ({} folders compared)",
            folders.len()
        );
        return Ok(());
    }

    let scorer = FolderQualityScorer::new(config.quality.clone());
    let quality_by_path: BTreeMap<String, QualityBreakdown> = folders
        .iter()
        .map(|f| (f.path.clone(), scorer.score(f)))
        .collect();
    let decisions = DuplicateResolver::resolve(&pairs, &quality_by_path);

    println!("=== Duplicate Candidates ===\n");
    for (key, result) in &pairs {
        let marker = if result.identical { " [identical content]" } else { "" };
        println!("Score {:>5.1}{marker}", result.weighted_score);
        println!("  A: {}", key.first);
        println!("  B: {}", key.second);

        if verbose && !result.scores.is_empty() {
            for (param, score) in &result.scores {
                println!("     {param:<22} {score:.3}");
            }
        }

        match &decisions[key] {
            Decision::Prefer { keep, discard } => {
                let keep_q = quality_by_path[keep].total_score;
                let discard_q = quality_by_path[discard].total_score;
                println!("  -> keep    {keep} (quality {keep_q:.1})");
                println!("     discard {discard} (quality {discard_q:.1})");
            }
            Decision::Ambiguous => {
                println!("  -> ambiguous (equal quality, review manually)");
            }
        }
        println!();
    }

    let ambiguous = decisions
        .values()
        .filter(|d| matches!(d, Decision::Ambiguous))
        .count();
    println!(
        "{} pairs found, {} resolvable, {} ambiguous",
        pairs.len(),
        pairs.len() - ambiguous,
        ambiguous
    );
    Ok(())
}

fn cmd_quality(
    config: &Config,
    filter: Option<&str>,
    store_override: Option<&std::path::Path>,
    verbose: bool,
) -> anyhow::Result<()> {
    let store = Store::open(store_path(config, store_override)?)?;
    if store.is_empty() {
        println!("Store is empty - run `scan` first.");
        return Ok(());
    }

    let scorer = FolderQualityScorer::new(config.quality.clone());

    let mut scored: Vec<(String, QualityBreakdown)> = store
        .records()
        .filter(|f| filter.is_none_or(|needle| f.path.contains(needle)))
        .map(|f| (f.path.clone(), scorer.score(f)))
        .collect();
    scored.sort_by(|(pa, a), (pb, b)| {
        b.total_score
            .total_cmp(&a.total_score)
            .then_with(|| pa.cmp(pb))
    });

    if scored.is_empty() {
        println!("No folders matched.");
        return Ok(());
    }

    println!("=== Folder Quality ===\n");
    for (path, breakdown) in &scored {
        println!("{:>6.1}  {path}", breakdown.total_score);
        if verbose {
            for (component, score) in &breakdown.components {
                println!("        {component:<24} {score:>6.1}");
            }
        }
    }
    println!("\n{} folders scored", scored.len());
    Ok(())
}
