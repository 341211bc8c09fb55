//! Subcommand implementations.

pub mod compare;
pub mod export;
pub mod health;
pub mod init;
pub mod lab;
pub mod pairs;
pub mod score;
pub mod submit;
pub mod tickets;
pub mod translate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use mtlab_core::scoring::ScoreCard;
use mtlab_engines::config::load_config_from;
use mtlab_engines::MtlabConfig;
use mtlab_store::DataDir;

/// Load the config and pick the data directory, `--data-dir` winning.
pub(crate) fn open_data_dir(
    data_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<(MtlabConfig, DataDir)> {
    let config = load_config_from(config_path)?;
    let root = data_dir.unwrap_or_else(|| config.data_dir.clone());
    Ok((config, DataDir::new(root)))
}

/// One `name: value` line per metric, rounded for display.
pub(crate) fn print_scores(scores: &ScoreCard) {
    for (name, value) in scores.rounded(3).iter() {
        println!("  {name:<10} {value:.3}");
    }
}
