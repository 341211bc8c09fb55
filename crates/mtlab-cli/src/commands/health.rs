//! The `mtlab health` command.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use mtlab_core::scoring::{Scorer, BASELINE_METRICS};
use mtlab_engines::config::OPENAI_KEY_VARS;
use mtlab_engines::create_engine;

pub fn execute(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let (config, data) = super::open_data_dir(data_dir, config_path.as_deref())?;

    println!("Metrics:");
    println!("  baseline: {}", BASELINE_METRICS.join(", "));
    let enhanced = Scorer::detect().enhanced_metrics();
    if enhanced.is_empty() {
        println!("  enhanced: none (built without the bleu/ter features)");
    } else {
        println!("  enhanced: {}", enhanced.join(", "));
    }

    println!("\nEngines:");
    let names: BTreeSet<&str> = config
        .engines
        .keys()
        .map(String::as_str)
        .chain(["openai", "reverse"])
        .collect();
    for name in names {
        let engine_config = config.engine_config(name)?;
        let status = if engine_config.has_credentials() {
            "ready"
        } else {
            "no API key"
        };
        let marker = if name == config.default_engine { " (default)" } else { "" };
        println!("  {name}{marker}: type {}, {status}", engine_config.kind());

        let models: Vec<String> = create_engine(name, &engine_config)?
            .available_models()
            .into_iter()
            .map(|m| m.id)
            .collect();
        if !models.is_empty() {
            println!("    models: {}", models.join(", "));
        }
    }
    println!("  default model: {}", config.default_model);

    println!("\nSecrets:");
    for var in OPENAI_KEY_VARS {
        let set = std::env::var(var).is_ok_and(|v| !v.trim().is_empty());
        println!("  {var}: {}", if set { "set" } else { "not set" });
    }

    println!("\nData ({}):", data.root().display());
    for (file, present) in data.present_files() {
        println!("  {file}: {}", if present { "present" } else { "missing" });
    }

    Ok(())
}
