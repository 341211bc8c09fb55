//! The `mtlab init` command.

use anyhow::Result;

use mtlab_store::DataDir;

pub fn execute() -> Result<()> {
    // Create mtlab.toml
    if std::path::Path::new("mtlab.toml").exists() {
        println!("mtlab.toml already exists, skipping.");
    } else {
        std::fs::write("mtlab.toml", SAMPLE_CONFIG)?;
        println!("Created mtlab.toml");
    }

    // Seed the data directory
    let data = DataDir::default();
    if data.ensure_sample_pairs()? {
        println!("Created {}", data.pairs_path().display());
    } else {
        println!("{} already exists, skipping.", data.pairs_path().display());
    }
    if data.ensure_tickets()? {
        println!("Created {}", data.tickets_path().display());
    } else {
        println!("{} already exists, skipping.", data.tickets_path().display());
    }

    println!("\nNext steps:");
    println!("  1. export OPENAI_API_KEY=... (or use --engine reverse offline)");
    println!("  2. Run: mtlab lab --engine reverse");
    println!("  3. Run: mtlab tickets add --id T001 --source \"...\" --reference \"...\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mtlab configuration

default_engine = "openai"
default_model = "gpt-4o-mini"
default_temperature = 0.0
system_prompt = "You are a professional Arabic↔English translator. Preserve meaning and tone."
data_dir = "data"
parallelism = 4
max_retries = 3
retry_delay_ms = 1000

[engines.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[engines.reverse]
type = "reverse"
"#;
