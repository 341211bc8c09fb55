//! The `mtlab export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mtlab_report::{build_overview, write_html_report};

pub fn execute(
    output: PathBuf,
    format: String,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, data) = super::open_data_dir(data_dir, config_path.as_deref())?;
    let table = data.read_results()?;
    if table.is_empty() {
        eprintln!("No submissions yet in {}", data.results_path().display());
    }

    let overview = build_overview(&table.records());

    match format.as_str() {
        "html" => write_html_report(&overview, &output)?,
        "json" => {
            let json = serde_json::to_string_pretty(&overview)?;
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&output, json)
                .with_context(|| format!("failed to write {}", output.display()))?;
        }
        other => anyhow::bail!("unknown format '{other}' (expected html or json)"),
    }

    println!(
        "Exported overview of {} submissions from {} students to {}",
        overview.total_submissions,
        overview.students.len(),
        output.display()
    );
    Ok(())
}
