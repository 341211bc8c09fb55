//! The `mtlab compare` command.

use std::path::PathBuf;

use anyhow::Result;

use mtlab_core::report::{LabReport, ScoreChange};

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    metric: String,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = LabReport::load_json(&baseline_path)?;
    let current = LabReport::load_json(&current_path)?;

    let report = current.compare(&baseline, &metric, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!(
                "Comparison on {}: {} regressions, {} improvements, {} unchanged",
                report.metric,
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            print_changes("Regressions", &report.regressions);
            print_changes("Improvements", &report.improvements);

            if report.new_items > 0 {
                println!("\n{} new item(s)", report.new_items);
            }
            if report.removed_items > 0 {
                println!("{} removed item(s)", report.removed_items);
            }
            if report.missing_metric > 0 {
                println!("{} item(s) without {} in one of the runs", report.missing_metric, report.metric);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_changes(title: &str, changes: &[ScoreChange]) {
    if changes.is_empty() {
        return;
    }
    println!("\n{title}:");
    for c in changes {
        println!(
            "  {} {:.3} -> {:.3} ({:+.3})",
            c.item_id, c.baseline_score, c.current_score, c.delta
        );
    }
}
