//! The `mtlab lab` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use mtlab_core::engine::{LabEngine, ProgressReporter};
use mtlab_core::report::{LabReport, LabResult};
use mtlab_core::scoring::P2;
use mtlab_engines::create_engine;
use mtlab_report::html::write_lab_html;
use mtlab_report::overview::ordered_metrics;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_item_start(&self, item_id: &str, attempt: u32) {
        eprintln!("  Starting: {item_id} (attempt {attempt})");
    }

    fn on_item_complete(&self, result: &LabResult) {
        eprintln!(
            "  Done: {} [{}] p2 {:.3} ({}ms)",
            result.item_id,
            result.attempts,
            result.scores.get(P2).unwrap_or_default(),
            result.latency_ms,
        );
    }

    fn on_item_error(&self, item_id: &str, error: &str) {
        eprintln!("  ERROR: {item_id}: {error}");
    }

    fn on_run_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} succeeded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub struct LabArgs {
    pub engine: Option<String>,
    pub model: Option<String>,
    pub terms: String,
    pub style: Option<String>,
    pub parallelism: Option<usize>,
    pub output: PathBuf,
    pub format: String,
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: LabArgs) -> Result<()> {
    let (config, data) = super::open_data_dir(args.data_dir, args.config.as_deref())?;

    let formats: Vec<&str> = if args.format == "all" {
        vec!["json", "html"]
    } else {
        args.format.split(',').map(str::trim).collect()
    };
    if let Some(bad) = formats.iter().find(|f| !matches!(**f, "json" | "html")) {
        anyhow::bail!("unknown format '{bad}' (expected json, html, or all)");
    }

    let pairs = data.load_pairs()?;
    anyhow::ensure!(
        !pairs.is_empty(),
        "no pairs in {}; run `mtlab pairs seed` first",
        data.pairs_path().display()
    );

    let engine_name = args.engine.unwrap_or_else(|| config.default_engine.clone());
    let model = args.model.unwrap_or_else(|| config.default_model.clone());
    let engine = create_engine(&engine_name, &config.engine_config(&engine_name)?)?;

    let mut lab_config = config.lab_config();
    if let Some(p) = args.parallelism {
        lab_config.parallelism = p;
    }
    lab_config.terms = args.terms;
    lab_config.style = args.style;
    anyhow::ensure!(lab_config.parallelism >= 1, "parallelism must be at least 1");

    eprintln!(
        "mtlab v{} — Translating {} pairs with {engine_name}/{model}",
        env!("CARGO_PKG_VERSION"),
        pairs.len()
    );
    eprintln!();

    let lab = LabEngine::new(Arc::from(engine), lab_config);
    let report = lab.run(&pairs, &model, &ConsoleReporter).await?;

    print_summary(&report);

    std::fs::create_dir_all(&args.output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = args.output.join(format!("lab-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = args.output.join(format!("lab-{timestamp}.html"));
                write_lab_html(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => eprintln!("Unknown format: {other}"),
        }
    }

    Ok(())
}

fn print_summary(report: &LabReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Metric", "Mean", "Items"]);

    let metrics = ordered_metrics(report.summary.means.keys().map(String::as_str));
    for metric in &metrics {
        if let Some(mean) = report.summary.means.get(metric) {
            table.add_row(vec![
                Cell::new(metric),
                Cell::new(format!("{:.3}", mean.mean)),
                Cell::new(mean.count),
            ]);
        }
    }

    eprintln!("\n{table}");
    eprintln!(
        "{} items, {} failed, avg latency {}ms",
        report.summary.items, report.summary.failed, report.summary.avg_latency_ms
    );
}
