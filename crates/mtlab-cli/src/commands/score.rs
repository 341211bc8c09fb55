//! The `mtlab score` command.

use anyhow::Result;

use mtlab_core::scoring::Scorer;

pub fn execute(candidate: String, reference: String, format: String, baseline_only: bool) -> Result<()> {
    let scorer = if baseline_only {
        Scorer::baseline_only()
    } else {
        Scorer::detect()
    };
    let scores = scorer.score(&candidate, &reference);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&scores)?),
        "text" => {
            println!("Scores:");
            super::print_scores(&scores);
        }
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }

    Ok(())
}
