//! The `mtlab pairs` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mtlab_store::validate_pairs;

use crate::PairsCommand;

pub fn execute(
    action: PairsCommand,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, data) = super::open_data_dir(data_dir, config_path.as_deref())?;

    match action {
        PairsCommand::Seed { reset } => {
            if reset {
                data.reset_sample_pairs()?;
                println!("Reset {}", data.pairs_path().display());
            } else if data.ensure_sample_pairs()? {
                println!("Created {}", data.pairs_path().display());
            } else {
                println!("{} already exists, skipping.", data.pairs_path().display());
            }
        }
        PairsCommand::List => {
            let pairs = data.load_pairs()?;
            if pairs.is_empty() {
                println!("No pairs. Run `mtlab pairs seed` to create the demo dataset.");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_header(vec!["Id", "Source", "Reference", "Langs"]);
            for p in &pairs {
                table.add_row(vec![
                    Cell::new(&p.id),
                    Cell::new(&p.source),
                    Cell::new(&p.reference),
                    Cell::new(format!("{}→{}", p.src_lang, p.tgt_lang)),
                ]);
            }
            println!("{table}");
        }
        PairsCommand::Validate => {
            let pairs = data.load_pairs()?;
            println!("{}: {} pairs", data.pairs_path().display(), pairs.len());

            let warnings = validate_pairs(&pairs);
            for w in &warnings {
                match &w.item_id {
                    Some(id) => println!("  WARNING [{id}]: {}", w.message),
                    None => println!("  WARNING: {}", w.message),
                }
            }

            if warnings.is_empty() {
                println!("Dataset valid.");
            } else {
                println!("{} warning(s).", warnings.len());
            }
        }
    }

    Ok(())
}
