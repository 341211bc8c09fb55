//! The `mtlab submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mtlab_core::model::{Submission, WorkMode};
use mtlab_core::scoring::Scorer;

pub struct SubmitArgs {
    pub student: String,
    pub item: Option<String>,
    pub ticket: Option<String>,
    pub mt_output: String,
    pub post_edit: String,
    pub terms: String,
    pub system_prompt: String,
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: SubmitArgs) -> Result<()> {
    let student = args.student.trim().to_string();
    anyhow::ensure!(!student.is_empty(), "student name is required");

    let (_, data) = super::open_data_dir(args.data_dir, args.config.as_deref())?;

    let (mode, item_id, source, reference) = match (args.ticket, args.item) {
        (Some(ticket_id), _) => {
            let ticket = data.find_ticket(&ticket_id)?;
            if let Some(holder) = ticket.assigned_to.as_deref().filter(|a| !a.trim().is_empty()) {
                anyhow::ensure!(
                    holder == student,
                    "ticket {ticket_id} is assigned to {holder}, not {student}"
                );
            }
            let reference = ticket.reference().map(str::to_string);
            (WorkMode::Ticket, ticket.ticket_id, ticket.source, reference)
        }
        (None, Some(item_id)) => {
            let pair = data.find_pair(&item_id)?;
            let reference = Some(pair.reference).filter(|r| !r.trim().is_empty());
            (WorkMode::Pairs, pair.id, pair.source, reference)
        }
        (None, None) => anyhow::bail!("either --item or --ticket is required"),
    };

    let candidate = Submission::pick_candidate(&args.post_edit, &args.mt_output)
        .context("nothing to score: pass --post-edit or --mt-output")?;
    let scores = reference
        .as_deref()
        .map(|r| Scorer::detect().score(candidate, r));

    let submission = Submission {
        timestamp: chrono::Utc::now(),
        student,
        mode,
        item_id,
        source,
        reference: reference.unwrap_or_default(),
        mt_output: args.mt_output.trim().to_string(),
        post_edit: args.post_edit.trim().to_string(),
        terms: args.terms,
        system_prompt: args.system_prompt,
        scores,
    };

    data.append_result(&submission.to_record())
        .context("failed to save submission")?;
    if mode == WorkMode::Ticket {
        data.mark_submitted(&submission.item_id)?;
    }
    tracing::info!(
        student = %submission.student,
        mode = %mode,
        item = %submission.item_id,
        "submission saved"
    );

    println!(
        "Saved submission from {} ({} {})",
        submission.student,
        mode,
        submission.item_id
    );
    match &submission.scores {
        Some(scores) => super::print_scores(scores),
        None => println!("  no reference for this item; saved without metrics"),
    }

    Ok(())
}
