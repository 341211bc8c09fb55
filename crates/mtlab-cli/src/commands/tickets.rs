//! The `mtlab tickets` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mtlab_core::model::{Ticket, TicketStatus};

use crate::TicketsCommand;

pub fn execute(
    action: TicketsCommand,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, data) = super::open_data_dir(data_dir, config_path.as_deref())?;

    match action {
        TicketsCommand::Add {
            id,
            source,
            reference,
            src_lang,
            tgt_lang,
            assigned_to,
            due_date,
            points,
        } => {
            let assigned_to = assigned_to.filter(|a| !a.trim().is_empty());
            let status = if assigned_to.is_some() {
                TicketStatus::Claimed
            } else {
                TicketStatus::Open
            };
            let ticket = Ticket {
                reference: reference.filter(|r| !r.trim().is_empty()),
                src_lang,
                tgt_lang,
                assigned_to,
                due_date,
                status,
                points,
                ..Ticket::new(id, source)
            };
            let ticket_id = ticket.ticket_id.trim().to_string();
            data.add_ticket(ticket)?;
            println!("Added ticket {ticket_id}");
        }
        TicketsCommand::List { student, open } => {
            let tickets = match (&student, open) {
                (Some(s), _) => data.tickets_for(s)?,
                (None, true) => data.unassigned()?,
                (None, false) => data.load_tickets()?,
            };
            if tickets.is_empty() {
                println!("No tickets.");
            } else {
                print_tickets(&tickets);
            }
        }
        TicketsCommand::Claim { id, student } => {
            let ticket = data.claim(&id, &student)?;
            println!(
                "Ticket {} claimed by {}",
                ticket.ticket_id,
                ticket.assigned_to.as_deref().unwrap_or_default()
            );
        }
        TicketsCommand::Import { file } => {
            let count = data.import_tickets(&file)?;
            println!("Imported {count} tickets from {}", file.display());
        }
    }

    Ok(())
}

fn print_tickets(tickets: &[Ticket]) {
    let mut table = Table::new();
    table.set_header(vec![
        "Ticket", "Source", "Langs", "Assigned", "Due", "Status", "Points", "Ref",
    ]);

    for t in tickets {
        table.add_row(vec![
            Cell::new(&t.ticket_id),
            Cell::new(truncate(&t.source, 48)),
            Cell::new(format!("{}→{}", t.src_lang, t.tgt_lang)),
            Cell::new(t.assigned_to.as_deref().unwrap_or("-")),
            Cell::new(t.due_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(t.status),
            Cell::new(t.points),
            Cell::new(if t.reference().is_some() { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}…")
}
