//! Instructor assignments (`tickets.csv`).

use std::collections::HashSet;
use std::path::Path;

use mtlab_core::model::{Ticket, TicketStatus};

use crate::{DataDir, Result, StoreError};

/// Column order of `tickets.csv`.
pub const TICKET_COLUMNS: [&str; 9] = [
    "ticket_id",
    "source",
    "reference",
    "src_lang",
    "tgt_lang",
    "assigned_to",
    "due_date",
    "status",
    "points",
];

fn read_tickets(path: &Path) -> Result<Vec<Ticket>> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| StoreError::csv(path, e))?;
    rdr.deserialize()
        .collect::<std::result::Result<Vec<Ticket>, _>>()
        .map_err(|e| StoreError::csv(path, e))
}

impl DataDir {
    /// Write an empty tickets file if none exists. Returns true if written.
    pub fn ensure_tickets(&self) -> Result<bool> {
        if self.tickets_path().exists() {
            return Ok(false);
        }
        self.save_tickets(&[])?;
        Ok(true)
    }

    /// All tickets. A missing file has none.
    pub fn load_tickets(&self) -> Result<Vec<Ticket>> {
        let path = self.tickets_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_tickets(&path)
    }

    pub fn save_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        let path = self.tickets_path();
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(TICKET_COLUMNS)
            .map_err(|e| StoreError::csv(&path, e))?;
        for ticket in tickets {
            wtr.serialize(ticket).map_err(|e| StoreError::csv(&path, e))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| StoreError::io(&path, e.into_error()))?;
        self.write_atomic(&path, &bytes)
    }

    pub fn find_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        self.load_tickets()?
            .into_iter()
            .find(|t| t.ticket_id == ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))
    }

    /// Append one ticket. Id and source are required; ids are unique.
    pub fn add_ticket(&self, mut ticket: Ticket) -> Result<()> {
        ticket.ticket_id = ticket.ticket_id.trim().to_string();
        if ticket.ticket_id.is_empty() {
            return Err(StoreError::MissingField("ticket_id"));
        }
        if ticket.source.trim().is_empty() {
            return Err(StoreError::MissingField("source"));
        }

        let mut tickets = self.load_tickets()?;
        if tickets.iter().any(|t| t.ticket_id == ticket.ticket_id) {
            return Err(StoreError::DuplicateTicket(ticket.ticket_id));
        }

        tracing::info!(ticket = %ticket.ticket_id, "adding ticket");
        tickets.push(ticket);
        self.save_tickets(&tickets)
    }

    /// Replace the tickets file with an uploaded CSV.
    ///
    /// The upload must parse as tickets and carry unique, non-empty ids;
    /// otherwise the current file is left untouched. Returns the number of
    /// tickets imported.
    pub fn import_tickets(&self, upload: &Path) -> Result<usize> {
        let tickets = read_tickets(upload)?;

        let mut seen = HashSet::new();
        for t in &tickets {
            if t.ticket_id.trim().is_empty() {
                return Err(StoreError::MissingField("ticket_id"));
            }
            if !seen.insert(t.ticket_id.as_str()) {
                return Err(StoreError::DuplicateTicket(t.ticket_id.clone()));
            }
        }

        self.save_tickets(&tickets)?;
        tracing::info!(count = tickets.len(), from = %upload.display(), "imported tickets");
        Ok(tickets.len())
    }

    /// Assign an unassigned ticket to `student`.
    ///
    /// Claiming a ticket you already hold is a no-op.
    pub fn claim(&self, ticket_id: &str, student: &str) -> Result<Ticket> {
        let student = student.trim();
        if student.is_empty() {
            return Err(StoreError::MissingField("student"));
        }

        let mut tickets = self.load_tickets()?;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.ticket_id == ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;

        if !ticket.is_unassigned() {
            let holder = ticket.assigned_to.clone().unwrap_or_default();
            if holder == student {
                return Ok(ticket.clone());
            }
            return Err(StoreError::AlreadyAssigned {
                ticket_id: ticket_id.to_string(),
                assigned_to: holder,
            });
        }

        ticket.assigned_to = Some(student.to_string());
        ticket.status = TicketStatus::Claimed;
        let claimed = ticket.clone();
        self.save_tickets(&tickets)?;
        tracing::info!(ticket = %ticket_id, student, "ticket claimed");
        Ok(claimed)
    }

    pub fn mark_submitted(&self, ticket_id: &str) -> Result<()> {
        let mut tickets = self.load_tickets()?;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.ticket_id == ticket_id)
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;
        ticket.status = TicketStatus::Submitted;
        self.save_tickets(&tickets)
    }

    /// Tickets assigned to `student` that are still open or claimed.
    pub fn tickets_for(&self, student: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .load_tickets()?
            .into_iter()
            .filter(|t| t.is_active_for(student))
            .collect())
    }

    /// Tickets nobody has claimed yet.
    pub fn unassigned(&self) -> Result<Vec<Ticket>> {
        Ok(self
            .load_tickets()?
            .into_iter()
            .filter(Ticket::is_unassigned)
            .collect())
    }
}
