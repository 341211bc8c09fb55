//! Core data model types for mtlab.
//!
//! Dataset pairs, instructor-assigned tickets, and the submissions students
//! save after post-editing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::ScoreCard;

/// A source sentence with its gold reference translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationPair {
    pub id: String,
    pub source: String,
    pub reference: String,
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    #[serde(default = "default_tgt_lang")]
    pub tgt_lang: String,
}

/// An assignment handed to a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub source: String,
    /// Optional human reference; tickets without one cannot be scored.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    #[serde(default = "default_tgt_lang")]
    pub tgt_lang: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default = "default_points")]
    pub points: u32,
}

impl Ticket {
    /// A fresh, open ticket with default languages and points.
    pub fn new(ticket_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            source: source.into(),
            reference: None,
            src_lang: default_src_lang(),
            tgt_lang: default_tgt_lang(),
            assigned_to: None,
            due_date: None,
            status: TicketStatus::Open,
            points: default_points(),
        }
    }

    /// The reference, if one is set and non-blank.
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn is_unassigned(&self) -> bool {
        self.assigned_to
            .as_deref()
            .map_or(true, |a| a.trim().is_empty())
    }

    /// Assigned to `student` and still workable.
    pub fn is_active_for(&self, student: &str) -> bool {
        self.assigned_to.as_deref() == Some(student)
            && matches!(self.status, TicketStatus::Open | TicketStatus::Claimed)
    }
}

fn default_src_lang() -> String {
    "en".to_string()
}

fn default_tgt_lang() -> String {
    "ar".to_string()
}

fn default_points() -> u32 {
    5
}

/// Lifecycle of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Claimed,
    Submitted,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "open"),
            TicketStatus::Claimed => write!(f, "claimed"),
            TicketStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "claimed" => Ok(TicketStatus::Claimed),
            "submitted" => Ok(TicketStatus::Submitted),
            other => Err(format!("unknown ticket status: {other}")),
        }
    }
}

/// Where a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    Pairs,
    Ticket,
}

impl WorkMode {
    /// Column that holds the item identifier in the results log.
    pub fn id_column(self) -> &'static str {
        match self {
            WorkMode::Pairs => "item_id",
            WorkMode::Ticket => "ticket_id",
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkMode::Pairs => write!(f, "pairs"),
            WorkMode::Ticket => write!(f, "ticket"),
        }
    }
}

/// Prefix of metric columns in the results log.
pub const METRIC_COLUMN_PREFIX: &str = "metric_";

/// A saved piece of student work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub timestamp: DateTime<Utc>,
    pub student: String,
    pub mode: WorkMode,
    pub item_id: String,
    pub source: String,
    pub reference: String,
    pub mt_output: String,
    pub post_edit: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub system_prompt: String,
    /// Absent when the item had no reference to score against.
    #[serde(default)]
    pub scores: Option<ScoreCard>,
}

impl Submission {
    /// The text to score: the post-edit if given, otherwise the raw MT output.
    ///
    /// Returns `None` when both are blank.
    pub fn pick_candidate<'a>(post_edit: &'a str, mt_output: &'a str) -> Option<&'a str> {
        [post_edit.trim(), mt_output.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
    }

    /// Flatten into ordered `(column, value)` cells for the results log.
    pub fn to_record(&self) -> Vec<(String, String)> {
        let mut cells = vec![
            ("timestamp".to_string(), self.timestamp.timestamp().to_string()),
            ("student".to_string(), self.student.clone()),
            ("mode".to_string(), self.mode.to_string()),
            (self.mode.id_column().to_string(), self.item_id.clone()),
            ("source".to_string(), self.source.clone()),
            ("reference".to_string(), self.reference.clone()),
            ("mt_output".to_string(), self.mt_output.clone()),
            ("post_edit".to_string(), self.post_edit.clone()),
            ("terms".to_string(), self.terms.clone()),
            ("system_prompt".to_string(), self.system_prompt.clone()),
        ];
        if let Some(scores) = &self.scores {
            cells.extend(
                scores
                    .iter()
                    .map(|(k, v)| (format!("{METRIC_COLUMN_PREFIX}{k}"), v.to_string())),
            );
        }
        cells
    }
}
