use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from reading or updating the data directory.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("ticket {0} already exists")]
    DuplicateTicket(String),

    #[error("ticket {0} not found")]
    TicketNotFound(String),

    #[error("ticket {ticket_id} is already assigned to {assigned_to}")]
    AlreadyAssigned {
        ticket_id: String,
        assigned_to: String,
    },

    #[error("item {0} not found in the pairs dataset")]
    PairNotFound(String),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}
