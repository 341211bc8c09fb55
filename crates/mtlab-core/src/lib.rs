//! mtlab-core — Translation scoring, data model, and the batch lab engine.
//!
//! The scoring subsystem ([`scoring::score`]) is pure and dependency-free at
//! run time: baseline metrics always work offline, enhanced metrics are
//! added when compiled in (cargo features `bleu` and `ter`).

#[cfg(feature = "bleu")]
pub mod bleu;
pub mod engine;
pub mod error;
pub mod model;
pub mod ngram;
pub mod report;
pub mod scoring;
pub mod statistics;
#[cfg(feature = "ter")]
pub mod ter;
pub mod tokenize;
pub mod traits;

pub use error::{EngineError, MetricError};
pub use scoring::{score, ScoreCard, Scorer};
