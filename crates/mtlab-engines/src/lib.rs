//! mtlab-engines — machine-translation engine integrations.
//!
//! Implements the `TranslationEngine` trait for OpenAI-compatible chat
//! APIs and an offline toy engine, plus the `mtlab.toml` configuration
//! that selects between them.

pub mod config;
pub mod mock;
pub mod openai;
pub mod reverse;

pub use config::{create_engine, load_config, load_config_from, EngineConfig, MtlabConfig};
pub use mtlab_core::error::EngineError;
