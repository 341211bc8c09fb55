//! Engine configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mtlab_core::engine::LabConfig;
use mtlab_core::traits::{TranslationEngine, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

use crate::openai::OpenAiEngine;
use crate::reverse::ReverseEngine;

/// Environment variables that override the OpenAI key, highest priority first.
pub const OPENAI_KEY_VARS: [&str; 2] = ["MTLAB_OPENAI_KEY", "OPENAI_API_KEY"];

/// Configuration for a single translation engine.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EngineConfig {
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Reverse,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineConfig::OpenAI {
                api_key,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &if api_key.is_empty() { "" } else { "***" })
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            EngineConfig::Reverse => f.write_str("Reverse"),
        }
    }
}

impl EngineConfig {
    /// The `type` tag as written in `mtlab.toml`.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineConfig::OpenAI { .. } => "openai",
            EngineConfig::Reverse => "reverse",
        }
    }

    /// Whether the engine has what it needs to make calls.
    pub fn has_credentials(&self) -> bool {
        match self {
            EngineConfig::OpenAI { api_key, .. } => !api_key.trim().is_empty(),
            EngineConfig::Reverse => true,
        }
    }

    fn openai_without_key() -> Self {
        EngineConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            org_id: None,
        }
    }
}

/// Top-level mtlab configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtlabConfig {
    /// Engine configurations keyed by name.
    #[serde(default)]
    pub engines: HashMap<String, EngineConfig>,
    /// Engine used when none is given on the command line.
    #[serde(default = "default_engine")]
    pub default_engine: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature (0.0 for reproducible classroom runs).
    #[serde(default)]
    pub default_temperature: f64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Directory holding the pairs, tickets, and results files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Max concurrent translations in a lab run.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Max retries on transient engine errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_engine() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_parallelism() -> usize {
    4
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    1000
}

impl Default for MtlabConfig {
    fn default() -> Self {
        Self {
            engines: HashMap::new(),
            default_engine: default_engine(),
            default_model: default_model(),
            default_temperature: 0.0,
            system_prompt: default_system_prompt(),
            data_dir: default_data_dir(),
            parallelism: default_parallelism(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl MtlabConfig {
    /// Look up an engine by name.
    ///
    /// `openai` and `reverse` work without a config entry.
    pub fn engine_config(&self, name: &str) -> Result<EngineConfig> {
        if let Some(config) = self.engines.get(name) {
            return Ok(config.clone());
        }
        match name {
            "openai" => Ok(EngineConfig::openai_without_key()),
            "reverse" => Ok(EngineConfig::Reverse),
            other => anyhow::bail!(
                "unknown engine '{other}' (configure it under [engines.{other}] in mtlab.toml)"
            ),
        }
    }

    /// Lab settings derived from this config.
    pub fn lab_config(&self) -> LabConfig {
        LabConfig {
            parallelism: self.parallelism,
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            temperature: self.default_temperature,
            system_prompt: Some(self.system_prompt.clone()),
            ..LabConfig::default()
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in an engine config.
fn resolve_engine_config(config: &EngineConfig) -> EngineConfig {
    match config {
        EngineConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => EngineConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        EngineConfig::Reverse => EngineConfig::Reverse,
    }
}

/// Put the first key found by `lookup` into the `openai` engine entry.
fn apply_key_override(config: &mut MtlabConfig, lookup: impl Fn(&str) -> Option<String>) {
    let Some(key) = OPENAI_KEY_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()))
    else {
        return;
    };

    let entry = config
        .engines
        .entry("openai".into())
        .or_insert_with(EngineConfig::openai_without_key);
    match entry {
        EngineConfig::OpenAI { api_key, .. } => *api_key = key,
        EngineConfig::Reverse => {
            tracing::warn!("engine 'openai' is configured as type reverse; ignoring API key override")
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mtlab.toml` in the current directory
/// 2. `~/.config/mtlab/config.toml`
///
/// Environment variable overrides: `MTLAB_OPENAI_KEY`, then `OPENAI_API_KEY`.
pub fn load_config() -> Result<MtlabConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<MtlabConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mtlab.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => parse_config_file(path)?,
        None => MtlabConfig::default(),
    };
    if let Some(path) = &config_path {
        tracing::debug!("loaded config from {}", path.display());
    }

    config.engines = config
        .engines
        .iter()
        .map(|(k, v)| (k.clone(), resolve_engine_config(v)))
        .collect();
    apply_key_override(&mut config, |var| std::env::var(var).ok());

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<MtlabConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<MtlabConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mtlab"))
}

/// Create an engine instance from its configuration.
pub fn create_engine(name: &str, config: &EngineConfig) -> Result<Box<dyn TranslationEngine>> {
    tracing::debug!(engine = name, kind = config.kind(), "creating engine");
    match config {
        EngineConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiEngine::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        ))),
        EngineConfig::Reverse => Ok(Box::new(ReverseEngine)),
    }
}
