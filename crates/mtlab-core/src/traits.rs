//! Translation engine trait and prompt helpers.
//!
//! The trait is implemented by the `mtlab-engines` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default system prompt for translation engines.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional Arabic↔English translator. Preserve meaning and tone.";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A machine-translation backend.
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Human-readable engine name (e.g. "openai").
    fn name(&self) -> &str;

    /// Translate `request.text`.
    async fn translate(&self, request: &TranslateRequest) -> anyhow::Result<TranslateResponse>;

    /// Models this engine can be asked for.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request to translate a piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Source text.
    pub text: String,
    /// Optional system prompt override.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Comma-separated `source=target` terminology hints.
    #[serde(default)]
    pub terms: String,
    /// Free-form style constraints appended to the user prompt.
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default = "default_src_lang")]
    pub src_lang: String,
    #[serde(default = "default_tgt_lang")]
    pub tgt_lang: String,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: f64,
}

fn default_src_lang() -> String {
    "en".to_string()
}

fn default_tgt_lang() -> String {
    "ar".to_string()
}

impl TranslateRequest {
    /// A deterministic request with no glossary or style.
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            system_prompt: None,
            terms: String::new(),
            style: None,
            src_lang: default_src_lang(),
            tgt_lang: default_tgt_lang(),
            temperature: 0.0,
        }
    }

    /// System prompt with the glossary hint appended.
    pub fn full_system_prompt(&self) -> String {
        let base = self
            .system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        format!("{base}{}", build_glossary_hint(&self.terms))
    }

    /// User prompt with style constraints appended.
    pub fn user_prompt(&self) -> String {
        build_user_prompt(&self.text, self.style.as_deref())
    }
}

/// Response from a translation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    /// Translated text, trimmed.
    pub text: String,
    /// Model that actually produced the translation.
    pub model: String,
    /// Token usage, when the engine reports it.
    #[serde(default)]
    pub token_usage: Option<TokenUsage>,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting reported by hosted engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Engine name.
    pub engine: String,
}

/// Turn `"policy=سياسة, ministry=الوزارة"` into a system-prompt suffix.
///
/// Entries without `=` are dropped. Returns an empty string when nothing is
/// left.
pub fn build_glossary_hint(terms: &str) -> String {
    let pairs: Vec<&str> = terms
        .split(',')
        .map(str::trim)
        .filter(|t| t.contains('='))
        .collect();
    if pairs.is_empty() {
        return String::new();
    }
    format!("\nUse these terminology mappings: {}", pairs.join("; "))
}

/// Append style constraints to the text to translate.
pub fn build_user_prompt(text: &str, style: Option<&str>) -> String {
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => format!("{text}\n\nConstraints: {style}"),
        None => text.to_string(),
    }
}
