//! Offline toy engine for demos and tests.

use async_trait::async_trait;

use mtlab_core::traits::{ModelInfo, TranslateRequest, TranslateResponse, TranslationEngine};

/// Reverses word order and tags the output with the target language.
///
/// Lets a class try the whole post-editing loop without an API key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseEngine;

impl ReverseEngine {
    pub fn reverse(text: &str, tgt_lang: &str) -> String {
        let reversed: Vec<&str> = text.split_whitespace().rev().collect();
        let tag = if tgt_lang.trim().to_lowercase().starts_with("ar") {
            "[AR]"
        } else {
            "[MT]"
        };
        format!("{} {tag}", reversed.join(" "))
    }
}

#[async_trait]
impl TranslationEngine for ReverseEngine {
    fn name(&self) -> &str {
        "reverse"
    }

    async fn translate(&self, request: &TranslateRequest) -> anyhow::Result<TranslateResponse> {
        Ok(TranslateResponse {
            text: Self::reverse(&request.text, &request.tgt_lang),
            model: "reverse".into(),
            token_usage: None,
            latency_ms: 0,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "reverse".into(),
            name: "Word-order reversal".into(),
            engine: "reverse".into(),
        }]
    }
}
