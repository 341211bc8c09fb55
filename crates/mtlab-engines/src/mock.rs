//! Mock engine for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mtlab_core::traits::{
    ModelInfo, TokenUsage, TranslateRequest, TranslateResponse, TranslationEngine,
};

/// A mock engine for exercising the lab runner without real API calls.
///
/// Returns configurable translations based on source-text matching.
pub struct MockEngine {
    /// Map of source substring → translation.
    responses: HashMap<String, String>,
    /// Translation used when nothing matches.
    default_response: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<TranslateRequest>>,
}

impl MockEngine {
    /// Create a mock engine with the given source→translation mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: "ترجمة".to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same translation.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            ..Self::new(HashMap::new())
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<TranslateRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TranslationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, request: &TranslateRequest) -> anyhow::Result<TranslateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let text = self
            .responses
            .iter()
            .find(|(key, _)| request.text.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        let prompt_tokens = request.text.split_whitespace().count() as u32;
        let completion_tokens = text.split_whitespace().count() as u32;

        Ok(TranslateResponse {
            text,
            model: request.model.clone(),
            token_usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            engine: "mock".into(),
        }]
    }
}
