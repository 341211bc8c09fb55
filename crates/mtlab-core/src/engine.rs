//! Batch lab runner.
//!
//! Translates every pair of a dataset with one engine, scores each output
//! against its reference, and collects the results into a [`LabReport`].
//! Items run concurrently up to `parallelism`; transient engine errors are
//! retried with exponential backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::TranslationPair;
use crate::report::{LabFailure, LabReport, LabResult};
use crate::scoring::Scorer;
use crate::statistics::compute_summary;
use crate::traits::{TranslateRequest, TranslationEngine};

/// Configuration for a lab run.
#[derive(Debug, Clone)]
pub struct LabConfig {
    /// Maximum concurrent translations.
    pub parallelism: usize,
    /// Retries on transient engine errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub retry_delay: Duration,
    /// Sampling temperature.
    pub temperature: f64,
    /// Optional system prompt override.
    pub system_prompt: Option<String>,
    /// Terminology hints applied to every item.
    pub terms: String,
    /// Style constraints applied to every item.
    pub style: Option<String>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
            temperature: 0.0,
            system_prompt: None,
            terms: String::new(),
            style: None,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_item_start(&self, item_id: &str, attempt: u32);
    fn on_item_complete(&self, result: &LabResult);
    fn on_item_error(&self, item_id: &str, error: &str);
    fn on_run_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_item_start(&self, _: &str, _: u32) {}
    fn on_item_complete(&self, _: &LabResult) {}
    fn on_item_error(&self, _: &str, _: &str) {}
    fn on_run_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Runs a dataset through one translation engine.
pub struct LabEngine {
    engine: Arc<dyn TranslationEngine>,
    scorer: Arc<Scorer>,
    config: LabConfig,
}

impl LabEngine {
    pub fn new(engine: Arc<dyn TranslationEngine>, config: LabConfig) -> Self {
        Self {
            engine,
            scorer: Arc::new(Scorer::detect()),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    /// Translate and score every pair with `model`.
    pub async fn run(
        &self,
        pairs: &[TranslationPair],
        model: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<LabReport> {
        anyhow::ensure!(self.config.parallelism >= 1, "parallelism must be at least 1");

        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));

        let mut futures = FuturesUnordered::new();

        for pair in pairs {
            let engine = Arc::clone(&self.engine);
            let scorer = Arc::clone(&self.scorer);
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let pair = pair.clone();
            let model = model.to_string();

            futures.push(async move {
                let item_id = pair.id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                    let request = TranslateRequest {
                        model,
                        text: pair.source.clone(),
                        system_prompt: config.system_prompt.clone(),
                        terms: config.terms.clone(),
                        style: config.style.clone(),
                        src_lang: pair.src_lang.clone(),
                        tgt_lang: pair.tgt_lang.clone(),
                        temperature: config.temperature,
                    };

                    let mut last_error = None;
                    let mut retry_delay = config.retry_delay;
                    for attempt in 1..=config.max_retries + 1 {
                        if attempt > 1 {
                            tokio::time::sleep(retry_delay).await;
                            retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
                        }
                        progress.on_item_start(&pair.id, attempt);

                        match engine.translate(&request).await {
                            Ok(response) => {
                                let scores = scorer.score(&response.text, &pair.reference);
                                return Ok(LabResult {
                                    item_id: pair.id.clone(),
                                    source: pair.source.clone(),
                                    reference: pair.reference.clone(),
                                    mt_output: response.text,
                                    model: response.model,
                                    scores,
                                    latency_ms: response.latency_ms,
                                    attempts: attempt,
                                });
                            }
                            Err(e) => {
                                if let Some(engine_err) = e.downcast_ref::<EngineError>() {
                                    if engine_err.is_permanent() {
                                        return Err(e);
                                    }
                                    if let Some(ms) = engine_err.retry_after_ms() {
                                        retry_delay = Duration::from_millis(ms);
                                    }
                                }
                                tracing::warn!(item = %pair.id, attempt, "translation failed: {e:#}");
                                last_error = Some(e);
                            }
                        }
                    }

                    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("unknown error")))
                };
                (item_id, inner.await)
            });
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        let total = futures.len();

        while let Some((item_id, result)) = futures.next().await {
            match result {
                Ok(lab_result) => {
                    progress.on_item_complete(&lab_result);
                    results.push(lab_result);
                }
                Err(e) => {
                    tracing::error!("lab item {item_id} failed: {e:#}");
                    progress.on_item_error(&item_id, &e.to_string());
                    failures.push(LabFailure {
                        item_id,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        // Completion order is nondeterministic; keep dataset order in the report.
        let order = |id: &str| pairs.iter().position(|p| p.id == id).unwrap_or(usize::MAX);
        results.sort_by_key(|r| order(&r.item_id));
        failures.sort_by_key(|f| order(&f.item_id));

        let elapsed = start.elapsed();
        progress.on_run_complete(total, results.len(), failures.len(), elapsed);

        let summary = compute_summary(&results, failures.len());

        Ok(LabReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            engine: self.engine.name().to_string(),
            model: model.to_string(),
            results,
            failures,
            summary,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
