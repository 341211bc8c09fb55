//! The `mtlab translate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mtlab_core::scoring::Scorer;
use mtlab_core::traits::TranslateRequest;
use mtlab_engines::config::load_config_from;
use mtlab_engines::create_engine;

pub struct TranslateArgs {
    pub text: String,
    pub engine: Option<String>,
    pub model: Option<String>,
    pub terms: String,
    pub style: Option<String>,
    pub system_prompt: Option<String>,
    pub src_lang: String,
    pub tgt_lang: String,
    pub reference: Option<String>,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: TranslateArgs) -> Result<()> {
    anyhow::ensure!(!args.text.trim().is_empty(), "nothing to translate");

    let config = load_config_from(args.config.as_deref())?;
    let engine_name = args.engine.unwrap_or_else(|| config.default_engine.clone());
    let engine = create_engine(&engine_name, &config.engine_config(&engine_name)?)?;

    let request = TranslateRequest {
        model: args.model.unwrap_or_else(|| config.default_model.clone()),
        text: args.text,
        system_prompt: Some(args.system_prompt.unwrap_or_else(|| config.system_prompt.clone())),
        terms: args.terms,
        style: args.style,
        src_lang: args.src_lang,
        tgt_lang: args.tgt_lang,
        temperature: config.default_temperature,
    };

    let response = engine
        .translate(&request)
        .await
        .with_context(|| format!("engine '{engine_name}' failed to translate"))?;

    println!("{}", response.text);
    tracing::debug!(
        model = %response.model,
        latency_ms = response.latency_ms,
        "translation complete"
    );

    if let Some(reference) = args.reference.filter(|r| !r.trim().is_empty()) {
        let scores = Scorer::detect().score(&response.text, &reference);
        println!();
        println!("Scores:");
        super::print_scores(&scores);
    }

    Ok(())
}
