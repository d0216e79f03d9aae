//! `terms-checkr`: summarize Terms & Conditions and score their risk.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]), apply CLI overrides.
//! 3. Read the document from a file or stdin.
//! 4. Compile the detector library ([`patterns::PatternLibrary`]).
//! 5. With `--online`, wire the remote summarizer, classifier and translator ([`services`]).
//! 6. Run the pipeline ([`engine::Analyzer`]).
//! 7. Render the requested report ([`report`]).
//! 8. Exit `0`, or `1` when `--fail-on` is tripped by the risk level.

mod analysis;
mod chunker;
mod cli;
mod config;
mod engine;
mod models;
mod patterns;
mod report;
mod services;
mod text;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::{load_config, Config};
use engine::{Analyzer, Services};
use models::Document;
use patterns::tables::SUPPORTED_LANGUAGES;
use patterns::PatternLibrary;
use services::huggingface::{HfClassifier, HfSummarizer, InferenceApi};
use services::libretranslate::LibreTranslate;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if !SUPPORTED_LANGUAGES.iter().any(|(code, _)| *code == cli.lang) {
        let codes: Vec<&str> = SUPPORTED_LANGUAGES.iter().map(|(code, _)| *code).collect();
        bail!("Unsupported language '{}' (expected one of: {})", cli.lang, codes.join(", "));
    }

    // Load config relative to the working directory
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = load_config(&cwd, cli.config.as_deref())?;
    if let Some(max_tokens) = cli.max_tokens {
        config.override_max_tokens(max_tokens)?;
    }

    let (document, source) = read_document(&cli.input)?;
    if document.is_empty() {
        bail!("{} contains no text to analyze", source);
    }
    debug!(words = document.word_count(), source = %source, "document loaded");

    let library = Arc::new(PatternLibrary::builtin()?);
    debug!(detectors = library.len(), "pattern library compiled");
    let services = if cli.online {
        online_services(&config)?
    } else {
        Services::default()
    };

    let analysis = Analyzer::new(library, config, services)
        .with_progress(!cli.quiet)
        .analyze(&document, &cli.lang)
        .await?;

    // Resolve effective report format: --pdf implies PDF format
    let report_format = match &cli.pdf {
        Some(_) => ReportFormat::Pdf,
        None => cli.report,
    };
    let pdf_path = cli
        .pdf
        .unwrap_or_else(|| PathBuf::from("terms-report.pdf"));

    match report_format {
        ReportFormat::Terminal => {
            report::terminal::render(&analysis, &source, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        ReportFormat::Pdf => {
            report::pdf::render(&analysis, &source, &pdf_path)?;
        }
    }

    if let Some(fail_on) = cli.fail_on {
        if fail_on.is_tripped_by(analysis.risk_profile.risk_level) {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Read the whole document; `-` reads stdin. Returns the text and a display name.
fn read_document(input: &Path) -> Result<(Document, String)> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read document from stdin")?;
        return Ok((Document::new(text), "<stdin>".to_string()));
    }

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    Ok((Document::new(text), name))
}

fn online_services(config: &Config) -> Result<Services> {
    let cfg = &config.services;
    let timeout = Duration::from_secs(cfg.timeout_secs);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()?;

    let token = std::env::var(&cfg.token_env).ok();
    if token.is_none() {
        debug!(var = %cfg.token_env, "no inference token set, sending anonymous requests");
    }
    let api = InferenceApi::new(client.clone(), cfg.endpoint.clone(), token, timeout);

    let translator_key = std::env::var(&cfg.translator_key_env).ok();

    Ok(Services {
        summarizer: Some(Arc::new(HfSummarizer::new(api.clone(), cfg.summarizer_model.clone()))),
        classifier: Some(Arc::new(HfClassifier::new(api, cfg.classifier_model.clone()))),
        translator: Some(Arc::new(LibreTranslate::new(
            client,
            cfg.translator_url.clone(),
            translator_key,
            timeout,
        ))),
    })
}
