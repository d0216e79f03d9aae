//! The analysis pipeline.
//!
//! Chunk → summarize chunks (remote or extractive) → assemble the summary →
//! clauses, categories and risk on the original text → optional model risk on the
//! executive summary → optional translation of the user-facing text.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::analysis::categories::analyze_categories;
use crate::analysis::clauses::extract_clauses;
use crate::analysis::risk::{model_assessment, score_risk, unknown_assessment};
use crate::analysis::summary::{assemble, ChunkSummary, Summary};
use crate::chunker::Chunker;
use crate::config::Config;
use crate::models::{
    AnalysisMetadata, Chunk, ClauseMatch, Document, ModelRiskAssessment, Provenance,
    StructuredAnalysis,
};
use crate::patterns::tables::CLASSIFIER_LABELS;
use crate::patterns::PatternLibrary;
use crate::services::{translate_sentences, Summarizer, Translator, ZeroShotClassifier};
use crate::text::sentences::SentenceSplitter;
use crate::text::tokens::Tokenizer;

/// Token budget of the zero-shot classifier input.
const CLASSIFIER_MAX_TOKENS: usize = 512;

/// Optional remote collaborators. Any left `None` is skipped or replaced locally.
#[derive(Default, Clone)]
pub struct Services {
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub classifier: Option<Arc<dyn ZeroShotClassifier>>,
    pub translator: Option<Arc<dyn Translator>>,
}

pub struct Analyzer {
    library: Arc<PatternLibrary>,
    config: Config,
    splitter: Box<dyn SentenceSplitter>,
    tokenizer: Tokenizer,
    services: Services,
    progress: bool,
}

impl Analyzer {
    pub fn new(library: Arc<PatternLibrary>, config: Config, services: Services) -> Self {
        let splitter = config.chunking.sentence_splitter.build();
        let tokenizer = config.chunking.tokenizer.build();
        Self {
            library,
            config,
            splitter,
            tokenizer,
            services,
            progress: false,
        }
    }

    /// Show a progress bar on stderr while chunks are summarized remotely.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run the full pipeline on `document`, translating to `language` when a
    /// translator is available.
    pub async fn analyze(&self, document: &Document, language: &str) -> Result<StructuredAnalysis> {
        let text = document.text();

        let chunks = Chunker::new(self.splitter.as_ref(), &self.tokenizer, self.config.chunking.max_tokens)
            .chunk(text);
        let chunk_summaries = self.summarize_chunks(&chunks).await?;
        let mut summary = assemble(document, chunk_summaries, self.splitter.as_ref());

        let mut important_clauses = extract_clauses(&self.library, text, &self.config.clauses);
        let categories = analyze_categories(&self.library, text);
        let category_scores = categories.scores();
        let risk_profile = score_risk(&self.library, text, &self.config.clauses);
        debug!(
            clauses = important_clauses.len(),
            overall = risk_profile.overall_score,
            level = %risk_profile.risk_level,
            "scored document"
        );

        let model_risk = self.assess_model_risk(&summary.executive_summary).await;

        let original_length = text.chars().count();
        let summary_compression = if original_length == 0 {
            0.0
        } else {
            summary.executive_summary.chars().count() as f64 / original_length as f64
        };

        let (language, translation_fallbacks) = match (&self.services.translator, language) {
            (_, "en") => ("en".to_string(), 0),
            (Some(translator), target) => {
                let fallbacks = self
                    .translate(translator.as_ref(), target, &mut summary, &mut important_clauses)
                    .await;
                (target.to_string(), fallbacks)
            }
            (None, target) => {
                warn!("no translator configured, leaving the analysis in English instead of '{}'", target);
                ("en".to_string(), 0)
            }
        };

        let metadata = AnalysisMetadata {
            original_length,
            summary_compression,
            chunk_count: chunks.len(),
            token_count_source: token_count_source(&chunks),
            fallback_chunks: summary.fallback_count(),
            translation_fallbacks,
        };

        Ok(StructuredAnalysis {
            summary,
            important_clauses,
            categories,
            category_scores,
            risk_profile,
            model_risk,
            language,
            metadata,
        })
    }

    async fn summarize_chunks(&self, chunks: &[Chunk]) -> Result<Vec<ChunkSummary>> {
        let splitter = self.splitter.as_ref();

        let Some(summarizer) = &self.services.summarizer else {
            debug!("no summarizer configured, using extractive chunk summaries");
            return Ok(chunks
                .iter()
                .map(|c| ChunkSummary::fallback(c.index, &c.text, splitter))
                .collect());
        };

        let options = &self.config.summary;
        let pb = if self.progress && !chunks.is_empty() {
            let pb = ProgressBar::new(chunks.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                    .progress_chars("#>-"),
            );
            pb.set_message("summarizing");
            Some(pb)
        } else {
            None
        };

        let mut summaries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(options.batch_size.max(1)) {
            let futures: Vec<_> = batch
                .iter()
                .map(|chunk| summarizer.summarize(&chunk.text, options.max_length, options.min_length))
                .collect();

            let results = join_all(futures).await;

            for (chunk, result) in batch.iter().zip(results) {
                let summary = match result {
                    Ok(text) => ChunkSummary::computed(chunk.index, text),
                    Err(e) => {
                        warn!(chunk = chunk.index, "summarizer failed, using leading sentences: {}", e);
                        ChunkSummary::fallback(chunk.index, &chunk.text, splitter)
                    }
                };
                summaries.push(summary);
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }

        Ok(summaries)
    }

    async fn assess_model_risk(&self, executive_summary: &str) -> Option<ModelRiskAssessment> {
        let classifier = self.services.classifier.as_ref()?;
        if executive_summary.trim().is_empty() {
            return Some(unknown_assessment("empty summary"));
        }

        let input = truncate_to_budget(
            self.splitter.as_ref(),
            &self.tokenizer,
            executive_summary,
            CLASSIFIER_MAX_TOKENS,
        );
        match classifier.classify(&input, CLASSIFIER_LABELS).await {
            Ok(scores) => Some(model_assessment(scores)),
            Err(e) => {
                warn!("risk classifier failed: {}", e);
                Some(unknown_assessment(format!("Risk analysis temporarily unavailable: {}", e)))
            }
        }
    }

    /// Translate the user-facing text in place; returns the untranslated sentence count.
    async fn translate(
        &self,
        translator: &dyn Translator,
        target: &str,
        summary: &mut Summary,
        clauses: &mut [ClauseMatch],
    ) -> usize {
        let splitter = self.splitter.as_ref();
        let mut fallbacks = 0;

        let mut fields: Vec<&mut String> = vec![&mut summary.executive_summary];
        fields.extend(summary.key_points.iter_mut());
        fields.extend(clauses.iter_mut().map(|c| &mut c.clause));
        fields.push(&mut summary.overview.main_purpose);
        fields.extend(summary.overview.key_highlights.iter_mut());

        for field in fields {
            let translated = translate_sentences(translator, splitter, field.as_str(), target).await;
            fallbacks += translated.fallbacks;
            *field = translated.text;
        }

        debug!(language = target, fallbacks, "translated analysis");
        fallbacks
    }
}

fn token_count_source(chunks: &[Chunk]) -> Provenance {
    if chunks.iter().any(|c| c.token_source == Provenance::Fallback) {
        Provenance::Fallback
    } else {
        Provenance::Computed
    }
}

/// Leading whole sentences of `text` whose summed token counts fit `budget`.
fn truncate_to_budget(
    splitter: &dyn SentenceSplitter,
    tokenizer: &Tokenizer,
    text: &str,
    budget: usize,
) -> String {
    if tokenizer.tokens(text) <= budget {
        return text.to_string();
    }

    let mut kept = Vec::new();
    let mut used = 0;
    for sentence in splitter.split(text) {
        let tokens = tokenizer.tokens(sentence);
        if used + tokens > budget {
            break;
        }
        kept.push(sentence);
        used += tokens;
    }
    kept.join(" ")
}
