use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::Provenance;

/// Approximate tokens per whitespace-separated word when no exact counter is available.
pub const TOKENS_PER_WORD: f64 = 1.33;

/// A model-specific token counter. `None` means the counter is unavailable.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Option<usize>;
}

/// Counts Unicode word-bound segments, treating punctuation as its own token.
///
/// Closer to sub-word tokenizers than the word ratio for punctuation-heavy legal text.
pub struct SegmentCounter;

impl TokenCounter for SegmentCounter {
    fn count(&self, text: &str) -> Option<usize> {
        Some(
            text.split_word_bounds()
                .filter(|s| !s.trim().is_empty())
                .count(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCount {
    pub tokens: usize,
    pub source: Provenance,
}

/// Wraps an optional [`TokenCounter`] and falls back to [`estimate_tokens`].
pub struct Tokenizer {
    counter: Option<Box<dyn TokenCounter>>,
}

impl Tokenizer {
    pub fn new(counter: Option<Box<dyn TokenCounter>>) -> Self {
        Self { counter }
    }

    /// Word-ratio estimate only.
    pub fn estimating() -> Self {
        Self { counter: None }
    }

    pub fn count(&self, text: &str) -> TokenCount {
        match self.counter.as_ref().and_then(|c| c.count(text)) {
            Some(tokens) => TokenCount {
                tokens,
                source: Provenance::Computed,
            },
            None => TokenCount {
                tokens: estimate_tokens(text),
                source: Provenance::Fallback,
            },
        }
    }

    pub fn tokens(&self, text: &str) -> usize {
        self.count(text).tokens
    }
}

/// Rough estimate: `floor(words × 1.33)`.
pub fn estimate_tokens(text: &str) -> usize {
    let words = text.split_whitespace().count();
    (words as f64 * TOKENS_PER_WORD) as usize
}

/// Tokenizer selection from the `[chunking]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    #[default]
    Estimate,
    Segments,
}

impl TokenizerKind {
    pub fn build(self) -> Tokenizer {
        match self {
            TokenizerKind::Estimate => Tokenizer::estimating(),
            TokenizerKind::Segments => Tokenizer::new(Some(Box::new(SegmentCounter))),
        }
    }
}
