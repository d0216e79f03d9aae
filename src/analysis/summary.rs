use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Document, Provenance};
use crate::patterns::tables::{KEY_POINT_KEYWORDS, OVERVIEW_TERMS, TOPICS};
use crate::text::sentences::SentenceSplitter;

use super::count_occurrences;

const EXECUTIVE_CHARS: usize = 200;
const KEY_POINT_WINDOW: usize = 6;
const MAX_KEY_POINTS: usize = 5;
const OVERVIEW_SENTENCES: usize = 5;
const WORDS_PER_MINUTE: usize = 200;
const DEFAULT_PURPOSE: &str = "Terms and Conditions governing service usage.";

/// Summarizer length limits, from the `[summary]` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    pub max_length: usize,
    pub min_length: usize,
    /// Chunks summarized concurrently per batch.
    pub batch_size: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 40,
            batch_size: 8,
        }
    }
}

/// Summary of one chunk, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkSummary {
    pub index: usize,
    pub text: String,
    pub source: Provenance,
}

impl ChunkSummary {
    pub fn computed(index: usize, text: String) -> Self {
        Self {
            index,
            text,
            source: Provenance::Computed,
        }
    }

    /// Local stand-in for a failed remote summary: the chunk's first two sentences.
    pub fn fallback(index: usize, chunk: &str, splitter: &dyn SentenceSplitter) -> Self {
        let text = splitter.split(chunk).into_iter().take(2).collect::<Vec<_>>().join(" ");
        Self {
            index,
            text,
            source: Provenance::Fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub main_purpose: String,
    pub key_highlights: Vec<String>,
    pub document_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub executive_summary: String,
    pub key_points: Vec<String>,
    pub overview: Overview,
    /// Topic weight 0–100 relative to the most frequent topic.
    pub topic_distribution: BTreeMap<String, u32>,
    pub readability_score: u32,
    pub word_count: usize,
    /// Minutes, at least 1.
    pub estimated_reading_time: usize,
    pub chunk_summaries: Vec<ChunkSummary>,
}

impl Summary {
    pub fn fallback_count(&self) -> usize {
        self.chunk_summaries
            .iter()
            .filter(|s| s.source == Provenance::Fallback)
            .count()
    }
}

/// Build the structured summary from per-chunk summaries.
///
/// Chunk summaries are joined in chunk order whatever order they arrive in. Word
/// count, reading time, overview and topics come from the original document.
pub fn assemble(
    document: &Document,
    mut chunk_summaries: Vec<ChunkSummary>,
    splitter: &dyn SentenceSplitter,
) -> Summary {
    chunk_summaries.sort_by_key(|s| s.index);
    let combined = join_summaries(&chunk_summaries);

    Summary {
        executive_summary: truncate_executive(&combined),
        key_points: key_points(&combined, splitter),
        overview: overview(document.text(), splitter),
        topic_distribution: topic_distribution(document.text()),
        readability_score: readability(&combined, splitter),
        word_count: document.word_count(),
        estimated_reading_time: (document.word_count() / WORDS_PER_MINUTE).max(1),
        chunk_summaries,
    }
}

fn join_summaries(summaries: &[ChunkSummary]) -> String {
    summaries
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_executive(text: &str) -> String {
    match text.char_indices().nth(EXECUTIVE_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Keyword-bearing or substantive sentences among the first six, at most five.
pub fn key_points(summary: &str, splitter: &dyn SentenceSplitter) -> Vec<String> {
    splitter
        .split(summary)
        .into_iter()
        .take(KEY_POINT_WINDOW)
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            KEY_POINT_KEYWORDS.iter().any(|kw| lower.contains(kw))
                || sentence.split_whitespace().count() > 8
        })
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect()
}

/// Top-scoring document sentences by important-term count, in document order.
pub fn overview(text: &str, splitter: &dyn SentenceSplitter) -> Overview {
    let mut scored: Vec<(usize, usize, &str)> = splitter
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(i, sentence)| {
            let lower = sentence.to_lowercase();
            let score = OVERVIEW_TERMS.iter().filter(|t| lower.contains(*t)).count();
            (score, i, sentence)
        })
        .collect();

    // stable: ties keep document order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(OVERVIEW_SENTENCES);
    scored.sort_by_key(|(_, i, _)| *i);

    let points: Vec<&str> = scored
        .into_iter()
        .filter(|(score, _, _)| *score > 0)
        .map(|(_, _, s)| s)
        .collect();

    let main_purpose = if points.is_empty() {
        DEFAULT_PURPOSE.to_string()
    } else {
        points.iter().take(3).copied().collect::<Vec<_>>().join(" ")
    };

    Overview {
        main_purpose,
        key_highlights: points.iter().skip(3).map(|s| s.to_string()).collect(),
        document_type: "Terms and Conditions".to_string(),
    }
}

/// Keyword occurrences per topic, normalized to the largest topic.
pub fn topic_distribution(text: &str) -> BTreeMap<String, u32> {
    let lower = text.to_lowercase();
    let counts: Vec<(&str, usize)> = TOPICS
        .iter()
        .map(|(topic, keywords)| {
            let count = keywords.iter().map(|kw| count_occurrences(&lower, kw)).sum();
            (*topic, count)
        })
        .collect();

    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    counts
        .into_iter()
        .map(|(topic, count)| {
            let normalized = if max == 0 {
                0
            } else {
                ((count as f64 / max as f64) * 100.0) as u32
            };
            (topic.to_string(), normalized.min(100))
        })
        .collect()
}

/// `100 − 2·avg_sentence_len − 5·avg_word_len`, clamped to 0–100; 50 for empty text.
pub fn readability(text: &str, splitter: &dyn SentenceSplitter) -> u32 {
    let sentences = splitter.split(text).len();
    let words: Vec<&str> = text.split_whitespace().collect();
    if sentences == 0 || words.is_empty() {
        return 50;
    }

    let avg_sentence = words.len() as f64 / sentences as f64;
    let avg_word = words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;
    let score = 100.0 - avg_sentence * 2.0 - avg_word * 5.0;
    score.clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::sentences::PunctuationSplitter;

    fn computed(parts: &[&str]) -> Vec<ChunkSummary> {
        parts
            .iter()
            .enumerate()
            .map(|(i, t)| ChunkSummary::computed(i, t.to_string()))
            .collect()
    }

    #[test]
    fn test_fallback_keeps_two_sentences() {
        let s = ChunkSummary::fallback(3, "One thing. Two things! Three things?", &PunctuationSplitter);
        assert_eq!(s.text, "One thing. Two things!");
        assert_eq!(s.source, Provenance::Fallback);
        assert_eq!(s.index, 3);
    }

    #[test]
    fn test_assemble_joins_in_chunk_order() {
        let doc = Document::new("Some document text.");
        let mut parts = computed(&["First part.", "Second part.", "Third part."]);
        parts.reverse();
        let summary = assemble(&doc, parts, &PunctuationSplitter);
        assert_eq!(summary.executive_summary, "First part. Second part. Third part.");
        assert_eq!(summary.fallback_count(), 0);
    }

    #[test]
    fn test_executive_summary_truncation() {
        let long = "a".repeat(250);
        let summary = assemble(&Document::new("x"), computed(&[&long]), &PunctuationSplitter);
        assert_eq!(summary.executive_summary.chars().count(), 203);
        assert!(summary.executive_summary.ends_with("..."));

        let exact = "b".repeat(200);
        let summary = assemble(&Document::new("x"), computed(&[&exact]), &PunctuationSplitter);
        assert_eq!(summary.executive_summary, exact);
    }

    #[test]
    fn test_reading_time_from_document() {
        let doc = Document::new("word ".repeat(450));
        let summary = assemble(&doc, computed(&["Short."]), &PunctuationSplitter);
        assert_eq!(summary.word_count, 450);
        assert_eq!(summary.estimated_reading_time, 2);

        let doc = Document::new("just ten words here and there and more of them");
        let summary = assemble(&doc, computed(&["Short."]), &PunctuationSplitter);
        assert_eq!(summary.estimated_reading_time, 1);
    }

    #[test]
    fn test_key_points() {
        let text = "We use cookies. Short one. This sentence has well over eight words in it for sure. Tiny.";
        assert_eq!(
            key_points(text, &PunctuationSplitter),
            vec![
                "We use cookies.",
                "This sentence has well over eight words in it for sure."
            ]
        );
    }

    #[test]
    fn test_key_points_window_and_cap() {
        let text = "Refund one. Refund two. Refund three. Refund four. Refund five. Refund six. Refund seven.";
        let points = key_points(text, &PunctuationSplitter);
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], "Refund one.");
        assert_eq!(points[4], "Refund five.");

        let late = "A. B. C. D. E. F. Your payment is due.";
        assert!(key_points(late, &PunctuationSplitter).is_empty());
    }

    #[test]
    fn test_overview_orders_by_document_position() {
        let text = "Welcome to our site. We collect personal data. The sky is blue. You may cancel anytime.";
        let o = overview(text, &PunctuationSplitter);
        assert_eq!(o.main_purpose, "We collect personal data. You may cancel anytime.");
        assert!(o.key_highlights.is_empty());
        assert_eq!(o.document_type, "Terms and Conditions");
    }

    #[test]
    fn test_overview_highlights_and_default() {
        let text = "Refund one. Refund two. Cancel three. Privacy four. Share five. Plain six. Data seven.";
        let o = overview(text, &PunctuationSplitter);
        assert_eq!(o.main_purpose, "Refund one. Refund two. Cancel three.");
        assert_eq!(o.key_highlights, vec!["Privacy four.", "Share five."]);

        let o = overview("The sky is blue.", &PunctuationSplitter);
        assert_eq!(o.main_purpose, DEFAULT_PURPOSE);
    }

    #[test]
    fn test_topic_distribution_normalized() {
        let topics = topic_distribution("payment fee refund. dispute.");
        assert_eq!(topics["payments_billing"], 100);
        assert_eq!(topics["dispute_resolution"], 33);
        assert_eq!(topics["cookies_tracking"], 0);
        assert_eq!(topics.len(), 6);

        assert!(topic_distribution("").values().all(|v| *v == 0));
    }

    #[test]
    fn test_readability() {
        assert_eq!(readability("We collect data. We share it.", &PunctuationSplitter), 74);
        assert_eq!(readability("", &PunctuationSplitter), 50);
        let dense = format!("{}.", "incomprehensibilities ".repeat(40));
        assert_eq!(readability(&dense, &PunctuationSplitter), 0);
    }
}
