//! Token-budget chunking.
//!
//! Sentences are accumulated greedily; a sentence that alone exceeds the budget is
//! split at word boundaries. A single word over budget is kept whole and flagged.

use tracing::debug;

use crate::models::{Chunk, Provenance};
use crate::text::sentences::SentenceSplitter;
use crate::text::tokens::Tokenizer;

pub struct Chunker<'a> {
    splitter: &'a dyn SentenceSplitter,
    tokenizer: &'a Tokenizer,
    max_tokens: usize,
}

impl<'a> Chunker<'a> {
    pub fn new(splitter: &'a dyn SentenceSplitter, tokenizer: &'a Tokenizer, max_tokens: usize) -> Self {
        Self {
            splitter,
            tokenizer,
            max_tokens,
        }
    }

    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut builder = ChunkBuilder::new(self.tokenizer, self.max_tokens);

        for sentence in self.splitter.split(text) {
            if self.tokenizer.tokens(sentence) > self.max_tokens {
                builder.flush();
                for word in sentence.split_whitespace() {
                    builder.push(word);
                }
                builder.flush();
            } else {
                builder.push(sentence);
            }
        }
        builder.flush();

        debug!(
            chunks = builder.chunks.len(),
            max_tokens = self.max_tokens,
            "chunked document"
        );
        builder.chunks
    }
}

/// Greedy accumulator shared by sentence- and word-level passes.
struct ChunkBuilder<'a> {
    tokenizer: &'a Tokenizer,
    max_tokens: usize,
    current: String,
    current_tokens: usize,
    current_source: Provenance,
    chunks: Vec<Chunk>,
}

impl<'a> ChunkBuilder<'a> {
    fn new(tokenizer: &'a Tokenizer, max_tokens: usize) -> Self {
        Self {
            tokenizer,
            max_tokens,
            current: String::new(),
            current_tokens: 0,
            current_source: Provenance::Computed,
            chunks: Vec::new(),
        }
    }

    /// Append `unit`, closing the current chunk first if the joined text would overflow.
    fn push(&mut self, unit: &str) {
        if self.current.is_empty() {
            self.start_with(unit);
            return;
        }

        let candidate = format!("{} {}", self.current, unit);
        let measured = self.tokenizer.count(&candidate);
        if measured.tokens > self.max_tokens {
            self.flush();
            self.start_with(unit);
        } else {
            self.current = candidate;
            self.current_tokens = measured.tokens;
            self.current_source = measured.source;
        }
    }

    fn start_with(&mut self, unit: &str) {
        let measured = self.tokenizer.count(unit);
        self.current = unit.to_string();
        self.current_tokens = measured.tokens;
        self.current_source = measured.source;
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        let oversized = self.current_tokens > self.max_tokens;
        self.chunks.push(Chunk {
            index: self.chunks.len(),
            text,
            tokens: self.current_tokens,
            oversized,
            token_source: self.current_source,
        });
        self.current_tokens = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::sentences::PunctuationSplitter;
    use crate::text::tokens::{TokenCounter, TokenizerKind};

    fn chunk(text: &str, max_tokens: usize) -> Vec<Chunk> {
        let tokenizer = TokenizerKind::Estimate.build();
        Chunker::new(&PunctuationSplitter, &tokenizer, max_tokens).chunk(text)
    }

    fn normalized(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk("", 512).is_empty());
        assert!(chunk("   \n  ", 512).is_empty());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunk("We collect data. We share it.", 512);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "We collect data. We share it.");
        assert_eq!(chunks[0].index, 0);
        assert!(!chunks[0].oversized);
    }

    #[test]
    fn test_greedy_sentence_accumulation() {
        // Each sentence: 4 words -> 5 tokens; two sentences: 8 words -> 10 tokens.
        let text = "One two three four. Five six seven eight. Nine ten eleven twelve.";
        let chunks = chunk(text, 10);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "One two three four. Five six seven eight.");
        assert_eq!(chunks[1].text, "Nine ten eleven twelve.");
        assert!(chunks.iter().all(|c| c.tokens <= 10));
    }

    #[test]
    fn test_budget_and_order_preserved() {
        let sentence = "The provider may share your personal information with partners.";
        let text = vec![sentence; 200].join(" ");
        let chunks = chunk(&text, 64);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.tokens <= 64 && !c.oversized));
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
        let joined: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(normalized(&joined.join(" ")), normalized(&text));
    }

    #[test]
    fn test_long_sentence_splits_on_words_only() {
        let words: Vec<String> = (0..2000).map(|i| format!("word{}", i)).collect();
        let text = words.join(" ");
        let chunks = chunk(&text, 512);

        assert!(chunks.len() >= 5);
        let mut rebuilt = Vec::new();
        for c in &chunks {
            assert!(c.tokens <= 512);
            rebuilt.extend(c.text.split_whitespace());
        }
        let expected: Vec<&str> = words.iter().map(String::as_str).collect();
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_long_sentence_flushes_pending_chunk_first() {
        let long = vec!["lorem"; 30].join(" ");
        let text = format!("Short intro. {}. Tail sentence.", long);
        let chunks = chunk(&text, 20);

        assert_eq!(chunks[0].text, "Short intro.");
        assert_eq!(chunks.last().map(|c| c.text.as_str()), Some("Tail sentence."));
        let joined: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(normalized(&joined.join(" ")), normalized(&text));
    }

    struct CharCounter;

    impl TokenCounter for CharCounter {
        fn count(&self, text: &str) -> Option<usize> {
            Some(text.chars().count())
        }
    }

    #[test]
    fn test_oversized_word_kept_whole() {
        let tokenizer = Tokenizer::new(Some(Box::new(CharCounter)));
        let chunks =
            Chunker::new(&PunctuationSplitter, &tokenizer, 8).chunk("tiny supercalifragilistic ok");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["tiny", "supercalifragilistic", "ok"]);
        assert_eq!(chunks.iter().filter(|c| c.oversized).count(), 1);
        assert!(chunks[1].oversized);
    }

    /// Counts words but gives up on anything containing a digit.
    struct WordsWithoutDigits;

    impl TokenCounter for WordsWithoutDigits {
        fn count(&self, text: &str) -> Option<usize> {
            if text.chars().any(|c| c.is_ascii_digit()) {
                None
            } else {
                Some(text.split_whitespace().count())
            }
        }
    }

    #[test]
    fn test_chunks_record_token_source() {
        let tokenizer = Tokenizer::new(Some(Box::new(WordsWithoutDigits)));
        let chunks = Chunker::new(&PunctuationSplitter, &tokenizer, 4)
            .chunk("One two three. Pay 30 dollars. Four five.");

        let sources: Vec<Provenance> = chunks.iter().map(|c| c.token_source).collect();
        assert_eq!(
            sources,
            vec![Provenance::Computed, Provenance::Fallback, Provenance::Computed]
        );

        let estimated = chunk("One two three.", 10);
        assert_eq!(estimated[0].token_source, Provenance::Fallback);
    }

    #[test]
    fn test_zero_budget_terminates() {
        let chunks = chunk("a b c.", 0);
        assert_eq!(chunks.len(), 3);
    }
}
