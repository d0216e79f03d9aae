use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into an ordered sequence of trimmed, non-empty sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Boundary is `.`, `!` or `?` followed by whitespace or end of input.
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = match chars.peek() {
                None => true,
                Some((_, next)) => next.is_whitespace(),
            };
            if at_boundary {
                let end = i + c.len_utf8();
                push_trimmed(&mut sentences, &text[start..end]);
                start = end;
            }
        }
        push_trimmed(&mut sentences, &text[start..]);

        sentences
    }
}

/// UAX #29 sentence boundaries.
pub struct UnicodeSplitter;

impl SentenceSplitter for UnicodeSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        for sentence in text.split_sentence_bounds() {
            push_trimmed(&mut sentences, sentence);
        }
        sentences
    }
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

/// Splitter selection from the `[chunking]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitterKind {
    #[default]
    Punctuation,
    Unicode,
}

impl SplitterKind {
    pub fn build(self) -> Box<dyn SentenceSplitter> {
        match self {
            SplitterKind::Punctuation => Box::new(PunctuationSplitter),
            SplitterKind::Unicode => Box::new(UnicodeSplitter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_boundaries() {
        let text = "We collect data. Do we share it? Yes!  Contact us at help@example.com";
        let sentences = PunctuationSplitter.split(text);
        assert_eq!(
            sentences,
            vec![
                "We collect data.",
                "Do we share it?",
                "Yes!",
                "Contact us at help@example.com"
            ]
        );
    }

    #[test]
    fn test_punctuation_inside_token_is_not_a_boundary() {
        let sentences = PunctuationSplitter.split("Version 2.0 applies.Next clause. Done.");
        assert_eq!(sentences, vec!["Version 2.0 applies.Next clause.", "Done."]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(PunctuationSplitter.split("").is_empty());
        assert!(PunctuationSplitter.split("  \n ").is_empty());
        assert!(UnicodeSplitter.split("").is_empty());
    }

    #[test]
    fn test_unicode_splitter() {
        let sentences = UnicodeSplitter.split("First sentence. Second one!");
        assert_eq!(sentences, vec!["First sentence.", "Second one!"]);
    }
}
