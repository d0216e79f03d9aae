use serde::Deserialize;

use crate::models::{ClauseMatch, Severity};
use crate::patterns::{Detector, Group, PatternLibrary};

/// Extraction limits, from the `[clauses]` config section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClauseOptions {
    /// Characters of context kept on each side of a match.
    pub context_radius: usize,
    /// Contexts shorter than this (in characters) are dropped as noise.
    pub min_context_len: usize,
    pub max_clauses: usize,
}

impl Default for ClauseOptions {
    fn default() -> Self {
        Self {
            context_radius: 50,
            min_context_len: 20,
            max_clauses: 4,
        }
    }
}

/// Extract concerning clauses from `text`.
///
/// Detectors run in table order and their matches are kept in match order; the cap
/// applies to that combined sequence, so early detectors win over later ones.
pub fn extract_clauses(library: &PatternLibrary, text: &str, options: &ClauseOptions) -> Vec<ClauseMatch> {
    library
        .group(Group::Clause)
        .flat_map(|detector| clause_matches(detector, text, options))
        .take(options.max_clauses)
        .collect()
}

/// Whether any high-weight clause detector yields a context that passes the length
/// filter, regardless of `max_clauses`.
pub fn has_high_concern(library: &PatternLibrary, text: &str, options: &ClauseOptions) -> bool {
    library
        .group(Group::Clause)
        .filter(|d| d.weight == Severity::High)
        .any(|d| clause_matches(d, text, options).next().is_some())
}

/// Matches of one detector whose context is long enough, in match order.
fn clause_matches<'a>(
    detector: &'a Detector,
    text: &'a str,
    options: &'a ClauseOptions,
) -> impl Iterator<Item = ClauseMatch> + 'a {
    detector.regex.find_iter(text).filter_map(move |m| {
        let context = context_window(text, m.start(), m.end(), options.context_radius);
        if context.chars().count() < options.min_context_len {
            return None;
        }
        Some(ClauseMatch {
            matched: m.as_str().to_string(),
            clause: context.to_string(),
            detector: detector.name.to_string(),
            concern_level: detector.weight,
        })
    })
}

/// `radius` characters either side of `start..end`, clipped to `text` and trimmed.
fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let begin = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .take(radius)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(start)
    };
    let finish = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[begin..finish].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = "Your subscription will automatically renew. We are not liable for damages. Disputes are resolved by binding arbitration.";

    fn extract(text: &str) -> Vec<ClauseMatch> {
        let lib = PatternLibrary::builtin().unwrap();
        extract_clauses(&lib, text, &ClauseOptions::default())
    }

    #[test]
    fn test_scenario_clauses() {
        let clauses = extract(SCENARIO);
        assert_eq!(clauses.len(), 4);

        let renewal = clauses
            .iter()
            .find(|c| c.detector == "automatic renewal")
            .unwrap();
        assert_eq!(renewal.concern_level, Severity::Medium);
        assert_eq!(renewal.matched, "automatically renew");

        assert!(clauses.iter().any(|c| {
            (c.detector == "liability" || c.detector == "arbitration")
                && c.concern_level == Severity::High
        }));
        let arbitration = clauses.iter().find(|c| c.detector == "arbitration").unwrap();
        assert_eq!(arbitration.matched, "binding arbitration");
    }

    #[test]
    fn test_cap_follows_detector_order() {
        let text = "We use cookies. More cookies here. Cookies everywhere. Even more cookies. \
                    Your plan will automatically renew unless you cancel.";
        let clauses = extract(text);
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[0].detector, "automatic renewal");
        assert_eq!(clauses[1].detector, "tracking");
    }

    #[test]
    fn test_context_window_bounds() {
        let padding = "x".repeat(100);
        let text = format!("{} binding arbitration {}", padding, padding);
        let clauses = extract(&text);
        let clause = &clauses[0];
        assert_eq!(clause.detector, "arbitration");
        // 50 characters either side of the match, no trimming needed mid-padding.
        assert_eq!(clause.clause.chars().count(), 50 + "binding arbitration".len() + 50);
    }

    #[test]
    fn test_short_context_discarded() {
        assert!(extract("loss").is_empty());
        assert_eq!(extract("Any loss is yours alone to bear.").len(), 1);
    }

    #[test]
    fn test_multibyte_text_clips_on_char_boundaries() {
        let text = "Ünsere Bedingungen — “Sie” stimmen der binding arbitration zu, außerdem gilt “Kündigung”.";
        let clauses = extract(text);
        assert!(clauses.iter().any(|c| c.detector == "arbitration"));
    }

    #[test]
    fn test_no_matches() {
        assert!(extract("The weather is pleasant today and the garden is green.").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_high_concern_ignores_cap() {
        let lib = PatternLibrary::builtin().unwrap();
        let options = ClauseOptions::default();
        let text = format!(
            "{}We are not liable for damages of any kind.",
            "Your plan will automatically renew every month. ".repeat(5)
        );

        let clauses = extract_clauses(&lib, &text, &options);
        assert_eq!(clauses.len(), 4);
        assert!(clauses.iter().all(|c| c.concern_level == Severity::Medium));
        assert!(has_high_concern(&lib, &text, &options));
    }

    #[test]
    fn test_high_concern_respects_length_filter() {
        let lib = PatternLibrary::builtin().unwrap();
        let options = ClauseOptions::default();
        assert!(!has_high_concern(&lib, "loss", &options));
        assert!(!has_high_concern(&lib, "Cookies are used for tracking visits.", &options));
        assert!(has_high_concern(&lib, "Any loss is yours alone to bear.", &options));
    }

    #[test]
    fn test_context_window_clips_to_document() {
        assert_eq!(context_window("abc def", 0, 3, 50), "abc def");
        assert_eq!(context_window("abcdefghij", 4, 5, 2), "cdefg");
        assert_eq!(context_window("abcdefghij", 4, 5, 0), "e");
    }
}
