//! Deterministic analysis of a [`Document`](crate::models::Document).
//!
//! - [`clauses`]: concerning-clause extraction with bounded context.
//! - [`categories`]: per-category detector frequencies and supporting facts.
//! - [`risk`]: the four-dimension risk profile and the model-based alternate.
//! - [`summary`]: assembly of chunk summaries into the structured summary.

pub mod categories;
pub mod clauses;
pub mod risk;
pub mod summary;

/// Non-overlapping occurrences of `needle` in `haystack`.
pub(crate) fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_occurrences_non_overlapping() {
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
        assert_eq!(count_occurrences("fee fees feedback", "fee"), 3);
        assert_eq!(count_occurrences("", "fee"), 0);
        assert_eq!(count_occurrences("fee", ""), 0);
    }
}
