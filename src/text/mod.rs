//! Text primitives the chunker and analyzers build on.
//!
//! - [`sentences`]: sentence splitting collaborators.
//! - [`tokens`]: token counting with a word-ratio fallback.

pub mod sentences;
pub mod tokens;
