//! Report renderers for a [`StructuredAnalysis`](crate::models::StructuredAnalysis).
//!
//! - [`terminal`]: colored, tabular output with summary box; respects `--verbose` / `--quiet`.
//! - [`pdf`]: multi-page PDF with a cover, risk dimension bars, and clause and
//!   category tables.

pub mod pdf;
pub mod terminal;
