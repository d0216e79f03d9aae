use crate::models::{DimensionScores, ModelRiskAssessment, Provenance, RiskLevel, RiskProfile};
use crate::patterns::tables::BENIGN_LABEL;
use crate::patterns::PatternLibrary;

use super::clauses::{has_high_concern, ClauseOptions};
use super::count_occurrences;

/// Placeholder score reported when the classifier is unavailable.
pub const UNKNOWN_SCORE: f64 = 50.0;

const GENERALLY_ACCEPTABLE: &str = "Generally acceptable terms";

/// Score `text` across the four risk dimensions.
///
/// Each dimension is `min(100, occurrences × weight)`. Any high-concern clause in
/// `text` lifts the level to at least MEDIUM without changing the score; the clause
/// cap in `clause_options` plays no part.
pub fn score_risk(library: &PatternLibrary, text: &str, clause_options: &ClauseOptions) -> RiskProfile {
    let lower = text.to_lowercase();
    let mut scores = DimensionScores::default();
    let mut recommendations = Vec::new();

    for spec in library.dimensions() {
        let count: usize = spec
            .keywords
            .iter()
            .map(|kw| count_occurrences(&lower, kw))
            .sum();
        let score = dimension_score(count, spec.weight);
        scores.set(spec.dimension, score);
        if score > 50 {
            recommendations.push(spec.advisory.to_string());
        }
    }

    if recommendations.is_empty() {
        recommendations.push(GENERALLY_ACCEPTABLE.to_string());
    }

    let mean = scores.iter().map(|(_, s)| s as f64).sum::<f64>() / 4.0;
    let banded = level_for_score(mean);
    let risk_level = if banded < RiskLevel::Medium && has_high_concern(library, text, clause_options) {
        RiskLevel::Medium
    } else {
        banded
    };

    RiskProfile {
        scores,
        overall_score: round_to(mean.clamp(0.0, 100.0), 1),
        risk_level,
        risk_color: risk_level.color().to_string(),
        escalated: risk_level != banded,
        recommendations,
        source: Provenance::Computed,
    }
}

fn dimension_score(count: usize, weight: u32) -> u32 {
    let raw = (count as u64).saturating_mul(weight as u64);
    raw.min(100) as u32
}

/// HIGH ≥ 75, MEDIUM ≥ 50, LOW ≥ 25, else VERY LOW.
pub fn level_for_score(score: f64) -> RiskLevel {
    if score >= 75.0 {
        RiskLevel::High
    } else if score >= 50.0 {
        RiskLevel::Medium
    } else if score >= 25.0 {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    }
}

/// Derive the alternate risk score from zero-shot label scores.
///
/// `sum(scores except the benign label) × 12.5`, clamped to 100.
pub fn model_assessment(label_scores: Vec<(String, f64)>) -> ModelRiskAssessment {
    let total: f64 = label_scores
        .iter()
        .filter(|(label, _)| label != BENIGN_LABEL)
        .map(|(_, score)| score)
        .sum();
    let overall_risk = round_to(total * 12.5, 2).min(100.0);

    let risk_level = if overall_risk >= 75.0 {
        RiskLevel::High
    } else if overall_risk >= 40.0 {
        RiskLevel::Medium
    } else if overall_risk >= 15.0 {
        RiskLevel::Low
    } else {
        RiskLevel::VeryLow
    };

    ModelRiskAssessment {
        label_scores,
        overall_risk,
        risk_level,
        source: Provenance::Computed,
        error: None,
    }
}

/// Neutral assessment used when the classifier fails.
pub fn unknown_assessment(error: impl Into<String>) -> ModelRiskAssessment {
    ModelRiskAssessment {
        label_scores: Vec::new(),
        overall_risk: UNKNOWN_SCORE,
        risk_level: RiskLevel::Unknown,
        source: Provenance::Fallback,
        error: Some(error.into()),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
