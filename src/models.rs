use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::categories::CategoryAnalysis;
use crate::analysis::summary::Summary;

/// Raw document text plus its derived word count.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    word_count: usize,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self { text, word_count }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }
}

/// A token-budget-bounded segment of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub tokens: usize,
    /// Set when the chunk is a single word that alone exceeds the budget.
    pub oversized: bool,
    /// Fallback when `tokens` is the word-ratio estimate.
    pub token_source: Provenance,
}

/// Whether a value came from the primary computation or a local fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Computed,
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Computed => write!(f, "computed"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

/// Qualitative weight of a detector; doubles as the concern level of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A located detector match with its surrounding context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseMatch {
    pub matched: String,
    pub clause: String,
    #[serde(rename = "type")]
    pub detector: String,
    pub concern_level: Severity,
}

/// Roll-up of one analysis category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub detected: bool,
    pub frequency: usize,
    pub risk_level: Severity,
}

/// Discrete overall risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "VERY LOW")]
    VeryLow,
    #[serde(rename = "LOW")]
    Low,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl RiskLevel {
    /// Display color used by the report renderers.
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::High => "#ef4444",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::Low => "#3b82f6",
            RiskLevel::VeryLow => "#22c55e",
            RiskLevel::Unknown => "#6b7280",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::VeryLow => write!(f, "VERY LOW"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// The four independently scored risk dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Privacy,
    Financial,
    Control,
    Legal,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Privacy => write!(f, "Privacy"),
            Dimension::Financial => write!(f, "Financial"),
            Dimension::Control => write!(f, "Control"),
            Dimension::Legal => write!(f, "Legal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DimensionScores {
    pub privacy_risk: u32,
    pub financial_risk: u32,
    pub control_risk: u32,
    pub legal_risk: u32,
}

impl DimensionScores {
    pub fn get(&self, dimension: Dimension) -> u32 {
        match dimension {
            Dimension::Privacy => self.privacy_risk,
            Dimension::Financial => self.financial_risk,
            Dimension::Control => self.control_risk,
            Dimension::Legal => self.legal_risk,
        }
    }

    pub fn set(&mut self, dimension: Dimension, score: u32) {
        match dimension {
            Dimension::Privacy => self.privacy_risk = score,
            Dimension::Financial => self.financial_risk = score,
            Dimension::Control => self.control_risk = score,
            Dimension::Legal => self.legal_risk = score,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dimension, u32)> + '_ {
        [
            Dimension::Privacy,
            Dimension::Financial,
            Dimension::Control,
            Dimension::Legal,
        ]
        .into_iter()
        .map(|d| (d, self.get(d)))
    }
}

/// Heuristic risk profile derived from keyword signals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    #[serde(flatten)]
    pub scores: DimensionScores,
    pub overall_score: f64,
    pub risk_level: RiskLevel,
    pub risk_color: String,
    /// True when a high-concern clause lifted the level above its score band.
    pub escalated: bool,
    pub recommendations: Vec<String>,
    pub source: Provenance,
}

/// Alternate risk estimate from a zero-shot classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRiskAssessment {
    pub label_scores: Vec<(String, f64)>,
    pub overall_risk: f64,
    pub risk_level: RiskLevel,
    pub source: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisMetadata {
    /// Characters in the input document.
    pub original_length: usize,
    /// Executive summary length over document length.
    pub summary_compression: f64,
    pub chunk_count: usize,
    /// Fallback when any chunk was measured by the word-ratio estimate.
    pub token_count_source: Provenance,
    pub fallback_chunks: usize,
    /// Sentences left untranslated after a translator failure.
    pub translation_fallbacks: usize,
}

/// The final artifact returned for one analyzed document.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredAnalysis {
    pub summary: Summary,
    pub important_clauses: Vec<ClauseMatch>,
    pub categories: CategoryAnalysis,
    pub category_scores: BTreeMap<String, CategoryScore>,
    pub risk_profile: RiskProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_risk: Option<ModelRiskAssessment>,
    pub language: String,
    pub metadata: AnalysisMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_word_count() {
        let doc = Document::new("  We may   share your data.\nSee below. ");
        assert_eq!(doc.word_count(), 7);
        assert!(!doc.is_empty());
        assert!(Document::new(" \n\t").is_empty());
    }

    #[test]
    fn test_risk_level_ordering_and_display() {
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Low > RiskLevel::VeryLow);
        assert_eq!(RiskLevel::VeryLow.to_string(), "VERY LOW");
        assert_eq!(
            serde_json::to_string(&RiskLevel::VeryLow).unwrap(),
            "\"VERY LOW\""
        );
    }

    #[test]
    fn test_risk_profile_serializes_flat() {
        let profile = RiskProfile {
            scores: DimensionScores {
                privacy_risk: 10,
                ..Default::default()
            },
            overall_score: 2.5,
            risk_level: RiskLevel::VeryLow,
            risk_color: RiskLevel::VeryLow.color().to_string(),
            escalated: false,
            recommendations: vec![],
            source: Provenance::Computed,
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["privacy_risk"], 10);
        assert_eq!(value["risk_level"], "VERY LOW");
        assert_eq!(value["source"], "computed");
    }
}
