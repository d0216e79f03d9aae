//! The detector library shared by every analysis.
//!
//! - [`tables`]: the static detector and keyword tables.
//!
//! [`PatternLibrary`] compiles the tables once at startup and is read-only afterwards;
//! callers share it through an `Arc`.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::models::Severity;

pub mod tables;

use tables::{DimensionSpec, DETECTORS, DIMENSIONS};

/// Which analysis a detector feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Clause,
    DataCollected,
    DataUsage,
    DataSharing,
    UserRights,
    Liabilities,
    AutomaticRenewals,
    Termination,
}

impl Group {
    /// The seven category groups, in report order.
    pub const CATEGORIES: [Group; 7] = [
        Group::DataCollected,
        Group::DataUsage,
        Group::DataSharing,
        Group::UserRights,
        Group::Liabilities,
        Group::AutomaticRenewals,
        Group::Termination,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Group::Clause => "clauses",
            Group::DataCollected => "data_collected",
            Group::DataUsage => "data_usage",
            Group::DataSharing => "data_sharing",
            Group::UserRights => "user_rights",
            Group::Liabilities => "liabilities",
            Group::AutomaticRenewals => "automatic_renewals",
            Group::Termination => "termination_clauses",
        }
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Clause => write!(f, "Concerning Clauses"),
            Group::DataCollected => write!(f, "Data Collected"),
            Group::DataUsage => write!(f, "Data Usage"),
            Group::DataSharing => write!(f, "Data Sharing"),
            Group::UserRights => write!(f, "User Rights"),
            Group::Liabilities => write!(f, "Liabilities"),
            Group::AutomaticRenewals => write!(f, "Automatic Renewals"),
            Group::Termination => write!(f, "Termination"),
        }
    }
}

/// A compiled, immutable detector.
#[derive(Debug)]
pub struct Detector {
    pub name: &'static str,
    pub group: Group,
    pub weight: Severity,
    pub regex: Regex,
}

/// Regexes behind the supporting facts of the category analysis.
#[derive(Debug)]
pub struct FactPatterns {
    pub response_time: Regex,
    pub notice_period: Regex,
    pub jurisdiction: Regex,
    pub email: Regex,
}

impl FactPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            response_time: Regex::new(r"(\d+)\s*(day|week|month|business day)")?,
            notice_period: Regex::new(r"(\d+)\s*(day|week|month).*notice")?,
            jurisdiction: Regex::new(
                r"(?i:governed\s+by|laws?\s+of|jurisdiction\s+of)(?:\s+the)?(?:\s+(?i:state|commonwealth|province)\s+of)?\s+([A-Z][a-zA-Z]+)",
            )?,
            email: Regex::new(r"email|e-mail")?,
        })
    }
}

#[derive(Debug)]
pub struct PatternLibrary {
    detectors: Vec<Detector>,
    facts: FactPatterns,
}

impl PatternLibrary {
    /// Compile the built-in detector table.
    pub fn builtin() -> Result<Self> {
        let detectors = DETECTORS
            .iter()
            .map(|spec| {
                let regex = RegexBuilder::new(spec.pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("invalid pattern for detector '{}'", spec.name))?;
                Ok(Detector {
                    name: spec.name,
                    group: spec.group,
                    weight: spec.weight,
                    regex,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            detectors,
            facts: FactPatterns::new()?,
        })
    }

    /// Detectors of one group, in table order.
    pub fn group(&self, group: Group) -> impl Iterator<Item = &Detector> + '_ {
        self.detectors.iter().filter(move |d| d.group == group)
    }

    #[cfg(test)]
    pub fn detector(&self, name: &str) -> Option<&Detector> {
        self.detectors.iter().find(|d| d.name == name)
    }

    pub fn facts(&self) -> &FactPatterns {
        &self.facts
    }

    pub fn dimensions(&self) -> &'static [DimensionSpec] {
        &DIMENSIONS
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }
}
