use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

use crate::models::{CategoryScore, Severity};
use crate::patterns::{FactPatterns, Group, PatternLibrary};

const MAX_EXAMPLES: usize = 3;

/// Frequency and static risk level of one detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub detector: String,
    pub detected: bool,
    pub frequency: usize,
    pub risk_level: Severity,
    /// Distinct matched phrases, first-seen order.
    pub examples: Vec<String>,
}

/// Three-step qualitative rating used by supporting facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rating {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundPolicy {
    NoRefunds,
    Conditional,
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataCollection {
    pub findings: Vec<Finding>,
    pub collection_methods: Vec<String>,
    pub opt_out_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataUsage {
    pub findings: Vec<Finding>,
    pub consent_required: bool,
    pub opt_out_mechanisms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSharing {
    pub findings: Vec<Finding>,
    pub user_control: bool,
    pub anonymization: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRights {
    pub findings: Vec<Finding>,
    pub contact_methods: Vec<String>,
    pub response_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Liabilities {
    pub findings: Vec<Finding>,
    pub user_protection: Rating,
    pub jurisdiction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutomaticRenewals {
    pub findings: Vec<Finding>,
    pub cancellation_difficulty: Rating,
    pub refund_policy: RefundPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Termination {
    pub findings: Vec<Finding>,
    pub notice_period: Option<String>,
    pub data_deletion: bool,
}

/// Per-category breakdown of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnalysis {
    pub data_collected: DataCollection,
    pub data_usage: DataUsage,
    pub data_sharing: DataSharing,
    pub user_rights: UserRights,
    pub liabilities: Liabilities,
    pub automatic_renewals: AutomaticRenewals,
    pub termination_clauses: Termination,
}

impl CategoryAnalysis {
    pub fn findings(&self, group: Group) -> &[Finding] {
        match group {
            Group::DataCollected => &self.data_collected.findings,
            Group::DataUsage => &self.data_usage.findings,
            Group::DataSharing => &self.data_sharing.findings,
            Group::UserRights => &self.user_rights.findings,
            Group::Liabilities => &self.liabilities.findings,
            Group::AutomaticRenewals => &self.automatic_renewals.findings,
            Group::Termination => &self.termination_clauses.findings,
            Group::Clause => &[],
        }
    }

    /// Roll each category up into a [`CategoryScore`], keyed by category name.
    pub fn scores(&self) -> BTreeMap<String, CategoryScore> {
        Group::CATEGORIES
            .iter()
            .map(|group| {
                let findings = self.findings(*group);
                let score = CategoryScore {
                    detected: findings.iter().any(|f| f.detected),
                    frequency: findings.iter().map(|f| f.frequency).sum(),
                    risk_level: findings
                        .iter()
                        .filter(|f| f.detected)
                        .map(|f| f.risk_level)
                        .max()
                        .unwrap_or(Severity::Low),
                };
                (group.key().to_string(), score)
            })
            .collect()
    }
}

/// Run every category group over `text`.
///
/// Detector frequencies are counted over the lower-cased text; the jurisdiction
/// lookup needs the original casing.
pub fn analyze_categories(library: &PatternLibrary, text: &str) -> CategoryAnalysis {
    let facts = library.facts();
    let lower = text.to_lowercase();
    let findings = |group: Group| run_group(library, group, &lower);

    let liability_findings = findings(Group::Liabilities);
    let user_protection = user_protection(&liability_findings);

    CategoryAnalysis {
        data_collected: DataCollection {
            findings: findings(Group::DataCollected),
            collection_methods: present(
                &lower,
                &[
                    ("cookie", "Cookies"),
                    ("form", "Forms"),
                    ("automatic", "Automatic"),
                    ("third party", "Third Parties"),
                ],
            ),
            opt_out_available: lower.contains("opt-out") || lower.contains("opt out"),
        },
        data_usage: DataUsage {
            findings: findings(Group::DataUsage),
            consent_required: lower.contains("consent"),
            opt_out_mechanisms: opt_out_mechanisms(&lower),
        },
        data_sharing: DataSharing {
            findings: findings(Group::DataSharing),
            user_control: lower.contains("control") && lower.contains("sharing"),
            anonymization: lower.contains("anonymous") || lower.contains("anonymize"),
        },
        user_rights: UserRights {
            findings: findings(Group::UserRights),
            contact_methods: contact_methods(facts, &lower),
            response_time: first_quantity(&facts.response_time, &lower),
        },
        liabilities: Liabilities {
            findings: liability_findings,
            user_protection,
            jurisdiction: facts
                .jurisdiction
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
        },
        automatic_renewals: AutomaticRenewals {
            findings: findings(Group::AutomaticRenewals),
            cancellation_difficulty: cancellation_difficulty(&lower),
            refund_policy: refund_policy(&lower),
        },
        termination_clauses: Termination {
            findings: findings(Group::Termination),
            notice_period: first_quantity(&facts.notice_period, &lower),
            data_deletion: lower.contains("delete") && lower.contains("data"),
        },
    }
}

fn run_group(library: &PatternLibrary, group: Group, lower: &str) -> Vec<Finding> {
    library
        .group(group)
        .map(|detector| {
            let mut frequency = 0;
            let mut examples: Vec<String> = Vec::new();
            for m in detector.regex.find_iter(lower) {
                frequency += 1;
                if examples.len() < MAX_EXAMPLES && !examples.iter().any(|e| e == m.as_str()) {
                    examples.push(m.as_str().to_string());
                }
            }
            Finding {
                detector: detector.name.to_string(),
                detected: frequency > 0,
                frequency,
                risk_level: detector.weight,
                examples,
            }
        })
        .collect()
}

fn present(lower: &str, table: &[(&str, &str)]) -> Vec<String> {
    table
        .iter()
        .filter(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| label.to_string())
        .collect()
}

fn opt_out_mechanisms(lower: &str) -> Vec<String> {
    let mut mechanisms = Vec::new();
    if lower.contains("unsubscribe") {
        mechanisms.push("Unsubscribe".to_string());
    }
    if lower.contains("opt-out") || lower.contains("opt out") {
        mechanisms.push("Opt-out".to_string());
    }
    if lower.contains("settings") {
        mechanisms.push("Account Settings".to_string());
    }
    if lower.contains("contact") {
        mechanisms.push("Contact Support".to_string());
    }
    mechanisms
}

fn contact_methods(facts: &FactPatterns, lower: &str) -> Vec<String> {
    let mut methods = Vec::new();
    if facts.email.is_match(lower) {
        methods.push("Email".to_string());
    }
    if lower.contains("phone") {
        methods.push("Phone".to_string());
    }
    if lower.contains("mail") && lower.contains("address") {
        methods.push("Mail".to_string());
    }
    if lower.contains("form") {
        methods.push("Online Form".to_string());
    }
    methods
}

/// First `<number> <unit>` match, pluralized: `"30 days"`.
fn first_quantity(re: &Regex, lower: &str) -> Option<String> {
    let caps = re.captures(lower)?;
    Some(format!("{} {}s", &caps[1], &caps[2]))
}

/// Share of liability detectors that did *not* fire.
fn user_protection(findings: &[Finding]) -> Rating {
    if findings.is_empty() {
        return Rating::High;
    }
    let absent = findings.iter().filter(|f| !f.detected).count();
    let ratio = absent as f64 / findings.len() as f64;
    if ratio >= 0.7 {
        Rating::High
    } else if ratio >= 0.4 {
        Rating::Medium
    } else {
        Rating::Low
    }
}

fn cancellation_difficulty(lower: &str) -> Rating {
    const INDICATORS: [&str; 5] = ["difficult", "complex", "notice period", "penalty", "fee"];
    match INDICATORS.iter().filter(|i| lower.contains(*i)).count() {
        0 => Rating::Low,
        1 | 2 => Rating::Medium,
        _ => Rating::High,
    }
}

fn refund_policy(lower: &str) -> RefundPolicy {
    if lower.contains("no refund") || lower.contains("non-refundable") {
        RefundPolicy::NoRefunds
    } else if lower.contains("refund") {
        RefundPolicy::Conditional
    } else {
        RefundPolicy::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> CategoryAnalysis {
        let lib = PatternLibrary::builtin().unwrap();
        analyze_categories(&lib, text)
    }

    fn finding<'a>(findings: &'a [Finding], name: &str) -> &'a Finding {
        findings.iter().find(|f| f.detector == name).unwrap()
    }

    #[test]
    fn test_data_collection_frequencies() {
        let analysis = analyze(
            "We collect your Email address and e-mail preferences. We use GPS location data and cookies.",
        );
        let email = finding(&analysis.data_collected.findings, "email");
        assert!(email.detected);
        assert_eq!(email.frequency, 2);
        assert_eq!(email.examples, vec!["email", "e-mail"]);

        let location = finding(&analysis.data_collected.findings, "location");
        assert_eq!(location.frequency, 2);
        assert_eq!(location.risk_level, Severity::High);

        assert_eq!(analysis.data_collected.collection_methods, vec!["Cookies"]);
        assert!(!analysis.data_collected.opt_out_available);
    }

    #[test]
    fn test_usage_and_sharing_facts() {
        let analysis = analyze(
            "With your consent we use data for advertising. You may opt out in Settings. \
             Anonymous statistics may be shared with partners.",
        );
        assert!(analysis.data_usage.consent_required);
        assert_eq!(
            analysis.data_usage.opt_out_mechanisms,
            vec!["Opt-out", "Account Settings"]
        );
        assert!(analysis.data_sharing.anonymization);
        assert!(!analysis.data_sharing.user_control);
        assert!(finding(&analysis.data_sharing.findings, "third_parties").detected);
    }

    #[test]
    fn test_user_rights_facts() {
        let analysis = analyze(
            "Contact us by email or phone. We respond within 30 business days to deletion requests.",
        );
        assert_eq!(analysis.user_rights.contact_methods, vec!["Email", "Phone"]);
        assert_eq!(analysis.user_rights.response_time.as_deref(), Some("30 business days"));
        // "deletion" is not "delete"
        assert!(!finding(&analysis.user_rights.findings, "delete_data").detected);
    }

    #[test]
    fn test_liability_facts() {
        let analysis = analyze(
            "We are not liable for anything. The service is provided as-is. \
             These terms are governed by the laws of the State of California.",
        );
        let liabilities = &analysis.liabilities;
        assert!(finding(&liabilities.findings, "not_responsible").detected);
        assert!(finding(&liabilities.findings, "warranty_disclaimer").detected);
        // 3 of 5 detectors absent -> 0.6
        assert_eq!(liabilities.user_protection, Rating::Medium);
        assert_eq!(liabilities.jurisdiction.as_deref(), Some("California"));
    }

    #[test]
    fn test_renewal_facts() {
        let no_refund = analyze("Fees are non-refundable. A penalty applies. Cancellation is complex.");
        assert_eq!(no_refund.automatic_renewals.refund_policy, RefundPolicy::NoRefunds);
        assert_eq!(no_refund.automatic_renewals.cancellation_difficulty, Rating::High);

        let conditional = analyze("Refunds are available within the trial.");
        assert_eq!(conditional.automatic_renewals.refund_policy, RefundPolicy::Conditional);
        assert_eq!(conditional.automatic_renewals.cancellation_difficulty, Rating::Low);

        let silent = analyze("Nothing about money here.");
        assert_eq!(silent.automatic_renewals.refund_policy, RefundPolicy::Unspecified);
    }

    #[test]
    fn test_termination_facts() {
        let analysis = analyze(
            "We may suspend your account. We give 30 days written notice before closure. We delete your data.",
        );
        let termination = &analysis.termination_clauses;
        assert_eq!(termination.notice_period.as_deref(), Some("30 days"));
        assert!(termination.data_deletion);
        assert!(finding(&termination.findings, "account_suspension").detected);
    }

    #[test]
    fn test_scores_roll_up() {
        let analysis = analyze("We may terminate without notice at our sole discretion.");
        let scores = analysis.scores();
        assert_eq!(scores.len(), 7);

        let termination = &scores["termination_clauses"];
        assert!(termination.detected);
        assert_eq!(termination.frequency, 2);
        assert_eq!(termination.risk_level, Severity::High);

        let renewals = &scores["automatic_renewals"];
        assert!(!renewals.detected);
        assert_eq!(renewals.frequency, 0);
        assert_eq!(renewals.risk_level, Severity::Low);
    }

    #[test]
    fn test_idempotent() {
        let text = "We share data with third parties and advertisers. Auto-renewal applies.";
        assert_eq!(analyze(text), analyze(text));
    }

    #[test]
    fn test_empty_text() {
        let analysis = analyze("");
        assert!(analysis.scores().values().all(|s| !s.detected && s.frequency == 0));
        assert_eq!(analysis.liabilities.user_protection, Rating::High);
        assert_eq!(analysis.user_rights.response_time, None);
        assert_eq!(analysis.liabilities.jurisdiction, None);
    }
}
