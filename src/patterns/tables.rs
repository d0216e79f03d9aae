//! Static detector and keyword tables.
//!
//! Every heuristic signal lives here as data so it can be audited and tested per
//! detector. Patterns are compiled case-insensitively by [`super::PatternLibrary`].

use crate::models::{Dimension, Severity};

use super::Group;

/// Uncompiled detector record.
pub struct DetectorSpec {
    pub name: &'static str,
    pub group: Group,
    pub pattern: &'static str,
    pub weight: Severity,
}

const fn spec(name: &'static str, group: Group, pattern: &'static str, weight: Severity) -> DetectorSpec {
    DetectorSpec {
        name,
        group,
        pattern,
        weight,
    }
}

use super::Group::*;
use crate::models::Severity::{High, Low, Medium};

/// Table order is significant: clause extraction caps results in this order.
pub const DETECTORS: &[DetectorSpec] = &[
    // Concerning clauses
    spec("automatic renewal", Clause, r"automatic renewal|auto-renewal|automatically renew", Medium),
    spec("non-refundable", Clause, r"non-refundable|no refund|cannot be refunded", High),
    spec("arbitration", Clause, r"arbitration|binding arbitration|waive.*right.*jury", High),
    spec("liability", Clause, r"liable|liability|damages|loss", High),
    spec("third-party sharing", Clause, r"third party|third-party|share.*information", Medium),
    spec("tracking", Clause, r"cookies|tracking|analytics|advertising", Medium),
    spec("cancellation", Clause, r"cancel|cancellation|terminate|termination", Medium),
    spec("intellectual property", Clause, r"intellectual property|copyright|trademark", Medium),
    // Data collected
    spec("email", DataCollected, r"email|e-mail|mail address", Low),
    spec("location", DataCollected, r"location|gps|geographic|geolocation", High),
    spec("contacts", DataCollected, r"contact|address book|phone book", Medium),
    spec("device_info", DataCollected, r"device|hardware|software|operating system|browser", Low),
    spec("usage_data", DataCollected, r"usage|activity|behavior|interaction", Low),
    spec("cookies", DataCollected, r"cookie|tracking|pixel|beacon", Medium),
    spec("personal_info", DataCollected, r"name|age|gender|birthday|personal information", Medium),
    spec("financial", DataCollected, r"payment|credit card|billing|financial", High),
    // Data usage
    spec("advertising", DataUsage, r"advertis|marketing|promotional|ads", High),
    spec("analytics", DataUsage, r"analytic|analysis|tracking|statistics", High),
    spec("personalization", DataUsage, r"personaliz|customiz|tailor|recommend", Medium),
    spec("service_improvement", DataUsage, r"improve|enhance|develop|optimize", Low),
    spec("security", DataUsage, r"security|fraud|protection|safety", Low),
    spec("legal_compliance", DataUsage, r"legal|compliance|law|regulation", Low),
    // Data sharing
    spec("third_parties", DataSharing, r"third.?part|partner|vendor|contractor", High),
    spec("affiliates", DataSharing, r"affiliate|subsidiary|parent company", Medium),
    spec("advertisers", DataSharing, r"advertiser|ad network|marketing", High),
    spec("government", DataSharing, r"government|law enforcement|legal|court", Medium),
    spec("merger_acquisition", DataSharing, r"merger|acquisition|business transfer|sale", Low),
    // User rights
    spec("delete_data", UserRights, r"delete|remove|erasure|right to be forgotten", Low),
    spec("export_data", UserRights, r"export|download|portability|copy", Low),
    spec("opt_out", UserRights, r"opt.?out|unsubscribe|withdraw", Low),
    spec("access_data", UserRights, r"access|view|see.*data", Low),
    spec("correct_data", UserRights, r"correct|update|modify|rectif", Low),
    spec("restrict_processing", UserRights, r"restrict|limit|object.*processing", Low),
    // Liabilities
    spec("not_responsible", Liabilities, r"not responsible|not liable|disclaim", High),
    spec("limitation_damages", Liabilities, r"limit.*damage|limit.*liabilit", High),
    spec("indemnification", Liabilities, r"indemnif|hold harmless", Medium),
    spec("warranty_disclaimer", Liabilities, r"no warrant|disclaim.*warrant|as.?is", High),
    spec("force_majeure", Liabilities, r"force majeure|act of god|beyond.*control", Medium),
    // Automatic renewals
    spec("auto_renewal", AutomaticRenewals, r"auto.?renew|automatic.?renew|automatically renew", High),
    spec("hidden_charges", AutomaticRenewals, r"additional.*fee|extra.*charge|hidden.*cost", High),
    spec("cancellation_deadline", AutomaticRenewals, r"cancel.*before|notice.*period|deadline", Medium),
    spec("renewal_terms", AutomaticRenewals, r"renew.*term|subscription.*period", Medium),
    spec("price_changes", AutomaticRenewals, r"price.*change|rate.*change|fee.*increase", High),
    // Termination
    spec("immediate_termination", Termination, r"immediate.?terminat|without notice", High),
    spec("at_will_termination", Termination, r"at will|any time|sole discretion", High),
    spec("breach_termination", Termination, r"breach|violation|non.?compliance", Medium),
    spec("data_retention", Termination, r"retain.*data|keep.*information", Medium),
    spec("account_suspension", Termination, r"suspend|disable|deactivate", Medium),
];

/// Keyword list and multiplier for one risk dimension.
pub struct DimensionSpec {
    pub dimension: Dimension,
    pub keywords: &'static [&'static str],
    pub weight: u32,
    /// Appended to the recommendations when the dimension scores above 50.
    pub advisory: &'static str,
}

pub const DIMENSIONS: [DimensionSpec; 4] = [
    DimensionSpec {
        dimension: Dimension::Privacy,
        keywords: &["share", "third party", "advertising", "tracking", "cookies"],
        weight: 5,
        advisory: "Review data sharing practices carefully",
    },
    DimensionSpec {
        dimension: Dimension::Financial,
        keywords: &[
            "auto-renew",
            "automatically renew",
            "hidden",
            "fee",
            "penalty",
            "non-refundable",
        ],
        weight: 8,
        advisory: "Check cancellation and refund policies",
    },
    DimensionSpec {
        dimension: Dimension::Control,
        keywords: &["terminate", "suspend", "discretion", "without notice"],
        weight: 7,
        advisory: "Understand termination conditions",
    },
    DimensionSpec {
        dimension: Dimension::Legal,
        keywords: &["arbitration", "not liable", "disclaim", "waive"],
        weight: 10,
        advisory: "Consider legal implications carefully",
    },
];

/// Sentences in a summary containing any of these are promoted to key points.
pub const KEY_POINT_KEYWORDS: &[&str] = &[
    "personal data",
    "privacy",
    "cookies",
    "third party",
    "liability",
    "cancellation",
    "refund",
    "payment",
    "subscription",
    "automatic",
    "intellectual property",
    "user content",
    "termination",
    "dispute",
];

/// Terms used to rank document sentences for the overview.
pub const OVERVIEW_TERMS: &[&str] = &[
    "privacy",
    "data",
    "personal",
    "collect",
    "use",
    "share",
    "rights",
    "terminate",
    "cancel",
    "refund",
    "liability",
    "responsible",
];

/// Topic keyword groups for the normalized topic distribution.
pub const TOPICS: &[(&str, &[&str])] = &[
    (
        "privacy_data",
        &["personal data", "privacy", "information", "data collection", "personal information"],
    ),
    (
        "payments_billing",
        &["payment", "billing", "subscription", "fee", "refund", "price"],
    ),
    (
        "user_obligations",
        &["user", "obligation", "prohibited", "not allowed", "must", "shall"],
    ),
    (
        "company_rights",
        &["right", "reserve", "may", "company", "service provider"],
    ),
    (
        "dispute_resolution",
        &["dispute", "arbitration", "court", "legal", "resolution"],
    ),
    (
        "cookies_tracking",
        &["cookie", "tracking", "analytics", "advertising", "pixel"],
    ),
];

/// Zero-shot labels; the last one is the benign label excluded from the model score.
pub const CLASSIFIER_LABELS: &[&str] = &[
    "privacy risk",
    "data sharing with third parties",
    "automatic renewal",
    "hidden fees",
    "difficult cancellation",
    "arbitration clause",
    "high liability",
    BENIGN_LABEL,
];

pub const BENIGN_LABEL: &str = "low risk / consumer friendly";

/// Languages accepted by `--lang`.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("nl", "Dutch"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("no", "Norwegian"),
    ("fi", "Finnish"),
];
