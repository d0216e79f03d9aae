use std::path::PathBuf;

use clap::Parser;

use crate::models::RiskLevel;

#[derive(Parser, Debug)]
#[command(
    name = "terms-checkr",
    about = "Summarize terms & conditions and flag risky clauses",
    version
)]
pub struct Cli {
    /// Document to analyze; `-` reads stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Use the remote summarizer, risk classifier and translator
    #[arg(long)]
    pub online: bool,

    /// Config file [default: ./.terms-checkr/config.toml, fallback ~/.config/terms-checkr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// PDF output path; use without value to default to terms-report.pdf
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "terms-report.pdf")]
    pub pdf: Option<PathBuf>,

    /// Output language code (translation requires --online)
    #[arg(long, value_name = "CODE", default_value = "en")]
    pub lang: String,

    /// Token budget per chunk, overriding the config file
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<usize>,

    /// Exit with status 1 when the risk level is at or above LEVEL
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailLevel>,

    /// Show category tables, key points and full clause text
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Pdf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailLevel {
    Low,
    Medium,
    High,
}

impl From<FailLevel> for RiskLevel {
    fn from(level: FailLevel) -> Self {
        match level {
            FailLevel::Low => RiskLevel::Low,
            FailLevel::Medium => RiskLevel::Medium,
            FailLevel::High => RiskLevel::High,
        }
    }
}

impl FailLevel {
    /// UNKNOWN never trips the threshold.
    pub fn is_tripped_by(self, level: RiskLevel) -> bool {
        level != RiskLevel::Unknown && level >= RiskLevel::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["terms-checkr"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("-"));
        assert_eq!(cli.lang, "en");
        assert!(cli.pdf.is_none());
        assert!(cli.fail_on.is_none());
    }

    #[test]
    fn test_pdf_default_path() {
        let cli = Cli::try_parse_from(["terms-checkr", "tos.txt", "--pdf"]).unwrap();
        assert_eq!(cli.pdf, Some(PathBuf::from("terms-report.pdf")));
        assert_eq!(cli.input, PathBuf::from("tos.txt"));
    }

    #[test]
    fn test_fail_on_threshold() {
        let cli = Cli::try_parse_from(["terms-checkr", "--fail-on", "medium"]).unwrap();
        let fail_on = cli.fail_on.unwrap();
        assert!(fail_on.is_tripped_by(RiskLevel::High));
        assert!(fail_on.is_tripped_by(RiskLevel::Medium));
        assert!(!fail_on.is_tripped_by(RiskLevel::Low));
        assert!(!fail_on.is_tripped_by(RiskLevel::Unknown));
    }
}
