use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::analysis::categories::{CategoryAnalysis, RefundPolicy};
use crate::models::{ModelRiskAssessment, RiskLevel, Severity, StructuredAnalysis};
use crate::patterns::Group;

const CLAUSE_PREVIEW_CHARS: usize = 80;
/// Visible columns inside the summary box.
const BOX_WIDTH: usize = 48;

/// Render a colored terminal report.
pub fn render(analysis: &StructuredAnalysis, source: &str, verbose: bool, quiet: bool) -> Result<()> {
    let risk = &analysis.risk_profile;
    let summary = &analysis.summary;

    if quiet {
        println!(
            "Risk: {}  Score: {:.1}  Clauses: {}  Words: {}",
            paint_level(risk.risk_level),
            risk.overall_score,
            analysis.important_clauses.len(),
            summary.word_count,
        );
        return Ok(());
    }

    println!("\n {} v{}", "terms-checkr".bold(), env!("CARGO_PKG_VERSION"));
    println!(" Analyzing: {}\n", source);

    // Summary box
    let raised = if risk.escalated { " (raised by clauses)" } else { "" };
    let level_plain = format!("Risk level         : {}{}", risk.risk_level, raised);
    let level_painted = format!("Risk level         : {}{}", paint_level(risk.risk_level), raised);
    let score = format!("Overall score      : {:.1} / 100", risk.overall_score);
    let clauses = format!("Concerning clauses : {}", analysis.important_clauses.len());
    let words = format!(
        "Words / reading    : {} / ~{} min",
        summary.word_count, summary.estimated_reading_time
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!("{}", box_row("SUMMARY", &"SUMMARY".bold().to_string()));
    println!("{}", box_row(&score, &score));
    println!("{}", box_row(&level_plain, &level_painted));
    println!("{}", box_row(&clauses, &clauses));
    println!("{}", box_row(&words, &words));
    if let Some(model) = &analysis.model_risk {
        let (plain, painted) = model_line(model);
        println!("{}", box_row(&plain, &painted));
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if !summary.executive_summary.is_empty() {
        println!(" {}\n", "Executive summary".bold());
        println!(" {}\n", summary.executive_summary);
    }

    render_dimensions(analysis);

    println!(" {}", "Recommendations".bold());
    for rec in &risk.recommendations {
        println!("  {} {}", "→".cyan(), rec);
    }
    println!();

    if !analysis.important_clauses.is_empty() {
        println!(" {} Concerning clauses:\n", "[CLAUSES]".yellow().bold());
        render_clauses(analysis, verbose);
        println!();
    }

    if verbose {
        if !summary.key_points.is_empty() {
            println!(" {}", "Key points".bold());
            for point in &summary.key_points {
                println!("  • {}", point);
            }
            println!();
        }
        println!(" {}\n", "Categories".bold());
        render_categories(&analysis.categories);
        render_facts(&analysis.categories);
        println!();
    }

    if analysis.metadata.fallback_chunks > 0 {
        println!(
            " {} {} of {} chunk summaries used the local fallback",
            "note:".dimmed(),
            analysis.metadata.fallback_chunks,
            analysis.metadata.chunk_count
        );
    }

    Ok(())
}

fn render_dimensions(analysis: &StructuredAnalysis) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dimension").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("").add_attribute(Attribute::Bold),
        ]);

    for (dimension, score) in analysis.risk_profile.scores.iter() {
        table.add_row(vec![
            Cell::new(dimension.to_string()),
            Cell::new(score)
                .fg(score_color(score))
                .set_alignment(CellAlignment::Right),
            Cell::new(bar(score, 20)).fg(score_color(score)),
        ]);
    }

    println!("{}\n", table);
}

fn render_clauses(analysis: &StructuredAnalysis, verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Concern").add_attribute(Attribute::Bold),
            Cell::new("Match").add_attribute(Attribute::Bold),
            Cell::new("Clause").add_attribute(Attribute::Bold),
        ]);

    for clause in &analysis.important_clauses {
        let text = if verbose {
            clause.clause.clone()
        } else {
            preview(&clause.clause, CLAUSE_PREVIEW_CHARS)
        };
        table.add_row(vec![
            Cell::new(&clause.detector),
            Cell::new(clause.concern_level.to_string())
                .fg(severity_color(clause.concern_level))
                .set_alignment(CellAlignment::Center),
            Cell::new(&clause.matched),
            Cell::new(text),
        ]);
    }

    println!("{}", table);
}

fn render_categories(categories: &CategoryAnalysis) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Detector").add_attribute(Attribute::Bold),
            Cell::new("Hits").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
        ]);

    for group in Group::CATEGORIES {
        for finding in categories.findings(group).iter().filter(|f| f.detected) {
            table.add_row(vec![
                Cell::new(group.to_string()),
                Cell::new(&finding.detector),
                Cell::new(finding.frequency).set_alignment(CellAlignment::Right),
                Cell::new(finding.risk_level.to_string()).fg(severity_color(finding.risk_level)),
            ]);
        }
    }

    println!("{}", table);
}

fn render_facts(categories: &CategoryAnalysis) {
    let renewals = &categories.automatic_renewals;
    let refund = match renewals.refund_policy {
        RefundPolicy::NoRefunds => "no refunds",
        RefundPolicy::Conditional => "conditional",
        RefundPolicy::Unspecified => "unspecified",
    };
    let facts = [
        ("Opt-out available", yes_no(categories.data_collected.opt_out_available)),
        ("Consent required", yes_no(categories.data_usage.consent_required)),
        ("Anonymization", yes_no(categories.data_sharing.anonymization)),
        (
            "Response time",
            categories.user_rights.response_time.clone().unwrap_or_else(|| "not stated".into()),
        ),
        (
            "User protection",
            format!("{:?}", categories.liabilities.user_protection).to_lowercase(),
        ),
        (
            "Jurisdiction",
            categories.liabilities.jurisdiction.clone().unwrap_or_else(|| "not stated".into()),
        ),
        (
            "Cancellation difficulty",
            format!("{:?}", renewals.cancellation_difficulty).to_lowercase(),
        ),
        ("Refund policy", refund.to_string()),
        (
            "Notice period",
            categories.termination_clauses.notice_period.clone().unwrap_or_else(|| "not stated".into()),
        ),
        ("Data deletion", yes_no(categories.termination_clauses.data_deletion)),
    ];

    println!();
    for (label, value) in facts {
        println!("  {:<24} {}", format!("{}:", label).dimmed(), value);
    }
}

/// One summary box row. Padding is computed from `plain` so escape codes in
/// `painted` do not shift the right border.
fn box_row(plain: &str, painted: &str) -> String {
    let pad = BOX_WIDTH.saturating_sub(plain.chars().count());
    format!(" │  {}{}  │", painted, " ".repeat(pad))
}

/// Model risk row as (plain, painted) text.
fn model_line(model: &ModelRiskAssessment) -> (String, String) {
    let label = "Model risk         :";
    match model.risk_level {
        RiskLevel::Unknown => (
            format!("{} unavailable", label),
            format!("{} {}", label, "unavailable".dimmed()),
        ),
        level => (
            format!("{} {:.1} ({})", label, model.overall_risk, level),
            format!("{} {:.1} ({})", label, model.overall_risk, paint_level(level)),
        ),
    }
}

fn paint_level(level: RiskLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        RiskLevel::High => text.red().bold(),
        RiskLevel::Medium => text.yellow().bold(),
        RiskLevel::Low => text.blue(),
        RiskLevel::VeryLow => text.green(),
        RiskLevel::Unknown => text.dimmed(),
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Green,
    }
}

fn score_color(score: u32) -> Color {
    match score {
        75.. => Color::Red,
        50..=74 => Color::Yellow,
        25..=49 => Color::Blue,
        _ => Color::Green,
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// Horizontal bar of `width` cells for a 0–100 score.
fn bar(score: u32, width: usize) -> String {
    let filled = (score.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// First `max` characters of `text` with an ellipsis when cut.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_widths() {
        assert_eq!(bar(0, 10), "░".repeat(10));
        assert_eq!(bar(100, 10), "█".repeat(10));
        assert_eq!(bar(50, 10).chars().filter(|c| *c == '█').count(), 5);
        assert_eq!(bar(250, 4), "█".repeat(4));
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("Kündigung jederzeit", 4), "Künd…");
    }

    /// Drop ANSI SGR sequences such as `\x1b[1;31m`.
    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_box_row_ignores_escape_codes() {
        let plain = "Risk level         : HIGH";
        let painted = "Risk level         : \x1b[1;31mHIGH\x1b[0m";

        let row = box_row(plain, painted);
        assert_eq!(strip_ansi(&row), box_row(plain, plain));
        let border = " ┌────────────────────────────────────────────────────┐";
        assert_eq!(strip_ansi(&row).chars().count(), border.chars().count());
        assert!(row.ends_with(" │"));
    }

    #[test]
    fn test_model_line_plain_text() {
        let model = ModelRiskAssessment {
            label_scores: vec![],
            overall_risk: 20.0,
            risk_level: RiskLevel::Low,
            source: crate::models::Provenance::Computed,
            error: None,
        };
        let (plain, painted) = model_line(&model);
        assert_eq!(plain, "Model risk         : 20.0 (LOW)");
        assert_eq!(strip_ansi(&painted), plain);
    }

    #[test]
    fn test_score_color_bands() {
        assert_eq!(score_color(80), Color::Red);
        assert_eq!(score_color(50), Color::Yellow);
        assert_eq!(score_color(30), Color::Blue);
        assert_eq!(score_color(0), Color::Green);
    }
}
