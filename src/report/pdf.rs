use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};

use crate::models::{Dimension, RiskLevel, Severity, StructuredAnalysis};
use crate::patterns::Group;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const COVER_HDR_H: f32 = 72.0; // gradient header height on cover page

// ── Colour palette ────────────────────────────────────────────────────────────
const BG:           (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL:        (f32, f32, f32) = (1.00, 1.00, 1.00);
const PANEL_ALT:    (f32, f32, f32) = (0.95, 0.96, 0.99);
const PANEL_BORDER: (f32, f32, f32) = (0.85, 0.87, 0.92);
const ACCENT_BLU:   (f32, f32, f32) = (0.20, 0.46, 0.95);
const ACCENT_PUR:   (f32, f32, f32) = (0.52, 0.30, 0.95);
const TEXT_PRI:     (f32, f32, f32) = (0.07, 0.08, 0.14);
const TEXT_SEC:     (f32, f32, f32) = (0.36, 0.40, 0.52);
const TEXT_MUT:     (f32, f32, f32) = (0.58, 0.63, 0.72);
const WHITE:        (f32, f32, f32) = (1.00, 1.00, 1.00);
const WHITE_DIM:    (f32, f32, f32) = (0.82, 0.89, 1.00);

const LOW_BG:  (f32, f32, f32) = (0.90, 0.98, 0.92);
const LOW_FG:  (f32, f32, f32) = (0.07, 0.52, 0.22);
const MED_BG:  (f32, f32, f32) = (1.00, 0.95, 0.87);
const MED_FG:  (f32, f32, f32) = (0.70, 0.40, 0.02);
const HIGH_BG: (f32, f32, f32) = (1.00, 0.91, 0.91);
const HIGH_FG: (f32, f32, f32) = (0.76, 0.09, 0.13);

const R_PANEL: f32 = 2.5;
const R_BADGE: f32 = 1.5;

// ── Dimensions page layout ────────────────────────────────────────────────────
const C1_X: f32 = MARGIN;
const C2_X: f32 = MARGIN + 44.0;
const C3_X: f32 = MARGIN + 118.0;
const T_END: f32 = PAGE_W - MARGIN;

const HDR_H: f32 = 9.0;
const LINE_H: f32 = 4.8;
const ROW_PAD: f32 = 4.5;

const BADGE_W: f32 = 37.0;
const BADGE_H: f32 = 6.5;
const DOT_SIZE: f32 = 2.5;
const DESC_WRAP: usize = 40;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render a PDF report: cover → risk dimensions → clause table → category findings.
pub fn render(analysis: &StructuredAnalysis, source: &str, output_path: &Path) -> Result<()> {
    let doc = PdfDocument::empty("Terms & Conditions Report");

    add_cover_page(&doc, analysis, source)?;
    add_dimensions_page(&doc, analysis)?;
    add_table_pages(
        &doc,
        "Concerning Clauses",
        "No concerning clauses were found.",
        &CLAUSE_COLUMNS,
        &clause_rows(analysis),
    )?;
    add_table_pages(
        &doc,
        "Category Findings",
        "No category detectors matched.",
        &CATEGORY_COLUMNS,
        &category_rows(analysis),
    )?;

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

// ── Cover page ────────────────────────────────────────────────────────────────

fn add_cover_page(doc: &PdfDocumentReference, analysis: &StructuredAnalysis, source: &str) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Cover");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let risk = &analysis.risk_profile;

    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);

    let hdr_bot = PAGE_H - COVER_HDR_H;
    fill_gradient_h(&layer, 0.0, hdr_bot, PAGE_W, COVER_HDR_H, ACCENT_BLU, ACCENT_PUR, 28);

    set_color(&layer, WHITE_DIM);
    layer.use_text(
        format!("terms-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(PAGE_W - MARGIN - 40.0), Mm(PAGE_H - 10.5), &font_r,
    );

    set_color(&layer, WHITE);
    layer.use_text("Terms & Conditions", 28.0, Mm(MARGIN), Mm(PAGE_H - 26.0), &font_b);
    set_color(&layer, WHITE_DIM);
    layer.use_text("Risk Report", 28.0, Mm(MARGIN), Mm(PAGE_H - 41.0), &font_b);

    // ── Document chip ─────────────────────────────────────────────────────────
    let chip_y = hdr_bot - 18.0;
    let chip_h = 12.0f32;
    let chip_w = 106.0f32;
    fill_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL);
    stroke_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL_BORDER);
    fill_rect(&layer, MARGIN, chip_y, 2.5, chip_h, ACCENT_BLU);

    set_color(&layer, TEXT_MUT);
    layer.use_text("DOCUMENT", 6.0, Mm(MARGIN + 5.0), Mm(chip_y + chip_h - 3.8), &font_b);
    set_color(&layer, TEXT_PRI);
    layer.use_text(truncate(source, 34), 9.5, Mm(MARGIN + 5.0), Mm(chip_y + 2.8), &font_b);

    // ── Overall level badge, right of the chip ────────────────────────────────
    let level_fg = hex_rgb(risk.risk_level.color()).unwrap_or(TEXT_SEC);
    let level_x = MARGIN + chip_w + 6.0;
    let level_w = T_END - level_x;
    fill_rounded_rect(&layer, level_x, chip_y, level_w, chip_h, R_BADGE, tint(level_fg, 0.14));
    set_color(&layer, level_fg);
    layer.use_text("RISK LEVEL", 6.0, Mm(level_x + 4.0), Mm(chip_y + chip_h - 3.8), &font_b);
    layer.use_text(
        format!("{}  {:.1}", risk.risk_level, risk.overall_score),
        10.5, Mm(level_x + 4.0), Mm(chip_y + 2.6), &font_b,
    );

    set_color(&layer, TEXT_SEC);
    layer.use_text(
        format!(
            "Analyzed  {}    {} words, ~{} min read",
            report_date(),
            analysis.summary.word_count,
            analysis.summary.estimated_reading_time
        ),
        9.0, Mm(MARGIN), Mm(chip_y - 8.0), &font_r,
    );

    // ── Divider + dimension cards ─────────────────────────────────────────────
    let rule_y = chip_y - 16.5;
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, rule_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("RISK DIMENSIONS", 6.5, Mm(MARGIN), Mm(rule_y - 7.0), &font_b);

    let card_y  = rule_y - 42.0;
    let card_h  = 26.0f32;
    let gap     = 4.0f32;
    let total_w = T_END - MARGIN;
    let card_w  = (total_w - gap * 3.0) / 4.0;

    for (i, (dimension, score)) in risk.scores.iter().enumerate() {
        let cx = MARGIN + (card_w + gap) * i as f32;
        let label = dimension.to_string().to_uppercase();
        draw_stat_card(&layer, cx, card_y, card_w, card_h, &label, &score.to_string(),
                       score_palette(score).1, &font_r, &font_b);
    }

    // ── Executive summary ─────────────────────────────────────────────────────
    let section_y = card_y - 13.0;
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, section_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("EXECUTIVE SUMMARY", 6.5, Mm(MARGIN), Mm(section_y - 7.5), &font_b);

    let mut y = section_y - 14.0;
    set_color(&layer, TEXT_PRI);
    let summary_text = if analysis.summary.executive_summary.is_empty() {
        analysis.summary.overview.main_purpose.as_str()
    } else {
        analysis.summary.executive_summary.as_str()
    };
    for line in wrap_text(summary_text, 92).iter().take(6) {
        layer.use_text(line.as_str(), 9.0, Mm(MARGIN), Mm(y), &font_r);
        y -= LINE_H;
    }

    // ── What's in this report ─────────────────────────────────────────────────
    let items_y = y - 8.0;
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, items_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("WHAT'S IN THIS REPORT", 6.5, Mm(MARGIN), Mm(items_y - 7.5), &font_b);

    let items = [
        ("Risk Dimensions",    "Privacy, financial, control and legal scores with recommendations"),
        ("Concerning Clauses", "Flagged clauses with surrounding context and concern level"),
        ("Category Findings",  "Detector hits per category of the terms"),
    ];
    for (j, (title, desc)) in items.iter().enumerate() {
        let iy = items_y - 15.0 - j as f32 * 10.0;
        fill_rounded_rect(&layer, MARGIN, iy + 2.0, 2.0, 2.0, 1.0, ACCENT_BLU);
        set_color(&layer, TEXT_PRI);
        layer.use_text(*title, 8.5, Mm(MARGIN + 5.0), Mm(iy + 2.0), &font_b);
        set_color(&layer, TEXT_SEC);
        layer.use_text(*desc, 8.0, Mm(MARGIN + 5.0), Mm(iy - 3.5), &font_r);
    }

    draw_footer(&layer, &font_r);
    layer.use_text(report_date(), 7.5, Mm(PAGE_W - MARGIN - 22.0), Mm(15.0), &font_r);

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_stat_card(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    label: &str,
    value: &str,
    accent: (f32, f32, f32),
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) {
    fill_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL);
    stroke_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL_BORDER);

    fill_rect(layer, x, y + h - 2.0, w, 2.0, accent);

    set_color(layer, accent);
    layer.use_text(value, 20.0, Mm(x + 5.0), Mm(y + h * 0.38), font_b);

    set_color(layer, TEXT_MUT);
    layer.use_text(label, 6.5, Mm(x + 5.0), Mm(y + 3.5), font_r);
}

// ── Risk dimensions page ──────────────────────────────────────────────────────

fn dimension_description(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Privacy => "Data sharing, third parties, advertising, tracking and cookies.",
        Dimension::Financial => "Automatic renewal, hidden charges, fees, penalties and refunds.",
        Dimension::Control => "Termination or suspension at the provider's discretion.",
        Dimension::Legal => "Arbitration, liability disclaimers and waived rights.",
    }
}

fn add_dimensions_page(doc: &PdfDocumentReference, analysis: &StructuredAnalysis) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Risk Dimensions");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let risk = &analysis.risk_profile;

    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    fill_gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_BLU, ACCENT_PUR, 21);

    set_color(&layer, TEXT_PRI);
    layer.use_text("Risk Dimensions", 20.0, Mm(MARGIN), Mm(278.5), &font_b);
    set_color(&layer, TEXT_SEC);
    let subtitle = if risk.escalated {
        format!("Overall {:.1} / 100, level {} (raised by high-concern clauses)", risk.overall_score, risk.risk_level)
    } else {
        format!("Overall {:.1} / 100, level {}", risk.overall_score, risk.risk_level)
    };
    layer.use_text(subtitle, 9.0, Mm(MARGIN), Mm(271.5), &font_r);
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, 267.5, PANEL_BORDER);

    let rows: Vec<(Dimension, u32, Vec<String>, f32)> = risk
        .scores
        .iter()
        .map(|(dimension, score)| {
            let lines = wrap_text(dimension_description(dimension), DESC_WRAP);
            let height = lines.len().max(2) as f32 * LINE_H + ROW_PAD * 2.0;
            (dimension, score, lines, height)
        })
        .collect();

    const TABLE_TOP: f32 = 258.0;
    let total_h = HDR_H + rows.iter().map(|r| r.3).sum::<f32>();
    let table_bot = TABLE_TOP - total_h;
    let table_w = T_END - C1_X;

    fill_rounded_rect(&layer, C1_X, table_bot, table_w, total_h, R_PANEL, PANEL);
    stroke_rounded_rect(&layer, C1_X, table_bot, table_w, total_h, R_PANEL, PANEL_BORDER);

    set_color(&layer, TEXT_SEC);
    layer.use_text("DIMENSION",        7.0, Mm(C1_X + 4.0), Mm(TABLE_TOP - 6.2), &font_b);
    layer.use_text("WHAT IT MEASURES", 7.0, Mm(C2_X + 2.0), Mm(TABLE_TOP - 6.2), &font_b);
    layer.use_text("SCORE",            7.0, Mm(C3_X + 2.0), Mm(TABLE_TOP - 6.2), &font_b);
    draw_hline(&layer, C1_X + R_PANEL, T_END - R_PANEL, TABLE_TOP - HDR_H, PANEL_BORDER);

    let mut y_top = TABLE_TOP - HDR_H;
    for (i, (dimension, score, lines, height)) in rows.iter().enumerate() {
        let y_bot = y_top - height;
        let (bg, fg) = score_palette(*score);

        if i % 2 == 1 {
            fill_rect(&layer, C1_X, y_bot, table_w, *height, PANEL_ALT);
        }

        let badge_x = C1_X + 3.0;
        let badge_y = y_top - ROW_PAD - BADGE_H;
        fill_rounded_rect(&layer, badge_x, badge_y, BADGE_W, BADGE_H, R_BADGE, bg);
        fill_rounded_rect(&layer,
            badge_x + 2.5, badge_y + (BADGE_H - DOT_SIZE) / 2.0,
            DOT_SIZE, DOT_SIZE, DOT_SIZE / 2.0, fg);
        set_color(&layer, fg);
        layer.use_text(dimension.to_string(), 8.0, Mm(badge_x + 7.5), Mm(badge_y + 1.5), &font_b);

        set_color(&layer, TEXT_SEC);
        for (j, line) in lines.iter().enumerate() {
            let ly = y_top - ROW_PAD - (j as f32 + 0.9) * LINE_H;
            layer.use_text(line.as_str(), 8.0, Mm(C2_X + 2.0), Mm(ly), &font_r);
        }

        // Score value + horizontal bar
        let bar_x = C3_X + 18.0;
        let bar_w = T_END - bar_x - 4.0;
        let bar_y = y_top - ROW_PAD - 4.2;
        set_color(&layer, fg);
        layer.use_text(score.to_string(), 11.0, Mm(C3_X + 2.0), Mm(bar_y), &font_b);
        fill_rounded_rect(&layer, bar_x, bar_y, bar_w, 3.2, 1.2, PANEL_ALT);
        if *score > 0 {
            let filled = bar_w * (*score).min(100) as f32 / 100.0;
            fill_rounded_rect(&layer, bar_x, bar_y, filled.max(2.4), 3.2, 1.2, fg);
        }

        if i < rows.len() - 1 {
            draw_hline(&layer, C1_X + R_PANEL, T_END - R_PANEL, y_bot, PANEL_BORDER);
        }
        y_top = y_bot;
    }

    // ── Recommendations and key points below the table ────────────────────────
    let mut y = table_bot - 12.0;
    y = draw_bullets(&layer, "RECOMMENDATIONS", &risk.recommendations, y, &font_r, &font_b);
    if !analysis.summary.key_points.is_empty() {
        y = draw_bullets(&layer, "KEY POINTS", &analysis.summary.key_points, y - 6.0, &font_r, &font_b);
    }
    if let Some(model) = &analysis.model_risk {
        let text = match model.risk_level {
            RiskLevel::Unknown => "Model-based assessment unavailable.".to_string(),
            level => format!("Model-based assessment: {:.1} / 100 ({})", model.overall_risk, level),
        };
        if y > 32.0 {
            set_color(&layer, TEXT_SEC);
            layer.use_text(text, 8.5, Mm(MARGIN), Mm(y - 6.0), &font_r);
        }
    }

    draw_footer(&layer, &font_r);
    Ok(())
}

/// Titled bullet list; returns the y below the last line drawn.
fn draw_bullets(
    layer: &PdfLayerReference,
    title: &str,
    items: &[String],
    top: f32,
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) -> f32 {
    const FLOOR: f32 = 30.0;

    draw_hline(layer, MARGIN, PAGE_W - MARGIN, top, PANEL_BORDER);
    set_color(layer, TEXT_MUT);
    layer.use_text(title, 6.5, Mm(MARGIN), Mm(top - 7.0), font_b);

    let mut y = top - 13.0;
    for item in items {
        if y < FLOOR {
            break;
        }
        fill_rounded_rect(layer, MARGIN, y + 0.8, 1.8, 1.8, 0.9, ACCENT_BLU);
        set_color(layer, TEXT_PRI);
        for line in wrap_text(item, 90) {
            if y < FLOOR {
                break;
            }
            layer.use_text(line, 8.5, Mm(MARGIN + 5.0), Mm(y), font_r);
            y -= 4.4;
        }
        y -= 1.6;
    }
    y
}

// ── Paged tables ──────────────────────────────────────────────────────────────

struct Column {
    header: &'static str,
    x: f32,
    wrap: usize,
}

const BADGE_COL_X: f32 = MARGIN + 152.0;

const CLAUSE_COLUMNS: [Column; 3] = [
    Column { header: "TYPE",   x: MARGIN,         wrap: 22 },
    Column { header: "MATCH",  x: MARGIN + 38.0,  wrap: 22 },
    Column { header: "CLAUSE", x: MARGIN + 76.0,  wrap: 44 },
];

const CATEGORY_COLUMNS: [Column; 4] = [
    Column { header: "CATEGORY", x: MARGIN,         wrap: 24 },
    Column { header: "DETECTOR", x: MARGIN + 44.0,  wrap: 24 },
    Column { header: "HITS",     x: MARGIN + 88.0,  wrap: 6 },
    Column { header: "EXAMPLES", x: MARGIN + 104.0, wrap: 26 },
];

struct Badge {
    label: String,
    bg: (f32, f32, f32),
    fg: (f32, f32, f32),
}

struct TableRow {
    cells: Vec<String>,
    badge: Badge,
}

fn severity_badge(severity: Severity) -> Badge {
    let (bg, fg) = match severity {
        Severity::High => (HIGH_BG, HIGH_FG),
        Severity::Medium => (MED_BG, MED_FG),
        Severity::Low => (LOW_BG, LOW_FG),
    };
    Badge {
        label: severity.to_string().to_uppercase(),
        bg,
        fg,
    }
}

fn clause_rows(analysis: &StructuredAnalysis) -> Vec<TableRow> {
    analysis
        .important_clauses
        .iter()
        .map(|c| TableRow {
            cells: vec![c.detector.clone(), c.matched.clone(), c.clause.clone()],
            badge: severity_badge(c.concern_level),
        })
        .collect()
}

fn category_rows(analysis: &StructuredAnalysis) -> Vec<TableRow> {
    Group::CATEGORIES
        .iter()
        .flat_map(move |group| {
            analysis
                .categories
                .findings(*group)
                .iter()
                .filter(|f| f.detected)
                .map(move |f| TableRow {
                    cells: vec![
                        group.to_string(),
                        f.detector.replace('_', " "),
                        f.frequency.to_string(),
                        f.examples.join(", "),
                    ],
                    badge: severity_badge(f.risk_level),
                })
        })
        .collect()
}

fn add_table_pages(
    doc: &PdfDocumentReference,
    title: &str,
    empty_message: &str,
    columns: &[Column],
    rows: &[TableRow],
) -> Result<()> {
    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    const BASE_ROW_H: f32 = 7.0;
    const EXTRA_LINE_H: f32 = 3.5;
    const FIRST_Y: f32 = 259.5;
    const BOT_MARGIN: f32 = 25.0;

    let wrapped: Vec<(Vec<Vec<String>>, f32)> = rows
        .iter()
        .map(|row| {
            let cells: Vec<Vec<String>> = row
                .cells
                .iter()
                .zip(columns)
                .map(|(text, col)| wrap_text(text, col.wrap))
                .collect();
            let extra = cells.iter().map(Vec::len).max().unwrap_or(1).saturating_sub(1);
            (cells, BASE_ROW_H + extra as f32 * EXTRA_LINE_H)
        })
        .collect();

    let mut page_num: u32 = 1;
    let mut layer = new_table_page(doc, title, page_num, columns, &font_r, &font_b);
    let mut cur_y = FIRST_Y;

    if rows.is_empty() {
        set_color(&layer, TEXT_SEC);
        layer.use_text(empty_message, 9.0, Mm(MARGIN + 1.5), Mm(cur_y - 4.0), &font_r);
        return Ok(());
    }

    for (row_idx, (row, (cells, row_h))) in rows.iter().zip(&wrapped).enumerate() {
        let row_h = *row_h;
        if cur_y - row_h < BOT_MARGIN {
            page_num += 1;
            layer = new_table_page(doc, title, page_num, columns, &font_r, &font_b);
            cur_y = FIRST_Y;
        }

        if row_idx % 2 == 0 {
            fill_rect(&layer, MARGIN, cur_y - row_h + 1.5, PAGE_W - 2.0 * MARGIN, row_h, PANEL_ALT);
        }

        let text_y = cur_y - 4.0;
        for (i, (lines, col)) in cells.iter().zip(columns).enumerate() {
            set_color(&layer, if i == 0 { TEXT_PRI } else { TEXT_SEC });
            for (j, line) in lines.iter().enumerate() {
                let line_y = text_y - j as f32 * EXTRA_LINE_H;
                layer.use_text(line.as_str(), 8.0, Mm(col.x + 1.5), Mm(line_y), &font_r);
            }
        }

        let badge_x = BADGE_COL_X + 1.5;
        let badge_y = cur_y - 5.8;
        fill_rounded_rect(&layer, badge_x, badge_y, 20.0, 4.8, R_BADGE, row.badge.bg);
        set_color(&layer, row.badge.fg);
        layer.use_text(row.badge.label.as_str(), 7.0, Mm(badge_x + 3.0), Mm(badge_y + 1.1), &font_b);

        draw_hline(&layer, MARGIN, T_END, cur_y - row_h + 1.5, PANEL_BORDER);
        cur_y -= row_h;
    }

    Ok(())
}

fn new_table_page(
    doc: &PdfDocumentReference,
    title: &str,
    page_num: u32,
    columns: &[Column],
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) -> PdfLayerReference {
    const HDR_Y: f32 = 268.5;

    let (pi, li) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), title);
    let layer = doc.get_page(pi).get_layer(li);

    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    fill_gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_BLU, ACCENT_PUR, 21);

    set_color(&layer, TEXT_PRI);
    layer.use_text(title, 14.0, Mm(MARGIN), Mm(282.5), font_b);
    set_color(&layer, TEXT_MUT);
    layer.use_text(format!("Page {}", page_num), 8.0, Mm(PAGE_W - MARGIN - 14.0), Mm(283.0), font_r);
    draw_hline(&layer, MARGIN, PAGE_W - MARGIN, 277.5, PANEL_BORDER);

    fill_rounded_rect(&layer, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL);
    stroke_rounded_rect(&layer, MARGIN, HDR_Y - 7.5, PAGE_W - 2.0 * MARGIN, 9.5, R_BADGE, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    for col in columns {
        layer.use_text(col.header, 7.0, Mm(col.x + 1.5), Mm(HDR_Y - 4.0), font_b);
    }
    layer.use_text("CONCERN", 7.0, Mm(BADGE_COL_X + 1.5), Mm(HDR_Y - 4.0), font_b);

    draw_footer(&layer, font_r);
    layer
}

fn draw_footer(layer: &PdfLayerReference, font_r: &IndirectFontRef) {
    draw_hline(layer, MARGIN, PAGE_W - MARGIN, 22.0, PANEL_BORDER);
    set_color(layer, TEXT_MUT);
    layer.use_text(
        format!("Generated by terms-checkr v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(MARGIN), Mm(15.0), font_r,
    );
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn set_color(layer: &PdfLayerReference, (r, g, b): (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb { r, g, b, icc_profile: None }));
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32,
             (r, g, b): (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb { r, g, b, icc_profile: None }));
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(x),     Mm(y)),     false),
            (Point::new(Mm(x + w), Mm(y)),     false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x),     Mm(y + h)), false),
        ]],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_fill_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
}

/// Clockwise polygon ring approximating a rounded rectangle, 8 segments per corner.
fn rounded_rect_ring(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(Point, bool)> {
    let r = r.min(w / 2.0).min(h / 2.0);
    const SEGS: usize = 8;
    let mut pts = Vec::with_capacity(4 * (SEGS + 1));

    let corners = [
        (x + w - r, y + r,     270.0f32, 360.0f32),
        (x + w - r, y + h - r, 0.0f32,   90.0f32),
        (x + r,     y + h - r, 90.0f32,  180.0f32),
        (x + r,     y + r,     180.0f32, 270.0f32),
    ];

    for (cx, cy, start, end) in &corners {
        for i in 0..=SEGS {
            let t = i as f32 / SEGS as f32;
            let angle = (start + (end - start) * t).to_radians();
            pts.push((
                Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())),
                false,
            ));
        }
    }
    pts
}

fn fill_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32,
                     r: f32, (cr, cg, cb): (f32, f32, f32)) {
    layer.set_fill_color(Color::Rgb(Rgb { r: cr, g: cg, b: cb, icc_profile: None }));
    layer.add_polygon(Polygon {
        rings: vec![rounded_rect_ring(x, y, w, h, r)],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_fill_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
}

fn stroke_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32,
                       r: f32, (cr, cg, cb): (f32, f32, f32)) {
    layer.set_outline_color(Color::Rgb(Rgb { r: cr, g: cg, b: cb, icc_profile: None }));
    layer.set_outline_thickness(0.4);
    layer.add_polygon(Polygon {
        rings: vec![rounded_rect_ring(x, y, w, h, r)],
        mode: PaintMode::Stroke,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_outline_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
    layer.set_outline_thickness(1.0);
}

fn draw_hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32,
              (r, g, b): (f32, f32, f32)) {
    layer.set_outline_color(Color::Rgb(Rgb { r, g, b, icc_profile: None }));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
    layer.set_outline_color(Color::Rgb(Rgb { r: 0.0, g: 0.0, b: 0.0, icc_profile: None }));
    layer.set_outline_thickness(1.0);
}

/// Left-to-right gradient rectangle built from `steps` vertical strips.
#[allow(clippy::too_many_arguments)]
fn fill_gradient_h(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    from: (f32, f32, f32),
    to: (f32, f32, f32),
    steps: usize,
) {
    let step_w = w / steps as f32;
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let color = (
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
            from.2 + (to.2 - from.2) * t,
        );
        // strips overlap to hide rounding gaps
        fill_rect(layer, x + i as f32 * step_w, y, step_w + 0.6, h, color);
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

/// `#rrggbb` to 0–1 RGB components.
fn hex_rgb(hex: &str) -> Option<(f32, f32, f32)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(|v| v as f32 / 255.0);
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Blend `color` over white; `amount` 0 is white, 1 is the colour itself.
fn tint(color: (f32, f32, f32), amount: f32) -> (f32, f32, f32) {
    let mix = |c: f32| 1.0 - (1.0 - c) * amount;
    (mix(color.0), mix(color.1), mix(color.2))
}

/// Badge (background, foreground) for a 0–100 dimension score.
fn score_palette(score: u32) -> ((f32, f32, f32), (f32, f32, f32)) {
    match score {
        50.. => (HIGH_BG, HIGH_FG),
        25..=49 => (MED_BG, MED_FG),
        _ => (LOW_BG, LOW_FG),
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max {
        format!("{}…", chars[..max - 1].iter().collect::<String>())
    } else {
        s.to_string()
    }
}

/// Greedy word wrap at `max_chars`; whitespace runs collapse to single spaces.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ── Date helper ───────────────────────────────────────────────────────────────

fn report_date() -> String {
    format_date(Utc::now())
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_hex_rgb() {
        let (r, g, b) = hex_rgb("#ef4444").unwrap();
        assert!((r - 239.0 / 255.0).abs() < 1e-6);
        assert!((g - 68.0 / 255.0).abs() < 1e-6);
        assert!((b - 68.0 / 255.0).abs() < 1e-6);
        assert!(hex_rgb("ef4444").is_none());
        assert!(hex_rgb("#zzzzzz").is_none());
        for level in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low, RiskLevel::VeryLow, RiskLevel::Unknown] {
            assert!(hex_rgb(level.color()).is_some());
        }
    }

    #[test]
    fn test_tint_bounds() {
        assert_eq!(tint((0.0, 0.5, 1.0), 0.0), (1.0, 1.0, 1.0));
        assert_eq!(tint((0.0, 0.5, 1.0), 1.0), (0.0, 0.5, 1.0));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("short", 10), vec!["short"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(
            wrap_text("the quick brown fox\njumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap_text("unbreakableword", 5), vec!["unbreakableword"]);
    }

    #[test]
    fn test_report_date_is_calendar_date() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap();
        assert_eq!(format_date(at), "2026-10-18");
        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(format_date(leap), "2024-02-29");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("terms.txt", 20), "terms.txt");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
