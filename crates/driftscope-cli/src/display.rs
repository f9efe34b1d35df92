//! Terminal rendering of analyses.
//!
//! Highlighted segments get a severity background colour; with colour
//! disabled they are written as `[text](Severity)` instead.

use std::fmt::Write;

use crossterm::style::{Color, Stylize, style};
use driftscope_core::{DriftItem, Highlighted, Segment, Severity};
use driftscope_store::AnalysisRecord;

const PREVIEW_CHARS: usize = 50;

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Rgb { r: 250, g: 78, b: 78 },
        Severity::Medium => Color::Rgb { r: 241, g: 147, b: 31 },
        Severity::Low => Color::Rgb { r: 247, g: 243, b: 0 },
    }
}

// ── Segments ──

pub fn render_segments(segments: &[Segment], color: bool) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg.severity {
            Some(severity) if color => {
                // Styled per line so line breaks and indentation stay unstyled.
                for (i, line) in seg.text.split('\n').enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    if line.is_empty() {
                        continue;
                    }
                    let styled = style(line).on(severity_color(severity)).with(Color::Black);
                    let _ = write!(out, "{styled}");
                }
            }
            Some(severity) => {
                let _ = write!(out, "[{}]({})", seg.text, severity);
            }
            None => out.push_str(&seg.text),
        }
    }
    out
}

pub fn format_highlighted(highlighted: &Highlighted, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analysed drift from {} to {}",
        caption(&highlighted.source_language),
        caption(&highlighted.translation_language)
    );
    out.push('\n');
    for line in render_segments(&highlighted.segments, color).lines() {
        let _ = writeln!(out, "  {line}");
    }
    out.push('\n');
    out
}

// ── Drift items ──

pub fn format_drift_list(items: &[DriftItem]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Detected drift ({})", items.len());
    for item in items {
        let severity = item.severity.map_or("Unrated", Severity::as_str);
        let _ = write!(out, "  {severity}: {}", item.description);
        if let Some(category) = item.category {
            let _ = write!(out, " [{category}]");
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

// ── Records ──

/// A full card for one stored analysis.
pub fn format_record(record: &AnalysisRecord, highlighted: &Highlighted, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Drift analysis #{} ===", record.id);
    let _ = writeln!(
        out,
        "{}  ({})",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.model_name
    );
    out.push('\n');
    out.push_str(&format_highlighted(highlighted, color));
    out.push_str(&format_drift_list(&record.analysis.drift_items));
    out
}

/// One line per record, newest first as given.
pub fn format_recent(records: &[AnalysisRecord]) -> String {
    let mut out = String::new();
    out.push_str("Recent analyses\n");
    if records.is_empty() {
        out.push_str("  (none)\n");
    }
    for r in records {
        let _ = writeln!(
            out,
            "  #{} {}  {} → {} | Source: {} | Translation: {}",
            r.id,
            r.created_at.format("%Y-%m-%d %H:%M"),
            caption(&r.source_lang),
            caption(&r.translation_lang),
            preview(&r.source_text),
            preview(&r.translation_text),
        );
    }
    out
}

// ── Helpers ──

fn caption(language: &str) -> &str {
    if language.trim().is_empty() {
        "?"
    } else {
        language
    }
}

/// First line, cut to [`PREVIEW_CHARS`] characters.
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() || text.lines().nth(1).is_some() {
        format!("{head}...")
    } else {
        head
    }
}
