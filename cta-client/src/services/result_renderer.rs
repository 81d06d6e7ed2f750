//! Result rendering
//!
//! Count tables become a header row plus one row per label, in the order
//! the server sent them (never sorted). Oracc markup is passed through
//! untouched. Diagnostics are always kept apart from the main display so a
//! front end can put them in its status area.

use cta_common::api::{Diagnostics, GlossaryCounts, LabelMap, SignCounts, WordCounts};
use cta_common::AnalysisKind;

use crate::models::AnalysisResult;

/// Main display content for one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRepresentation {
    Table {
        headers: Vec<String>,
        rows: Vec<TableRow>,
    },
    Markup {
        html: String,
        text: Option<String>,
    },
}

/// One labelled table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<u64>,
}

/// Rendered result: main display plus the separate diagnostics area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResult {
    pub kind: AnalysisKind,
    pub display: DisplayRepresentation,
    pub diagnostics: Diagnostics,
}

/// Label column header for each table kind
fn label_header(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::Signs => "sign",
        AnalysisKind::Words => "word form",
        AnalysisKind::Glossary => "form",
        AnalysisKind::Oracc => "",
    }
}

fn table<R, const N: usize>(
    kind: AnalysisKind,
    headers: [&str; N],
    map: &LabelMap<R>,
    values: impl Fn(&R) -> [u64; N],
) -> DisplayRepresentation {
    let headers = std::iter::once(label_header(kind))
        .chain(headers)
        .map(str::to_string)
        .collect();
    let rows = map
        .iter()
        .map(|(label, record)| TableRow {
            label: label.to_string(),
            values: values(record).to_vec(),
        })
        .collect();
    DisplayRepresentation::Table { headers, rows }
}

/// Map an analysis result to its display form
pub fn render(result: &AnalysisResult) -> RenderedResult {
    let kind = result.kind();
    let display = match result {
        AnalysisResult::Signs { table: map, .. } => {
            table(kind, SignCounts::HEADERS, map, SignCounts::values)
        }
        AnalysisResult::Words { table: map, .. } => {
            table(kind, WordCounts::HEADERS, map, WordCounts::values)
        }
        AnalysisResult::Glossary { table: map, .. } => {
            table(kind, GlossaryCounts::HEADERS, map, GlossaryCounts::values)
        }
        AnalysisResult::Oracc { html, text, .. } => DisplayRepresentation::Markup {
            html: html.clone(),
            text: text.clone(),
        },
    };

    RenderedResult {
        kind,
        display,
        diagnostics: result.diagnostics().clone(),
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl RenderedResult {
    /// HTML fragment for the main result area
    ///
    /// Table headers and labels are escaped; Oracc markup is emitted as-is.
    pub fn to_html(&self) -> String {
        match &self.display {
            DisplayRepresentation::Markup { html, .. } => html.clone(),
            DisplayRepresentation::Table { headers, rows } => {
                let mut out = format!("<table class=\"analysis-table {}\">\n", self.kind);
                out.push_str("  <thead><tr>");
                for header in headers {
                    out.push_str(&format!("<th>{}</th>", escape_html(header)));
                }
                out.push_str("</tr></thead>\n  <tbody>\n");
                for row in rows {
                    out.push_str(&format!("    <tr><td>{}</td>", escape_html(&row.label)));
                    for value in &row.values {
                        out.push_str(&format!("<td>{}</td>", value));
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("  </tbody>\n</table>\n");
                out
            }
        }
    }

    /// HTML fragment for the status area, empty when there is nothing to say
    pub fn diagnostics_html(&self) -> String {
        if self.diagnostics.is_empty() {
            return String::new();
        }
        let items: String = self
            .diagnostics
            .lines()
            .iter()
            .map(|line| format!("<li>{}</li>", escape_html(line)))
            .collect();
        format!("<ul class=\"syntax-errors\">{}</ul>", items)
    }

    /// Aligned plain-text rendering for a terminal
    pub fn to_text(&self) -> String {
        match &self.display {
            DisplayRepresentation::Markup { html, text } => match text {
                Some(text) => text.clone(),
                None => html.clone(),
            },
            DisplayRepresentation::Table { headers, rows } => {
                let cells: Vec<Vec<String>> = rows
                    .iter()
                    .map(|row| {
                        std::iter::once(row.label.clone())
                            .chain(row.values.iter().map(u64::to_string))
                            .collect()
                    })
                    .collect();

                let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
                for row in &cells {
                    for (width, cell) in widths.iter_mut().zip(row) {
                        *width = (*width).max(cell.chars().count());
                    }
                }

                let format_line = |line: &[String]| {
                    line.iter()
                        .zip(&widths)
                        .enumerate()
                        .map(|(i, (cell, width))| {
                            if i == 0 {
                                format!("{:<width$}", cell, width = *width)
                            } else {
                                format!("{:>width$}", cell, width = *width)
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("  ")
                        .trim_end()
                        .to_string()
                };

                let mut out = format_line(headers.as_slice());
                out.push('\n');
                for row in &cells {
                    out.push_str(&format_line(row.as_slice()));
                    out.push('\n');
                }
                out
            }
        }
    }
}
