//! Post-processing normalization of the converted HTML.
//!
//! Two regex-level passes run on the HTML string before it is parsed:
//!
//! 1. A paragraph consisting solely of three or more hyphens becomes `<hr />`.
//!    Authors often type `-----` instead of applying the horizontal-line
//!    style; both end up as the same rule block.
//! 2. Tables get presentational attributes (collapsed borders, padded
//!    centred cells) and their first row is promoted to header cells. This
//!    only affects the HTML preview; the Markdown grid ignores styling.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const TABLE_STYLE: &str = "border-collapse:collapse;width:100%;";
pub const CELL_STYLE: &str = "border:1px solid black;padding:4px;text-align:center;vertical-align:middle;";
pub const HEADER_STYLE: &str = "background-color:#f2f2f2;font-weight:bold;";

/// Apply both normalization passes.
pub fn normalize_html(html: &str) -> String {
    let s = dashes_to_rule(html);
    style_tables(&s)
}

// ── Pass 1: Dash paragraphs → horizontal rule ────────────────────────────

static RE_DASH_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<p\b[^>]*>-{3,}\s*</p>").unwrap());

fn dashes_to_rule(html: &str) -> String {
    RE_DASH_PARAGRAPH.replace_all(html, "<hr />").into_owned()
}

// ── Pass 2: Table styling and header row ─────────────────────────────────

static RE_TABLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(/?)(table|tr|td|th)\b([^>]*)>").unwrap());

static RE_STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s*style\s*=\s*("[^"]*"|'[^']*'|[^\s>]*)"#).unwrap());

/// Per open `<table>`: rows seen so far.
#[derive(Default)]
struct TableState {
    rows: usize,
}

fn style_tables(html: &str) -> String {
    let mut tables: Vec<TableState> = Vec::new();
    // Tag names of open cells, so close tags follow a td → th promotion.
    let mut cells: Vec<&'static str> = Vec::new();

    RE_TABLE_TAG
        .replace_all(html, |caps: &Captures<'_>| {
            let closing = !caps[1].is_empty();
            let tag = caps[2].to_ascii_lowercase();
            let attrs = RE_STYLE_ATTR.replace_all(&caps[3], "");
            let attrs = attrs.trim_end_matches('/').trim_end();

            match (tag.as_str(), closing) {
                ("table", false) => {
                    tables.push(TableState::default());
                    format!(r#"<table{attrs} style="{TABLE_STYLE}">"#)
                }
                ("table", true) => {
                    tables.pop();
                    "</table>".to_string()
                }
                ("tr", false) => {
                    if let Some(t) = tables.last_mut() {
                        t.rows += 1;
                    }
                    format!("<tr{attrs}>")
                }
                ("tr", true) => "</tr>".to_string(),
                (cell, false) => {
                    let header = tables.last().is_some_and(|t| t.rows == 1);
                    let (name, style) = if header {
                        ("th", format!("{CELL_STYLE}{HEADER_STYLE}"))
                    } else if cell == "th" {
                        ("th", CELL_STYLE.to_string())
                    } else {
                        ("td", CELL_STYLE.to_string())
                    };
                    cells.push(name);
                    format!(r#"<{name}{attrs} style="{style}">"#)
                }
                (cell, true) => {
                    let name = cells.pop().unwrap_or(if cell == "th" { "th" } else { "td" });
                    format!("</{name}>")
                }
            }
        })
        .into_owned()
}
