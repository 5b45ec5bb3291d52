//! Table Renderer: a table node → a fenced, fixed-width text grid.
//!
//! ```text
//! | A | B  |
//! | 1 | 22 |
//! ```
//!
//! The first row fixes the column count: short rows are padded with empty
//! cells, extra cells are dropped. Widths are measured in characters.

use crate::model::{DocumentNode, NodeKind};

/// Fence wrapped around every rendered table.
pub const TABLE_FENCE: &str = "```";

/// Render `table`, or return an empty string when it has no rows.
pub fn render_table(table: &DocumentNode) -> String {
    let mut rows = Vec::new();
    collect_rows(table, &mut rows);

    let grid: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children
                .iter()
                .filter(|c| c.kind == NodeKind::TableCell)
                .map(DocumentNode::flattened_text)
                .collect()
        })
        .collect();

    let Some(columns) = grid.first().map(Vec::len) else {
        return String::new();
    };
    if columns == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; columns];
    for row in &grid {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let lines: Vec<String> = grid
        .iter()
        .map(|row| {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, &w)| format!("{:<w$}", row.get(i).map(String::as_str).unwrap_or("")))
                .collect();
            format!("| {} |", cells.join(" | "))
        })
        .collect();

    format!("{TABLE_FENCE}\n{}\n{TABLE_FENCE}", lines.join("\n"))
}

/// Rows of this table in order, looking through `tbody`/`thead`/`tfoot`
/// wrappers but not into nested tables.
fn collect_rows<'a>(node: &'a DocumentNode, rows: &mut Vec<&'a DocumentNode>) {
    for child in &node.children {
        match child.kind {
            NodeKind::TableRow => rows.push(child),
            NodeKind::Table => {}
            _ => collect_rows(child, rows),
        }
    }
}
