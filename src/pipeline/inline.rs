//! Inline Text Renderer: one block's inline content → one line of Markdown.

use crate::model::{DocumentNode, NodeKind};

/// Render the direct children of `node` as a single trimmed line.
///
/// Text children are taken literally, hyperlinks with a non-empty `href`
/// become `[text](href)`, and every other child contributes its
/// whitespace-collapsed text with edge spaces kept. `<br>` counts as a space.
pub fn render_inline(node: &DocumentNode) -> String {
    render_children(&node.children)
}

/// Same as [`render_inline`] over an explicit child sequence.
pub fn render_children<'a>(children: impl IntoIterator<Item = &'a DocumentNode>) -> String {
    let mut line = String::new();
    for child in children {
        match &child.kind {
            NodeKind::Text(s) => line.push_str(s),
            NodeKind::Hyperlink => {
                let text = child.flattened_text();
                match child.attr("href").map(str::trim).filter(|h| !h.is_empty()) {
                    Some(href) => {
                        line.push('[');
                        line.push_str(&text);
                        line.push_str("](");
                        line.push_str(href);
                        line.push(')');
                    }
                    None => line.push_str(&text),
                }
            }
            _ => line.push_str(&child.spaced_text()),
        }
    }
    line.trim().to_string()
}
