//! Block-to-Markdown Transcriber.
//!
//! Turns the classified top-level blocks into the ordered [`MarkdownBlock`]
//! sequence, then applies title promotion to the first block.

use crate::model::{DocumentNode, ImageMap, MarkdownBlock, NodeKind};
use crate::pipeline::inline::render_inline;
use crate::pipeline::list::flatten_list;
use crate::pipeline::table::render_table;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Text emitted for a horizontal rule.
pub const HR_MARKER: &str = "------------------------";

/// Text emitted for an image block; the file travels alongside it.
pub const IMAGE_PLACEHOLDER: &str = "[[IMAGE]]";

/// Title promotion settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleRule<'a> {
    pub enabled: bool,
    pub link: Option<&'a str>,
}

/// Transcribe `blocks` in order.
pub fn transcribe(blocks: &[&DocumentNode], images: &ImageMap, title: TitleRule<'_>) -> Vec<MarkdownBlock> {
    let mut out = Vec::with_capacity(blocks.len());
    for node in blocks {
        transcribe_block(node, images, &mut out);
    }
    if title.enabled {
        if let Some(first) = out.first_mut() {
            promote_title(first, title.link);
        }
    }
    debug!("Transcribed {} blocks into {} Markdown blocks", blocks.len(), out.len());
    out
}

fn transcribe_block(node: &DocumentNode, images: &ImageMap, out: &mut Vec<MarkdownBlock>) {
    match &node.kind {
        NodeKind::Heading(level) => {
            let text = render_inline(node);
            if !text.is_empty() {
                out.push(MarkdownBlock::text(format!("{} **{}**", level.marker(), text)));
            }
        }
        NodeKind::Paragraph => {
            let text = render_inline(node);
            if !text.is_empty() {
                out.push(MarkdownBlock::text(text));
            }
        }
        NodeKind::UnorderedList | NodeKind::OrderedList => {
            out.extend(flatten_list(node, 0).into_iter().map(MarkdownBlock::text));
        }
        NodeKind::HorizontalRule => out.push(MarkdownBlock::text(HR_MARKER)),
        NodeKind::Table => {
            let grid = render_table(node);
            if !grid.is_empty() {
                out.push(MarkdownBlock::text(grid));
            }
        }
        NodeKind::Image => {
            let src = node.attr("src").unwrap_or_default();
            out.push(MarkdownBlock::image(IMAGE_PLACEHOLDER, resolve_image(src, images)));
        }
        NodeKind::ListItem
        | NodeKind::TableRow
        | NodeKind::TableCell
        | NodeKind::Hyperlink
        | NodeKind::Text(_)
        | NodeKind::Other(_) => {}
    }
}

/// Look `src` up in the map. An embedded-data reference that misses falls
/// back to the most recently stored image.
fn resolve_image(src: &str, images: &ImageMap) -> Option<PathBuf> {
    if let Some(path) = images.get(src) {
        return Some(path.to_path_buf());
    }
    if src.starts_with("data:image/") {
        if let Some(path) = images.last() {
            warn!("Image reference not in map; using last stored image {}", path.display());
            return Some(path.to_path_buf());
        }
    }
    warn!("Image reference could not be resolved; sending placeholder only");
    None
}

/// Re-render a text block as a level-1 bold heading, optionally linked.
fn promote_title(block: &mut MarkdownBlock, link: Option<&str>) {
    if block.image.is_some() {
        return;
    }
    let stripped = block
        .text
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim_end();
    // Only a single bold span is unwrapped; `**a** and **b**` stays as is.
    let core = stripped
        .strip_prefix("**")
        .and_then(|s| s.strip_suffix("**"))
        .filter(|inner| !inner.contains("**"))
        .unwrap_or(stripped);
    block.text = match link {
        Some(target) => format!("# [**{core}**]({target})"),
        None => format!("# **{core}**"),
    };
}
