//! Grouping/Chunking Policy: pack Markdown blocks into message-sized groups.
//!
//! Image blocks and fenced tables always travel alone. Other blocks are
//! joined with a blank line until the next one would push the group over the
//! budget. Blocks are never split, so a single block longer than the budget
//! becomes its own oversized group.

use crate::model::{MarkdownBlock, MessageGroup};
use crate::pipeline::table::TABLE_FENCE;

/// Separator between packed blocks.
pub const GROUP_SEPARATOR: &str = "\n\n";

/// Pack `blocks` into groups of at most `limit` characters.
pub fn group_blocks(blocks: &[MarkdownBlock], limit: usize) -> Vec<MessageGroup> {
    let mut packer = Packer {
        groups: Vec::new(),
        buf: String::new(),
        buf_chars: 0,
        limit,
    };
    for block in blocks {
        if block.image.is_some() || block.text.starts_with(TABLE_FENCE) {
            packer.flush();
            packer.groups.push(MessageGroup {
                text: block.text.clone(),
                image: block.image.clone(),
            });
        } else if !block.text.is_empty() {
            packer.push(&block.text);
        }
    }
    packer.flush();
    packer.groups
}

struct Packer {
    groups: Vec<MessageGroup>,
    buf: String,
    buf_chars: usize,
    limit: usize,
}

impl Packer {
    fn push(&mut self, text: &str) {
        let chars = text.chars().count();
        if !self.buf.is_empty() {
            let joined = self.buf_chars + GROUP_SEPARATOR.len() + chars;
            if joined <= self.limit {
                self.buf.push_str(GROUP_SEPARATOR);
                self.buf.push_str(text);
                self.buf_chars = joined;
                return;
            }
            self.flush();
        }
        self.buf.push_str(text);
        self.buf_chars = chars;
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        self.groups.push(MessageGroup {
            text: std::mem::take(&mut self.buf),
            image: None,
        });
        self.buf_chars = 0;
    }
}
