//! Data model shared by every pipeline stage.
//!
//! [`DocumentNode`] is the read-only tree produced from the converted HTML.
//! Its kind is a closed enum so every stage that dispatches on element kind
//! is checked for exhaustiveness by the compiler.
//!
//! [`MarkdownBlock`] is the unit of transcription output and
//! [`MessageGroup`] the unit of delivery.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Heading levels the transcriber understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// The Markdown marker for this level (`#`, `##`, `###`).
    pub fn marker(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "#",
            HeadingLevel::H2 => "##",
            HeadingLevel::H3 => "###",
        }
    }
}

/// Element kind of a [`DocumentNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Heading(HeadingLevel),
    Paragraph,
    UnorderedList,
    OrderedList,
    ListItem,
    HorizontalRule,
    Table,
    TableRow,
    TableCell,
    Image,
    Hyperlink,
    /// A raw text node carrying its literal content.
    Text(String),
    /// Any element without a dedicated kind (`strong`, `tbody`, `h4`, …).
    Other(String),
}

impl NodeKind {
    /// Map a lower-cased HTML tag name to its kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "h1" => NodeKind::Heading(HeadingLevel::H1),
            "h2" => NodeKind::Heading(HeadingLevel::H2),
            "h3" => NodeKind::Heading(HeadingLevel::H3),
            "p" => NodeKind::Paragraph,
            "ul" => NodeKind::UnorderedList,
            "ol" => NodeKind::OrderedList,
            "li" => NodeKind::ListItem,
            "hr" => NodeKind::HorizontalRule,
            "table" => NodeKind::Table,
            "tr" => NodeKind::TableRow,
            "td" | "th" => NodeKind::TableCell,
            "img" => NodeKind::Image,
            "a" => NodeKind::Hyperlink,
            other => NodeKind::Other(other.to_string()),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::UnorderedList | NodeKind::OrderedList)
    }
}

/// One node of the parsed document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentNode {
    pub kind: NodeKind,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(content.into()))
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DocumentNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// All descendant text, whitespace-collapsed to single spaces and trimmed.
    pub fn flattened_text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        collapse_whitespace(&raw)
    }

    /// All descendant text with whitespace runs collapsed to one space but
    /// kept at the edges, so adjacent inline siblings stay separated.
    pub fn spaced_text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        collapse_runs(&raw)
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(s) => out.push_str(s),
            NodeKind::Other(tag) if tag == "br" => out.push(' '),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// Collapse every whitespace run to one space and trim both ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse every whitespace run to one space without trimming.
pub fn collapse_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Inline image reference (e.g. a `data:` URI) → path of the stored file.
///
/// Insertion order is preserved; [`ImageMap::last`] backs the single-image
/// fallback used by the transcriber.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageMap {
    entries: IndexMap<String, PathBuf>,
}

impl ImageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(reference.into(), path.into());
    }

    pub fn get(&self, reference: &str) -> Option<&Path> {
        self.entries.get(reference).map(PathBuf::as_path)
    }

    /// The value of the most recently inserted reference.
    pub fn last(&self) -> Option<&Path> {
        self.entries.last().map(|(_, p)| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }
}

/// One unit of transcribed Markdown, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkdownBlock {
    pub text: String,
    /// Stored image file, only ever set for blocks produced from an image.
    pub image: Option<PathBuf>,
}

impl MarkdownBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn image(text: impl Into<String>, image: Option<PathBuf>) -> Self {
        Self {
            text: text.into(),
            image,
        }
    }
}

/// One delivery unit: text under the character budget, plus an optional image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageGroup {
    pub text: String,
    pub image: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag() {
        assert_eq!(NodeKind::from_tag("h2"), NodeKind::Heading(HeadingLevel::H2));
        assert_eq!(NodeKind::from_tag("th"), NodeKind::TableCell);
        assert_eq!(NodeKind::from_tag("h4"), NodeKind::Other("h4".into()));
        assert!(NodeKind::from_tag("ol").is_list());
    }

    #[test]
    fn test_flattened_text_collapses_whitespace() {
        let node = DocumentNode::new(NodeKind::Paragraph)
            .with_child(DocumentNode::text("  Hello\n"))
            .with_child(
                DocumentNode::new(NodeKind::Other("strong".into()))
                    .with_child(DocumentNode::text("big   ")),
            )
            .with_child(DocumentNode::text("\tworld "));
        assert_eq!(node.flattened_text(), "Hello big world");
    }

    #[test]
    fn test_spaced_text_keeps_edges() {
        let node = DocumentNode::new(NodeKind::Other("em".into()))
            .with_child(DocumentNode::text("  a\n\n"))
            .with_child(DocumentNode::new(NodeKind::Other("br".into())))
            .with_child(DocumentNode::text("b "));
        assert_eq!(node.spaced_text(), " a b ");
        assert_eq!(collapse_runs("x \t y"), "x y");
    }

    #[test]
    fn test_image_map_last_follows_insertion_order() {
        let mut map = ImageMap::new();
        assert!(map.last().is_none());
        map.insert("data:image/png;base64,AAA", "/tmp/a.png");
        map.insert("data:image/png;base64,BBB", "/tmp/b.png");
        assert_eq!(map.last(), Some(Path::new("/tmp/b.png")));
        assert_eq!(map.get("data:image/png;base64,AAA"), Some(Path::new("/tmp/a.png")));
        assert_eq!(map.len(), 2);
    }
}
