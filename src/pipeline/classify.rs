//! Block Classifier: keep the recognized top-level blocks, in order.

use crate::model::{DocumentNode, NodeKind};

/// Direct children of `root` that are headings (1–3), paragraphs, lists,
/// horizontal rules, tables or images.
pub fn classify(root: &DocumentNode) -> Vec<&DocumentNode> {
    root.children.iter().filter(|n| is_block(&n.kind)).collect()
}

fn is_block(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Heading(_)
        | NodeKind::Paragraph
        | NodeKind::UnorderedList
        | NodeKind::OrderedList
        | NodeKind::HorizontalRule
        | NodeKind::Table
        | NodeKind::Image => true,
        NodeKind::ListItem
        | NodeKind::TableRow
        | NodeKind::TableCell
        | NodeKind::Hyperlink
        | NodeKind::Text(_)
        | NodeKind::Other(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;
    use crate::pipeline::html::parse_html;

    #[test]
    fn test_keeps_blocks_in_order() {
        let root = DocumentNode::new(NodeKind::Other("body".into())).with_children([
            DocumentNode::text("stray"),
            DocumentNode::new(NodeKind::Heading(HeadingLevel::H2)),
            DocumentNode::new(NodeKind::Other("div".into())),
            DocumentNode::new(NodeKind::Paragraph),
            DocumentNode::new(NodeKind::Image),
            DocumentNode::new(NodeKind::Other("h4".into())),
            DocumentNode::new(NodeKind::Table),
            DocumentNode::new(NodeKind::HorizontalRule),
            DocumentNode::new(NodeKind::OrderedList),
        ]);
        let kinds: Vec<&NodeKind> = classify(&root).into_iter().map(|n| &n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &NodeKind::Heading(HeadingLevel::H2),
                &NodeKind::Paragraph,
                &NodeKind::Image,
                &NodeKind::Table,
                &NodeKind::HorizontalRule,
                &NodeKind::OrderedList,
            ]
        );
    }

    #[test]
    fn test_nested_blocks_not_lifted() {
        let root = parse_html("<div><p>inside</p></div><p>outside</p>");
        let blocks = classify(&root);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].flattened_text(), "outside");
    }
}
