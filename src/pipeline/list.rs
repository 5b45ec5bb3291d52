//! List Flattener: nested `ul`/`ol` → indented bullet lines.

use crate::model::{DocumentNode, NodeKind};
use crate::pipeline::inline::render_children;

/// Flatten `list` depth-first, pre-order.
///
/// Each item becomes `"  " * depth + "- " + text`, where the text is the
/// item's non-list content. Lists nested directly in the item follow at
/// `depth + 1`. Ordered lists use the same `-` bullet.
pub fn flatten_list(list: &DocumentNode, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for item in list.children.iter().filter(|c| c.kind == NodeKind::ListItem) {
        let text = render_children(item.children.iter().filter(|c| !c.kind.is_list()));
        lines.push(format!("{}- {}", "  ".repeat(depth), text));
        for nested in item.children.iter().filter(|c| c.kind.is_list()) {
            lines.extend(flatten_list(nested, depth + 1));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> DocumentNode {
        DocumentNode::new(NodeKind::ListItem).with_child(DocumentNode::text(text))
    }

    fn list(kind: NodeKind, items: Vec<DocumentNode>) -> DocumentNode {
        DocumentNode::new(kind).with_children(items)
    }

    #[test]
    fn test_nested_lines_follow_parent() {
        let tree = list(
            NodeKind::UnorderedList,
            vec![
                item("a").with_child(list(
                    NodeKind::OrderedList,
                    vec![item("a1").with_child(list(NodeKind::UnorderedList, vec![item("a1x")])), item("a2")],
                )),
                item("b"),
            ],
        );
        assert_eq!(flatten_list(&tree, 0), vec!["- a", "  - a1", "    - a1x", "  - a2", "- b"]);
    }

    #[test]
    fn test_starting_depth_and_links() {
        let tree = list(
            NodeKind::OrderedList,
            vec![DocumentNode::new(NodeKind::ListItem)
                .with_child(DocumentNode::text("go "))
                .with_child(
                    DocumentNode::new(NodeKind::Hyperlink)
                        .with_attr("href", "https://x")
                        .with_child(DocumentNode::text("there")),
                )],
        );
        assert_eq!(flatten_list(&tree, 2), vec!["    - go [there](https://x)"]);
    }

    #[test]
    fn test_non_item_children_ignored_and_empty_item_kept() {
        let tree = list(
            NodeKind::UnorderedList,
            vec![DocumentNode::text("\n"), DocumentNode::new(NodeKind::ListItem), item("z")],
        );
        assert_eq!(flatten_list(&tree, 0), vec!["- ", "- z"]);
    }
}
