//! HTML string → [`DocumentNode`] tree.
//!
//! Parsing uses html5ever's standards-compliant tree builder, so the converter's
//! output and hand-written HTML alike get the usual repairs (implied
//! `<tbody>`, closed `<p>` before block elements, …). Only the `<body>`
//! subtree is kept; comments, doctypes and processing instructions are
//! dropped.

use crate::model::{DocumentNode, NodeKind};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse `html` and return a root node whose children are the body's
/// top-level nodes.
pub fn parse_html(html: &str) -> DocumentNode {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let top: Vec<Handle> = match find_element(&dom.document, "body") {
        Some(body) => body.children.borrow().clone(),
        None => dom.document.children.borrow().clone(),
    };
    DocumentNode::new(NodeKind::Other("body".into())).with_children(top.iter().filter_map(convert))
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &node.data {
        if name.local.to_string().eq_ignore_ascii_case(tag) {
            return Some(node.clone());
        }
    }
    node.children.borrow().iter().find_map(|c| find_element(c, tag))
}

fn convert(handle: &Handle) -> Option<DocumentNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(DocumentNode::text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.to_string().to_ascii_lowercase();
            let mut node = DocumentNode::new(NodeKind::from_tag(&tag));
            for attr in attrs.borrow().iter() {
                node.attrs
                    .insert(attr.name.local.to_string(), attr.value.to_string());
            }
            node.children = handle.children.borrow().iter().filter_map(convert).collect();
            Some(node)
        }
        _ => None,
    }
}
