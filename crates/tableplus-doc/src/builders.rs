#![forbid(unsafe_code)]

//! Terse constructors for documents, used by hosts, commands, and tests.

use crate::node::{Attrs, Node, NodeType};

/// Document root.
#[must_use]
pub fn doc(content: Vec<Node>) -> Node {
    Node::new(NodeType::Doc, Attrs::new(), content)
}

/// Paragraph holding `text` (empty text yields an empty paragraph).
#[must_use]
pub fn p(text: &str) -> Node {
    let content = if text.is_empty() {
        Vec::new()
    } else {
        vec![Node::text(text)]
    };
    Node::new(NodeType::Paragraph, Attrs::new(), content)
}

/// Table with default attributes.
#[must_use]
pub fn table(rows: Vec<Node>) -> Node {
    Node::new(NodeType::Table, Attrs::new(), rows)
}

/// Row group wrapper.
#[must_use]
pub fn row_group(rows: Vec<Node>) -> Node {
    Node::new(NodeType::TableRowGroup, Attrs::new(), rows)
}

/// Table row.
#[must_use]
pub fn row(cells: Vec<Node>) -> Node {
    Node::new(NodeType::TableRow, Attrs::new(), cells)
}

/// Body cell with one paragraph.
#[must_use]
pub fn cell(text: &str) -> Node {
    Node::new(NodeType::TableCell, Attrs::new(), vec![p(text)])
}

/// Header cell with one paragraph.
#[must_use]
pub fn header(text: &str) -> Node {
    Node::new(NodeType::TableHeader, Attrs::new(), vec![p(text)])
}

/// Empty cell of the same type and attributes as `template`.
#[must_use]
pub fn empty_like(template: &Node) -> Node {
    Node::new(template.kind(), template.attrs().clone(), vec![p("")])
}
