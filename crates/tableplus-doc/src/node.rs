#![forbid(unsafe_code)]

//! Immutable document nodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StepError;
use crate::resolve::ResolvedPos;

/// Node types known to the table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Text,
    Table,
    TableRowGroup,
    TableRow,
    TableCell,
    TableHeader,
}

impl NodeType {
    /// Schema name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::Table => "table",
            Self::TableRowGroup => "tableRowGroup",
            Self::TableRow => "tableRow",
            Self::TableCell => "tableCell",
            Self::TableHeader => "tableHeader",
        }
    }

    /// `tableCell` or `tableHeader`.
    #[must_use]
    pub const fn is_cell(self) -> bool {
        matches!(self, Self::TableCell | Self::TableHeader)
    }

    /// Whether nodes of this type may appear directly inside `self`.
    #[must_use]
    pub const fn allows_child(self, child: NodeType) -> bool {
        match self {
            Self::Doc => matches!(child, Self::Paragraph | Self::Table),
            Self::Paragraph => matches!(child, Self::Text),
            Self::Text => false,
            Self::Table => matches!(child, Self::TableRowGroup | Self::TableRow),
            Self::TableRowGroup => matches!(child, Self::TableRow),
            Self::TableRow => child.is_cell(),
            Self::TableCell | Self::TableHeader => matches!(child, Self::Paragraph | Self::Table),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl AttrValue {
    /// The string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The string value if this is a non-empty string.
    #[must_use]
    pub fn as_non_empty_str(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    /// Truthiness: `true`, non-zero numbers, and non-empty strings.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Attribute map of a node.
pub type Attrs = BTreeMap<String, AttrValue>;

/// An immutable document node.
///
/// Text nodes carry a string and no children; every other node carries an
/// ordered child list. The token size is cached at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: NodeType,
    attrs: Attrs,
    content: Vec<Node>,
    text: String,
    size: usize,
}

impl Node {
    /// Create an element node.
    #[must_use]
    pub fn new(kind: NodeType, attrs: Attrs, content: Vec<Node>) -> Self {
        debug_assert!(kind != NodeType::Text, "use Node::text for text nodes");
        let content_size: usize = content.iter().map(Node::node_size).sum();
        let size = if kind == NodeType::Doc {
            content_size
        } else {
            content_size + 2
        };
        Self {
            kind,
            attrs,
            content,
            text: String::new(),
            size,
        }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let size = text.chars().count();
        Self {
            kind: NodeType::Text,
            attrs: Attrs::new(),
            content: Vec::new(),
            text,
            size,
        }
    }

    /// Node type.
    #[must_use]
    pub const fn kind(&self) -> NodeType {
        self.kind
    }

    /// Whether this is a text node.
    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == NodeType::Text
    }

    /// Attributes.
    #[must_use]
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    /// A single attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// A string attribute, ignoring nulls and empty strings.
    #[must_use]
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(AttrValue::as_non_empty_str)
    }

    /// Children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.content
    }

    /// Child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.content.get(index)
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.content.len()
    }

    /// Text of a text node (empty for elements).
    #[must_use]
    pub fn text_str(&self) -> &str {
        &self.text
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        if self.is_text() {
            return self.text.clone();
        }
        let mut out = String::new();
        self.descendants(&mut |node, _| {
            if node.is_text() {
                out.push_str(&node.text);
            }
            true
        });
        out
    }

    /// Size in position tokens.
    #[must_use]
    pub const fn node_size(&self) -> usize {
        self.size
    }

    /// Size of the content (excludes the opening and closing tokens).
    #[must_use]
    pub fn content_size(&self) -> usize {
        match self.kind {
            NodeType::Text => self.size,
            NodeType::Doc => self.size,
            _ => self.size - 2,
        }
    }

    /// Copy with attributes replaced.
    #[must_use]
    pub fn with_attrs(&self, attrs: Attrs) -> Self {
        Self {
            attrs,
            ..self.clone()
        }
    }

    /// Copy with one attribute set.
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Copy with the child list replaced.
    #[must_use]
    pub fn with_content(&self, content: Vec<Node>) -> Self {
        Self::new(self.kind, self.attrs.clone(), content)
    }

    /// Children paired with their offsets inside this node's content.
    pub fn children_with_offsets(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.content.iter().scan(0usize, |offset, child| {
            let start = *offset;
            *offset += child.node_size();
            Some((start, child))
        })
    }

    /// Visit every descendant overlapping `from..to` (content-relative),
    /// depth-first, pre-order.
    ///
    /// The visitor receives each node and its position; returning `false`
    /// skips that node's children.
    pub fn nodes_between(&self, from: usize, to: usize, f: &mut dyn FnMut(&Node, usize) -> bool) {
        self.nodes_between_at(from, to, f, 0);
    }

    fn nodes_between_at(
        &self,
        from: usize,
        to: usize,
        f: &mut dyn FnMut(&Node, usize) -> bool,
        base: usize,
    ) {
        let mut pos = 0usize;
        for child in &self.content {
            if pos >= to {
                break;
            }
            let end = pos + child.node_size();
            if end > from && f(child, base + pos) && !child.is_text() && !child.content.is_empty() {
                let start = pos + 1;
                child.nodes_between_at(
                    from.saturating_sub(start),
                    to.saturating_sub(start).min(child.content_size()),
                    f,
                    base + start,
                );
            }
            pos = end;
        }
    }

    /// Visit every descendant, depth-first, pre-order.
    pub fn descendants(&self, f: &mut dyn FnMut(&Node, usize) -> bool) {
        self.nodes_between(0, self.content_size(), f);
    }

    /// Resolve a content-relative position.
    pub fn resolve(&self, pos: usize) -> Result<ResolvedPos<'_>, StepError> {
        ResolvedPos::resolve(self, pos)
    }

    /// The node starting exactly at `pos`, if any.
    #[must_use]
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        self.resolve(pos).ok().and_then(|r| r.node_after())
    }

    /// Replace `from..to` with `nodes`, returning the new tree.
    ///
    /// Both ends must lie in the same parent, each either on a child
    /// boundary or inside a text child. Every inserted node must be allowed
    /// in that parent.
    pub fn replace(&self, from: usize, to: usize, nodes: &[Node]) -> Result<Node, StepError> {
        if from > to {
            return Err(StepError::InvertedRange { from, to });
        }
        let rfrom = self.resolve(from)?;
        let rto = self.resolve(to)?;
        let depth = rfrom.shared_depth(to);
        if rfrom.depth() != depth || rto.depth() != depth {
            return Err(StepError::UnalignedReplace { from, to });
        }
        let parent = rfrom.node(depth);
        if let Some(bad) = nodes.iter().find(|n| !parent.kind.allows_child(n.kind)) {
            return Err(StepError::InvalidContent {
                parent: parent.kind,
                child: bad.kind,
            });
        }
        let content = splice(
            parent.children(),
            rfrom.parent_offset(),
            rto.parent_offset(),
            nodes,
        );
        let path: Vec<usize> = (0..depth).map(|d| rfrom.index(d)).collect();
        Ok(self.map_descendant(&path, &mut |node| node.with_content(content.clone())))
    }

    /// Replace the attributes of the node starting at `pos`.
    pub fn set_node_attrs(&self, pos: usize, attrs: Attrs) -> Result<Node, StepError> {
        let resolved = self.resolve(pos)?;
        let target = resolved.node_after().ok_or(StepError::NoNodeAt { pos })?;
        if target.is_text() {
            return Err(StepError::TextNodeAttrs { pos });
        }
        let depth = resolved.depth();
        let path: Vec<usize> = (0..=depth).map(|d| resolved.index(d)).collect();
        Ok(self.map_descendant(&path, &mut |node| node.with_attrs(attrs.clone())))
    }

    fn map_descendant(&self, path: &[usize], f: &mut dyn FnMut(&Node) -> Node) -> Node {
        match path.split_first() {
            None => f(self),
            Some((&index, rest)) => {
                let mut content = self.content.clone();
                if let Some(child) = content.get_mut(index) {
                    *child = child.map_descendant(rest, f);
                }
                self.with_content(content)
            }
        }
    }

    fn char_slice(&self, start: usize, end: usize) -> Node {
        Node::text(
            self.text
                .chars()
                .skip(start)
                .take(end.saturating_sub(start))
                .collect::<String>(),
        )
    }
}

/// Rebuild a child list with `from..to` (content offsets) replaced by
/// `inserted`, splitting text children at the edges and merging adjacent
/// text afterwards.
fn splice(children: &[Node], from: usize, to: usize, inserted: &[Node]) -> Vec<Node> {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut pos = 0usize;
    for child in children {
        let end = pos + child.node_size();
        if end <= from {
            before.push(child.clone());
        } else if pos >= to {
            after.push(child.clone());
        } else if child.is_text() {
            if from > pos {
                before.push(child.char_slice(0, from - pos));
            }
            if to < end {
                after.push(child.char_slice(to - pos, end - pos));
            }
        }
        pos = end;
    }

    let mut out: Vec<Node> = Vec::with_capacity(before.len() + inserted.len() + after.len());
    for node in before.into_iter().chain(inserted.iter().cloned()).chain(after) {
        if node.is_text() && node.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.is_text() && node.is_text() && last.attrs == node.attrs => {
                let merged = format!("{}{}", last.text, node.text);
                *last = Node::text(merged);
            }
            _ => out.push(node),
        }
    }
    out
}
