#![forbid(unsafe_code)]

//! Resolved positions.

use crate::error::StepError;
use crate::node::Node;

#[derive(Debug, Clone, Copy)]
struct PathEntry<'a> {
    node: &'a Node,
    /// Index of the child the position points into (or before).
    index: usize,
    /// Position of the start of `node`'s content.
    start: usize,
}

/// A position resolved against a tree: the chain of ancestors containing it
/// and where it falls in each.
///
/// Depth 0 is the root. Resolution stops descending at a child boundary or
/// inside a text node, so `node(depth())` is always an element.
#[derive(Debug, Clone)]
pub struct ResolvedPos<'a> {
    pos: usize,
    path: Vec<PathEntry<'a>>,
    parent_offset: usize,
    text_offset: usize,
}

impl<'a> ResolvedPos<'a> {
    pub(crate) fn resolve(root: &'a Node, pos: usize) -> Result<Self, StepError> {
        let size = root.content_size();
        if pos > size {
            return Err(StepError::PositionOutOfRange { pos, size });
        }
        let mut path = Vec::new();
        let mut node = root;
        let mut start = 0usize;
        let mut offset = pos;
        loop {
            let (index, child_start) = find_index(node, offset);
            let rem = offset - child_start;
            path.push(PathEntry { node, index, start });
            if rem == 0 {
                return Ok(Self {
                    pos,
                    path,
                    parent_offset: offset,
                    text_offset: 0,
                });
            }
            let Some(child) = node.child(index) else {
                return Err(StepError::PositionOutOfRange { pos, size });
            };
            if child.is_text() {
                return Ok(Self {
                    pos,
                    path,
                    parent_offset: offset,
                    text_offset: rem,
                });
            }
            node = child;
            start += child_start + 1;
            offset = rem - 1;
        }
    }

    /// The resolved position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Depth of the innermost element containing the position.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len() - 1
    }

    /// Ancestor at `depth`.
    #[must_use]
    pub fn node(&self, depth: usize) -> &'a Node {
        self.path[depth.min(self.depth())].node
    }

    /// Innermost element containing the position.
    #[must_use]
    pub fn parent(&self) -> &'a Node {
        self.node(self.depth())
    }

    /// Child index within the ancestor at `depth`.
    #[must_use]
    pub fn index(&self, depth: usize) -> usize {
        self.path[depth.min(self.depth())].index
    }

    /// Position of the start of the content of the ancestor at `depth`.
    #[must_use]
    pub fn start(&self, depth: usize) -> usize {
        self.path[depth.min(self.depth())].start
    }

    /// Position of the end of the content of the ancestor at `depth`.
    #[must_use]
    pub fn end(&self, depth: usize) -> usize {
        self.start(depth) + self.node(depth).content_size()
    }

    /// Position directly before the ancestor at `depth` (`depth >= 1`).
    #[must_use]
    pub fn before(&self, depth: usize) -> Option<usize> {
        if depth == 0 {
            None
        } else {
            Some(self.start(depth) - 1)
        }
    }

    /// Offset of the position inside its parent's content.
    #[must_use]
    pub const fn parent_offset(&self) -> usize {
        self.parent_offset
    }

    /// Offset inside a text child, 0 when on a child boundary.
    #[must_use]
    pub const fn text_offset(&self) -> usize {
        self.text_offset
    }

    /// The node starting exactly at this position.
    #[must_use]
    pub fn node_after(&self) -> Option<&'a Node> {
        if self.text_offset != 0 {
            return None;
        }
        self.parent().child(self.index(self.depth()))
    }

    /// Deepest depth whose content contains both this position and `pos`.
    #[must_use]
    pub fn shared_depth(&self, pos: usize) -> usize {
        (1..=self.depth())
            .rev()
            .find(|&d| self.start(d) <= pos && self.end(d) >= pos)
            .unwrap_or(0)
    }
}

/// Index of the child containing `offset` and that child's start offset.
/// An offset at the very end yields `(child_count, content_size)`.
fn find_index(node: &Node, offset: usize) -> (usize, usize) {
    for (index, (start, child)) in node.children_with_offsets().enumerate() {
        if offset < start + child.node_size() {
            return (index, start);
        }
    }
    (node.child_count(), node.content_size())
}
