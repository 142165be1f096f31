#![forbid(unsafe_code)]

//! The host collaboration contract.
//!
//! Commands and the resize controller never touch a concrete editor; they
//! read the current [`EditorState`] and hand transactions back through
//! [`EditorHost::dispatch`].

use crate::error::{DispatchError, StepError};
use crate::node::{Attrs, Node, NodeType};
use crate::state::EditorState;
use crate::transaction::Transaction;

/// An editor that owns a state and accepts transactions.
pub trait EditorHost {
    /// Current state.
    fn state(&self) -> &EditorState;

    /// Apply a transaction built on the current state.
    fn dispatch(&mut self, tr: Transaction) -> Result<(), DispatchError>;
}

/// An ancestor located from a position.
#[derive(Debug, Clone, Copy)]
pub struct FoundNode<'a> {
    pub node: &'a Node,
    /// Position directly before the node.
    pub pos: usize,
    /// Position of the start of the node's content.
    pub start: usize,
    pub depth: usize,
}

/// Innermost ancestor of `pos` with type `kind`.
#[must_use]
pub fn find_parent_node_of_type(doc: &Node, pos: usize, kind: NodeType) -> Option<FoundNode<'_>> {
    let resolved = doc.resolve(pos).ok()?;
    (1..=resolved.depth()).rev().find_map(|depth| {
        let node = resolved.node(depth);
        (node.kind() == kind).then(|| FoundNode {
            node,
            pos: resolved.before(depth).unwrap_or_default(),
            start: resolved.start(depth),
            depth,
        })
    })
}

/// The table containing the selection head.
#[must_use]
pub fn find_parent_table_of_selection(state: &EditorState) -> Option<FoundNode<'_>> {
    find_parent_node_of_type(state.doc(), state.selection().head, NodeType::Table)
}

/// A transaction replacing the attributes of the node at `pos`.
pub fn apply_attribute_change(
    state: &EditorState,
    pos: usize,
    attrs: Attrs,
) -> Result<Transaction, StepError> {
    let mut tr = state.tr();
    tr.set_node_attrs(pos, attrs)?;
    Ok(tr)
}

/// Depth-first, pre-order walk over every descendant of `node`.
///
/// Positions are relative to the start of `node`'s content.
pub fn for_each_descendant(node: &Node, mut visit: impl FnMut(&Node, usize) -> bool) {
    node.descendants(&mut visit);
}
