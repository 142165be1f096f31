#![forbid(unsafe_code)]

//! Transactions: a base document plus an ordered list of applied steps.
//!
//! Every step is applied eagerly when added, so a transaction always knows
//! the document each step saw (`doc_before_step`) and the final document.
//! The reconciliation engine relies on this to classify steps against the
//! exact tree they edited.

use std::fmt;

use crate::error::StepError;
use crate::node::{AttrValue, Attrs, Node};
use crate::state::Selection;
use crate::step::{AttrStep, Mapping, ReplaceStep, Step, StepMap};

/// Who produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionOrigin {
    /// Direct user editing.
    #[default]
    User,
    /// A named editor command.
    Command(&'static str),
    /// A plugin's appended transaction.
    Plugin(&'static str),
    /// An interactive column resize commit.
    Resize,
}

impl fmt::Display for TransactionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Command(name) => write!(f, "command:{name}"),
            Self::Plugin(key) => write!(f, "plugin:{key}"),
            Self::Resize => f.write_str("resize"),
        }
    }
}

/// An ordered group of steps built against one state version.
#[derive(Debug, Clone)]
pub struct Transaction {
    base_version: u64,
    docs: Vec<Node>,
    doc: Node,
    steps: Vec<Step>,
    maps: Vec<StepMap>,
    origin: TransactionOrigin,
    selection: Option<Selection>,
}

impl Transaction {
    /// Start an empty transaction on `doc`, which is at `base_version`.
    #[must_use]
    pub fn new(doc: Node, base_version: u64) -> Self {
        Self {
            base_version,
            docs: Vec::new(),
            doc,
            steps: Vec::new(),
            maps: Vec::new(),
            origin: TransactionOrigin::default(),
            selection: None,
        }
    }

    /// Version of the state this transaction was built on.
    #[must_use]
    pub const fn base_version(&self) -> u64 {
        self.base_version
    }

    /// Document before any step.
    #[must_use]
    pub fn before(&self) -> &Node {
        self.docs.first().unwrap_or(&self.doc)
    }

    /// Document after every step.
    #[must_use]
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// Steps in application order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Document the step at `index` was applied to.
    #[must_use]
    pub fn doc_before_step(&self, index: usize) -> Option<&Node> {
        self.docs.get(index)
    }

    /// Position mapping across every step.
    #[must_use]
    pub fn mapping(&self) -> Mapping {
        Mapping::new(self.maps.clone())
    }

    /// Position mapping across the steps from `index` onward.
    #[must_use]
    pub fn mapping_from(&self, index: usize) -> Mapping {
        Mapping::new(self.maps.get(index..).unwrap_or_default().to_vec())
    }

    /// Whether any step changed the document.
    #[must_use]
    pub fn doc_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Apply and record a step. A failing step leaves the transaction
    /// untouched.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let next = step.apply(&self.doc)?;
        let prev = std::mem::replace(&mut self.doc, next);
        self.docs.push(prev);
        self.maps.push(step.map());
        self.steps.push(step);
        Ok(self)
    }

    /// Replace `from..to` with `content`.
    pub fn replace_with(
        &mut self,
        from: usize,
        to: usize,
        content: Vec<Node>,
    ) -> Result<&mut Self, StepError> {
        self.step(Step::Replace(ReplaceStep::new(from, to, content)))
    }

    /// Insert `content` at `pos`.
    pub fn insert(&mut self, pos: usize, content: Vec<Node>) -> Result<&mut Self, StepError> {
        self.replace_with(pos, pos, content)
    }

    /// Delete `from..to`.
    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        self.replace_with(from, to, Vec::new())
    }

    /// Replace every attribute of the node at `pos`.
    pub fn set_node_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, StepError> {
        self.step(Step::Attr(AttrStep { pos, attrs }))
    }

    /// Set one attribute of the node at `pos`, keeping the others.
    pub fn set_node_attr(
        &mut self,
        pos: usize,
        key: &str,
        value: impl Into<AttrValue>,
    ) -> Result<&mut Self, StepError> {
        let node = self.doc.node_at(pos).ok_or(StepError::NoNodeAt { pos })?;
        let mut attrs = node.attrs().clone();
        attrs.insert(key.to_string(), value.into());
        self.set_node_attrs(pos, attrs)
    }

    /// Request a selection for the resulting state.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    /// Explicitly requested selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Tag the transaction's origin.
    #[must_use]
    pub fn with_origin(mut self, origin: TransactionOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Who produced this transaction.
    #[must_use]
    pub const fn origin(&self) -> TransactionOrigin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{cell, doc, row, table};
    use crate::step::Assoc;

    fn sample() -> Node {
        doc(vec![table(vec![row(vec![cell("ab"), cell("cd")])])])
    }

    #[test]
    fn records_doc_before_each_step() {
        let mut tr = Transaction::new(sample(), 0);
        tr.delete(8, 14).expect("delete cell");
        tr.insert(8, vec![cell("x")]).expect("insert cell");
        assert_eq!(tr.steps().len(), 2);
        assert_eq!(tr.before(), &sample());
        assert_eq!(tr.doc_before_step(0), Some(&sample()));
        assert_eq!(
            tr.doc_before_step(1).map(Node::content_size),
            Some(10),
            "second step sees the shrunken table"
        );
        assert_eq!(tr.doc().text_content(), "abx");
        assert!(tr.doc_before_step(2).is_none());
    }

    #[test]
    fn failed_step_leaves_transaction_unchanged() {
        let mut tr = Transaction::new(sample(), 3);
        assert!(tr.delete(3, 9).is_err());
        assert!(!tr.doc_changed());
        assert_eq!(tr.doc(), &sample());
        assert_eq!(tr.base_version(), 3);
    }

    #[test]
    fn set_node_attr_merges() {
        let mut tr = Transaction::new(sample(), 0);
        tr.set_node_attr(0, "locked", true).expect("lock");
        tr.set_node_attr(0, "borderColor", "red").expect("color");
        let t = &tr.doc().children()[0];
        assert_eq!(t.attr("locked"), Some(&AttrValue::Bool(true)));
        assert_eq!(t.attr_str("borderColor"), Some("red"));
        assert!(matches!(
            tr.set_node_attr(5, "x", true),
            Err(StepError::NoNodeAt { pos: 5 })
        ));
    }

    #[test]
    fn mapping_from_skips_earlier_steps() {
        let mut tr = Transaction::new(sample(), 0);
        tr.insert(2, vec![cell("z")]).expect("insert first");
        tr.set_node_attr(0, "locked", true).expect("attr");
        assert_eq!(tr.mapping().map(8, Assoc::After), 13);
        assert_eq!(tr.mapping_from(1).map(8, Assoc::After), 8);
        assert!(tr.mapping_from(9).is_empty());
    }

    #[test]
    fn origin_display() {
        let tr = Transaction::new(sample(), 0).with_origin(TransactionOrigin::Plugin("widths"));
        assert_eq!(tr.origin().to_string(), "plugin:widths");
        assert_eq!(TransactionOrigin::default(), TransactionOrigin::User);
    }
}
