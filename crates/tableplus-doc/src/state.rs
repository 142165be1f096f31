#![forbid(unsafe_code)]

//! Editor state snapshots.

use crate::error::DispatchError;
use crate::node::Node;
use crate::step::Assoc;
use crate::transaction::Transaction;

/// A text selection as an anchor/head pair of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// Collapsed selection at `pos`.
    #[must_use]
    pub const fn cursor(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Selection from `anchor` to `head`.
    #[must_use]
    pub const fn range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Lower bound.
    #[must_use]
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound.
    #[must_use]
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Whether anchor and head coincide.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Map through a transaction and clamp into `doc`.
    #[must_use]
    pub fn map(&self, tr: &Transaction, doc: &Node) -> Self {
        let mapping = tr.mapping();
        let limit = doc.content_size();
        Self {
            anchor: mapping.map(self.anchor, Assoc::After).min(limit),
            head: mapping.map(self.head, Assoc::After).min(limit),
        }
    }
}

/// An immutable snapshot: document, selection, and a version counter that
/// increases with every document change.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    version: u64,
}

impl EditorState {
    /// Fresh state at version 0 with the cursor at the start.
    #[must_use]
    pub fn new(doc: Node) -> Self {
        Self {
            doc,
            selection: Selection::default(),
            version: 0,
        }
    }

    /// Current document.
    #[must_use]
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Document version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Copy with a new selection, clamped to the document.
    #[must_use]
    pub fn with_selection(&self, selection: Selection) -> Self {
        let limit = self.doc.content_size();
        Self {
            selection: Selection::range(selection.anchor.min(limit), selection.head.min(limit)),
            ..self.clone()
        }
    }

    /// Begin a transaction on this state.
    #[must_use]
    pub fn tr(&self) -> Transaction {
        Transaction::new(self.doc.clone(), self.version)
    }

    /// Produce the state after `tr`.
    ///
    /// The transaction must have been built on this exact version. Its
    /// steps were already applied while it was built, so the resulting
    /// document is taken as is.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, DispatchError> {
        if tr.base_version() != self.version {
            return Err(DispatchError::Stale {
                base_version: tr.base_version(),
                current_version: self.version,
            });
        }
        let doc = tr.doc().clone();
        let selection = match tr.selection() {
            Some(sel) => {
                let limit = doc.content_size();
                Selection::range(sel.anchor.min(limit), sel.head.min(limit))
            }
            None => self.selection.map(tr, &doc),
        };
        let version = if tr.doc_changed() {
            self.version + 1
        } else {
            self.version
        };
        Ok(Self {
            doc,
            selection,
            version,
        })
    }
}
