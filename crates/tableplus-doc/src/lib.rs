#![forbid(unsafe_code)]

//! Host document model.
//!
//! # Role in tableplus
//! The reconciliation engine and the resize controller only ever see the
//! host editor through this crate: immutable [`Node`] snapshots addressed by
//! integer positions, [`Step`]s that replace a range or set a node's
//! attributes, and [`Transaction`]s that record the document before each
//! step so a consumer can inspect exactly what every step did.
//!
//! # Positions
//! Positions count tokens the way ProseMirror does: entering or leaving a
//! non-text node is one token, every character of a text node is one
//! token. Position 0 is the start of the document's content.

pub mod builders;
pub mod error;
pub mod host;
pub mod markup;
pub mod node;
pub mod resolve;
pub mod state;
pub mod step;
pub mod table;
pub mod transaction;

pub use error::{DispatchError, StepError};
pub use host::{
    EditorHost, FoundNode, apply_attribute_change, find_parent_node_of_type,
    find_parent_table_of_selection, for_each_descendant,
};
pub use node::{AttrValue, Attrs, Node, NodeType};
pub use resolve::ResolvedPos;
pub use state::{EditorState, Selection};
pub use step::{Assoc, AttrStep, Mapping, ReplaceStep, Step, StepMap};
pub use table::{AuthoritativeRow, CellSpan, RowRef, authoritative_row};
pub use transaction::{Transaction, TransactionOrigin};
