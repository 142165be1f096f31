#![forbid(unsafe_code)]

//! Document edit errors.

use std::fmt;

use crate::node::NodeType;

/// A step could not be applied to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// Position lies outside the document.
    PositionOutOfRange { pos: usize, size: usize },
    /// `from` is after `to`.
    InvertedRange { from: usize, to: usize },
    /// The range does not start and end inside one parent.
    UnalignedReplace { from: usize, to: usize },
    /// Inserted node is not allowed in the target parent.
    InvalidContent { parent: NodeType, child: NodeType },
    /// No node starts at the position.
    NoNodeAt { pos: usize },
    /// Attributes cannot be set on text.
    TextNodeAttrs { pos: usize },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionOutOfRange { pos, size } => {
                write!(f, "position {pos} out of range (document size {size})")
            }
            Self::InvertedRange { from, to } => write!(f, "inverted range {from}..{to}"),
            Self::UnalignedReplace { from, to } => {
                write!(f, "range {from}..{to} does not lie in a single parent")
            }
            Self::InvalidContent { parent, child } => {
                write!(f, "{child} is not allowed inside {parent}")
            }
            Self::NoNodeAt { pos } => write!(f, "no node starts at position {pos}"),
            Self::TextNodeAttrs { pos } => {
                write!(f, "cannot set attributes on text node at {pos}")
            }
        }
    }
}

impl std::error::Error for StepError {}

/// A transaction could not be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The transaction was built from an older state.
    Stale { base_version: u64, current_version: u64 },
    /// A step failed while the host re-applied the transaction.
    Step(StepError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale {
                base_version,
                current_version,
            } => write!(
                f,
                "stale transaction: built on version {base_version}, state is at {current_version}"
            ),
            Self::Step(err) => write!(f, "step failed: {err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step(err) => Some(err),
            Self::Stale { .. } => None,
        }
    }
}

impl From<StepError> for DispatchError {
    fn from(err: StepError) -> Self {
        Self::Step(err)
    }
}
