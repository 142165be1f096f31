#![forbid(unsafe_code)]

//! Edit steps and position mapping.
//!
//! A [`Step`] is the atomic unit of change. Replace steps carry the range
//! they replaced and the nodes they inserted, which is everything the
//! reconciliation engine needs to reason about cell insertion and removal.
//! Attribute steps replace a single node's attributes and never move
//! positions.

use crate::error::StepError;
use crate::node::{Attrs, Node};

/// Replace `from..to` with `content`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceStep {
    pub from: usize,
    pub to: usize,
    pub content: Vec<Node>,
}

impl ReplaceStep {
    /// Create a replace step.
    #[must_use]
    pub fn new(from: usize, to: usize, content: Vec<Node>) -> Self {
        Self { from, to, content }
    }

    /// Token size of the inserted content.
    #[must_use]
    pub fn inserted_size(&self) -> usize {
        self.content.iter().map(Node::node_size).sum()
    }

    /// Whether the step removes anything.
    #[must_use]
    pub fn removes(&self) -> bool {
        self.to > self.from
    }
}

/// Replace the attributes of the node at `pos`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrStep {
    pub pos: usize,
    pub attrs: Attrs,
}

/// One atomic document change.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Replace(ReplaceStep),
    Attr(AttrStep),
}

impl Step {
    /// Apply the step, producing a new document.
    pub fn apply(&self, doc: &Node) -> Result<Node, StepError> {
        match self {
            Self::Replace(step) => doc.replace(step.from, step.to, &step.content),
            Self::Attr(step) => doc.set_node_attrs(step.pos, step.attrs.clone()),
        }
    }

    /// How this step moves positions.
    #[must_use]
    pub fn map(&self) -> StepMap {
        match self {
            Self::Replace(step) => {
                StepMap::range(step.from, step.to.saturating_sub(step.from), step.inserted_size())
            },
            Self::Attr(_) => StepMap::identity(),
        }
    }

    /// The replace step, if this is one.
    #[must_use]
    pub fn as_replace(&self) -> Option<&ReplaceStep> {
        match self {
            Self::Replace(step) => Some(step),
            Self::Attr(_) => None,
        }
    }
}

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before inserted content.
    Before,
    /// Move past inserted content.
    #[default]
    After,
}

/// Position map of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepMap {
    range: Option<(usize, usize, usize)>,
}

impl StepMap {
    /// A map that moves nothing.
    #[must_use]
    pub const fn identity() -> Self {
        Self { range: None }
    }

    /// `old_size` tokens at `start` became `new_size` tokens.
    #[must_use]
    pub const fn range(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            range: Some((start, old_size, new_size)),
        }
    }

    /// Map a position through this step.
    #[must_use]
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let Some((start, old_size, new_size)) = self.range else {
            return pos;
        };
        let end = start + old_size;
        if pos < start {
            return pos;
        }
        if pos > end {
            return pos - old_size + new_size;
        }
        let stick_before = if old_size == 0 {
            assoc == Assoc::Before
        } else if pos == start {
            true
        } else if pos == end {
            false
        } else {
            assoc == Assoc::Before
        };
        if stick_before { start } else { start + new_size }
    }

    /// Whether this step removed all of `from..to`.
    #[must_use]
    pub fn covers(&self, from: usize, to: usize) -> bool {
        self.range.is_some_and(|(start, old_size, _)| {
            old_size > 0 && start <= from && to <= start + old_size
        })
    }
}

/// A sequence of step maps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    /// Build from step maps in application order.
    #[must_use]
    pub fn new(maps: Vec<StepMap>) -> Self {
        Self { maps }
    }

    /// Append another map.
    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Append every map of another mapping.
    pub fn extend(&mut self, other: &Mapping) {
        self.maps.extend_from_slice(&other.maps);
    }

    /// Map a position through every step.
    #[must_use]
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps.iter().fold(pos, |pos, map| map.map(pos, assoc))
    }

    /// Map the node range `from..to` through every step, or `None` once a
    /// step removes the whole range or collapses it.
    ///
    /// The start sticks after content inserted at it and the end sticks
    /// before, so neighbours growing at either edge never widen the range.
    #[must_use]
    pub fn map_span(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        self.maps.iter().try_fold((from, to), |(from, to), map| {
            if map.covers(from, to) {
                return None;
            }
            let span = (map.map(from, Assoc::After), map.map(to, Assoc::Before));
            (span.0 < span.1).then_some(span)
        })
    }

    /// Number of maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    /// Whether there are no maps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
