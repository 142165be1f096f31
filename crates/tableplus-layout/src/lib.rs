#![forbid(unsafe_code)]

//! Column-width vectors and resize-handle geometry.
//!
//! # Role in tableplus
//! A table's `columnWidths` attribute is a comma-joined list of percentages.
//! [`ColumnWidths`] is the codec for it plus the arithmetic the
//! reconciliation engine needs (remove a block, insert equal shares).
//! [`handles`] holds the pixel/percent conversions the resize overlay
//! performs while a seam handle is dragged.

pub mod handles;
pub mod widths;

pub use tableplus_core::geometry::{Point, Rect};

pub use handles::{
    HandleNeighbors, clamp_handle_percent, handle_offsets, pointer_offset, widths_from_offsets,
};
pub use widths::{ColumnWidths, inserted_column_width, round2};
