#![forbid(unsafe_code)]

//! Interactive table overlay and commands.
//!
//! # Role in tableplus
//! This crate is the part of tableplus a user touches. A
//! [`TableResizeController`] sits on top of each table node and turns
//! pointer drags on its seam handles into `columnWidths` commits;
//! [`TableViews`] keeps one controller per table in step with the document;
//! [`TableCommand`] covers the toolbar actions (alignment, lock, colours,
//! duplication, explicit widths).
//!
//! # How it fits in the system
//! Controllers and commands only see the editor through
//! [`tableplus_doc::EditorHost`]. Every transaction they dispatch passes
//! through the host's plugin chain, so structural commands are followed by
//! width reconciliation in the same dispatch.

pub mod commands;
pub mod drag;
pub mod overlay;
pub mod resize;
pub mod views;

pub use commands::{TableCommand, TextAlign};
pub use drag::{
    CancelReason, DragEffect, DragNoopReason, DragTransition, ResizeDragMachine, ResizeDragState,
};
pub use overlay::{
    CELL_COUNT_VAR, CELL_PERCENTAGE_VAR, HandleAnchor, HandleStyle, HandleView, OverlayView,
};
pub use resize::{CommitOutcome, RevertReason, TableResizeController};
pub use views::{SyncReport, TableViews};
