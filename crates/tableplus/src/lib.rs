#![forbid(unsafe_code)]

//! tableplus public facade crate.
//!
//! Tables whose column widths survive structural edits. This crate
//! re-exports the pieces a host needs: the document model, an in-memory
//! [`Editor`] with the width reconciler installed, the per-table resize
//! controller, and the table commands.
//!
//! ```
//! use tableplus::prelude::*;
//! use tableplus::doc::builders::{cell, doc, row, table};
//!
//! let d = doc(vec![
//!     table(vec![row(vec![cell("a"), cell("b"), cell("c")])])
//!         .with_attr(COLUMN_WIDTHS, "30,30,40"),
//! ]);
//! let mut editor = Editor::with_table_plus(d, &TablePlusConfig::default());
//!
//! // Delete the middle cell (positions 7..12).
//! let mut tr = editor.state().tr();
//! tr.delete(7, 12)?;
//! editor.dispatch(tr)?;
//!
//! let t = editor.state().doc().child(0).expect("table");
//! assert_eq!(t.attr_str(COLUMN_WIDTHS), Some("30,40"));
//! # Ok::<(), tableplus::Error>(())
//! ```

pub mod error;
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use tableplus_core::{
    DirectionHints, Observable, Point, PointerButton, PointerEvent, PointerEventKind, Rect,
    Subscription, TextDirection,
};

// --- Layout re-exports -----------------------------------------------------

pub use tableplus_layout::ColumnWidths;

// --- Document re-exports ---------------------------------------------------

pub use tableplus_doc::table::{
    BACKGROUND_COLOR, BORDER_COLOR, COLUMN_WIDTHS, LOCKED, TEXT_ALIGN,
};
pub use tableplus_doc::{
    DispatchError, EditorHost, EditorState, Node, NodeType, Selection, StepError, Transaction,
    TransactionOrigin,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tableplus_runtime::{
    ColumnWidthReconciler, ConfigError, Editor, Plugin, ResizeConfig, TablePlusConfig,
};

// --- Widget re-exports -----------------------------------------------------

pub use tableplus_widgets::{
    CommitOutcome, OverlayView, TableCommand, TableResizeController, TableViews, TextAlign,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        COLUMN_WIDTHS, ColumnWidths, CommitOutcome, DirectionHints, Editor, EditorHost, Error,
        Node, Observable, PointerEvent, Rect, Result, TableCommand, TablePlusConfig,
        TableResizeController, TableViews,
    };

    pub use crate::{core, doc, layout, runtime, widgets};
}

pub use tableplus_core as core;
pub use tableplus_doc as doc;
pub use tableplus_layout as layout;
pub use tableplus_runtime as runtime;
pub use tableplus_widgets as widgets;
