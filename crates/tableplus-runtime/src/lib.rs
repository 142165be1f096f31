#![forbid(unsafe_code)]

//! Editor runtime for tableplus.
//!
//! # Role in tableplus
//! `tableplus-runtime` hosts documents: [`Editor`] applies transactions and
//! runs the [`Plugin`] chain, [`ColumnWidthReconciler`] keeps each table's
//! width vector consistent with its column count after structural edits,
//! and [`TablePlusConfig`] carries every tunable.
//!
//! # How it fits in the system
//! Commands and the resize controller (in `tableplus-widgets`) only see an
//! [`tableplus_doc::EditorHost`]; `Editor` is the in-memory implementation.
//! Each dispatch is atomic from the outside: the reconciler's correction is
//! applied before the new state is published.

pub mod config;
pub mod editor;
pub mod plugin;
pub mod reconcile;

pub use config::{ConfigError, ReconcileConfig, ResizeConfig, TableConfig, TablePlusConfig};
pub use editor::{DEFAULT_MAX_APPEND_ROUNDS, Editor};
pub use plugin::Plugin;
pub use reconcile::{CellEdit, ColumnWidthReconciler, PLUGIN_KEY, SkipReason};
