#![forbid(unsafe_code)]

//! Core: geometry, pointer events, text direction, and reactive signals.
//!
//! # Role in tableplus
//! `tableplus-core` is the input layer. It owns the host-agnostic types the
//! resize controller consumes: bounding boxes in CSS pixels, a generic
//! pointer-drag primitive, and the effective text direction of the editing
//! surface.
//!
//! # How it fits in the system
//! `tableplus-layout` builds handle geometry on top of [`geometry::Rect`].
//! `tableplus-widgets` drives its drag lifecycle from [`event::PointerEvent`]
//! and watches [`direction::DirectionHints`] through [`reactive::Observable`]
//! so right-to-left layout is re-evaluated even when the document does not
//! change.

pub mod direction;
pub mod event;
pub mod geometry;
pub mod reactive;

pub use direction::{DirectionHints, RTL_LANGUAGES, TextDirection};
pub use event::{PointerButton, PointerEvent, PointerEventKind};
pub use geometry::{Point, Rect};
pub use reactive::{Observable, Subscription};
