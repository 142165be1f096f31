#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! The host delivers mouse, pen, and touch input as one generic
//! pointer-drag primitive: down at a point, zero or more moves, then up.
//! A cancel stands in for a lost pointer capture.
//!
//! # Design Notes
//!
//! - Coordinates are viewport CSS pixels, like a DOM `clientX`/`clientY`.
//! - `pointer_id` distinguishes concurrent touches; the resize overlay only
//!   follows the pointer that started the drag.

use crate::geometry::Point;

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// Pointer position in viewport pixels.
    pub position: Point,

    /// Identifier of the pointer that produced the event.
    pub pointer_id: u32,
}

impl PointerEvent {
    /// Create a new pointer event for the primary pointer.
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: Point::new(x, y),
            pointer_id: 0,
        }
    }

    /// Primary-button press at a point.
    #[must_use]
    pub const fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary), x, y)
    }

    /// Pointer move to a point.
    #[must_use]
    pub const fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    /// Primary-button release at a point.
    #[must_use]
    pub const fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up(PointerButton::Primary), x, y)
    }

    /// Set the pointer id.
    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn xy(&self) -> (f64, f64) {
        (self.position.x, self.position.y)
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Pointer moved (with or without a button held).
    Move,

    /// Button released.
    Up(PointerButton),

    /// The host lost the pointer (capture lost, window blur).
    Cancel,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointerButton {
    /// Left mouse button, pen contact, or touch.
    Primary,

    /// Right mouse button.
    Secondary,

    /// Middle mouse button.
    Auxiliary,
}
