#![forbid(unsafe_code)]

//! Presentation model of the resize overlay.
//!
//! The controller does not draw. It hands the host an [`OverlayView`]: the
//! CSS custom properties to publish on the table element and one
//! [`HandleView`] per column seam, already mirrored for the resolved text
//! direction.

use std::fmt::Write as _;

use tableplus_core::TextDirection;
use tableplus_doc::markup::BORDER_COLOR_VAR;
use tableplus_layout::ColumnWidths;

/// Custom property carrying the column count.
pub const CELL_COUNT_VAR: &str = "--cell-count";
/// Custom property carrying the grid tracks, e.g. `30% 30% 40%`.
pub const CELL_PERCENTAGE_VAR: &str = "--cell-percentage";

/// Edge a handle's offset is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleAnchor {
    Left,
    Right,
}

impl HandleAnchor {
    /// Leading edge for a direction.
    #[must_use]
    pub const fn leading(direction: TextDirection) -> Self {
        match direction {
            TextDirection::Ltr => Self::Left,
            TextDirection::Rtl => Self::Right,
        }
    }

    /// CSS property name.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Centering transform for a handle anchored on this edge.
    #[must_use]
    pub const fn transform(self) -> &'static str {
        match self {
            Self::Left => "translate(-50%, -50%)",
            Self::Right => "translate(50%, -50%)",
        }
    }
}

/// Visual style shared by every handle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleStyle {
    /// Edge length in pixels.
    pub size: f64,
    pub background: String,
}

impl HandleStyle {
    /// Inline declarations for the handle element.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            "position: absolute; top: 50%; width: {size}px; height: {size}px; \
             border-radius: 50%; background: {bg}; cursor: ew-resize;",
            size = self.size,
            bg = self.background,
        )
    }
}

/// One seam handle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleView {
    /// Column whose trailing edge this handle sits on.
    pub index: usize,
    pub anchor: HandleAnchor,
    /// Percentage of the table box from `anchor`.
    pub offset: f64,
    /// Whether pointer-down on this handle can start a drag.
    pub interactive: bool,
    /// Whether this handle is the one being dragged.
    pub active: bool,
}

impl HandleView {
    /// Inline position declarations, e.g. `left: 30%; transform: ...`.
    #[must_use]
    pub fn css(&self) -> String {
        let opposite = match self.anchor {
            HandleAnchor::Left => HandleAnchor::Right,
            HandleAnchor::Right => HandleAnchor::Left,
        };
        format!(
            "{}: {}%; {}: auto; transform: {};",
            self.anchor.as_css(),
            self.offset,
            opposite.as_css(),
            self.anchor.transform()
        )
    }
}

/// Everything the host needs to render one table's overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayView {
    pub direction: TextDirection,
    pub cell_count: usize,
    /// Live widths (the drag preview while dragging).
    pub cell_percentage: ColumnWidths,
    pub handles: Vec<HandleView>,
    pub handle_style: HandleStyle,
    /// The table's own border colour, else the configured default.
    pub border_color: String,
    /// Show the lock indicator and no interactive handles.
    pub locked: bool,
}

impl OverlayView {
    /// Custom properties to set on the table element.
    #[must_use]
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            (CELL_COUNT_VAR, self.cell_count.to_string()),
            (CELL_PERCENTAGE_VAR, self.cell_percentage.to_css_tracks()),
            (BORDER_COLOR_VAR, self.border_color.clone()),
        ]
    }

    /// The custom properties as one inline style string.
    #[must_use]
    pub fn style(&self) -> String {
        let mut out = String::new();
        for (name, value) in self.css_variables() {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{name}: {value};");
        }
        out
    }

    /// Handles the user can grab.
    pub fn interactive_handles(&self) -> impl Iterator<Item = &HandleView> {
        self.handles.iter().filter(|h| h.interactive)
    }
}
