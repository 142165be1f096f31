#![forbid(unsafe_code)]

//! Resize-handle geometry.
//!
//! Handle *i* sits on the trailing edge of column *i*, at the cumulative sum
//! of widths `0..=i`. Positions are percentages of the table box measured
//! from its leading edge (the left edge for left-to-right, the right edge
//! for right-to-left), so mirroring only changes how a pointer coordinate
//! is turned into an offset.

use tableplus_core::TextDirection;
use tableplus_core::geometry::Rect;

use crate::widths::round2;

/// Positions of the handles adjacent to the one being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandleNeighbors {
    /// Percentage of handle `i - 1`, if any.
    pub previous: Option<f64>,
    /// Percentage of handle `i + 1`, if any.
    pub next: Option<f64>,
}

impl HandleNeighbors {
    /// Neighbours of handle `index` within `offsets`.
    #[must_use]
    pub fn of(offsets: &[f64], index: usize) -> Self {
        Self {
            previous: index.checked_sub(1).and_then(|i| offsets.get(i)).copied(),
            next: offsets.get(index + 1).copied(),
        }
    }
}

/// Cumulative handle offsets for a width vector.
#[must_use]
pub fn handle_offsets(widths: &[f64]) -> Vec<f64> {
    widths
        .iter()
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

/// Per-column widths from handle offsets.
///
/// Each offset is rounded to two decimals, then each width is the rounded
/// difference from the previous offset.
#[must_use]
pub fn widths_from_offsets(offsets: &[f64]) -> Vec<f64> {
    let mut counted = 0.0;
    offsets
        .iter()
        .map(|offset| {
            let position = round2(*offset);
            let width = round2(position - counted);
            counted = position;
            width
        })
        .collect()
}

/// Pointer offset in pixels from the table's leading edge.
#[inline]
#[must_use]
pub fn pointer_offset(bounds: &Rect, pointer_x: f64, direction: TextDirection) -> f64 {
    match direction {
        TextDirection::Ltr => pointer_x - bounds.left(),
        TextDirection::Rtl => bounds.right() - pointer_x,
    }
}

/// Convert a pointer offset into a handle percentage.
///
/// The offset is first floored at `min_column_width` pixels and converted
/// to a percentage in `[0, 100]`. The result is then kept at least
/// `min_column_width` pixels past the previous handle and short of the next
/// one where the box allows it, and finally clamped between the two
/// neighbours so handles never cross.
///
/// Returns `None` when the box has no usable width or the offset is not
/// finite.
#[must_use]
pub fn clamp_handle_percent(
    offset: f64,
    box_width: f64,
    min_column_width: f64,
    neighbors: HandleNeighbors,
) -> Option<f64> {
    if !offset.is_finite() || !box_width.is_finite() || box_width <= 0.0 {
        return None;
    }
    let to_percent = |px: f64| (px / box_width * 100.0).clamp(0.0, 100.0);
    let x = offset.max(min_column_width);
    let mut percent = to_percent(x);

    if let Some(previous) = neighbors.previous {
        let previous_px = previous * box_width / 100.0 + min_column_width;
        if x < previous_px {
            percent = to_percent(previous_px);
        }
    }

    if let Some(next) = neighbors.next {
        let next_px = next * box_width / 100.0 - min_column_width;
        if x > next_px {
            percent = to_percent(next_px);
        }
    }

    // The pixel gaps can conflict when neighbours sit closer than two
    // minimum widths; ordering between handles always wins.
    let lower = neighbors.previous.unwrap_or(0.0);
    let upper = neighbors.next.unwrap_or(100.0);
    Some(percent.max(lower).min(upper))
}
