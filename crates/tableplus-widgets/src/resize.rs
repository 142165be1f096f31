#![forbid(unsafe_code)]

//! Interactive column resizing for one table.
//!
//! [`TableResizeController`] mirrors a table node. It derives the live
//! width vector and one handle per column from the stored `columnWidths`,
//! runs the drag lifecycle, previews widths while the pointer moves, and
//! writes the final vector back through the host on release.
//!
//! # Invariants
//!
//! 1. Handle offsets are non-decreasing at every point of a drag.
//! 2. Nothing is written to the document before pointer-up, and nothing at
//!    all while the table is locked.
//! 3. `update` and direction flips abandon an in-flight drag and rebuild
//!    every handle from the stored vector.
//! 4. After `dispose` the direction subscription is released and every
//!    input is ignored.

use std::cell::Cell;
use std::rc::Rc;

use tableplus_core::event::PointerEvent;
use tableplus_core::geometry::Rect;
use tableplus_core::reactive::{Observable, Subscription};
use tableplus_core::{DirectionHints, TextDirection};
use tableplus_doc::table::{
    COLUMN_WIDTHS, border_color, effective_column_widths, is_locked, max_cell_count,
};
use tableplus_doc::{EditorHost, Node, NodeType, TransactionOrigin};
use tableplus_layout::{
    ColumnWidths, HandleNeighbors, clamp_handle_percent, handle_offsets, pointer_offset, round2,
    widths_from_offsets,
};
use tableplus_runtime::TablePlusConfig;
use web_time::Instant;

use crate::drag::{CancelReason, DragEffect, ResizeDragMachine};
use crate::overlay::{HandleAnchor, HandleStyle, HandleView, OverlayView};

/// Why a release did not write the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevertReason {
    /// The table is locked.
    Locked,
    /// No table sits at the controller's position any more.
    StaleTable,
    /// The host refused the transaction.
    DispatchFailed,
}

impl RevertReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::StaleTable => "stale_table",
            Self::DispatchFailed => "dispatch_failed",
        }
    }
}

/// Result of a pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The vector was written.
    Committed(ColumnWidths),
    /// The drag ended where the stored vector already was.
    Unchanged,
    /// The preview was thrown away.
    Reverted(RevertReason),
    /// No drag was running for this pointer.
    Ignored,
}

impl CommitOutcome {
    /// Whether a transaction was dispatched.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Resize overlay state for one table node.
pub struct TableResizeController {
    table: Node,
    table_pos: usize,
    column_count: usize,
    /// Widths as last derived from the document.
    committed: ColumnWidths,
    /// Live widths, the drag preview while dragging.
    cell_percentage: ColumnWidths,
    /// Handle *i* sits on the trailing edge of column *i*.
    offsets: Vec<f64>,
    locked: bool,
    min_column_width: f64,
    handle_style: HandleStyle,
    default_border_color: String,
    drag: ResizeDragMachine,
    drag_started: Option<Instant>,
    /// Latest direction published by the hints subscription.
    direction: Rc<Cell<TextDirection>>,
    /// Direction the handles were last laid out for.
    rendered_direction: TextDirection,
    subscription: Option<Subscription>,
}

impl std::fmt::Debug for TableResizeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableResizeController")
            .field("table_pos", &self.table_pos)
            .field("column_count", &self.column_count)
            .field("cell_percentage", &self.cell_percentage)
            .field("locked", &self.locked)
            .field("direction", &self.rendered_direction)
            .field("drag", &self.drag.state())
            .field("disposed", &self.subscription.is_none())
            .finish()
    }
}

impl TableResizeController {
    /// Bind a controller to the table at `table_pos`.
    ///
    /// The controller subscribes to `hints` and re-resolves the text
    /// direction whenever they change.
    #[must_use]
    pub fn new(
        table: &Node,
        table_pos: usize,
        config: &TablePlusConfig,
        hints: &Observable<DirectionHints>,
    ) -> Self {
        let initial = hints.with(DirectionHints::resolve);
        let direction = Rc::new(Cell::new(initial));
        let sink = Rc::clone(&direction);
        let subscription = hints.subscribe(move |h| sink.set(h.resolve()));

        let mut controller = Self {
            table: table.clone(),
            table_pos,
            column_count: 0,
            committed: ColumnWidths::empty(),
            cell_percentage: ColumnWidths::empty(),
            offsets: Vec::new(),
            locked: false,
            min_column_width: config.resize.min_column_width,
            handle_style: HandleStyle {
                size: config.resize.handle_size,
                background: config.resize.handle_background.clone(),
            },
            default_border_color: config.table.border_color.clone(),
            drag: ResizeDragMachine::new(),
            drag_started: None,
            direction,
            rendered_direction: initial,
            subscription: Some(subscription),
        };
        controller.rebuild();
        controller
    }

    /// Re-render from a (possibly) new node.
    ///
    /// Returns `false` when `node` is not a table or the controller was
    /// disposed; the host should then create a fresh controller.
    pub fn update(&mut self, node: &Node, table_pos: usize) -> bool {
        if self.is_disposed() || node.kind() != NodeType::Table {
            return false;
        }
        self.abandon(CancelReason::NodeUpdated);
        self.table = node.clone();
        self.table_pos = table_pos;
        self.rendered_direction = self.direction.get();
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.column_count = max_cell_count(&self.table);
        self.committed = effective_column_widths(&self.table);
        self.locked = is_locked(&self.table);
        self.reset_preview();
    }

    fn reset_preview(&mut self) {
        self.cell_percentage = self.committed.clone();
        self.offsets = handle_offsets(self.committed.as_slice())
            .into_iter()
            .map(round2)
            .collect();
    }

    fn abandon(&mut self, reason: CancelReason) {
        if let Some(transition) = self.drag.cancel(reason) {
            if let DragEffect::Canceled { handle, .. } = transition.effect {
                tracing::debug!(
                    message = "resize.abandon",
                    table_pos = self.table_pos,
                    handle,
                    reason = reason.as_str()
                );
            }
            self.drag_started = None;
            self.reset_preview();
        }
    }

    /// Pick up a direction change published since the last call.
    ///
    /// A flip abandons any drag in progress and lays the handles out again.
    /// Returns whether the direction changed.
    pub fn sync_direction(&mut self) -> bool {
        let current = self.direction.get();
        if current == self.rendered_direction {
            return false;
        }
        tracing::debug!(
            message = "resize.direction_flip",
            table_pos = self.table_pos,
            rtl = current.is_rtl()
        );
        self.abandon(CancelReason::DirectionChanged);
        self.rendered_direction = current;
        self.reset_preview();
        true
    }

    /// Pointer-down on handle `handle`. Returns whether a drag started.
    ///
    /// A drag still running here never saw its pointer-up. It is abandoned
    /// with its preview before the new press is considered.
    pub fn pointer_down(&mut self, handle: usize, event: &PointerEvent) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.sync_direction();
        self.abandon(CancelReason::ReleaseLost);
        if self.locked {
            tracing::debug!(message = "resize.locked", table_pos = self.table_pos, handle);
            return false;
        }
        if handle >= self.offsets.len() {
            return false;
        }
        let transition = self.drag.press(handle, event);
        if let DragEffect::Noop { reason } = transition.effect {
            tracing::trace!(message = "resize.noop", reason = reason.as_str());
            return false;
        }
        self.drag_started = Some(Instant::now());
        tracing::debug!(
            message = "resize.drag_start",
            table_pos = self.table_pos,
            handle,
            pointer_id = event.pointer_id
        );
        true
    }

    /// Pointer-move within `bounds`, the table's bounding box.
    ///
    /// Moves the dragged handle and refreshes the preview. Returns whether
    /// the preview changed.
    pub fn pointer_move(&mut self, event: &PointerEvent, bounds: Rect) -> bool {
        if self.is_disposed() || self.sync_direction() {
            return false;
        }
        let transition = self.drag.drag(event);
        let DragEffect::Moved { handle, .. } = transition.effect else {
            return false;
        };
        let offset = pointer_offset(&bounds, event.position.x, self.rendered_direction);
        let neighbors = HandleNeighbors::of(&self.offsets, handle);
        let Some(percent) =
            clamp_handle_percent(offset, bounds.width, self.min_column_width, neighbors).map(round2)
        else {
            return false;
        };
        let Some(slot) = self.offsets.get_mut(handle) else {
            return false;
        };
        if *slot == percent {
            return false;
        }
        *slot = percent;
        self.cell_percentage = ColumnWidths::new(widths_from_offsets(&self.offsets));
        tracing::trace!(message = "resize.preview", handle, percent);
        true
    }

    /// Pointer-up: write the previewed vector through `host`.
    ///
    /// A locked table (as stored now, or when last rendered) reverts the
    /// preview and dispatches nothing.
    pub fn pointer_up(&mut self, event: &PointerEvent, host: &mut dyn EditorHost) -> CommitOutcome {
        if self.is_disposed() || self.sync_direction() {
            return CommitOutcome::Ignored;
        }
        let transition = self.drag.release(event);
        let DragEffect::Released { handle, .. } = transition.effect else {
            return CommitOutcome::Ignored;
        };
        let drag_us = self
            .drag_started
            .take()
            .map_or(0, |start| start.elapsed().as_micros() as u64);
        let widths = ColumnWidths::new(widths_from_offsets(&self.offsets));
        let serialized = widths.serialize();

        let tr = {
            let state = host.state();
            let Some(table) = state
                .doc()
                .node_at(self.table_pos)
                .filter(|n| n.kind() == NodeType::Table)
            else {
                return self.revert(handle, RevertReason::StaleTable);
            };
            if self.locked || is_locked(table) {
                return self.revert(handle, RevertReason::Locked);
            }
            if table.attr_str(COLUMN_WIDTHS) == Some(serialized.as_str()) {
                self.committed = widths;
                self.reset_preview();
                return CommitOutcome::Unchanged;
            }
            let mut tr = state.tr().with_origin(TransactionOrigin::Resize);
            if tr.set_node_attr(self.table_pos, COLUMN_WIDTHS, serialized).is_err() {
                return self.revert(handle, RevertReason::StaleTable);
            }
            tr
        };

        if let Err(err) = host.dispatch(tr) {
            tracing::warn!(
                message = "resize.commit_failed",
                table_pos = self.table_pos,
                error = %err
            );
            return self.revert(handle, RevertReason::DispatchFailed);
        }
        tracing::debug!(
            message = "resize.commit",
            table_pos = self.table_pos,
            handle,
            drag_us,
            widths = %widths.serialize()
        );
        self.committed = widths.clone();
        self.reset_preview();
        CommitOutcome::Committed(widths)
    }

    fn revert(&mut self, handle: usize, reason: RevertReason) -> CommitOutcome {
        tracing::debug!(
            message = "resize.commit_suppressed",
            table_pos = self.table_pos,
            handle,
            reason = reason.as_str()
        );
        self.reset_preview();
        CommitOutcome::Reverted(reason)
    }

    /// The host lost the pointer: drop the drag and its preview.
    pub fn pointer_cancel(&mut self) -> bool {
        let active = self.drag.is_active();
        self.abandon(CancelReason::PointerCancel);
        active
    }

    /// Release the direction subscription and stop reacting to input.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.abandon(CancelReason::Disposed);
        self.subscription = None;
        tracing::debug!(message = "resize.dispose", table_pos = self.table_pos);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.subscription.is_none()
    }

    /// Presentation model for the current state.
    ///
    /// Uses the latest published direction even before the next
    /// [`sync_direction`](Self::sync_direction).
    #[must_use]
    pub fn view(&self) -> OverlayView {
        let direction = self.direction.get();
        let anchor = HandleAnchor::leading(direction);
        let active = self.drag.active_handle();
        OverlayView {
            direction,
            cell_count: self.column_count,
            cell_percentage: self.cell_percentage.clone(),
            handles: self
                .offsets
                .iter()
                .enumerate()
                .map(|(index, offset)| HandleView {
                    index,
                    anchor,
                    offset: *offset,
                    interactive: !self.locked,
                    active: active == Some(index),
                })
                .collect(),
            handle_style: self.handle_style.clone(),
            border_color: border_color(&self.table)
                .filter(|color| !color.trim().is_empty())
                .unwrap_or(&self.default_border_color)
                .to_string(),
            locked: self.locked,
        }
    }

    /// Table node last rendered.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.table
    }

    /// Position commits are written to.
    #[must_use]
    pub const fn table_pos(&self) -> usize {
        self.table_pos
    }

    /// Columns in the authoritative row.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.column_count
    }

    /// Live widths.
    #[must_use]
    pub fn cell_percentage(&self) -> &ColumnWidths {
        &self.cell_percentage
    }

    /// Widths as last derived from the document or committed.
    #[must_use]
    pub fn committed_widths(&self) -> &ColumnWidths {
        &self.committed
    }

    /// Handle offsets in percent from the leading edge.
    #[must_use]
    pub fn handle_offsets(&self) -> &[f64] {
        &self.offsets
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn is_rtl(&self) -> bool {
        self.rendered_direction.is_rtl()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    #[must_use]
    pub const fn min_column_width(&self) -> f64 {
        self.min_column_width
    }
}
