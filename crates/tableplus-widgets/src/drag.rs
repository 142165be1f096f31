#![forbid(unsafe_code)]

//! Handle drag lifecycle.
//!
//! A drag starts on pointer-down over a handle, follows moves from the same
//! pointer, and ends either in a release (the caller commits) or a cancel
//! (the caller reverts the preview). Every call yields a
//! [`DragTransition`] so callers can log or test the exact effect, including
//! the no-op cases.
//!
//! ```text
//!   Idle ──press──▶ Dragging ──release──▶ Idle   (Released)
//!                      │  ▲
//!                      └──┘ drag                 (Moved)
//!                      │
//!                      └────cancel──────▶ Idle   (Canceled)
//! ```

use tableplus_core::event::{PointerButton, PointerEvent, PointerEventKind};
use tableplus_core::geometry::Point;

/// Where the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResizeDragState {
    #[default]
    Idle,
    Dragging {
        /// Handle being dragged.
        handle: usize,
        /// Pointer that owns the drag.
        pointer_id: u32,
        /// Where the drag started.
        origin: Point,
        /// Last pointer position seen.
        current: Point,
    },
}

/// Why an input did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragNoopReason {
    /// Move or release without a drag in progress.
    IdleWithoutActiveDrag,
    /// Press while another drag is running.
    ActiveDragAlreadyInProgress,
    /// Event came from a different pointer than the one dragging.
    PointerMismatch,
    /// Press with something other than the primary button.
    NonPrimaryButton,
    /// Event kind does not fit the called operation.
    UnexpectedEventKind,
}

impl DragNoopReason {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdleWithoutActiveDrag => "idle_without_active_drag",
            Self::ActiveDragAlreadyInProgress => "active_drag_already_in_progress",
            Self::PointerMismatch => "pointer_mismatch",
            Self::NonPrimaryButton => "non_primary_button",
            Self::UnexpectedEventKind => "unexpected_event_kind",
        }
    }
}

/// Why a drag was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CancelReason {
    /// The host lost the pointer.
    PointerCancel,
    /// The table node was re-rendered mid-drag.
    NodeUpdated,
    /// The resolved text direction flipped mid-drag.
    DirectionChanged,
    /// The controller was torn down.
    Disposed,
    /// A new press arrived before the running drag saw its pointer-up.
    ReleaseLost,
}

impl CancelReason {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerCancel => "pointer_cancel",
            Self::NodeUpdated => "node_updated",
            Self::DirectionChanged => "direction_changed",
            Self::Disposed => "disposed",
            Self::ReleaseLost => "release_lost",
        }
    }
}

/// What a transition did.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragEffect {
    Started {
        handle: usize,
        pointer_id: u32,
        origin: Point,
    },
    Moved {
        handle: usize,
        previous: Point,
        current: Point,
    },
    Released {
        handle: usize,
        origin: Point,
        end: Point,
    },
    Canceled {
        handle: usize,
        reason: CancelReason,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One step of the machine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragTransition {
    /// Monotonic id, counting every transition including no-ops.
    pub transition_id: u64,
    pub from: ResizeDragState,
    pub to: ResizeDragState,
    pub effect: DragEffect,
}

impl DragTransition {
    /// Whether the transition changed anything.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.effect, DragEffect::Noop { .. })
    }
}

/// Pointer-driven drag machine for one overlay.
#[derive(Debug, Clone, Default)]
pub struct ResizeDragMachine {
    state: ResizeDragState,
    transition_counter: u64,
}

impl ResizeDragMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ResizeDragState {
        self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, ResizeDragState::Dragging { .. })
    }

    /// Handle being dragged, if any.
    #[must_use]
    pub const fn active_handle(&self) -> Option<usize> {
        match self.state {
            ResizeDragState::Dragging { handle, .. } => Some(handle),
            ResizeDragState::Idle => None,
        }
    }

    /// Number of transitions produced so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    /// Pointer-down on `handle`.
    pub fn press(&mut self, handle: usize, event: &PointerEvent) -> DragTransition {
        match (self.state, event.kind) {
            (ResizeDragState::Dragging { .. }, _) => {
                self.noop(DragNoopReason::ActiveDragAlreadyInProgress)
            }
            (ResizeDragState::Idle, PointerEventKind::Down(PointerButton::Primary)) => {
                let to = ResizeDragState::Dragging {
                    handle,
                    pointer_id: event.pointer_id,
                    origin: event.position,
                    current: event.position,
                };
                self.transition(
                    to,
                    DragEffect::Started {
                        handle,
                        pointer_id: event.pointer_id,
                        origin: event.position,
                    },
                )
            }
            (ResizeDragState::Idle, PointerEventKind::Down(_)) => {
                self.noop(DragNoopReason::NonPrimaryButton)
            }
            (ResizeDragState::Idle, _) => self.noop(DragNoopReason::UnexpectedEventKind),
        }
    }

    /// Pointer-move while dragging.
    pub fn drag(&mut self, event: &PointerEvent) -> DragTransition {
        let ResizeDragState::Dragging {
            handle,
            pointer_id,
            origin,
            current,
        } = self.state
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if event.pointer_id != pointer_id {
            return self.noop(DragNoopReason::PointerMismatch);
        }
        if event.kind != PointerEventKind::Move {
            return self.noop(DragNoopReason::UnexpectedEventKind);
        }
        let to = ResizeDragState::Dragging {
            handle,
            pointer_id,
            origin,
            current: event.position,
        };
        self.transition(
            to,
            DragEffect::Moved {
                handle,
                previous: current,
                current: event.position,
            },
        )
    }

    /// Pointer-up ending the drag.
    pub fn release(&mut self, event: &PointerEvent) -> DragTransition {
        let ResizeDragState::Dragging {
            handle,
            pointer_id,
            origin,
            ..
        } = self.state
        else {
            return self.noop(DragNoopReason::IdleWithoutActiveDrag);
        };
        if event.pointer_id != pointer_id {
            return self.noop(DragNoopReason::PointerMismatch);
        }
        if !matches!(event.kind, PointerEventKind::Up(_)) {
            return self.noop(DragNoopReason::UnexpectedEventKind);
        }
        self.transition(
            ResizeDragState::Idle,
            DragEffect::Released {
                handle,
                origin,
                end: event.position,
            },
        )
    }

    /// Abandon a running drag. Returns `None` when idle.
    pub fn cancel(&mut self, reason: CancelReason) -> Option<DragTransition> {
        let handle = self.active_handle()?;
        Some(self.transition(ResizeDragState::Idle, DragEffect::Canceled { handle, reason }))
    }

    fn noop(&mut self, reason: DragNoopReason) -> DragTransition {
        self.transition(self.state, DragEffect::Noop { reason })
    }

    fn transition(&mut self, to: ResizeDragState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        let from = self.state;
        self.state = to;
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to,
            effect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableplus_core::event::PointerButton;

    #[test]
    fn press_drag_release() {
        let mut machine = ResizeDragMachine::new();
        let start = machine.press(1, &PointerEvent::down(10.0, 5.0));
        assert!(matches!(start.effect, DragEffect::Started { handle: 1, .. }));
        assert_eq!(machine.active_handle(), Some(1));

        let moved = machine.drag(&PointerEvent::moved(20.0, 5.0));
        assert_eq!(
            moved.effect,
            DragEffect::Moved {
                handle: 1,
                previous: Point::new(10.0, 5.0),
                current: Point::new(20.0, 5.0),
            }
        );

        let end = machine.release(&PointerEvent::up(25.0, 6.0));
        assert_eq!(
            end.effect,
            DragEffect::Released {
                handle: 1,
                origin: Point::new(10.0, 5.0),
                end: Point::new(25.0, 6.0),
            }
        );
        assert_eq!(machine.state(), ResizeDragState::Idle);
        assert_eq!(machine.transition_count(), 3);
    }

    #[test]
    fn idle_inputs_are_noops() {
        let mut machine = ResizeDragMachine::new();
        let moved = machine.drag(&PointerEvent::moved(1.0, 1.0));
        assert_eq!(
            moved.effect,
            DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag
            }
        );
        assert!(machine.release(&PointerEvent::up(1.0, 1.0)).is_noop());
        assert!(machine.cancel(CancelReason::PointerCancel).is_none());
        // no-ops still count
        assert_eq!(machine.transition_count(), 2);
    }

    #[test]
    fn second_press_does_not_steal_the_drag() {
        let mut machine = ResizeDragMachine::new();
        machine.press(0, &PointerEvent::down(0.0, 0.0));
        let again = machine.press(2, &PointerEvent::down(5.0, 0.0).with_pointer_id(3));
        assert_eq!(
            again.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress
            }
        );
        assert_eq!(machine.active_handle(), Some(0));
    }

    #[test]
    fn other_pointers_are_ignored() {
        let mut machine = ResizeDragMachine::new();
        machine.press(0, &PointerEvent::down(0.0, 0.0).with_pointer_id(1));
        let foreign = machine.drag(&PointerEvent::moved(9.0, 0.0).with_pointer_id(2));
        assert_eq!(
            foreign.effect,
            DragEffect::Noop {
                reason: DragNoopReason::PointerMismatch
            }
        );
        assert!(machine.release(&PointerEvent::up(9.0, 0.0).with_pointer_id(2)).is_noop());
        assert!(machine.is_active());
    }

    #[test]
    fn secondary_button_does_not_start() {
        let mut machine = ResizeDragMachine::new();
        let event = PointerEvent::new(PointerEventKind::Down(PointerButton::Secondary), 0.0, 0.0);
        assert_eq!(
            machine.press(0, &event).effect,
            DragEffect::Noop {
                reason: DragNoopReason::NonPrimaryButton
            }
        );
        assert!(!machine.is_active());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut machine = ResizeDragMachine::new();
        machine.press(4, &PointerEvent::down(0.0, 0.0));
        let canceled = machine.cancel(CancelReason::NodeUpdated).expect("active drag");
        assert_eq!(
            canceled.effect,
            DragEffect::Canceled {
                handle: 4,
                reason: CancelReason::NodeUpdated
            }
        );
        assert_eq!(canceled.to, ResizeDragState::Idle);
        assert!(!machine.is_active());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn transitions_serialize() {
        let mut machine = ResizeDragMachine::new();
        let started = machine.press(2, &PointerEvent::down(1.0, 2.0));
        let json = serde_json::to_string(&started).expect("serialize");
        let back: DragTransition = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, started);
    }

    #[test]
    fn transition_ids_are_monotonic() {
        let mut machine = ResizeDragMachine::new();
        let a = machine.press(0, &PointerEvent::down(0.0, 0.0));
        let b = machine.drag(&PointerEvent::moved(1.0, 0.0));
        let c = machine.drag(&PointerEvent::moved(2.0, 0.0).with_pointer_id(9));
        assert!(a.transition_id < b.transition_id && b.transition_id < c.transition_id);
    }
}
