#![forbid(unsafe_code)]

//! Shared values that announce their changes.
//!
//! Hosts publish the direction-bearing attributes of the editing surface as
//! an `Observable<DirectionHints>`, and the editor publishes its document
//! version as an `Observable<u64>`. Resize controllers subscribe on
//! creation and must let go on disposal, otherwise callbacks pile up as
//! tables are inserted and removed.
//!
//! A [`Subscription`] detaches its callback when dropped. Removal is eager
//! when the observable is not borrowed at that moment and deferred to the
//! next notification otherwise, so [`Observable::live_subscriber_count`] is
//! always exact while [`Observable::subscriber_count`] may briefly include
//! detached slots.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;
use web_time::Instant;

struct Slot<T> {
    id: u64,
    live: Rc<Cell<bool>>,
    callback: Rc<dyn Fn(&T)>,
}

struct Shared<T> {
    value: T,
    version: u64,
    next_id: u64,
    slots: Vec<Slot<T>>,
}

trait Detach {
    fn detach(&self, id: u64);
}

impl<T> Detach for RefCell<Shared<T>> {
    fn detach(&self, id: u64) {
        if let Ok(mut shared) = self.try_borrow_mut() {
            shared.slots.retain(|slot| slot.id != id);
        }
    }
}

/// A value shared between handles, with a change counter and subscribers.
///
/// Clones are handles to the same value. `set` with an equal value does
/// nothing; a different value bumps [`version`](Self::version) by one and
/// calls every live subscriber, oldest first.
pub struct Observable<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.shared.borrow();
        f.debug_struct("Observable")
            .field("value", &shared.value)
            .field("version", &shared.version)
            .field("slots", &shared.slots.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                value,
                version: 0,
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.borrow().value.clone()
    }

    /// Read the current value in place.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.borrow().value)
    }

    /// Replace the value. Subscribers run only when it actually changed.
    pub fn set(&self, value: T) {
        {
            let mut shared = self.shared.borrow_mut();
            if shared.value == value {
                return;
            }
            shared.value = value;
            shared.version += 1;
        }
        self.notify();
    }

    /// Register `callback` until the returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let live = Rc::new(Cell::new(true));
        let id = {
            let mut shared = self.shared.borrow_mut();
            let id = shared.next_id;
            shared.next_id += 1;
            shared.slots.push(Slot {
                id,
                live: Rc::clone(&live),
                callback: Rc::new(callback),
            });
            id
        };
        let registry: Weak<dyn Detach> = Rc::downgrade(&self.shared) as Weak<RefCell<Shared<T>>>;
        Subscription { id, live, registry }
    }

    /// Number of changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.borrow().version
    }

    /// Registered slots, including detached ones awaiting removal.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.borrow().slots.len()
    }

    /// Subscribers whose guard is still held.
    #[must_use]
    pub fn live_subscriber_count(&self) -> usize {
        self.shared
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.live.get())
            .count()
    }

    fn notify(&self) {
        // No borrow may be held while callbacks run: they are free to read
        // the value or drop their own subscription.
        let (value, callbacks) = {
            let mut shared = self.shared.borrow_mut();
            shared.slots.retain(|slot| slot.live.get());
            let callbacks: Vec<_> = shared
                .slots
                .iter()
                .map(|slot| (Rc::clone(&slot.live), Rc::clone(&slot.callback)))
                .collect();
            (shared.value.clone(), callbacks)
        };
        if callbacks.is_empty() {
            return;
        }

        let start = Instant::now();
        let mut called = 0usize;
        for (live, callback) in &callbacks {
            // A callback earlier in the list may have detached this one.
            if live.get() {
                callback(&value);
                called += 1;
            }
        }
        trace!(
            message = "observable.notify",
            subscribers = called,
            duration_us = start.elapsed().as_micros() as u64
        );
    }
}

/// Keeps one callback registered. Dropping it detaches the callback.
pub struct Subscription {
    id: u64,
    live: Rc<Cell<bool>>,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// Whether the observable this guard belongs to still exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.set(false);
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_value_is_not_a_change() {
        let hints = Observable::new(1);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let _sub = hints.subscribe(move |v| sink.set(*v));

        hints.set(1);
        assert_eq!((seen.get(), hints.version()), (0, 0));
        hints.set(5);
        assert_eq!((seen.get(), hints.version()), (5, 1));
    }

    #[test]
    fn drop_detaches_immediately() {
        let hints = Observable::new(0);
        let sub = hints.subscribe(|_| {});
        assert_eq!(hints.subscriber_count(), 1);
        drop(sub);
        assert_eq!(hints.subscriber_count(), 0);
        assert_eq!(hints.live_subscriber_count(), 0);
    }

    #[test]
    fn drop_while_reading_is_deferred() {
        let hints = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let sub = hints.subscribe(move |_| counter.set(counter.get() + 1));

        hints.with(|_| drop(sub));
        assert_eq!(hints.subscriber_count(), 1);
        assert_eq!(hints.live_subscriber_count(), 0);

        hints.set(1);
        assert_eq!(calls.get(), 0);
        assert_eq!(hints.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_detach_a_later_one() {
        let hints = Observable::new(0);
        let calls = Rc::new(Cell::new(0));
        let later: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let victim = Rc::clone(&later);
        let _first = hints.subscribe(move |_| {
            victim.borrow_mut().take();
        });
        let counter = Rc::clone(&calls);
        *later.borrow_mut() = Some(hints.subscribe(move |_| counter.set(counter.get() + 1)));

        hints.set(1);
        assert_eq!(calls.get(), 0);
        assert_eq!(hints.live_subscriber_count(), 1);
    }

    #[test]
    fn guard_outliving_the_observable_is_harmless() {
        let hints = Observable::new("ltr".to_string());
        let sub = hints.subscribe(|_| {});
        assert!(sub.is_attached());
        drop(hints);
        assert!(!sub.is_attached());
        drop(sub);
    }

    #[test]
    fn handles_share_one_value_and_run_in_order() {
        let a = Observable::new(0);
        let b = a.clone();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (Rc::clone(&log), Rc::clone(&log));
        let _x = a.subscribe(move |_| first.borrow_mut().push("x"));
        let _y = b.subscribe(move |_| second.borrow_mut().push("y"));

        b.set(7);
        assert_eq!(a.get(), 7);
        assert_eq!(a.version(), 1);
        assert_eq!(*log.borrow(), vec!["x", "y"]);
    }
}
