#![forbid(unsafe_code)]

//! Single-threaded callback bus.
//!
//! [`Emitter`] fans an event out to its live subscribers; [`Subscription`]
//! is the RAII guard that keeps a subscriber alive. Callbacks are stored as
//! `Weak` pointers and pruned lazily during notification, so dropping the
//! guard is the only unsubscribe operation.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. A dropped [`Subscription`] receives nothing after the notification
//!    cycle in flight when it was dropped.
//! 3. Callbacks may subscribe and unsubscribe re-entrantly; each
//!    notification walks a snapshot taken before the first callback runs,
//!    so a subscriber added mid-cycle first hears the next event.
//!
//! # Example
//!
//! ```
//! use dragbind_core::events::Emitter;
//!
//! let bus: Emitter<u32> = Emitter::new();
//! let seen = std::rc::Rc::new(std::cell::Cell::new(0));
//! let guard = bus.subscribe({
//!     let seen = seen.clone();
//!     move |n| seen.set(*n)
//! });
//! bus.notify(&7);
//! assert_eq!(seen.get(), 7);
//! drop(guard);
//! bus.notify(&9);
//! assert_eq!(seen.get(), 7);
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct EmitterInner<E> {
    subscribers: Vec<Weak<dyn Fn(&E)>>,
}

/// Fan-out bus for one event type.
///
/// Cheap to clone; clones share the subscriber list.
pub struct Emitter<E> {
    inner: Rc<RefCell<EmitterInner<E>>>,
}

impl<E: 'static> Emitter<E> {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(EmitterInner {
                subscribers: Vec::new(),
            })),
        }
    }

    /// Register `callback` for every future notification.
    ///
    /// The callback lives exactly as long as the returned guard.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let callback: Rc<dyn Fn(&E)> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&callback));
        Subscription {
            _callback: Box::new(callback),
        }
    }

    /// Invoke every live subscriber with `event`, in registration order.
    ///
    /// The subscriber list is not borrowed while callbacks run, so they may
    /// notify, subscribe, or drop guards re-entrantly.
    pub fn notify(&self, event: &E) {
        let live: Vec<Rc<dyn Fn(&E)>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|slot| slot.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(event);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|slot| slot.strong_count() > 0);
        inner.subscribers.len()
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.inner.borrow().subscribers.len())
            .finish()
    }
}

/// RAII guard for one subscription.
///
/// Dropping it unsubscribes; the callback is pruned from the bus before the
/// next notification cycle.
#[must_use = "dropping this guard unsubscribes; hold it for the subscription's lifetime"]
pub struct Subscription {
    _callback: Box<dyn Any>,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
