#![forbid(unsafe_code)]

//! Host-side glue: an observable model slot and guarded two-way wiring.
//!
//! [`ModelCell`] is the application's half of a two-way model binding, the
//! place a host keeps "its" list. [`two_way`] connects a cell to a
//! [`ContainerBinding`] so host writes flow into reconciliation and
//! adopted drag events flow back, with a shared guard flag so neither
//! direction echoes into the other.
//!
//! # Invariants
//!
//! 1. Setting a cell to the value it already holds (reference identity, or
//!    `None` over `None`) does not notify.
//! 2. While one direction of a [`TwoWayModel`] propagates, the other is
//!    suppressed.
//! 3. On connect, the cell's current value wins and is pushed into the
//!    controller.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use dragbind_core::events::{Emitter, Subscription};
use dragbind_core::model::{ModelList, same_model};

use crate::binding::ContainerBinding;

/// Observable slot for the host's current list.
///
/// Cheap to clone; clones share the value and the subscriber list.
pub struct ModelCell<T> {
    value: Rc<RefCell<Option<ModelList<T>>>>,
    changes: Emitter<Option<ModelList<T>>>,
}

impl<T: 'static> ModelCell<T> {
    /// Create a cell holding `initial`.
    #[must_use]
    pub fn new(initial: Option<ModelList<T>>) -> Self {
        Self {
            value: Rc::new(RefCell::new(initial)),
            changes: Emitter::new(),
        }
    }

    /// The current value (a cheap `Rc` clone).
    #[must_use]
    pub fn get(&self) -> Option<ModelList<T>> {
        self.value.borrow().clone()
    }

    /// Replace the value and notify subscribers.
    ///
    /// Setting the value the cell already holds is a no-op.
    pub fn set(&self, value: Option<ModelList<T>>) {
        {
            let current = self.value.borrow();
            let unchanged = match (&*current, &value) {
                (Some(a), Some(b)) => same_model(a, b),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
        }
        *self.value.borrow_mut() = value.clone();
        self.changes.notify(&value);
    }

    /// Subscribe to value changes.
    pub fn subscribe(&self, callback: impl Fn(&Option<ModelList<T>>) + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }
}

impl<T: 'static> Default for ModelCell<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> Clone for ModelCell<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            changes: self.changes.clone(),
        }
    }
}

impl<T> fmt::Debug for ModelCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCell")
            .field("occupied", &self.value.borrow().is_some())
            .finish()
    }
}

/// RAII connection between a [`ModelCell`] and a [`ContainerBinding`].
///
/// Dropping it severs both directions.
#[must_use = "dropping this guard disconnects the two-way binding"]
pub struct TwoWayModel {
    _cell_to_binding: Subscription,
    _binding_to_cell: Subscription,
}

impl fmt::Debug for TwoWayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TwoWayModel")
    }
}

/// Connect `cell` and `binding` two-way.
///
/// The cell's current value is pushed into the controller first, then both
/// directions are wired: cell writes reconcile the controller, adopted
/// drag events update the cell. A shared flag suppresses the echo either
/// direction would otherwise cause.
pub fn two_way<T: 'static>(cell: &ModelCell<T>, binding: &ContainerBinding<T>) -> TwoWayModel {
    let propagating = Rc::new(Cell::new(false));

    match cell.get() {
        Some(list) => binding.set_model(list),
        None => binding.clear_model(),
    }

    let cell_to_binding = {
        let propagating = Rc::clone(&propagating);
        let target = binding.weak_ref();
        cell.subscribe(move |value| {
            if propagating.get() {
                return;
            }
            propagating.set(true);
            match value {
                Some(list) => target.set_model(Rc::clone(list)),
                None => target.clear_model(),
            }
            propagating.set(false);
        })
    };

    let binding_to_cell = {
        let propagating = Rc::clone(&propagating);
        let cell = cell.clone();
        binding.on_model_change(move |list| {
            if propagating.get() {
                tracing::trace!("echo suppressed");
                return;
            }
            propagating.set(true);
            cell.set(Some(Rc::clone(list)));
            propagating.set(false);
        })
    };

    TwoWayModel {
        _cell_to_binding: cell_to_binding,
        _binding_to_cell: binding_to_cell,
    }
}
