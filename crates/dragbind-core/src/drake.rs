#![forbid(unsafe_code)]

//! Drake book-keeping: aligned container/model slots plus the raw
//! lifecycle event stream.
//!
//! A drake is the shared state of one drag group: which containers
//! participate and which model snapshot each container currently shows.
//! The two sequences are index-aligned, and every operation here preserves
//! that alignment. The drake does no drag physics; an engine (or a test
//! double) drives it by injecting [`DrakeEvent`]s through [`Drake::emit`],
//! and the registry layer in the `dragbind` crate turns `Drop` and `Remove`
//! into model transforms.
//!
//! # Invariants
//!
//! 1. `containers.len() == models.len()` after every operation.
//! 2. [`Drake::detach`] removes one pair and preserves the relative order
//!    of the remaining slots.
//! 3. [`Drake::replace_model`] changes one model identity and nothing
//!    structural.
//!
//! # Example
//!
//! ```
//! use dragbind_core::drake::Drake;
//! use dragbind_core::handle::ContainerHandle;
//! use dragbind_core::model::model;
//! use dragbind_core::options::DrakeOptions;
//!
//! let drake: Drake<&str> = Drake::new(DrakeOptions::default());
//! let list = ContainerHandle::new();
//! assert_eq!(drake.attach(list, model(vec!["a", "b"])), 0);
//! assert_eq!(drake.len(), 1);
//! assert!(drake.detach(list));
//! assert!(drake.is_empty());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::events::{Emitter, Subscription};
use crate::handle::ContainerHandle;
use crate::model::ModelList;
use crate::options::DrakeOptions;

/// Raw lifecycle event injected by a drag engine.
///
/// Indices refer to positions inside the named container's model at the
/// moment the event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrakeEvent {
    /// An item was picked up.
    Drag {
        source: ContainerHandle,
        item_index: usize,
    },
    /// The gesture finished, however it ended.
    DragEnd { source: ContainerHandle },
    /// The dragged item was dropped into `target` before `target_index`.
    Drop {
        source: ContainerHandle,
        source_index: usize,
        target: ContainerHandle,
        target_index: usize,
    },
    /// The gesture was cancelled and the item reverted.
    Cancel { source: ContainerHandle },
    /// The dragged item was released outside every container and removed.
    Remove {
        source: ContainerHandle,
        item_index: usize,
    },
    /// The mirror entered `target` while dragging out of `source`.
    Over {
        source: ContainerHandle,
        target: ContainerHandle,
    },
    /// The mirror left `target`.
    Out {
        source: ContainerHandle,
        target: ContainerHandle,
    },
    /// Copy mode cloned the item out of `source`.
    Cloned {
        source: ContainerHandle,
        item_index: usize,
    },
}

struct DrakeInner<T> {
    containers: Vec<ContainerHandle>,
    models: Vec<ModelList<T>>,
    options: DrakeOptions,
}

impl<T> DrakeInner<T> {
    fn slot_of(&self, container: ContainerHandle) -> Option<usize> {
        self.containers.iter().position(|c| *c == container)
    }
}

/// Cheap-clone handle over one drag group's book-keeping state.
///
/// The event bus lives outside the slot state, so subscribers may call any
/// drake operation re-entrantly while an event is being delivered.
pub struct Drake<T> {
    inner: Rc<RefCell<DrakeInner<T>>>,
    events: Emitter<DrakeEvent>,
}

impl<T> Drake<T> {
    /// Create an empty drake; `options` are fixed for its lifetime.
    #[must_use]
    pub fn new(options: DrakeOptions) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DrakeInner {
                containers: Vec::new(),
                models: Vec::new(),
                options,
            })),
            events: Emitter::new(),
        }
    }

    /// Append a container with its aligned model. Returns the slot index.
    pub fn attach(&self, container: ContainerHandle, model: ModelList<T>) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.containers.push(container);
        inner.models.push(model);
        debug_assert_eq!(inner.containers.len(), inner.models.len());
        let slot = inner.containers.len() - 1;
        tracing::debug!(%container, slot, "container attached");
        slot
    }

    /// Remove a container and its aligned model by identity.
    ///
    /// Returns `false` when the drake does not hold `container`. Remaining
    /// slots keep their relative order.
    pub fn detach(&self, container: ContainerHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slot_of(container) else {
            return false;
        };
        inner.containers.remove(slot);
        inner.models.remove(slot);
        debug_assert_eq!(inner.containers.len(), inner.models.len());
        tracing::debug!(%container, slot, "container detached");
        true
    }

    /// Swap the model aligned with `container` in place.
    ///
    /// No structural change: slot order and count are untouched. Returns
    /// `false` when the drake does not hold `container`.
    pub fn replace_model(&self, container: ContainerHandle, model: ModelList<T>) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slot_of(container) else {
            return false;
        };
        inner.models[slot] = model;
        true
    }

    /// Slot index of `container`, while attached.
    #[must_use]
    pub fn index_of(&self, container: ContainerHandle) -> Option<usize> {
        self.inner.borrow().slot_of(container)
    }

    /// Model aligned with `container`.
    #[must_use]
    pub fn model_of(&self, container: ContainerHandle) -> Option<ModelList<T>> {
        let inner = self.inner.borrow();
        let slot = inner.slot_of(container)?;
        Some(Rc::clone(&inner.models[slot]))
    }

    /// Model at `slot`.
    #[must_use]
    pub fn model_at(&self, slot: usize) -> Option<ModelList<T>> {
        self.inner.borrow().models.get(slot).map(Rc::clone)
    }

    /// Snapshot of the container sequence.
    #[must_use]
    pub fn containers(&self) -> Vec<ContainerHandle> {
        self.inner.borrow().containers.clone()
    }

    /// Snapshot of the model sequence (cheap `Rc` clones).
    #[must_use]
    pub fn models(&self) -> Vec<ModelList<T>> {
        self.inner.borrow().models.clone()
    }

    /// Number of attached containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().containers.len()
    }

    /// Whether no container is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The options this drake was created with.
    #[must_use]
    pub fn options(&self) -> DrakeOptions {
        self.inner.borrow().options
    }

    /// Inject a lifecycle event. Engines and test doubles call this; the
    /// registry layer listens.
    pub fn emit(&self, event: DrakeEvent) {
        tracing::trace!(?event, "drake event");
        self.events.notify(&event);
    }

    /// Subscribe to raw lifecycle events.
    pub fn on_event(&self, callback: impl Fn(&DrakeEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }
}

impl<T> Clone for Drake<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            events: self.events.clone(),
        }
    }
}

impl<T> fmt::Debug for Drake<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Drake")
            .field("containers", &inner.containers)
            .field("options", &inner.options)
            .finish_non_exhaustive()
    }
}
