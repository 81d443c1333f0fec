#![forbid(unsafe_code)]

//! The binding controller: reconciles one container's declared bag name
//! and model against its current attachment.
//!
//! A [`ContainerBinding`] owns the binding state for exactly one host
//! container. Hosts push declaration changes through
//! [`ContainerBinding::set_group`] / [`ContainerBinding::set_model`] and
//! their `clear_*` counterparts; the controller walks a fixed decision
//! table and performs the minimal attach/detach/update work. While
//! attached, it filters the registry bus for model transforms involving
//! its container, adopts the new list, and republishes it on
//! [`ContainerBinding::on_model_change`] exactly once per adopted event.
//!
//! # Decision table
//!
//! Evaluated on every declaration change; first match wins.
//!
//! 1. No bag name declared: detach if attached, otherwise do nothing. A
//!    model without a name never touches the registry.
//! 2. Not attached, name declared: find the bag, creating it on first use,
//!    then append the container with its model (an empty placeholder when
//!    no model is declared, so drake slots stay aligned) and subscribe to
//!    the bag's events.
//! 3. Name changed while attached: detach from the old bag, then perform
//!    the rule-2 attach against the new name, strictly in that order.
//! 4. Same bag, new model identity: swap the bound slot in place. No
//!    lookup, no attach/detach.
//! 5. Model cleared while attached: detach. The name stays declared, so a
//!    later model re-attaches.
//! 6. Nothing changed: do nothing.
//!
//! Rule 4 plus reference-identity comparison is what keeps absorbed events
//! from cycling: a host that writes back the exact list it was handed
//! lands in rule 6.
//!
//! # Example
//!
//! ```ignore
//! let registry: Rc<dyn Registry<Task>> = Rc::new(BagRegistry::new());
//! let column = ContainerBinding::new(Rc::clone(&registry), column_handle);
//! column.set_group("board");
//! column.set_model(model(tasks));
//! let _watch = column.on_model_change(|tasks| review.queue(tasks));
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use dragbind_core::events::{Emitter, Subscription};
use dragbind_core::handle::ContainerHandle;
use dragbind_core::model::{ModelList, same_model};
use dragbind_core::options::DrakeOptions;

use crate::bag::Bag;
use crate::events::{BagEvent, Dispatch};
use crate::registry::Registry;

struct BindingState<T> {
    container: ContainerHandle,
    group: Option<String>,
    model: Option<ModelList<T>>,
    options: DrakeOptions,
    local_mirror: bool,
    bound: Option<Bag<T>>,
    bus: Option<Subscription>,
    changes: Emitter<ModelList<T>>,
}

/// Reconciling controller for one host container.
///
/// The sole owner of its binding state; dropping it detaches.
pub struct ContainerBinding<T> {
    registry: Rc<dyn Registry<T>>,
    state: Rc<RefCell<BindingState<T>>>,
}

impl<T: 'static> ContainerBinding<T> {
    /// Create a detached controller for `container`.
    #[must_use]
    pub fn new(registry: Rc<dyn Registry<T>>, container: ContainerHandle) -> Self {
        Self {
            registry,
            state: Rc::new(RefCell::new(BindingState {
                container,
                group: None,
                model: None,
                options: DrakeOptions::default(),
                local_mirror: false,
                bound: None,
                bus: None,
                changes: Emitter::new(),
            })),
        }
    }

    /// Options used when this controller has to create its bag.
    ///
    /// An already-existing bag keeps the options it was created with.
    #[must_use]
    pub fn with_options(self, options: DrakeOptions) -> Self {
        self.state.borrow_mut().options = options;
        self
    }

    /// Host the drag mirror in this controller's own container when the
    /// controller creates its bag.
    #[must_use]
    pub fn with_local_mirror(self, local_mirror: bool) -> Self {
        self.state.borrow_mut().local_mirror = local_mirror;
        self
    }

    /// Declare the bag name. Reconciles immediately.
    pub fn set_group(&self, name: impl Into<String>) {
        let model = self.state.borrow().model.clone();
        reconcile(&self.registry, &self.state, Some(name.into()), model);
    }

    /// Clear the bag name. Detaches if attached.
    pub fn clear_group(&self) {
        let model = self.state.borrow().model.clone();
        reconcile(&self.registry, &self.state, None, model);
    }

    /// Declare the model. Reconciles immediately.
    pub fn set_model(&self, model: ModelList<T>) {
        let group = self.state.borrow().group.clone();
        reconcile(&self.registry, &self.state, group, Some(model));
    }

    /// Clear the model. Detaches if attached; the bag name stays declared.
    pub fn clear_model(&self) {
        let group = self.state.borrow().group.clone();
        reconcile(&self.registry, &self.state, group, None);
    }

    /// The declared bag name.
    #[must_use]
    pub fn group(&self) -> Option<String> {
        self.state.borrow().group.clone()
    }

    /// The current model: the last list declared or adopted.
    #[must_use]
    pub fn model(&self) -> Option<ModelList<T>> {
        self.state.borrow().model.clone()
    }

    /// The container this controller binds.
    #[must_use]
    pub fn container(&self) -> ContainerHandle {
        self.state.borrow().container
    }

    /// Whether the container is currently attached to a drake.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state.borrow().bound.is_some()
    }

    /// Slot index in the bound drake, while attached.
    #[must_use]
    pub fn bound_index(&self) -> Option<usize> {
        let state = self.state.borrow();
        let bag = state.bound.as_ref()?;
        bag.drake().index_of(state.container)
    }

    /// Subscribe to adopted model changes.
    ///
    /// Fires synchronously, exactly once per adopted event, with the new
    /// list. Declaration changes made by the host do not fire.
    pub fn on_model_change(&self, callback: impl Fn(&ModelList<T>) + 'static) -> Subscription {
        self.state.borrow().changes.subscribe(callback)
    }

    pub(crate) fn weak_ref(&self) -> BindingRef<T> {
        BindingRef {
            registry: Rc::clone(&self.registry),
            state: Rc::downgrade(&self.state),
        }
    }
}

impl<T> Drop for ContainerBinding<T> {
    fn drop(&mut self) {
        detach(&self.registry, &self.state);
    }
}

/// Weak handle the host glue uses to reach a controller from closures.
pub(crate) struct BindingRef<T> {
    registry: Rc<dyn Registry<T>>,
    state: Weak<RefCell<BindingState<T>>>,
}

impl<T: 'static> BindingRef<T> {
    pub(crate) fn set_model(&self, model: ModelList<T>) {
        if let Some(state) = self.state.upgrade() {
            let group = state.borrow().group.clone();
            reconcile(&self.registry, &state, group, Some(model));
        }
    }

    pub(crate) fn clear_model(&self) {
        if let Some(state) = self.state.upgrade() {
            let group = state.borrow().group.clone();
            reconcile(&self.registry, &state, group, None);
        }
    }
}

fn reconcile<T: 'static>(
    registry: &Rc<dyn Registry<T>>,
    state: &Rc<RefCell<BindingState<T>>>,
    next_group: Option<String>,
    next_model: Option<ModelList<T>>,
) {
    // Rule 1: no bag name declared.
    let Some(group) = next_group else {
        detach(registry, state);
        let mut s = state.borrow_mut();
        s.group = None;
        s.model = next_model;
        return;
    };

    let (attached, same_group, model_changed) = {
        let s = state.borrow();
        let attached = s.bound.is_some();
        let same_group = s.group.as_deref() == Some(group.as_str());
        let model_changed = match (&s.model, &next_model) {
            (Some(old), Some(new)) => !same_model(old, new),
            (None, None) => false,
            _ => true,
        };
        (attached, same_group, model_changed)
    };

    // Rule 3: bag name changed while attached.
    if attached && !same_group {
        detach(registry, state);
        {
            let mut s = state.borrow_mut();
            s.group = Some(group);
            s.model = next_model;
        }
        attach(registry, state);
        return;
    }

    // Rule 2: not attached and a name is declared.
    if !attached {
        {
            let mut s = state.borrow_mut();
            s.group = Some(group);
            s.model = next_model;
        }
        attach(registry, state);
        return;
    }

    // Attached to the declared bag from here on.
    match next_model {
        // Rule 5: model cleared.
        None => {
            if model_changed {
                detach(registry, state);
            }
            let mut s = state.borrow_mut();
            s.model = None;
        }
        // Rule 4: new model identity, swapped into the bound slot.
        Some(new_model) if model_changed => {
            let (container, bound) = {
                let s = state.borrow();
                (s.container, s.bound.clone())
            };
            if let Some(bag) = bound {
                let replaced = bag.drake().replace_model(container, Rc::clone(&new_model));
                debug_assert!(replaced, "bound container missing from its drake");
            }
            state.borrow_mut().model = Some(new_model);
            tracing::debug!(%container, "model swapped in place");
        }
        // Rule 6: nothing changed.
        Some(_) => {}
    }
}

/// Resolve the declared bag (creating it on first use) and append the
/// container with its model, or an empty placeholder.
fn attach<T: 'static>(registry: &Rc<dyn Registry<T>>, state: &Rc<RefCell<BindingState<T>>>) {
    let (container, group, model, options) = {
        let s = state.borrow();
        let Some(group) = s.group.clone() else {
            return;
        };
        let mut options = s.options;
        if s.local_mirror {
            options.mirror_container = Some(s.container);
        }
        (s.container, group, s.model.clone(), options)
    };

    let bag = match registry.find(&group) {
        Some(bag) => bag,
        None => registry.add(&group, options),
    };
    let slot = bag
        .drake()
        .attach(container, model.unwrap_or_else(|| Rc::new(Vec::new())));
    let bus = subscribe(registry, state, &group);
    {
        let mut s = state.borrow_mut();
        s.bound = Some(bag);
        s.bus = Some(bus);
    }
    tracing::debug!(%container, bag = %group, slot, "attached");
}

/// Remove the container's pair from the bound drake and drop the bus
/// subscription. No-op when detached.
fn detach<T>(registry: &Rc<dyn Registry<T>>, state: &Rc<RefCell<BindingState<T>>>) {
    let (container, bag) = {
        let mut s = state.borrow_mut();
        let Some(bag) = s.bound.take() else {
            return;
        };
        s.bus = None;
        (s.container, bag)
    };
    // Teardown resolves the bag by name; it may have been destroyed (or
    // replaced) in the registry since this controller bound.
    match registry.find(bag.name()) {
        Some(current) => {
            current.drake().detach(container);
            tracing::debug!(%container, bag = bag.name(), "detached");
        }
        None => {
            tracing::debug!(%container, bag = bag.name(), "bag gone; local state cleared");
        }
    }
}

/// Filter the registry bus for model transforms involving this container.
fn subscribe<T: 'static>(
    registry: &Rc<dyn Registry<T>>,
    state: &Rc<RefCell<BindingState<T>>>,
    group: &str,
) -> Subscription {
    let weak = Rc::downgrade(state);
    let group: Rc<str> = Rc::from(group);
    registry.on_event(Rc::new(move |dispatch: &Dispatch<T>| {
        if dispatch.name != group {
            return;
        }
        let Some(state) = weak.upgrade() else {
            return;
        };
        let container = state.borrow().container;
        match &dispatch.event {
            BagEvent::DropModel(drop) => {
                if drop.target == container {
                    adopt(&state, &drop.target_model);
                } else if drop.source == container {
                    adopt(&state, &drop.source_model);
                }
            }
            BagEvent::RemoveModel(remove) => {
                if remove.source == container {
                    adopt(&state, &remove.source_model);
                }
            }
            BagEvent::Engine(_) => {}
        }
    }))
}

/// Store an adopted list and republish it. The store happens first, so a
/// synchronous host write-back of the same reference reconciles as a no-op.
fn adopt<T: 'static>(state: &Rc<RefCell<BindingState<T>>>, model: &ModelList<T>) {
    let changes = {
        let mut s = state.borrow_mut();
        // Transforms that restate the current list (a copy-mode source sees
        // its own unchanged model) are not adoptions.
        if let Some(current) = &s.model {
            if same_model(current, model) {
                return;
            }
        }
        s.model = Some(Rc::clone(model));
        s.changes.clone()
    };
    tracing::debug!("model adopted from drag event");
    changes.notify(model);
}
