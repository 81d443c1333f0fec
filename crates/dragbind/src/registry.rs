#![forbid(unsafe_code)]

//! The bag registry: the service that owns drag groups.
//!
//! The registry maps bag names to [`Bag`]s, wires every drake's raw
//! lifecycle stream into model transforms, and fans the results out on one
//! dispatch bus. Controllers consume it through the [`Registry`] trait, so
//! tests can decorate lookups.
//!
//! # Model transforms
//!
//! List mutation is always clone-splice: the registry never edits a model
//! in place, it builds the new list and swaps the drake slot. A `Drop`
//! inside one container becomes a reorder; across containers, a move (or a
//! copy when the drake was created with `copy`); a `Remove` deletes the
//! item. Every raw event is re-dispatched as [`BagEvent::Engine`] first;
//! the derived [`BagEvent::DropModel`] / [`BagEvent::RemoveModel`] follows
//! it on the bus.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `add` with a registered name | panic (programmer error) |
//! | `destroy` with an unknown name | returns `false` |
//! | Transform names a container the drake does not hold | `warn!`, no model event |
//! | Transform source index out of range | `warn!`, no model event |
//! | Transform target index past the end | clamped to an append |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use dragbind_core::drake::{Drake, DrakeEvent};
use dragbind_core::events::{Emitter, Subscription};
use dragbind_core::handle::ContainerHandle;
use dragbind_core::model::ModelList;
use dragbind_core::options::DrakeOptions;

use crate::bag::Bag;
use crate::events::{BagEvent, Dispatch, DropModel, RemoveModel};

/// Lookup and lifecycle surface a binding controller consumes.
pub trait Registry<T> {
    /// Find a bag by name. Never creates.
    fn find(&self, name: &str) -> Option<Bag<T>>;

    /// Create a drake from `options`, register it under `name`, and wire
    /// its model transforms.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    fn add(&self, name: &str, options: DrakeOptions) -> Bag<T>;

    /// Unregister `name` and drop its transform wiring.
    ///
    /// Returns `false` when the name is unknown.
    fn destroy(&self, name: &str) -> bool;

    /// Subscribe to the dispatch bus.
    fn on_event(&self, callback: Rc<dyn Fn(&Dispatch<T>)>) -> Subscription;
}

struct BagEntry<T> {
    bag: Bag<T>,
    _transform: Subscription,
}

struct RegistryInner<T> {
    bags: AHashMap<String, BagEntry<T>>,
}

/// Owns every bag and the shared dispatch bus.
///
/// Cheap to clone; clones share the bag table and the bus.
pub struct BagRegistry<T> {
    inner: Rc<RefCell<RegistryInner<T>>>,
    bus: Emitter<Dispatch<T>>,
}

impl<T: Clone + 'static> BagRegistry<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                bags: AHashMap::new(),
            })),
            bus: Emitter::new(),
        }
    }

    /// Names of all registered bags, in no particular order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.borrow().bags.keys().cloned().collect()
    }

    /// Number of registered bags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().bags.len()
    }

    /// Whether no bag is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().bags.is_empty()
    }

    /// Drop transforms for one bag.
    pub fn on_drop_model(
        &self,
        name: &str,
        callback: impl Fn(&DropModel<T>) + 'static,
    ) -> Subscription {
        let name: Rc<str> = Rc::from(name);
        self.bus.subscribe(move |dispatch| {
            if dispatch.name == name {
                if let BagEvent::DropModel(drop) = &dispatch.event {
                    callback(drop);
                }
            }
        })
    }

    /// Remove transforms for one bag.
    pub fn on_remove_model(
        &self,
        name: &str,
        callback: impl Fn(&RemoveModel<T>) + 'static,
    ) -> Subscription {
        let name: Rc<str> = Rc::from(name);
        self.bus.subscribe(move |dispatch| {
            if dispatch.name == name {
                if let BagEvent::RemoveModel(remove) = &dispatch.event {
                    callback(remove);
                }
            }
        })
    }

    /// Raw lifecycle passthroughs for one bag.
    pub fn on_engine_event(
        &self,
        name: &str,
        callback: impl Fn(&DrakeEvent) + 'static,
    ) -> Subscription {
        let name: Rc<str> = Rc::from(name);
        self.bus.subscribe(move |dispatch| {
            if dispatch.name == name {
                if let BagEvent::Engine(event) = &dispatch.event {
                    callback(event);
                }
            }
        })
    }
}

impl<T: Clone + 'static> Registry<T> for BagRegistry<T> {
    fn find(&self, name: &str) -> Option<Bag<T>> {
        self.inner
            .borrow()
            .bags
            .get(name)
            .map(|entry| entry.bag.clone())
    }

    fn add(&self, name: &str, options: DrakeOptions) -> Bag<T> {
        assert!(
            self.find(name).is_none(),
            "bag named {name:?} already exists"
        );
        let drake = Drake::new(options);
        let bag_name: Rc<str> = Rc::from(name);
        let transform = wire(self.bus.clone(), Rc::clone(&bag_name), &drake);
        let bag = Bag::new(bag_name, drake);
        self.inner.borrow_mut().bags.insert(
            name.to_string(),
            BagEntry {
                bag: bag.clone(),
                _transform: transform,
            },
        );
        tracing::debug!(name, "bag created");
        bag
    }

    fn destroy(&self, name: &str) -> bool {
        let removed = self.inner.borrow_mut().bags.remove(name).is_some();
        if removed {
            tracing::debug!(name, "bag destroyed");
        }
        removed
    }

    fn on_event(&self, callback: Rc<dyn Fn(&Dispatch<T>)>) -> Subscription {
        self.bus.subscribe(move |dispatch| callback(dispatch))
    }
}

impl<T: Clone + 'static> Default for BagRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BagRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            bus: self.bus.clone(),
        }
    }
}

impl<T> fmt::Debug for BagRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BagRegistry")
            .field("bags", &self.inner.borrow().bags.len())
            .finish()
    }
}

/// Subscribe the transform handler to a freshly created drake.
///
/// The raw event always goes out first; the derived model event, when the
/// transform produces one, follows it.
fn wire<T: Clone + 'static>(
    bus: Emitter<Dispatch<T>>,
    name: Rc<str>,
    drake: &Drake<T>,
) -> Subscription {
    let transform_drake = drake.clone();
    drake.on_event(move |event| {
        bus.notify(&Dispatch {
            name: Rc::clone(&name),
            event: BagEvent::Engine(*event),
        });
        if let Some(model_event) = transform(&transform_drake, event) {
            bus.notify(&Dispatch {
                name: Rc::clone(&name),
                event: model_event,
            });
        }
    })
}

fn transform<T: Clone>(drake: &Drake<T>, event: &DrakeEvent) -> Option<BagEvent<T>> {
    match *event {
        DrakeEvent::Drop {
            source,
            source_index,
            target,
            target_index,
        } => drop_transform(drake, source, source_index, target, target_index)
            .map(BagEvent::DropModel),
        DrakeEvent::Remove { source, item_index } => {
            remove_transform(drake, source, item_index).map(BagEvent::RemoveModel)
        }
        _ => None,
    }
}

fn drop_transform<T: Clone>(
    drake: &Drake<T>,
    source: ContainerHandle,
    source_index: usize,
    target: ContainerHandle,
    target_index: usize,
) -> Option<DropModel<T>> {
    let source_model = match drake.model_of(source) {
        Some(list) => list,
        None => {
            tracing::warn!(%source, "drop from a container this drake does not hold");
            return None;
        }
    };
    if source_index >= source_model.len() {
        tracing::warn!(
            %source,
            source_index,
            len = source_model.len(),
            "drop source index out of range"
        );
        return None;
    }
    let copy = drake.options().copy;

    if source == target {
        if copy {
            // A copy source is not reorderable; the raw event already went out.
            return None;
        }
        let mut items = source_model.as_ref().clone();
        let item = items.remove(source_index);
        let slot = target_index.min(items.len());
        items.insert(slot, item.clone());
        let new_model: ModelList<T> = Rc::new(items);
        drake.replace_model(source, Rc::clone(&new_model));
        return Some(DropModel {
            source,
            target,
            source_index,
            target_index: slot,
            item,
            source_model: Rc::clone(&new_model),
            target_model: new_model,
        });
    }

    let target_model = match drake.model_of(target) {
        Some(list) => list,
        None => {
            tracing::warn!(%target, "drop into a container this drake does not hold");
            return None;
        }
    };
    let (new_source, item) = if copy {
        (Rc::clone(&source_model), source_model[source_index].clone())
    } else {
        let mut items = source_model.as_ref().clone();
        let item = items.remove(source_index);
        let new_source: ModelList<T> = Rc::new(items);
        drake.replace_model(source, Rc::clone(&new_source));
        (new_source, item)
    };
    let mut target_items = target_model.as_ref().clone();
    let slot = target_index.min(target_items.len());
    target_items.insert(slot, item.clone());
    let new_target: ModelList<T> = Rc::new(target_items);
    drake.replace_model(target, Rc::clone(&new_target));
    Some(DropModel {
        source,
        target,
        source_index,
        target_index: slot,
        item,
        source_model: new_source,
        target_model: new_target,
    })
}

fn remove_transform<T: Clone>(
    drake: &Drake<T>,
    source: ContainerHandle,
    item_index: usize,
) -> Option<RemoveModel<T>> {
    let source_model = match drake.model_of(source) {
        Some(list) => list,
        None => {
            tracing::warn!(%source, "remove from a container this drake does not hold");
            return None;
        }
    };
    if item_index >= source_model.len() {
        tracing::warn!(
            %source,
            item_index,
            len = source_model.len(),
            "remove index out of range"
        );
        return None;
    }
    let mut items = source_model.as_ref().clone();
    let item = items.remove(item_index);
    let new_model: ModelList<T> = Rc::new(items);
    drake.replace_model(source, Rc::clone(&new_model));
    Some(RemoveModel {
        source,
        source_index: item_index,
        item,
        source_model: new_model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragbind_core::model::{model, same_model};

    fn registry() -> BagRegistry<&'static str> {
        BagRegistry::new()
    }

    #[test]
    fn add_then_find_returns_the_same_drake() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let container = ContainerHandle::new();
        bag.drake().attach(container, model(vec!["a"]));

        let found = registry.find("items").expect("bag registered");
        assert_eq!(found.drake().index_of(container), Some(0));
        assert!(registry.find("other").is_none());
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn duplicate_add_panics() {
        let registry = registry();
        registry.add("items", DrakeOptions::default());
        registry.add("items", DrakeOptions::default());
    }

    #[test]
    fn destroy_unregisters() {
        let registry = registry();
        registry.add("items", DrakeOptions::default());
        assert!(registry.destroy("items"));
        assert!(registry.find("items").is_none());
        assert!(!registry.destroy("items"));
    }

    #[test]
    fn names_and_len_track_registrations() {
        let registry = registry();
        assert!(registry.is_empty());
        registry.add("a", DrakeOptions::default());
        registry.add("b", DrakeOptions::default());
        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn drop_within_one_container_reorders() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        bag.drake().attach(list, model(vec!["a", "b", "c"]));

        let drops = Rc::new(RefCell::new(Vec::new()));
        let _guard = registry.on_drop_model("items", {
            let drops = Rc::clone(&drops);
            move |drop: &DropModel<&'static str>| drops.borrow_mut().push(drop.clone())
        });

        bag.drake().emit(DrakeEvent::Drop {
            source: list,
            source_index: 0,
            target: list,
            target_index: 2,
        });

        let new_model = bag.drake().model_of(list).unwrap();
        assert_eq!(new_model.as_slice(), ["b", "c", "a"]);

        let drops = drops.borrow();
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].item, "a");
        assert!(same_model(&drops[0].source_model, &new_model));
        assert!(same_model(&drops[0].target_model, &new_model));
    }

    #[test]
    fn drop_across_containers_moves_the_item() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let left = ContainerHandle::new();
        let right = ContainerHandle::new();
        bag.drake().attach(left, model(vec!["a", "b"]));
        bag.drake().attach(right, model(vec!["x"]));

        bag.drake().emit(DrakeEvent::Drop {
            source: left,
            source_index: 1,
            target: right,
            target_index: 0,
        });

        assert_eq!(bag.drake().model_of(left).unwrap().as_slice(), ["a"]);
        assert_eq!(bag.drake().model_of(right).unwrap().as_slice(), ["b", "x"]);
    }

    #[test]
    fn copy_mode_leaves_the_source_model_untouched() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::new().with_copy(true));
        let left = ContainerHandle::new();
        let right = ContainerHandle::new();
        let source_model = model(vec!["a", "b"]);
        bag.drake().attach(left, Rc::clone(&source_model));
        bag.drake().attach(right, model(Vec::new()));

        bag.drake().emit(DrakeEvent::Drop {
            source: left,
            source_index: 0,
            target: right,
            target_index: 0,
        });

        assert!(same_model(
            &bag.drake().model_of(left).unwrap(),
            &source_model
        ));
        assert_eq!(bag.drake().model_of(right).unwrap().as_slice(), ["a"]);
    }

    #[test]
    fn copy_mode_ignores_same_container_drops() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::new().with_copy(true));
        let list = ContainerHandle::new();
        let original = model(vec!["a", "b"]);
        bag.drake().attach(list, Rc::clone(&original));

        let engine_events = Rc::new(RefCell::new(0));
        let _raw = registry.on_engine_event("items", {
            let engine_events = Rc::clone(&engine_events);
            move |_| *engine_events.borrow_mut() += 1
        });
        let model_events = Rc::new(RefCell::new(0));
        let _drops = registry.on_drop_model("items", {
            let model_events = Rc::clone(&model_events);
            move |_| *model_events.borrow_mut() += 1
        });

        bag.drake().emit(DrakeEvent::Drop {
            source: list,
            source_index: 1,
            target: list,
            target_index: 0,
        });

        assert!(same_model(&bag.drake().model_of(list).unwrap(), &original));
        assert_eq!(*engine_events.borrow(), 1);
        assert_eq!(*model_events.borrow(), 0);
    }

    #[test]
    fn remove_deletes_the_item() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        bag.drake().attach(list, model(vec!["a", "b"]));

        let removals = Rc::new(RefCell::new(Vec::new()));
        let _guard = registry.on_remove_model("items", {
            let removals = Rc::clone(&removals);
            move |remove: &RemoveModel<&'static str>| removals.borrow_mut().push(remove.clone())
        });

        bag.drake().emit(DrakeEvent::Remove {
            source: list,
            item_index: 0,
        });

        assert_eq!(bag.drake().model_of(list).unwrap().as_slice(), ["b"]);
        let removals = removals.borrow();
        assert_eq!(removals.len(), 1);
        assert_eq!(removals[0].item, "a");
        assert_eq!(removals[0].source_index, 0);
    }

    #[test]
    fn out_of_range_drop_produces_no_model_event() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        let original = model(vec!["a"]);
        bag.drake().attach(list, Rc::clone(&original));

        let model_events = Rc::new(RefCell::new(0));
        let _drops = registry.on_drop_model("items", {
            let model_events = Rc::clone(&model_events);
            move |_| *model_events.borrow_mut() += 1
        });

        bag.drake().emit(DrakeEvent::Drop {
            source: list,
            source_index: 5,
            target: list,
            target_index: 0,
        });

        assert_eq!(*model_events.borrow(), 0);
        assert!(same_model(&bag.drake().model_of(list).unwrap(), &original));
    }

    #[test]
    fn unknown_container_drop_produces_no_model_event() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        bag.drake().attach(list, model(vec!["a"]));

        let model_events = Rc::new(RefCell::new(0));
        let _drops = registry.on_drop_model("items", {
            let model_events = Rc::clone(&model_events);
            move |_| *model_events.borrow_mut() += 1
        });

        bag.drake().emit(DrakeEvent::Drop {
            source: ContainerHandle::new(),
            source_index: 0,
            target: list,
            target_index: 0,
        });

        assert_eq!(*model_events.borrow(), 0);
    }

    #[test]
    fn target_index_past_the_end_appends() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let left = ContainerHandle::new();
        let right = ContainerHandle::new();
        bag.drake().attach(left, model(vec!["a"]));
        bag.drake().attach(right, model(vec!["x", "y"]));

        let drops = Rc::new(RefCell::new(Vec::new()));
        let _guard = registry.on_drop_model("items", {
            let drops = Rc::clone(&drops);
            move |drop: &DropModel<&'static str>| drops.borrow_mut().push(drop.clone())
        });

        bag.drake().emit(DrakeEvent::Drop {
            source: left,
            source_index: 0,
            target: right,
            target_index: 99,
        });

        assert_eq!(
            bag.drake().model_of(right).unwrap().as_slice(),
            ["x", "y", "a"]
        );
        assert_eq!(drops.borrow()[0].target_index, 2);
    }

    #[test]
    fn raw_event_precedes_its_model_event() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        bag.drake().attach(list, model(vec!["a", "b"]));

        let order = Rc::new(RefCell::new(Vec::new()));
        let _bus = registry.on_event(Rc::new({
            let order = Rc::clone(&order);
            move |dispatch: &Dispatch<&'static str>| {
                let tag = match dispatch.event {
                    BagEvent::Engine(_) => "engine",
                    BagEvent::DropModel(_) => "drop_model",
                    BagEvent::RemoveModel(_) => "remove_model",
                };
                order.borrow_mut().push(tag);
            }
        }));

        bag.drake().emit(DrakeEvent::Drop {
            source: list,
            source_index: 0,
            target: list,
            target_index: 1,
        });

        assert_eq!(*order.borrow(), vec!["engine", "drop_model"]);
    }

    #[test]
    fn destroyed_bag_stops_transforming() {
        let registry = registry();
        let bag = registry.add("items", DrakeOptions::default());
        let list = ContainerHandle::new();
        let original = model(vec!["a", "b"]);
        bag.drake().attach(list, Rc::clone(&original));

        let dispatches = Rc::new(RefCell::new(0));
        let _bus = registry.on_event(Rc::new({
            let dispatches = Rc::clone(&dispatches);
            move |_: &Dispatch<&'static str>| *dispatches.borrow_mut() += 1
        }));

        assert!(registry.destroy("items"));
        bag.drake().emit(DrakeEvent::Drop {
            source: list,
            source_index: 0,
            target: list,
            target_index: 1,
        });

        assert_eq!(*dispatches.borrow(), 0);
        assert!(same_model(&bag.drake().model_of(list).unwrap(), &original));
    }

    #[test]
    fn per_bag_helpers_filter_by_name() {
        let registry = registry();
        let cats = registry.add("cats", DrakeOptions::default());
        let dogs = registry.add("dogs", DrakeOptions::default());
        let cat_list = ContainerHandle::new();
        let dog_list = ContainerHandle::new();
        cats.drake().attach(cat_list, model(vec!["tabby", "calico"]));
        dogs.drake().attach(dog_list, model(vec!["beagle", "husky"]));

        let cat_drops = Rc::new(RefCell::new(0));
        let _guard = registry.on_drop_model("cats", {
            let cat_drops = Rc::clone(&cat_drops);
            move |_| *cat_drops.borrow_mut() += 1
        });

        dogs.drake().emit(DrakeEvent::Drop {
            source: dog_list,
            source_index: 0,
            target: dog_list,
            target_index: 1,
        });
        assert_eq!(*cat_drops.borrow(), 0);

        cats.drake().emit(DrakeEvent::Drop {
            source: cat_list,
            source_index: 0,
            target: cat_list,
            target_index: 1,
        });
        assert_eq!(*cat_drops.borrow(), 1);
    }
}
