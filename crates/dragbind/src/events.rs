#![forbid(unsafe_code)]

//! Service-level events: raw lifecycle passthroughs plus the model-aware
//! payloads the registry derives from `Drop` and `Remove`.

use std::rc::Rc;

use dragbind_core::drake::DrakeEvent;
use dragbind_core::handle::ContainerHandle;
use dragbind_core::model::ModelList;

/// Model outcome of a drop.
///
/// On a same-container reorder, `source_model` and `target_model` are the
/// same new list. In copy mode `source_model` is the source's unchanged
/// list.
#[derive(Debug, Clone)]
pub struct DropModel<T> {
    /// Container the item left.
    pub source: ContainerHandle,
    /// Container the item landed in.
    pub target: ContainerHandle,
    /// Index the item held in the source model.
    pub source_index: usize,
    /// Index the item holds in the target model, after clamping.
    pub target_index: usize,
    /// The moved (or copied) item.
    pub item: T,
    /// Model now shown by the source container.
    pub source_model: ModelList<T>,
    /// Model now shown by the target container.
    pub target_model: ModelList<T>,
}

/// Model outcome of an out-of-bounds removal.
#[derive(Debug, Clone)]
pub struct RemoveModel<T> {
    /// Container the item was dragged out of.
    pub source: ContainerHandle,
    /// Index the item held in the source model.
    pub source_index: usize,
    /// The removed item.
    pub item: T,
    /// Model now shown by the source container.
    pub source_model: ModelList<T>,
}

/// One event on a bag's stream.
#[derive(Debug, Clone)]
pub enum BagEvent<T> {
    /// Raw lifecycle event, forwarded unchanged.
    Engine(DrakeEvent),
    /// A drop, after its model transform.
    DropModel(DropModel<T>),
    /// A removal, after its model transform.
    RemoveModel(RemoveModel<T>),
}

/// Envelope carried on the registry bus.
#[derive(Debug, Clone)]
pub struct Dispatch<T> {
    /// Name of the bag the event belongs to.
    pub name: Rc<str>,
    /// The event.
    pub event: BagEvent<T>,
}
