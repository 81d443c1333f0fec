#![forbid(unsafe_code)]

//! Model lists and reference identity.
//!
//! A model is an immutable snapshot of a host-owned ordered list, shared as
//! `Rc<Vec<T>>`. Identity (`Rc::ptr_eq`) is the only equality this
//! workspace applies to models: reconciliation, feedback-loop avoidance,
//! and drake slot updates all compare pointers, never contents. Two lists
//! with equal elements are still different models.
//!
//! Mutation is clone-splice: build a new `Vec`, wrap it, swap the slot.
//! Holders of the old snapshot are unaffected.

use std::rc::Rc;

/// Shared, immutable snapshot of a host-owned ordered list.
pub type ModelList<T> = Rc<Vec<T>>;

/// Wrap items into a fresh [`ModelList`].
///
/// # Example
///
/// ```
/// use dragbind_core::model::{model, same_model};
///
/// let groceries = model(vec!["milk", "eggs"]);
/// let alias = groceries.clone();
/// assert!(same_model(&groceries, &alias));
/// ```
#[must_use]
pub fn model<T>(items: impl Into<Vec<T>>) -> ModelList<T> {
    Rc::new(items.into())
}

/// Reference-identity comparison of two model lists.
#[must_use]
pub fn same_model<T>(a: &ModelList<T>, b: &ModelList<T>) -> bool {
    Rc::ptr_eq(a, b)
}
