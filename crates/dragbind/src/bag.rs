#![forbid(unsafe_code)]

//! Named drag groups.

use std::fmt;
use std::rc::Rc;

use dragbind_core::drake::Drake;

/// A named drag group: the pairing of a registry name with its drake.
///
/// Bags are cheap to clone; clones observe the same drake state.
pub struct Bag<T> {
    name: Rc<str>,
    drake: Drake<T>,
}

impl<T> Bag<T> {
    /// Pair `name` with `drake`.
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>, drake: Drake<T>) -> Self {
        Self {
            name: name.into(),
            drake,
        }
    }

    /// The bag's registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The drake backing this bag.
    #[must_use]
    pub fn drake(&self) -> &Drake<T> {
        &self.drake
    }
}

impl<T> Clone for Bag<T> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            drake: self.drake.clone(),
        }
    }
}

impl<T> fmt::Debug for Bag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bag")
            .field("name", &self.name)
            .field("slots", &self.drake.len())
            .finish()
    }
}
