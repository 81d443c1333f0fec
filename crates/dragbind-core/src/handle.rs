#![forbid(unsafe_code)]

//! Opaque identities for host UI containers.
//!
//! A drake never inspects a container; it only needs a copyable identity to
//! pair the container with its model and to name it in lifecycle events.
//! Handles come from two id spaces: [`ContainerHandle::new`] allocates from
//! a process-wide counter, and [`ContainerHandle::from_raw`] bridges hosts
//! that already number their widgets. A host must not mix the two spaces in
//! the same UI tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static CONTAINER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of a host UI container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerHandle(u64);

impl ContainerHandle {
    /// Allocate a fresh, process-unique handle.
    #[must_use]
    pub fn new() -> Self {
        Self(CONTAINER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a host-assigned id.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The underlying id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for ContainerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}
