#![forbid(unsafe_code)]

//! Per-drake configuration.
//!
//! Options are fixed when a drake is created. The book-keeping layer
//! consumes `copy` (drop transforms clone instead of move) and
//! `mirror_container` (set by controllers configured with a local mirror);
//! the remaining fields are hints for whatever physics engine drives the
//! drake.

use crate::handle::ContainerHandle;

/// Axis a drake sorts along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Top-to-bottom item flow.
    #[default]
    Vertical,
    /// Left-to-right item flow.
    Horizontal,
}

/// Configuration attached to a drake at creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrakeOptions {
    /// Axis hint for engines.
    pub direction: Direction,
    /// Drops clone the item out of the source instead of moving it.
    pub copy: bool,
    /// Engine hint: items spilled outside every container revert.
    pub revert_on_spill: bool,
    /// Engine hint: items spilled outside every container are removed.
    /// Engines honoring this emit [`DrakeEvent::Remove`].
    ///
    /// [`DrakeEvent::Remove`]: crate::drake::DrakeEvent::Remove
    pub remove_on_spill: bool,
    /// Container that hosts the drag mirror, if not the engine default.
    pub mirror_container: Option<ContainerHandle>,
}

impl DrakeOptions {
    /// Default options: vertical, move semantics, no spill handling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sort axis.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Clone items out of the source on drop instead of moving them.
    #[must_use]
    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    /// Revert items spilled outside every container.
    #[must_use]
    pub fn with_revert_on_spill(mut self, revert: bool) -> Self {
        self.revert_on_spill = revert;
        self
    }

    /// Remove items spilled outside every container.
    #[must_use]
    pub fn with_remove_on_spill(mut self, remove: bool) -> Self {
        self.remove_on_spill = remove;
        self
    }

    /// Host the drag mirror in a specific container.
    #[must_use]
    pub fn with_mirror_container(mut self, container: ContainerHandle) -> Self {
        self.mirror_container = Some(container);
        self
    }
}
