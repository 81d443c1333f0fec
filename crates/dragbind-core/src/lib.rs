#![forbid(unsafe_code)]

//! Engine-facing substrate for the `dragbind` workspace.
//!
//! This crate holds the pieces a drag engine touches directly:
//!
//! - [`ContainerHandle`]: opaque identity for host UI containers
//! - [`ModelList`]: shared, reference-identity list snapshots
//! - [`DrakeOptions`]: per-drake configuration
//! - [`Emitter`] / [`Subscription`]: single-threaded callback bus
//! - [`Drake`] / [`DrakeEvent`]: aligned container/model book-keeping and
//!   the raw lifecycle event stream
//!
//! Everything here is single-threaded by construction (`Rc`, `RefCell`).
//! The host-facing reconciliation layer lives in the `dragbind` crate.

pub mod drake;
pub mod events;
pub mod handle;
pub mod model;
pub mod options;

pub use drake::{Drake, DrakeEvent};
pub use events::{Emitter, Subscription};
pub use handle::ContainerHandle;
pub use model::{ModelList, model, same_model};
pub use options::{Direction, DrakeOptions};
