#![forbid(unsafe_code)]

//! Model-aware drag-and-drop list binding.
//!
//! A drag engine moves things on screen; the application owns ordered
//! lists. This crate is the book-keeping between the two. Containers are
//! grouped into named **bags**; each bag owns a **drake** whose container
//! and model sequences stay index-aligned; a [`ContainerBinding`] per
//! container reconciles whatever the host declares against what is
//! attached, and hands drag outcomes back as new list snapshots. Model
//! equality is reference identity throughout, which is what keeps host
//! write-backs from cycling.
//!
//! # Architecture
//!
//! - [`registry`]: bags, find/add/destroy, the dispatch bus, and the
//!   clone-splice model transforms for `Drop` and `Remove`
//! - [`binding`]: the per-container reconciliation controller
//! - [`host`]: an observable model cell and guarded two-way wiring
//!
//! The engine-facing substrate ([`Drake`], [`ContainerHandle`],
//! [`ModelList`], [`Emitter`]) lives in `dragbind-core` and is re-exported
//! here.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use dragbind::{BagRegistry, ContainerBinding, ContainerHandle, DrakeEvent, Registry, model};
//!
//! let registry: Rc<BagRegistry<&str>> = Rc::new(BagRegistry::new());
//! let todo_col = ContainerHandle::new();
//! let done_col = ContainerHandle::new();
//!
//! let todo = ContainerBinding::new(Rc::clone(&registry) as Rc<dyn Registry<&str>>, todo_col);
//! todo.set_group("board");
//! todo.set_model(model(vec!["write docs", "fix bug"]));
//!
//! let done = ContainerBinding::new(Rc::clone(&registry) as Rc<dyn Registry<&str>>, done_col);
//! done.set_group("board");
//! done.set_model(model(vec!["release"]));
//!
//! // The engine reports: first todo item dropped at the top of done.
//! registry.find("board").unwrap().drake().emit(DrakeEvent::Drop {
//!     source: todo_col,
//!     source_index: 0,
//!     target: done_col,
//!     target_index: 0,
//! });
//!
//! assert_eq!(todo.model().unwrap().as_slice(), ["fix bug"]);
//! assert_eq!(done.model().unwrap().as_slice(), ["write docs", "release"]);
//! ```

pub mod bag;
pub mod binding;
pub mod events;
pub mod host;
pub mod registry;

pub use bag::Bag;
pub use binding::ContainerBinding;
pub use events::{BagEvent, Dispatch, DropModel, RemoveModel};
pub use host::{ModelCell, TwoWayModel, two_way};
pub use registry::{BagRegistry, Registry};

pub use dragbind_core::drake::{Drake, DrakeEvent};
pub use dragbind_core::events::{Emitter, Subscription};
pub use dragbind_core::handle::ContainerHandle;
pub use dragbind_core::model::{ModelList, model, same_model};
pub use dragbind_core::options::{Direction, DrakeOptions};
