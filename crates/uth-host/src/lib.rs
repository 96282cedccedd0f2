//! Host object system for uth.
//!
//! Objects living in the host are owned by an [`ObjectArena`] and addressed
//! through copyable [`Handle`]s. Destruction is deferred: an object is first
//! marked pending-kill (logically dead, still in memory) and only reclaimed by
//! a later [`ObjectArena::collect_garbage`] sweep. Rooted objects are exempt
//! from collection.
//!
//! ```rust
//! use uth_host::{HostObject, ObjectArena, ObjectHeader};
//!
//! #[derive(Default)]
//! struct Widget {
//!     header: ObjectHeader,
//! }
//!
//! impl HostObject for Widget {
//!     fn header(&self) -> &ObjectHeader {
//!         &self.header
//!     }
//!     fn header_mut(&mut self) -> &mut ObjectHeader {
//!         &mut self.header
//!     }
//! }
//!
//! let mut arena = ObjectArena::new();
//! let handle = arena.create(Widget::default());
//! arena.get_mut(handle).unwrap().header_mut().mark_pending_kill();
//! assert!(!arena.is_valid(handle));
//! assert_eq!(arena.collect_garbage(), 1);
//! assert!(arena.get(handle).is_none());
//! ```

pub mod arena;
pub mod module;
pub mod object;

pub use arena::{Handle, ObjectArena};
pub use module::ModuleManager;
pub use object::{HostObject, ObjectHeader};
