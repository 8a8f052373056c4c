//! # waypost-core
//!
//! The dispatch tree engine of the Waypost request routing framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! applications and extensions that don't need the adapters in `waypost-std`.
//!
//! # Building Blocks
//!
//! - [`Node`] - Anything that can be asked to handle a [`Request`]
//! - [`Dispatcher`] - The composite node: children, an override slot, a parent
//! - [`Priority`] - Sibling order, highest first
//! - [`StorageOption`] / [`ObjectStorage`] - Strong or weak retention of nodes
//! - [`SkipSet`] - Nodes a traversal step must not revisit
//!
//! # Dispatching
//!
//! A request submitted to any dispatcher is offered to its own handler, its
//! override, its children by priority and finally its parent, one candidate at
//! a time. The first node that handles it is returned.
//!
//! ```rust,ignore
//! let root = Dispatcher::new();
//! root.attach(Arc::new(SettingsScreen), Priority::HIGH, StorageOption::Strong)?;
//!
//! let handled = root.dispatch(&String::from("/settings")).await;
//! assert!(handled.is_some());
//! ```
//!
//! # Error Types
//!
//! - [`WaypostError`] - Top-level error type
//! - [`TreeError`] - Rejected tree mutations
//! - [`DispatchError`] - Unhandled requests, for callers that want an error

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod ancestry;
mod dispatcher;
mod error;
mod node;
mod priority;
mod request;
mod storage;

// Re-exports
pub use ancestry::{Ancestors, Descendants};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{BoxError, DispatchError, TreeError, WaypostError};
pub use node::{Handling, Node, NodeId, NodeRef, Outcome, SkipSet};
pub use priority::Priority;
pub use request::Request;
pub use storage::{ObjectStorage, StorageOption};
