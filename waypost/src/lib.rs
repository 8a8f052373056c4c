//! # waypost - Hierarchical Request Routing
//!
//! `waypost` routes a request through a tree of prioritized dispatchers until
//! exactly one node claims it. Each dispatcher asks its own handler, then its
//! override, then its children from highest to lowest priority, and finally
//! bubbles the request up to its parent. The first node that handles the
//! request is returned to the caller.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use waypost::prelude::*;
//!
//! #[waypost::handler(priority = 1000)]
//! fn settings(path: &String) -> bool {
//!     path.starts_with("/settings")
//! }
//!
//! let root = Dispatcher::new();
//! root.attach_owned(settings, settings::PRIORITY);
//! root.add_handler(Priority::LOW, |path: &String| path == "/");
//!
//! let handled = root.dispatch(&String::from("/settings/profile")).await;
//! assert_eq!(handled.unwrap().label(), "settings");
//! ```
//!
//! ## Crates
//!
//! - `waypost-core`: the tree and the traversal
//! - `waypost-std`: closure adapters, wrappers and testing utilities
//! - `waypost-macros`: the `#[handler]` attribute (feature `macros`)
//!
//! ## Features
//!
//! - `tracing` (default): log tree mutations and dispatch results
//! - `macros` (default): re-export `#[handler]`
//! - `timeout`: the `Timeout` wrapper, backed by tokio's timer

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use waypost_core::{
    // Tree
    Ancestors,
    // Error types
    BoxError,
    Descendants,
    DispatchError,
    Dispatcher,
    DispatcherBuilder,
    // Node contract
    Handling,
    Node,
    NodeId,
    NodeRef,
    // Storage
    ObjectStorage,
    Outcome,
    Priority,
    Request,
    SkipSet,
    StorageOption,
    TreeError,
    WaypostError,
};

/// Leaf nodes built from plain functions.
pub mod adapters {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::adapters::*;
}

/// Nodes that wrap another node.
pub mod wrappers {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::wrappers::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::testing::*;
}

/// Prelude module - common imports for Waypost.
///
/// # Usage
///
/// ```rust,ignore
/// use waypost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        adapters::DispatcherExt,
        // Core types
        Dispatcher,
        Handling,
        Node,
        NodeRef,
        Outcome,
        Priority,
        Request,
        SkipSet,
        StorageOption,
        // Errors
        DispatchError,
        TreeError,
        WaypostError,
    };
}

#[cfg(feature = "macros")]
pub use waypost_macros::handler;
