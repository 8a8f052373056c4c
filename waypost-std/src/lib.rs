//! # waypost-std
//!
//! Standard nodes for the Waypost request routing framework.
//!
//! This crate provides:
//! - **Closure adapters**: [`ClosureHandler`](adapters::ClosureHandler),
//!   [`AsyncClosureHandler`](adapters::AsyncClosureHandler),
//!   [`CallbackHandler`](adapters::CallbackHandler) and the
//!   [`DispatcherExt`](adapters::DispatcherExt) registration methods
//! - **Wrappers**: [`Traced`](wrappers::Traced), and `Timeout` with the
//!   `timeout` feature
//! - **Testing utilities**: [`RecordingNode`](testing::RecordingNode),
//!   [`VisitLog`](testing::VisitLog)

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core
pub use waypost_core;

// Modules
pub mod adapters;
pub mod testing;
pub mod wrappers;
