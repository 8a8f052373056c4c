//! Error types for Waypost.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`WaypostError`] - Top-level error type for all Waypost operations
//! - [`TreeError`] - Rejected tree mutations
//! - [`DispatchError`] - Requests no node handled, for callers that want an error

use crate::node::NodeId;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Waypost operations.
#[derive(Error, Debug)]
pub enum WaypostError {
    /// A tree mutation was rejected.
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// A request went unhandled.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Mutations that would corrupt the tree. The offending edge is never created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A dispatcher was attached to itself.
    #[error("dispatcher {0} cannot be attached to itself")]
    SelfAttachment(NodeId),

    /// The child is already an ancestor of the dispatcher it was attached to.
    #[error("attaching dispatcher {child} under {parent} would make it its own ancestor")]
    Cycle {
        /// The dispatcher the edge was requested on.
        parent: NodeId,
        /// The would-be child.
        child: NodeId,
    },
}

/// Dispatch results reported as errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Every candidate declined.
    #[error("no node handled the request of type `{request_type}`")]
    Unhandled {
        /// Type name of the request payload.
        request_type: &'static str,
    },
}

impl From<BoxError> for WaypostError {
    fn from(err: BoxError) -> Self {
        WaypostError::Custom(err)
    }
}
