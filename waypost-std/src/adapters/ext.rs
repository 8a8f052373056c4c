//! Closure registration directly on a dispatcher.

use super::{AsyncClosureHandler, CallbackHandler, ClosureHandler, Completion};
use std::{any::Any, future::Future};
use waypost_core::{Dispatcher, NodeRef, Priority};

/// Attach closures to a [`Dispatcher`] without naming the adapter types.
///
/// Every method wraps the closure in its adapter, attaches it as a strongly
/// held child and returns the node, so it can later be passed to
/// [`Dispatcher::detach`].
///
/// # Example
///
/// ```rust,ignore
/// let root = Dispatcher::new();
/// let settings = root.add_handler(Priority::HIGH, |path: &String| path == "/settings");
///
/// assert!(root.dispatch(&String::from("/settings")).await.is_some());
/// root.detach(&settings);
/// ```
pub trait DispatcherExt {
    /// Attach a synchronous predicate over `T`.
    fn add_handler<T, F>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> bool + Send + Sync + 'static;

    /// Attach an async function of `T`.
    fn add_async_handler<T, F, Fut>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Clone + Send + Sync,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static;

    /// Attach a function that answers through a [`Completion`].
    fn add_callback_handler<T, F>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Clone + Send + Sync,
        F: Fn(T, Completion) + Send + Sync + 'static;
}

impl DispatcherExt for Dispatcher {
    fn add_handler<T, F>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.attach_owned(ClosureHandler::new(handler), priority)
    }

    fn add_async_handler<T, F, Fut>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Clone + Send + Sync,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.attach_owned(AsyncClosureHandler::new(handler), priority)
    }

    fn add_callback_handler<T, F>(&self, priority: Priority, handler: F) -> NodeRef
    where
        T: Any + Clone + Send + Sync,
        F: Fn(T, Completion) + Send + Sync + 'static,
    {
        self.attach_owned(CallbackHandler::new(handler), priority)
    }
}
