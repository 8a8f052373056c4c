//! Closure-backed leaf nodes.

use std::{any::Any, future::Future, marker::PhantomData};
use waypost_core::{Handling, Node, Outcome, Request, SkipSet};

/// A leaf node that answers with a synchronous predicate over `T`.
///
/// Requests of any other type are declined without calling the predicate.
/// Answers are always ready, so asking this node never allocates.
///
/// # Example
///
/// ```rust,ignore
/// let settings = ClosureHandler::new(|path: &String| path == "/settings");
/// root.attach_owned(settings, Priority::MEDIUM);
/// ```
pub struct ClosureHandler<T, F> {
    handler: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> ClosureHandler<T, F>
where
    F: Fn(&T) -> bool,
{
    /// Wrap a predicate.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Node for ClosureHandler<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn handle<'a>(&'a self, request: Request<'a>, _skip: &'a SkipSet) -> Handling<'a> {
        let Some(path) = request.downcast_ref::<T>() else {
            return Handling::declined();
        };
        Handling::ready(Outcome::from_bool((self.handler)(path)))
    }
}

/// A leaf node that answers with an async function of `T`.
///
/// The function receives its own clone of the request, so the returned
/// future may outlive the dispatch step that created it.
///
/// # Example
///
/// ```rust,ignore
/// let remote = AsyncClosureHandler::new(|path: String| async move {
///     lookup_remote_route(&path).await.is_ok()
/// });
/// ```
pub struct AsyncClosureHandler<T, F> {
    handler: F,
    _marker: PhantomData<fn(T)>,
}

impl<T, F> AsyncClosureHandler<T, F> {
    /// Wrap an async function.
    pub fn new<Fut>(handler: F) -> Self
    where
        F: Fn(T) -> Fut,
    {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<T, F, Fut> Node for AsyncClosureHandler<T, F>
where
    T: Any + Clone + Send + Sync,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn handle<'a>(&'a self, request: Request<'a>, _skip: &'a SkipSet) -> Handling<'a> {
        let Some(path) = request.downcast_ref::<T>() else {
            return Handling::declined();
        };
        let handled = (self.handler)(path.clone());
        Handling::pending(async move { Outcome::from_bool(handled.await) })
    }
}
