//! Completion-callback leaf nodes.

use futures::channel::oneshot;
use std::{any::Any, fmt, marker::PhantomData};
use waypost_core::{Handling, Node, Outcome, Request, SkipSet};

/// The single-use token a [`CallbackHandler`] reports its answer through.
///
/// `complete` consumes the token, so an answer is reported at most once.
/// Dropping the token without completing counts as a decline.
pub struct Completion {
    sender: oneshot::Sender<bool>,
}

impl Completion {
    /// Report whether the request was handled.
    pub fn complete(self, handled: bool) {
        // The receiver is gone only when the dispatch itself was dropped.
        let _ = self.sender.send(handled);
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("canceled", &self.sender.is_canceled())
            .finish()
    }
}

/// A leaf node backed by a function that answers through a [`Completion`].
///
/// The function may complete right away, in which case the answer is ready
/// without allocating, or hand the token to some other task and complete it
/// later.
///
/// # Example
///
/// ```rust,ignore
/// let confirm = CallbackHandler::new(|path: String, done: Completion| {
///     tokio::spawn(async move {
///         done.complete(ask_user(&path).await);
///     });
/// });
/// ```
pub struct CallbackHandler<T, F> {
    handler: F,
    _marker: PhantomData<fn(T)>,
}

impl<T, F> CallbackHandler<T, F>
where
    F: Fn(T, Completion),
{
    /// Wrap a completion-callback function.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Node for CallbackHandler<T, F>
where
    T: Any + Clone + Send + Sync,
    F: Fn(T, Completion) + Send + Sync + 'static,
{
    fn handle<'a>(&'a self, request: Request<'a>, _skip: &'a SkipSet) -> Handling<'a> {
        let Some(path) = request.downcast_ref::<T>() else {
            return Handling::declined();
        };

        let (sender, mut receiver) = oneshot::channel();
        (self.handler)(path.clone(), Completion { sender });

        match receiver.try_recv() {
            Ok(Some(handled)) => Handling::ready(Outcome::from_bool(handled)),
            Ok(None) => Handling::pending(async move {
                Outcome::from_bool(receiver.await.unwrap_or(false))
            }),
            Err(oneshot::Canceled) => Handling::declined(),
        }
    }
}
