//! # Node Layer
//!
//! The capability contract every participant of a dispatch tree implements:
//! "attempt to handle this request, skipping these nodes, and tell me who
//! handled it".
//!
//! # Sync and Async Leaves
//!
//! A node answers with a [`Handling`], which is either already resolved or a
//! boxed future. Synchronous leaves return [`Handling::ready`] and never
//! allocate; nodes that need to wait on I/O return [`Handling::pending`].
//!
//! ```rust,ignore
//! struct SettingsScreen;
//!
//! impl Node for SettingsScreen {
//!     fn handle<'a>(&'a self, request: Request<'a>, _skip: &'a SkipSet) -> Handling<'a> {
//!         match request.downcast_ref::<String>() {
//!             Some(path) if path == "/settings" => Handling::accepted(),
//!             _ => Handling::declined(),
//!         }
//!     }
//! }
//! ```

use crate::{dispatcher::Dispatcher, request::Request};
use futures::future::{BoxFuture, Either, Ready, ready};
use std::{
    any::type_name,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

/// A shared reference to any node.
pub type NodeRef = Arc<dyn Node>;

/// Identity of a node: the address of its allocation.
///
/// Two handles are the same node exactly when their ids are equal; node
/// values are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The id of the node behind `node`.
    pub fn of<T: ?Sized>(node: &Arc<T>) -> Self {
        Self::from_ptr(Arc::as_ptr(node))
    }

    pub(crate) fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.cast::<()>() as usize)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// The answer a node gives when asked to handle a request.
#[derive(Clone)]
pub enum Outcome {
    /// Not this node's request.
    Declined,
    /// The asked node handled the request itself.
    Accepted,
    /// Another node, reached through the asked one, handled the request.
    Delegated(NodeRef),
}

impl Outcome {
    /// `Accepted` when `handled`, `Declined` otherwise.
    pub fn from_bool(handled: bool) -> Self {
        if handled { Self::Accepted } else { Self::Declined }
    }

    /// Whether some node handled the request.
    pub fn is_handled(&self) -> bool {
        !matches!(self, Self::Declined)
    }

    /// The handling node, given the node that was asked.
    pub fn resolve(self, asked: &NodeRef) -> Option<NodeRef> {
        match self {
            Self::Declined => None,
            Self::Accepted => Some(Arc::clone(asked)),
            Self::Delegated(node) => Some(node),
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declined => f.write_str("Declined"),
            Self::Accepted => f.write_str("Accepted"),
            Self::Delegated(node) => f
                .debug_tuple("Delegated")
                .field(&format_args!("{} {}", node.label(), NodeId::of(node)))
                .finish(),
        }
    }
}

/// A node's answer, possibly still in progress.
///
/// Resolves to exactly one [`Outcome`].
pub struct Handling<'a>(Either<Ready<Outcome>, BoxFuture<'a, Outcome>>);

impl<'a> Handling<'a> {
    /// An answer that is already known.
    pub fn ready(outcome: Outcome) -> Self {
        Self(Either::Left(ready(outcome)))
    }

    /// Shorthand for `Handling::ready(Outcome::Declined)`.
    pub fn declined() -> Self {
        Self::ready(Outcome::Declined)
    }

    /// Shorthand for `Handling::ready(Outcome::Accepted)`.
    pub fn accepted() -> Self {
        Self::ready(Outcome::Accepted)
    }

    /// An answer that arrives later.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Outcome> + Send + 'a,
    {
        Self(Either::Right(Box::pin(future)))
    }

    /// Whether the answer is already known.
    pub fn is_ready(&self) -> bool {
        matches!(self.0, Either::Left(_))
    }
}

impl Future for Handling<'_> {
    type Output = Outcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

impl fmt::Debug for Handling<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handling")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Nodes a traversal step must not visit.
///
/// Every dispatcher adds itself before asking its candidates, so a parent
/// never re-descends into the child that bubbled the request up, and a child
/// never bounces it back to the parent that asked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    ids: Vec<NodeId>,
}

impl SkipSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` must be skipped.
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Add `id`. Returns `false` when it was already present.
    pub fn insert(&mut self, id: NodeId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// A copy of this set that also contains `id`.
    pub fn with(&self, id: NodeId) -> Self {
        let mut extended = self.clone();
        extended.insert(id);
        extended
    }

    /// Number of skipped nodes.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is skipped.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Skipped ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<NodeId> for SkipSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<NodeId> for SkipSet {
    fn extend<I: IntoIterator<Item = NodeId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// A participant in a dispatch tree.
///
/// Leaves decide for themselves whether a request is theirs and answer
/// `Accepted` or `Declined`; they ignore `skip`. Composite nodes
/// ([`Dispatcher`]) walk their candidates and answer `Delegated` with the
/// node that ended up handling the request.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a dispatch tree `Node`",
    label = "missing `Node` implementation",
    note = "Nodes must implement `handle` and answer with a `Handling`."
)]
pub trait Node: Send + Sync + 'static {
    /// Attempt to handle `request`, never visiting a node in `skip`.
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a>;

    /// A human readable label for logs.
    fn label(&self) -> &str {
        type_name::<Self>()
    }

    /// The composite view of this node, if it is a dispatcher.
    fn as_dispatcher(&self) -> Option<&Dispatcher> {
        None
    }
}

impl fmt::Debug for dyn Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), NodeId::from_ptr(self as *const dyn Node))
    }
}
