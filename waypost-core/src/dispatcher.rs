//! # Dispatch Engine (Dispatcher)
//!
//! A Dispatcher is the composite node of a dispatch tree. It holds an ordered
//! set of children, an optional override slot and a weak back-reference to its
//! parent, and decides which single node handles a request.
//!
//! # Traversal
//!
//! For a request `R` and an incoming skip set `S`, a dispatcher `D`:
//!
//! 1. asks its own handler, if it has one (a hit means `D` handled `R`);
//! 2. asks the override node, unless it is in `S`;
//! 3. asks each child not in `S`, highest priority first, ties in attach order;
//! 4. asks its parent, unless it is in `S`.
//!
//! Candidates in steps 2-4 receive `S ∪ {D}`, so the parent never re-descends
//! into `D` and a composite override never loops back into it. The first
//! candidate that handles `R` ends the traversal; a candidate is only asked
//! once the previous one has answered.
//!
//! ```text
//!           (A)
//!          /   \
//!        (B)   (C)
//!       / | \     \
//!     (D)(E)(F)   (G)
//! ```
//!
//! Dispatching from `D` with only `G` able to handle the request visits
//! `D, B, E, F, A, C, G` (children in priority order) and returns `G`.
//!
//! # Snapshots
//!
//! Each step works on a snapshot of the dispatcher's candidates taken when
//! the step starts. Attaching or detaching while a request is in flight never
//! disturbs the candidate list that request is walking.

use crate::{
    ancestry::{Ancestors, Descendants},
    error::{DispatchError, TreeError},
    node::{Handling, Node, NodeId, NodeRef, Outcome, SkipSet},
    priority::Priority,
    request::Request,
    storage::{ObjectStorage, StorageOption},
};
use std::{
    any::Any,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
};

/// Serializes structural edits across every tree, so a cycle check and the
/// edge it admits happen as one step.
static TOPOLOGY: Mutex<()> = Mutex::new(());

fn topology() -> MutexGuard<'static, ()> {
    TOPOLOGY.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Child {
    node: ObjectStorage<dyn Node>,
    priority: Priority,
    sequence: u64,
}

#[derive(Default)]
struct State {
    children: Vec<Child>,
    next_sequence: u64,
    override_slot: Option<ObjectStorage<dyn Node>>,
}

impl State {
    fn push(&mut self, node: ObjectStorage<dyn Node>, priority: Priority) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.children.push(Child {
            node,
            priority,
            sequence,
        });
    }

    fn prune(&mut self) -> Vec<Child> {
        let (live, dead) = std::mem::take(&mut self.children)
            .into_iter()
            .partition(|child| child.node.is_live());
        self.children = live;
        dead
    }
}

/// Candidates of one traversal step, in the order they are asked.
struct Snapshot {
    override_node: Option<NodeRef>,
    children: Vec<NodeRef>,
    parent: Option<Arc<Dispatcher>>,
}

/// The composite node of a dispatch tree.
///
/// Dispatchers always live behind an [`Arc`]; create them with
/// [`Dispatcher::new`] or [`Dispatcher::builder`].
///
/// # Example
///
/// ```rust,ignore
/// let root = Dispatcher::new();
/// let settings = Dispatcher::builder().name("settings").build();
/// root.attach(settings.clone(), Priority::HIGH, StorageOption::Strong)?;
///
/// if let Some(node) = settings.dispatch(&String::from("/profile")).await {
///     println!("handled by {}", node.label());
/// }
/// ```
pub struct Dispatcher {
    me: Weak<Dispatcher>,
    name: Option<String>,
    handler: Option<NodeRef>,
    parent: RwLock<Option<Weak<Dispatcher>>>,
    state: RwLock<State>,
}

/// Builder for constructing a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    name: Option<String>,
    handler: Option<NodeRef>,
}

impl DispatcherBuilder {
    /// Create a builder for an unnamed dispatcher without its own handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the dispatcher in logs and `Debug` output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Let the dispatcher handle requests itself.
    ///
    /// The handler is asked before the override and the children. When it
    /// accepts, the dispatcher is reported as the handling node.
    pub fn handler<N: Node>(mut self, handler: N) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Arc<Dispatcher> {
        Arc::new_cyclic(|me| Dispatcher {
            me: Weak::clone(me),
            name: self.name,
            handler: self.handler,
            parent: RwLock::new(None),
            state: RwLock::new(State::default()),
        })
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Arc<Self> {
        DispatcherBuilder::new().build()
    }

    /// Start building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// This dispatcher's identity.
    pub fn id(&self) -> NodeId {
        NodeId::from_ptr(self as *const Self)
    }

    /// The label given at build time.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // Tree queries

    /// The dispatcher holding this one as a child or override, if it is alive.
    pub fn parent(&self) -> Option<Arc<Dispatcher>> {
        self.parent
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Live children in the order they are asked.
    pub fn children(&self) -> Vec<NodeRef> {
        self.snapshot_children()
    }

    /// The priority `node` was attached with, if it is a live child.
    pub fn priority_of(&self, node: &NodeRef) -> Option<Priority> {
        let id = NodeId::of(node);
        self.read_state()
            .children
            .iter()
            .find(|child| child.node.points_to(id) && child.node.is_live())
            .map(|child| child.priority)
    }

    /// The live override node.
    pub fn override_node(&self) -> Option<NodeRef> {
        self.read_state().override_slot.as_ref().and_then(ObjectStorage::get)
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors::new(self.parent())
    }

    /// Every node reachable through children, in pre-order.
    pub fn descendants(&self) -> Descendants {
        Descendants::new(self.children())
    }

    // Tree mutation

    /// Attach `node` as a child.
    ///
    /// Re-attaching an existing child updates its priority and storage in
    /// place; it keeps its original position among equal-priority siblings.
    /// A dispatcher child is first detached from its previous owner and then
    /// gets this dispatcher as its parent.
    ///
    /// # Errors
    ///
    /// [`TreeError`] when `node` is this dispatcher or one of its ancestors.
    pub fn attach(
        &self,
        node: NodeRef,
        priority: Priority,
        storage: StorageOption,
    ) -> Result<(), TreeError> {
        let id = NodeId::of(&node);

        let dead = {
            let _topology = topology();
            self.adopt(&node)?;

            let dead = {
                let mut state = self.write_state();
                let dead = state.prune();
                if let Some(existing) =
                    state.children.iter_mut().find(|child| child.node.points_to(id))
                {
                    existing.node = storage.store(&node);
                    existing.priority = priority;
                } else {
                    state.push(storage.store(&node), priority);
                }
                dead
            };
            self.claim(&node);
            dead
        };
        drop(dead);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            dispatcher = %self.label(),
            child = %node.label(),
            %priority,
            ?storage,
            "attached child"
        );
        Ok(())
    }

    /// Attach a freshly created node, held strongly, and return it.
    ///
    /// A node that nothing else references cannot close a cycle, so this
    /// cannot fail.
    pub fn attach_owned<N: Node>(&self, node: N, priority: Priority) -> NodeRef {
        let node: NodeRef = Arc::new(node);
        {
            let _topology = topology();
            self.write_state()
                .push(StorageOption::Strong.store(&node), priority);
            self.claim(&node);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            dispatcher = %self.label(),
            child = %node.label(),
            %priority,
            "attached owned child"
        );
        node
    }

    /// Detach `node` from the children and the override slot.
    ///
    /// A no-op when `node` is neither. A dispatcher's parent pointer is only
    /// cleared when it points here.
    pub fn detach(&self, node: &NodeRef) {
        let removed = {
            let _topology = topology();
            self.detach_id(NodeId::of(node))
        };
        drop(removed);
    }

    /// Remove `id` from both slots. The caller holds the topology lock and
    /// drops the returned storage after releasing it.
    fn detach_id(&self, id: NodeId) -> Vec<ObjectStorage<dyn Node>> {
        let removed: Vec<ObjectStorage<dyn Node>> = {
            let mut state = self.write_state();
            let mut removed = Vec::new();
            state.children.retain(|child| {
                if child.node.points_to(id) {
                    removed.push(child.node.clone());
                    false
                } else {
                    true
                }
            });
            if state.override_slot.as_ref().is_some_and(|slot| slot.points_to(id)) {
                removed.extend(state.override_slot.take());
            }
            removed
        };

        if removed.is_empty() {
            return removed;
        }
        if let Some(node) = removed.iter().find_map(ObjectStorage::get) {
            self.release(&node);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(dispatcher = %self.label(), child = %id, "detached node");
        removed
    }

    /// Put `node` in the override slot, replacing any previous override.
    ///
    /// The override is asked before every child and before the parent.
    ///
    /// # Errors
    ///
    /// [`TreeError`] when `node` is this dispatcher or one of its ancestors.
    pub fn set_override(&self, node: NodeRef, storage: StorageOption) -> Result<(), TreeError> {
        let previous = {
            let _topology = topology();
            self.adopt(&node)?;

            let previous = self
                .write_state()
                .override_slot
                .replace(storage.store(&node));
            self.claim(&node);
            if let Some(previous) = previous.as_ref().and_then(ObjectStorage::get) {
                self.release(&previous);
            }
            previous
        };
        drop(previous);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            dispatcher = %self.label(),
            node = %node.label(),
            ?storage,
            "override set"
        );
        Ok(())
    }

    /// Empty the override slot.
    ///
    /// A node that is also a child keeps this dispatcher as its parent.
    pub fn clear_override(&self) {
        let previous = {
            let _topology = topology();
            let previous = self.write_state().override_slot.take();
            if let Some(node) = previous.as_ref().and_then(ObjectStorage::get) {
                self.release(&node);
            }
            previous
        };

        #[cfg(feature = "tracing")]
        {
            if let Some(node) = previous.as_ref().and_then(ObjectStorage::get) {
                tracing::debug!(dispatcher = %self.label(), node = %node.label(), "override cleared");
            }
        }
        drop(previous);
    }

    /// Validate an edge from here to `node` and move a dispatcher `node` away
    /// from its previous owner.
    fn adopt(&self, node: &NodeRef) -> Result<(), TreeError> {
        let Some(child) = node.as_dispatcher() else {
            return Ok(());
        };

        let child_id = child.id();
        if child_id == self.id() {
            #[cfg(feature = "tracing")]
            tracing::warn!(dispatcher = %self.label(), "rejected self attachment");
            return Err(TreeError::SelfAttachment(child_id));
        }
        if self.ancestors().any(|ancestor| ancestor.id() == child_id) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                dispatcher = %self.label(),
                child = %child.label(),
                "rejected attachment that would create a cycle"
            );
            return Err(TreeError::Cycle {
                parent: self.id(),
                child: child_id,
            });
        }

        if let Some(previous) = child.parent() {
            if previous.id() != self.id() {
                // `node` outlives the removed entries.
                previous.detach_id(child_id);
            }
        }
        Ok(())
    }

    /// Whether `id` sits in the children or the override slot.
    fn holds(&self, id: NodeId) -> bool {
        let state = self.read_state();
        state.children.iter().any(|child| child.node.points_to(id))
            || state.override_slot.as_ref().is_some_and(|slot| slot.points_to(id))
    }

    fn claim(&self, node: &NodeRef) {
        if let Some(child) = node.as_dispatcher() {
            child.set_parent(Some(Weak::clone(&self.me)));
        }
    }

    /// Clear the parent pointer of a dispatcher `node` that is no longer held
    /// here in either slot.
    fn release(&self, node: &NodeRef) {
        let Some(child) = node.as_dispatcher() else {
            return;
        };
        if self.holds(child.id()) {
            return;
        }
        let mut parent = child.parent.write().unwrap_or_else(PoisonError::into_inner);
        if parent.as_ref().is_some_and(|p| p.as_ptr() == self as *const Self) {
            *parent = None;
        }
    }

    fn set_parent(&self, parent: Option<Weak<Dispatcher>>) {
        *self.parent.write().unwrap_or_else(PoisonError::into_inner) = parent;
    }

    // Traversal

    fn snapshot_children(&self) -> Vec<NodeRef> {
        let mut live: Vec<(Priority, u64, NodeRef)> = self
            .read_state()
            .children
            .iter()
            .filter_map(|child| child.node.get().map(|node| (child.priority, child.sequence, node)))
            .collect();
        // Stable sort with an explicit sequence tie-break.
        live.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        live.into_iter().map(|(_, _, node)| node).collect()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            override_node: self.override_node(),
            children: self.snapshot_children(),
            parent: self.parent(),
        }
    }

    async fn traverse(&self, request: Request<'_>, skip: &SkipSet) -> Outcome {
        if let Some(handler) = &self.handler {
            match handler.handle(request, skip).await {
                Outcome::Declined => {}
                outcome => return outcome,
            }
        }

        let Snapshot {
            override_node,
            children,
            parent,
        } = self.snapshot();
        let skip = skip.with(self.id());

        let candidates = override_node
            .into_iter()
            .chain(children)
            .chain(parent.map(|parent| parent as NodeRef));

        for candidate in candidates {
            if skip.contains(NodeId::of(&candidate)) {
                continue;
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(
                dispatcher = %self.label(),
                candidate = %candidate.label(),
                request = request.type_name(),
                "asking candidate"
            );

            let outcome = candidate.handle(request, &skip).await;
            if let Some(handled) = outcome.resolve(&candidate) {
                return Outcome::Delegated(handled);
            }
        }
        Outcome::Declined
    }

    /// Find the node that handles `payload`, starting here.
    pub async fn dispatch<T: Any + Send + Sync>(self: &Arc<Self>, payload: &T) -> Option<NodeRef> {
        self.dispatch_ignoring(Request::new(payload), &SkipSet::new())
            .await
    }

    /// Find the node that handles `request`, never visiting a node in `skip`.
    pub async fn dispatch_ignoring(
        self: &Arc<Self>,
        request: Request<'_>,
        skip: &SkipSet,
    ) -> Option<NodeRef> {
        let this: NodeRef = Arc::clone(self) as NodeRef;
        let handled = self.traverse(request, skip).await.resolve(&this);

        #[cfg(feature = "tracing")]
        {
            match &handled {
                Some(node) => tracing::debug!(
                    dispatcher = %self.label(),
                    request = request.type_name(),
                    handler = %node.label(),
                    "request handled"
                ),
                None => tracing::debug!(
                    dispatcher = %self.label(),
                    request = request.type_name(),
                    "request unhandled"
                ),
            }
        }
        handled
    }

    /// Like [`Dispatcher::dispatch`], reporting an unhandled request as an error.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Unhandled`] when every candidate declined.
    pub async fn try_dispatch<T: Any + Send + Sync>(
        self: &Arc<Self>,
        payload: &T,
    ) -> Result<NodeRef, DispatchError> {
        self.dispatch(payload)
            .await
            .ok_or(DispatchError::Unhandled {
                request_type: std::any::type_name::<T>(),
            })
    }

    /// Run [`Dispatcher::dispatch`] to completion on the current thread.
    ///
    /// Nodes that need a runtime-specific timer or reactor must not be
    /// reachable from a blocking dispatch.
    pub fn dispatch_blocking<T: Any + Send + Sync>(self: &Arc<Self>, payload: &T) -> Option<NodeRef> {
        futures::executor::block_on(self.dispatch(payload))
    }
}

impl Node for Dispatcher {
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a> {
        Handling::pending(self.traverse(request, skip))
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("dispatcher")
    }

    fn as_dispatcher(&self) -> Option<&Dispatcher> {
        Some(self)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Dispatcher")
            .field("id", &self.id())
            .field("name", &self.name)
            .field("children", &state.children.len())
            .field("has_override", &state.override_slot.is_some())
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
