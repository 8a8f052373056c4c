//! Testing utilities for Waypost.
//!
//! # Features
//!
//! - [`VisitLog`]: A shared, ordered log of the nodes asked during a dispatch
//! - [`RecordingNode`]: A leaf that records every request and skip set it sees

use std::{
    any::Any,
    fmt,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    task::{Context, Poll},
};
use waypost_core::{Handling, Node, Outcome, Request, SkipSet};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Visit Log
// ============================================================================

/// A shared log of node labels, in the order the nodes were asked.
///
/// Clones share the same log, so one log can be handed to every node of a
/// tree under test.
///
/// # Example
///
/// ```rust,ignore
/// let log = VisitLog::new();
/// root.attach_owned(RecordingNode::declining("a").with_log(&log), Priority::LOW);
/// root.attach_owned(RecordingNode::declining("b").with_log(&log), Priority::HIGH);
///
/// root.dispatch(&"anything").await;
/// assert_eq!(log.entries(), vec!["b", "a"]);
/// ```
#[derive(Clone, Default)]
pub struct VisitLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl VisitLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label.
    pub fn record(&self, label: impl Into<String>) {
        lock(&self.entries).push(label.into());
    }

    /// A copy of the labels recorded so far.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

impl fmt::Debug for VisitLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(lock(&self.entries).iter()).finish()
    }
}

// ============================================================================
// Recording Node
// ============================================================================

/// One request a [`RecordingNode`] was asked to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Type name of the request payload.
    pub request_type: &'static str,
    /// The skip set the node received.
    pub skip: SkipSet,
}

type Accepts = dyn Fn(Request<'_>) -> bool + Send + Sync;

/// A leaf node that records every request it is asked about.
///
/// Whether it accepts is fixed at construction: nothing, every request of one
/// type, or requests equal to one value. Clones share the recorded visits.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingNode::accepting_value("p", String::from("/r"));
/// let node = parent.attach_owned(recorder.clone(), Priority::LOW);
///
/// child.dispatch(&String::from("/r")).await;
/// assert_eq!(recorder.visit_count(), 1);
/// assert!(recorder.last_skip().unwrap().contains(child.id()));
/// ```
#[derive(Clone)]
pub struct RecordingNode {
    label: String,
    accepts: Arc<Accepts>,
    asynchronous: bool,
    log: Option<VisitLog>,
    visits: Arc<Mutex<Vec<Visit>>>,
}

impl RecordingNode {
    fn with_predicate(label: impl Into<String>, accepts: Arc<Accepts>) -> Self {
        Self {
            label: label.into(),
            accepts,
            asynchronous: false,
            log: None,
            visits: Arc::default(),
        }
    }

    /// A node that declines everything.
    pub fn declining(label: impl Into<String>) -> Self {
        Self::with_predicate(label, Arc::new(|_: Request<'_>| false))
    }

    /// A node that accepts everything.
    pub fn accepting(label: impl Into<String>) -> Self {
        Self::with_predicate(label, Arc::new(|_: Request<'_>| true))
    }

    /// A node that accepts requests equal to `value`.
    pub fn accepting_value<T>(label: impl Into<String>, value: T) -> Self
    where
        T: Any + PartialEq + Send + Sync,
    {
        Self::with_predicate(
            label,
            Arc::new(move |request: Request<'_>| request.downcast_ref::<T>() == Some(&value)),
        )
    }

    /// A node that accepts every request of type `T`.
    pub fn accepting_type<T: Any>(label: impl Into<String>) -> Self {
        Self::with_predicate(label, Arc::new(|request: Request<'_>| request.is::<T>()))
    }

    /// Also append the label to `log` whenever this node is asked.
    pub fn with_log(mut self, log: &VisitLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Answer with a pending [`Handling`] instead of a ready one.
    pub fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }

    /// Every visit so far, oldest first.
    pub fn visits(&self) -> Vec<Visit> {
        lock(&self.visits).clone()
    }

    /// How many times this node was asked.
    pub fn visit_count(&self) -> usize {
        lock(&self.visits).len()
    }

    /// The skip set of the most recent visit.
    pub fn last_skip(&self) -> Option<SkipSet> {
        lock(&self.visits).last().map(|visit| visit.skip.clone())
    }

    /// Forget recorded visits.
    pub fn clear(&self) {
        lock(&self.visits).clear();
    }
}

impl Node for RecordingNode {
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a> {
        lock(&self.visits).push(Visit {
            request_type: request.type_name(),
            skip: skip.clone(),
        });
        if let Some(log) = &self.log {
            log.record(self.label.as_str());
        }

        let outcome = Outcome::from_bool((self.accepts)(request));
        if self.asynchronous {
            Handling::pending(async move {
                YieldOnce::default().await;
                outcome
            })
        } else {
            Handling::ready(outcome)
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

/// Returns `Pending` on its first poll and wakes itself right away.
#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

impl fmt::Debug for RecordingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingNode")
            .field("label", &self.label)
            .field("asynchronous", &self.asynchronous)
            .field("visits", &self.visit_count())
            .finish_non_exhaustive()
    }
}
