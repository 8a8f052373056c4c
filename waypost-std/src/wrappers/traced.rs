//! Span instrumentation for a single node.

use waypost_core::{Handling, Node, Request, SkipSet};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// A node wrapper that runs the inner node inside a `tracing` span.
///
/// Every request asked of the inner node gets a `node_dispatch` span carrying
/// the wrapper's name and the request type. A pending answer is instrumented
/// with the span and logged at `debug` level when it arrives; a ready answer is
/// returned as is. Without the `tracing` feature the wrapper only forwards.
///
/// The wrapper is a node of its own: an accepting inner node is reported as
/// the wrapper, and a wrapped dispatcher is not treated as a dispatcher by
/// ancestry checks.
pub struct Traced<N> {
    inner: N,
    name: &'static str,
}

impl<N> Traced<N> {
    /// Wrap `inner`, labelling its spans with `name`.
    pub const fn new(inner: N, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// The wrapped node.
    pub fn inner(&self) -> &N {
        &self.inner
    }
}

impl<N: Clone> Clone for Traced<N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            name: self.name,
        }
    }
}

impl<N: Node> Node for Traced<N> {
    #[cfg(feature = "tracing")]
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a> {
        let span = tracing::debug_span!(
            "node_dispatch",
            node = %self.name,
            request = request.type_name(),
            skipped = skip.len()
        );
        let handling = span.in_scope(|| self.inner.handle(request, skip));
        if handling.is_ready() {
            span.in_scope(|| tracing::debug!("node answered without suspending"));
            return handling;
        }

        Handling::pending(
            async move {
                let outcome = handling.await;
                tracing::debug!(?outcome, "node answered");
                outcome
            }
            .instrument(span),
        )
    }

    #[cfg(not(feature = "tracing"))]
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a> {
        self.inner.handle(request, skip)
    }

    fn label(&self) -> &str {
        self.name
    }
}
