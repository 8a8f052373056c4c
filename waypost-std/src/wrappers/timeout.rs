//! Time-limited answers from a single node.

use std::time::Duration;
use tokio::time::timeout;
use waypost_core::{Handling, Node, Outcome, Request, SkipSet};

/// A node wrapper that declines when the inner node takes too long.
///
/// Ready answers pass straight through. Pending ones race a tokio timer and
/// the inner future is dropped when the timer wins, so the traversal moves on
/// to the next candidate. A dispatch reaching this node must run inside a
/// tokio runtime.
pub struct Timeout<N> {
    inner: N,
    duration: Duration,
}

impl<N> Timeout<N> {
    /// Wrap `inner`, giving it `duration` to answer.
    pub fn new(inner: N, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The time the inner node is given.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<N: Node> Node for Timeout<N> {
    fn handle<'a>(&'a self, request: Request<'a>, skip: &'a SkipSet) -> Handling<'a> {
        let handling = self.inner.handle(request, skip);
        if handling.is_ready() {
            return handling;
        }

        let duration = self.duration;
        Handling::pending(async move {
            match timeout(duration, handling).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        node = %self.inner.label(),
                        request = request.type_name(),
                        ?duration,
                        "node timed out, treating as declined"
                    );
                    Outcome::Declined
                }
            }
        })
    }

    fn label(&self) -> &str {
        self.inner.label()
    }
}
