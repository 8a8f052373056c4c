//! Type-erased requests.

use std::any::{Any, type_name};
use std::fmt;

/// A request travelling through the dispatch tree.
///
/// The tree never inspects the payload. Each leaf probes it with
/// [`Request::downcast_ref`] and declines when the type is not its own.
///
/// ```rust,ignore
/// let path = String::from("/settings");
/// let request = Request::new(&path);
/// assert_eq!(request.downcast_ref::<String>(), Some(&path));
/// assert!(request.downcast_ref::<u32>().is_none());
/// ```
#[derive(Clone, Copy)]
pub struct Request<'a> {
    payload: &'a (dyn Any + Send + Sync),
    type_name: &'static str,
}

impl<'a> Request<'a> {
    /// Wrap a payload.
    pub fn new<T: Any + Send + Sync>(payload: &'a T) -> Self {
        Self {
            payload,
            type_name: type_name::<T>(),
        }
    }

    /// The payload as `T`, or `None` when it is some other type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.payload.downcast_ref::<T>()
    }

    /// Whether the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// The payload's type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The raw payload.
    pub fn payload(&self) -> &'a (dyn Any + Send + Sync) {
        self.payload
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
