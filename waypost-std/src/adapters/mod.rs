//! Leaf nodes built from plain functions.
//!
//! - [`ClosureHandler`] - `Fn(&T) -> bool`, always answers immediately
//! - [`AsyncClosureHandler`] - `Fn(T) -> impl Future<Output = bool>`
//! - [`CallbackHandler`] - `Fn(T, Completion)`, answers whenever the
//!   [`Completion`] is completed
//! - [`DispatcherExt`] - attach any of the above in one call
//!
//! All three decline requests whose payload is not a `T`.

mod callback;
mod closure;
mod ext;

pub use callback::{CallbackHandler, Completion};
pub use closure::{AsyncClosureHandler, ClosureHandler};
pub use ext::DispatcherExt;
