//! Procedural macros for Waypost.

use proc_macro::TokenStream;

mod handler;

/// Turn a function over `&T` into a leaf node type.
///
/// The function must take exactly one argument, a reference to the request
/// payload type, and return `bool`. It may be `async`. The macro replaces the
/// function with a unit struct of the same name implementing `Node`: requests
/// of another type are declined, and a `T` request is accepted when the
/// function returns `true`.
///
/// # Arguments
///
/// - `name = "Ident"`: name the generated struct differently
/// - `priority = <int>`: add an associated `PRIORITY` constant
///
/// # Example
///
/// ```rust,ignore
/// #[waypost::handler(priority = 1000)]
/// fn settings(path: &String) -> bool {
///     path.starts_with("/settings")
/// }
///
/// root.attach_owned(settings, settings::PRIORITY);
/// ```
#[proc_macro_attribute]
pub fn handler(attr: TokenStream, item: TokenStream) -> TokenStream {
    handler::handler_impl(attr, item)
}
