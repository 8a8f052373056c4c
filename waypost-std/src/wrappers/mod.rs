//! Nodes that wrap another node and change how it is asked.

mod traced;
#[cfg(feature = "timeout")]
mod timeout;

pub use traced::Traced;
#[cfg(feature = "timeout")]
pub use timeout::Timeout;
