//! `nodes` crate: the `ExecutableNode` contract shared by the host runtime
//! and node plugins.
//!
//! Every node plugin must implement [`ExecutableNode`]. The host dispatches
//! execution through this trait object and renders [`NodeApiError`]s to the
//! end user.

pub mod error;
pub mod traits;

pub use error::{NodeApiError, NodeError};
pub use traits::{ExecutableNode, ExecutionContext};
