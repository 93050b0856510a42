//! `vocallabs` crate: a workflow node for the VocalLabs voice-calling API.
//!
//! The crate is organised around one outbound path:
//!
//! ```text
//! VocallabsNode::execute
//!   -> operations::prepare   (local validation, request building)
//!   -> Gateway::send         (token cache, bearer auth, error normalization)
//!   -> FailureContext::apply (operation-specific wording)
//! ```
//!
//! Validation failures never reach the network. Every failure that leaves
//! the crate is a [`NormalizedError`], converted to the host's
//! [`nodes::NodeError`] at the trait boundary.

pub mod config;
pub mod credentials;
pub mod description;
pub mod error;
pub mod gateway;
pub mod node;
pub mod operations;
pub mod params;
pub mod request;
pub mod token_cache;
pub mod validate;

#[cfg(test)]
mod gateway_tests;

pub use config::GatewayConfig;
pub use credentials::VocallabsCredentials;
pub use description::{describe, NodeDescription};
pub use error::{ErrorKind, NormalizedError};
pub use gateway::Gateway;
pub use node::VocallabsNode;
pub use operations::{prepare, Prepared, Resource};
pub use params::Params;
pub use request::RequestDescriptor;
pub use token_cache::TokenCache;
