//! `VocallabsNode`: the [`ExecutableNode`] the host dispatches to.

use std::sync::Arc;

use async_trait::async_trait;
use nodes::{ExecutableNode, ExecutionContext, NodeError};
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::GatewayConfig;
use crate::credentials::VocallabsCredentials;
use crate::error::NormalizedError;
use crate::gateway::Gateway;
use crate::operations::{self, Resource};
use crate::params::Params;

/// Config key selecting the resource.
pub const RESOURCE_KEY: &str = "resource";
/// Config key selecting the operation.
pub const OPERATION_KEY: &str = "operation";

#[derive(Debug)]
pub struct VocallabsNode {
    gateway: Gateway,
}

impl VocallabsNode {
    /// A node with its own token cache.
    pub fn new(config: GatewayConfig) -> Result<Self, NormalizedError> {
        Self::with_cache(config, Arc::default())
    }

    /// A node sharing `cache` with other nodes of the same process.
    pub fn with_cache(
        config: GatewayConfig,
        cache: Arc<crate::token_cache::TokenCache>,
    ) -> Result<Self, NormalizedError> {
        Ok(Self {
            gateway: Gateway::new(config, cache)?,
        })
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Resolve and run one operation for one item.
    ///
    /// # Errors
    /// Local validation failures are returned before credentials are read
    /// or any request is sent.
    #[instrument(skip_all, fields(node_id = %ctx.node_id))]
    pub async fn run(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NormalizedError> {
        let (resource, operation) = selection(&ctx.config)?;
        let params = Params::new(ctx.config.clone(), input);

        let prepared = operations::prepare(resource, &operation, &params)?;
        let credentials = VocallabsCredentials::from_context(ctx)?;

        info!(%resource, operation = %operation, "executing VocalLabs operation");
        prepared.run(&self.gateway, &credentials).await
    }
}

/// Resource and operation named by the node configuration, with defaults.
pub fn selection(config: &Value) -> Result<(Resource, String), NormalizedError> {
    let resource = match config.get(RESOURCE_KEY).and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.trim().parse()?,
        _ => Resource::Agent,
    };
    let operation = match config.get(OPERATION_KEY).and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => resource.default_operation().to_string(),
    };
    Ok((resource, operation))
}

#[async_trait]
impl ExecutableNode for VocallabsNode {
    async fn execute(&self, input: Value, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        self.run(input, ctx).await.map_err(NodeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selection_defaults() {
        let (resource, operation) = selection(&json!({})).unwrap();
        assert_eq!(resource, Resource::Agent);
        assert_eq!(operation, "getAgents");

        let (resource, operation) = selection(&json!({ "resource": "contacts" })).unwrap();
        assert_eq!(resource, Resource::Contacts);
        assert_eq!(operation, "getContacts");

        let (_, operation) = selection(&json!({ "resource": "call", "operation": "getVoices" })).unwrap();
        assert_eq!(operation, "getVoices");
    }

    #[test]
    fn unknown_resource_is_rejected() {
        let err = selection(&json!({ "resource": "billing" })).unwrap_err();
        assert_eq!(err.http_code, "400");
        assert!(err.message.starts_with("Unknown resource \"billing\""));
    }

    #[tokio::test]
    async fn validation_runs_before_credentials_are_read() {
        let node = VocallabsNode::new(GatewayConfig::default()).unwrap();
        let ctx = ExecutionContext::standalone(
            "vocallabs",
            json!({ "resource": "campaign", "operation": "getCampaignStatus" }),
        );
        let err = node.execute(Value::Null, &ctx).await.unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.http_code(), Some("400"));
        assert!(err.message().starts_with("Campaign ID required"));
    }
}
