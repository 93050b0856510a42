//! The `ExecutableNode` trait: the contract every node must fulfil.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::NodeError;

/// Shared context passed to every node during execution.
///
/// Defined here (in the nodes crate) so both the host and individual node
/// implementations can import it without a circular dependency.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: uuid::Uuid,
    /// ID of the current execution run.
    pub execution_id: uuid::Uuid,
    /// ID of the node within the workflow graph.
    pub node_id: String,
    /// Initial input supplied when the execution was triggered.
    pub input: Value,
    /// The node's configured parameters (what the host form renderer produced).
    pub config: Value,
    /// Decrypted secrets scoped to this workflow.
    pub secrets: HashMap<String, String>,
}

impl ExecutionContext {
    /// Context for a single node run outside of a persisted workflow.
    pub fn standalone(node_id: impl Into<String>, config: Value) -> Self {
        Self {
            workflow_id: uuid::Uuid::new_v4(),
            execution_id: uuid::Uuid::new_v4(),
            node_id: node_id.into(),
            input: Value::Null,
            config,
            secrets: HashMap::new(),
        }
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), value.into());
        self
    }

    /// First present secret among `keys`.
    pub fn secret(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|k| self.secrets.get(*k))
            .map(String::as_str)
    }
}

/// The core node trait.
///
/// All built-in nodes and plugins must implement this.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node against one workflow item and return this node's
    /// JSON output for it.
    async fn execute(
        &self,
        input: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, NodeError>;
}
