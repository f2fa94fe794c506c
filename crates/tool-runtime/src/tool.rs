use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use odoo_mcp_client::{ErpClient, OdooError};
use odoo_mcp_core::TransportKind;

/// Describes a tool's interface: name, human description and JSON Schema input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "execute_method")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// Context passed to tool execution: the backend connection and who is calling.
#[derive(Clone)]
pub struct ToolContext {
    pub erp: Arc<dyn ErpClient>,
    /// Transport the call arrived on, for logging.
    pub transport: TransportKind,
}

impl ToolContext {
    pub fn new(erp: Arc<dyn ErpClient>, transport: TransportKind) -> Self {
        Self { erp, transport }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async. They hold no connection of
/// their own; the ERP client arrives through [`ToolContext`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON arguments.
    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError>;
}

/// Tool failures, split by who is at fault.
///
/// Both variants display their message verbatim: callers forward it to
/// clients as-is.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The caller sent arguments the tool cannot run with. Nothing was executed.
    #[error("{0}")]
    InvalidInput(String),
    /// The backend call was made and failed.
    #[error(transparent)]
    Execution(#[from] OdooError),
}
