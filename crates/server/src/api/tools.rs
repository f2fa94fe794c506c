//! Tool listing and execution.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};

use odoo_mcp_core::TransportKind;
use odoo_mcp_tool_runtime::{ToolContext, ToolDefinition, ToolError};

use crate::state::GatewayState;

use super::GatewayError;

const CLIENT_NOT_INITIALIZED: &str = "Odoo client not initialized";

// ── Listing ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

impl From<ToolDefinition> for ToolDescriptor {
    fn from(def: ToolDefinition) -> Self {
        Self {
            name: def.name,
            description: def.description,
            schema: def.input_schema,
        }
    }
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDescriptor>,
}

pub async fn list_tools(State(state): State<Arc<GatewayState>>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.registry.list().into_iter().map(ToolDescriptor::from).collect(),
    })
}

// ── Execution ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ToolExecuteRequest {
    pub tool: String,
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct ToolExecuteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolExecuteResponse {
    fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }
}

/// `POST /tools/execute`.
///
/// The body is read raw so that a missing ERP client is reported before
/// the payload is validated.
pub async fn execute_tool(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<Json<ToolExecuteResponse>, GatewayError> {
    let erp = state
        .client()
        .ok_or_else(|| GatewayError::ServiceUnavailable(CLIENT_NOT_INITIALIZED.to_string()))?;

    let request: ToolExecuteRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::UnprocessableEntity(format!("Invalid request body: {e}")))?;

    let tool = state
        .registry
        .get(&request.tool)
        .ok_or_else(|| GatewayError::BadRequest(format!("Unknown tool: {}", request.tool)))?;

    info!(tool = %request.tool, "Executing tool");
    let ctx = ToolContext::new(erp, TransportKind::Sync);

    match tool.execute(Value::Object(request.arguments), &ctx).await {
        Ok(result) => Ok(Json(ToolExecuteResponse::ok(result))),
        Err(ToolError::InvalidInput(message)) => Err(GatewayError::BadRequest(message)),
        Err(e) => {
            error!(tool = %request.tool, error = ?e, "Tool execution error");
            Ok(Json(ToolExecuteResponse::failed(e.to_string())))
        }
    }
}
