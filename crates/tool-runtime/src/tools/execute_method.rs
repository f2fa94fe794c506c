//! `execute_method`: call any method on any Odoo model.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::tool::{Tool, ToolContext, ToolDefinition, ToolError};

/// Forwards `model.method(*args, **kwargs)` to the ERP client.
pub struct ExecuteMethodTool;

pub const TOOL_NAME: &str = "execute_method";

/// Message returned when `model` or `method` is absent or empty.
pub const MISSING_TARGET: &str = "model and method are required";

/// Validated arguments of one call.
#[derive(Debug, PartialEq)]
struct MethodCall {
    model: String,
    method: String,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
}

impl MethodCall {
    fn from_input(input: &Value) -> Result<Self, ToolError> {
        let non_empty = |key: &str| {
            input
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let (Some(model), Some(method)) = (non_empty("model"), non_empty("method")) else {
            return Err(ToolError::InvalidInput(MISSING_TARGET.to_string()));
        };

        let args = match input.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(ToolError::InvalidInput("args must be an array".to_string())),
        };
        let kwargs = match input.get("kwargs") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(ToolError::InvalidInput("kwargs must be an object".to_string())),
        };

        Ok(Self {
            model,
            method,
            args,
            kwargs,
        })
    }
}

#[async_trait]
impl Tool for ExecuteMethodTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Execute a read-only method on an Odoo model".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "model": {"type": "string"},
                    "method": {"type": "string"},
                    "args": {"type": "array"},
                    "kwargs": {"type": "object"}
                },
                "required": ["model", "method"],
                "additionalProperties": false
            }),
        }
    }

    async fn execute(&self, input: Value, context: &ToolContext) -> Result<Value, ToolError> {
        let call = MethodCall::from_input(&input)?;
        debug!(
            transport = %context.transport,
            model = %call.model,
            method = %call.method,
            "executing Odoo method"
        );

        context
            .erp
            .execute_method(&call.model, &call.method, call.args, call.kwargs)
            .await
            .map_err(|e| {
                warn!(model = %call.model, method = %call.method, error = %e, "Odoo method failed");
                ToolError::Execution(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odoo_mcp_client::testing::StubErpClient;
    use odoo_mcp_core::TransportKind;
    use serde_json::json;
    use std::sync::Arc;

    fn context(stub: StubErpClient) -> (ToolContext, Arc<StubErpClient>) {
        let stub = Arc::new(stub);
        (ToolContext::new(stub.clone(), TransportKind::Sync), stub)
    }

    #[test]
    fn schema_requires_model_and_method() {
        let def = ExecuteMethodTool.definition();
        assert_eq!(def.input_schema["required"], json!(["model", "method"]));
        assert_eq!(def.input_schema["additionalProperties"], json!(false));
    }

    #[test]
    fn args_and_kwargs_default_to_empty() {
        let call =
            MethodCall::from_input(&json!({"model": "res.partner", "method": "search"})).unwrap();
        assert!(call.args.is_empty());
        assert!(call.kwargs.is_empty());
    }

    #[test]
    fn empty_model_is_rejected() {
        let err = MethodCall::from_input(&json!({"model": "", "method": "read"})).unwrap_err();
        assert_eq!(err.to_string(), MISSING_TARGET);
    }

    #[test]
    fn non_string_method_is_rejected() {
        let err =
            MethodCall::from_input(&json!({"model": "res.partner", "method": 3})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn args_must_be_an_array() {
        let err = MethodCall::from_input(&json!({"model": "m", "method": "x", "args": {"a": 1}}))
            .unwrap_err();
        assert_eq!(err.to_string(), "args must be an array");
    }

    #[tokio::test]
    async fn forwards_to_erp_client() {
        let (ctx, stub) =
            context(StubErpClient::new().returning("res.partner", "search_count", json!(42)));
        let result = ExecuteMethodTool
            .execute(
                json!({
                    "model": "res.partner",
                    "method": "search_count",
                    "args": [[]],
                    "kwargs": {}
                }),
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(result, json!(42));

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec![json!([])]);
    }

    #[tokio::test]
    async fn missing_method_never_reaches_client() {
        let (ctx, stub) = context(StubErpClient::new());
        let err = ExecuteMethodTool
            .execute(json!({"model": "res.partner"}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn backend_failure_is_an_execution_error() {
        let (ctx, _stub) =
            context(StubErpClient::new().failing("sale.order", "action_confirm", "boom"));
        let err = ExecuteMethodTool
            .execute(json!({"model": "sale.order", "method": "action_confirm"}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
