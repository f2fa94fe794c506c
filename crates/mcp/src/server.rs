//! MCP server implementation.
//!
//! Wraps a `ToolRegistry` and the ERP client and exposes the tools over the
//! MCP protocol. Message handling takes `&self`, so one server can be driven
//! by a stdio loop or shared by concurrent HTTP sessions.

use std::sync::Arc;

use serde_json::{json, Value};

use odoo_mcp_client::ErpClient;
use odoo_mcp_core::TransportKind;
use odoo_mcp_tool_runtime::{ToolContext, ToolError, ToolRegistry};

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// MCP server that bridges a `ToolRegistry` to MCP clients.
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    erp: Arc<dyn ErpClient>,
    server_name: String,
    server_version: String,
    transport: TransportKind,
}

impl McpServer {
    /// Create a new MCP server over the given tools and ERP client.
    pub fn new(registry: Arc<ToolRegistry>, erp: Arc<dyn ErpClient>) -> Self {
        Self {
            registry,
            erp,
            server_name: "odoo-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            transport: TransportKind::Stdio,
        }
    }

    /// Record which transport drives this server (passed on to tools).
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Run the server loop, reading from and writing to the transport.
    ///
    /// Processes JSON-RPC messages until the transport is closed.
    pub async fn run<T: McpTransport>(&self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(
            server = %self.server_name,
            transport = %self.transport,
            "MCP server starting"
        );

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "Received message");

            if let Some(response) = self.handle_line(&line).await {
                let json = serde_json::to_string(&response)?;
                tracing::debug!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("Transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(line) {
            Ok(raw) => self.handle_value(raw).await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                Some(McpError::JsonParse(e).into_response(RpcId::Null))
            }
        }
    }

    /// Handle one parsed message. Returns `None` for notifications.
    pub async fn handle_value(&self, raw: Value) -> Option<JsonRpcResponse> {
        if raw.is_array() {
            let err = McpError::InvalidRequest("batching not supported".to_string());
            return Some(err.into_response(RpcId::Null));
        }
        if !raw.is_object() {
            let err = McpError::InvalidRequest("message must be a JSON object".to_string());
            return Some(err.into_response(RpcId::Null));
        }

        // Distinguish requests (have "id") from notifications (no "id").
        if raw.get("id").is_none() {
            match serde_json::from_value::<JsonRpcNotification>(raw) {
                Ok(notif) => self.handle_notification(&notif),
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed notification"),
            }
            return None;
        }

        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => Some(self.handle_request(&request).await),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
                Some(McpError::InvalidRequest(e.to_string()).into_response(RpcId::Null))
            }
        }
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(&request.params).await,
            method => {
                tracing::warn!(method = %method, "Unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => err.into_response(id),
        }
    }

    fn handle_notification(&self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                tracing::debug!("Client cancelled a request");
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    fn handle_initialize(&self, params: &Option<Value>) -> Result<Value, McpError> {
        let client = params
            .clone()
            .and_then(|p| serde_json::from_value::<InitializeParams>(p).ok())
            .and_then(|p| p.client_info)
            .map(|c| c.name)
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!(client = %client, "Handling initialize");

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_list_tools(&self) -> Result<Value, McpError> {
        tracing::debug!("Handling tools/list");

        let tools: Vec<ToolInfo> = self.registry.list().into_iter().map(ToolInfo::from).collect();
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    async fn handle_call_tool(&self, params: &Option<Value>) -> Result<Value, McpError> {
        let params = params
            .clone()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call_params: CallToolParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(tool = %call_params.name, "Handling tools/call");

        let tool = self
            .registry
            .get(&call_params.name)
            .ok_or_else(|| McpError::ToolNotFound(call_params.name.clone()))?;

        let ctx = ToolContext::new(self.erp.clone(), self.transport);
        let arguments = match call_params.arguments {
            Value::Null => json!({}),
            other => other,
        };

        let result = match tool.execute(arguments, &ctx).await {
            Ok(value) => {
                CallToolResult::text(render(&json!({"success": true, "result": value})), false)
            }
            Err(ToolError::InvalidInput(message)) => CallToolResult::text(message, true),
            Err(e) => {
                tracing::error!(tool = %call_params.name, error = %e, "Tool execution error");
                let body = json!({"success": false, "error": e.to_string()});
                CallToolResult::text(render(&body), true)
            }
        };

        Ok(serde_json::to_value(result)?)
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use odoo_mcp_client::testing::StubErpClient;

    fn test_server() -> McpServer {
        let erp = StubErpClient::new()
            .returning("res.partner", "search_count", json!(42))
            .failing("res.partner", "unlink", "Access Denied");
        McpServer::new(Arc::new(ToolRegistry::with_builtin_tools()), Arc::new(erp))
    }

    fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(
            RpcId::Number(id),
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
    }

    fn tool_text(resp: JsonRpcResponse) -> (String, bool) {
        let result: CallToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        match &result.content[0] {
            ToolContent::Text { text } => (text.clone(), result.is_error),
        }
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = test_server();
        let req = JsonRpcRequest::new(
            RpcId::Number(1),
            "initialize",
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test-client"}
            })),
        );

        let resp = server.handle_request(&req).await;
        assert!(resp.error.is_none());
        let result: InitializeResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.protocol_version, PROTOCOL_VERSION);
        assert_eq!(result.server_info.name, "odoo-mcp");
    }

    #[tokio::test]
    async fn test_handle_list_tools() {
        let server = test_server();
        let req = JsonRpcRequest::new(RpcId::Number(2), "tools/list", None);

        let resp = server.handle_request(&req).await;
        let result: ListToolsResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.tools.len(), 1);
        assert_eq!(result.tools[0].name, "execute_method");
        assert_eq!(result.tools[0].input_schema["required"], json!(["model", "method"]));
    }

    #[tokio::test]
    async fn test_call_execute_method() {
        let server = test_server();
        let resp = server
            .handle_request(&call(
                3,
                "execute_method",
                json!({"model": "res.partner", "method": "search_count", "args": [[]]}),
            ))
            .await;

        let (text, is_error) = tool_text(resp);
        assert!(!is_error);
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body, json!({"success": true, "result": 42}));
    }

    #[tokio::test]
    async fn test_call_execution_failure_is_tool_error() {
        let server = test_server();
        let resp = server
            .handle_request(&call(
                4,
                "execute_method",
                json!({"model": "res.partner", "method": "unlink"}),
            ))
            .await;

        assert!(resp.error.is_none());
        let (text, is_error) = tool_text(resp);
        assert!(is_error);
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body, json!({"success": false, "error": "Access Denied"}));
    }

    #[tokio::test]
    async fn test_call_with_missing_method() {
        let server = test_server();
        let resp = server
            .handle_request(&call(5, "execute_method", json!({"model": "res.partner"})))
            .await;
        let (text, is_error) = tool_text(resp);
        assert!(is_error);
        assert_eq!(text, "model and method are required");
    }

    #[tokio::test]
    async fn test_handle_call_tool_not_found() {
        let server = test_server();
        let resp = server.handle_request(&call(6, "nonexistent", json!({}))).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let server = test_server();
        let req = JsonRpcRequest::new(RpcId::Number(7), "resources/list", None);
        let resp = server.handle_request(&req).await;
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error_and_batch_rejection() {
        let server = test_server();
        let resp = server.handle_line("{not json").await.unwrap();
        assert_eq!(resp.id, RpcId::Null);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);

        let resp = server.handle_line("[]").await.unwrap();
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_non_object_message_is_invalid_request() {
        let server = test_server();
        for line in ["5", "\"hello\"", "null", "true"] {
            let resp = server.handle_line(line).await.unwrap();
            assert_eq!(resp.id, RpcId::Null);
            assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let server = test_server();
        let resp = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_server_run_with_channel_transport() {
        let (mut client_side, mut server_side) = ChannelTransport::pair();
        let server = test_server();

        let server_handle = tokio::spawn(async move { server.run(&mut server_side).await });

        let init_req = JsonRpcRequest::new(
            RpcId::Number(1),
            "initialize",
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test"}
            })),
        );
        client_side
            .send(&serde_json::to_string(&init_req).unwrap())
            .await
            .unwrap();
        let resp_line = client_side.receive().await.unwrap().unwrap();
        let resp: JsonRpcResponse = serde_json::from_str(&resp_line).unwrap();
        assert!(resp.error.is_none());

        // Notifications produce no output; the next line read is the call's response.
        client_side
            .send(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .unwrap();

        let call_req = call(
            2,
            "execute_method",
            json!({"model": "res.partner", "method": "search_count"}),
        );
        client_side
            .send(&serde_json::to_string(&call_req).unwrap())
            .await
            .unwrap();
        let resp_line = client_side.receive().await.unwrap().unwrap();
        let resp: JsonRpcResponse = serde_json::from_str(&resp_line).unwrap();
        assert_eq!(resp.id, RpcId::Number(2));
        let (text, is_error) = tool_text(resp);
        assert!(!is_error);
        assert!(text.contains("42"));

        // Drop client side to close the transport and let server exit
        drop(client_side);
        server_handle.await.unwrap().unwrap();
    }
}
