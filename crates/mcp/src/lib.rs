//! MCP (Model Context Protocol) implementation for the Odoo gateway.
//!
//! This crate implements the server side of MCP over JSON-RPC 2.0, exposing
//! the gateway's tool registry to MCP clients.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **transport**: Pluggable line transport (stdio, channels)
//! - **server**: MCP server wrapping a `ToolRegistry` and an ERP client
//! - **error**: Unified error types
//!
//! HTTP and SSE transports live in the server binary; they feed messages to
//! [`McpServer::handle_value`] directly.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use odoo_mcp::{McpServer, StdioTransport};
//! use odoo_mcp_client::ErpClient;
//! use odoo_mcp_tool_runtime::ToolRegistry;
//!
//! # async fn example(erp: Arc<dyn ErpClient>) {
//! let server = McpServer::new(Arc::new(ToolRegistry::with_builtin_tools()), erp);
//! let mut transport = StdioTransport::stdio();
//! server.run(&mut transport).await.unwrap();
//! # }
//! ```

pub mod types;
pub mod transport;
pub mod server;
pub mod error;

pub use types::*;
pub use transport::{ChannelTransport, LineTransport, McpTransport, StdioTransport};
pub use server::McpServer;
pub use error::McpError;
