//! MCP over stdin/stdout.

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use odoo_mcp::{McpServer, McpTransport, StdioTransport};
use odoo_mcp_core::TransportKind;

use crate::serve::{shutdown_signal, ToolServer, ToolSurface};

pub struct StdioServer;

#[async_trait]
impl ToolServer for StdioServer {
    fn transport(&self) -> TransportKind {
        TransportKind::Stdio
    }

    async fn serve(&self, surface: ToolSurface) -> anyhow::Result<()> {
        info!("Starting Odoo MCP server with stdio transport...");
        let mut transport = StdioTransport::stdio();
        serve_lines(surface, &mut transport).await
    }
}

/// Drive an MCP server over a line transport until EOF or Ctrl-C.
pub async fn serve_lines<T: McpTransport>(
    surface: ToolSurface,
    transport: &mut T,
) -> anyhow::Result<()> {
    let server = McpServer::new(surface.registry, surface.erp).with_transport(TransportKind::Stdio);

    tokio::select! {
        result = server.run(transport) => result.context("stdio transport failed")?,
        _ = shutdown_signal() => info!("Stopping stdio transport"),
    }
    Ok(())
}
