//! The `ToolServer` seam: one implementation per transport, all serving the
//! same tool surface.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use odoo_mcp_client::ErpClient;
use odoo_mcp_core::{ServerConfig, TransportKind};
use odoo_mcp_tool_runtime::ToolRegistry;

use crate::gateway::SyncGatewayServer;
use crate::stdio::StdioServer;
use crate::streaming::StreamingHttpServer;

/// What every transport exposes: the registered tools and the client they run against.
#[derive(Clone)]
pub struct ToolSurface {
    pub registry: Arc<ToolRegistry>,
    pub erp: Arc<dyn ErpClient>,
}

impl ToolSurface {
    pub fn new(registry: Arc<ToolRegistry>, erp: Arc<dyn ErpClient>) -> Self {
        Self { registry, erp }
    }
}

#[async_trait]
pub trait ToolServer: Send + Sync {
    fn transport(&self) -> TransportKind;

    /// Serve until the transport closes or the process is interrupted.
    async fn serve(&self, surface: ToolSurface) -> anyhow::Result<()>;
}

/// Pick the server for the configured transport.
pub fn server_for(config: &ServerConfig) -> Box<dyn ToolServer> {
    match config.transport() {
        TransportKind::Stdio => Box::new(StdioServer),
        TransportKind::Http => Box::new(StreamingHttpServer::new(config.bind_addr())),
        TransportKind::Sync => Box::new(SyncGatewayServer::new(config.bind_addr())),
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
