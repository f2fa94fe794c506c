//! Synchronous JSON gateway: plain request/response tool execution over HTTP.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{info, warn};

use odoo_mcp_core::TransportKind;

use crate::router::build_router;
use crate::serve::{shutdown_signal, ToolServer, ToolSurface};
use crate::state::GatewayState;

/// Gateway state with the surface's client installed.
fn gateway_state(surface: ToolSurface) -> Arc<GatewayState> {
    let state = Arc::new(GatewayState::new(surface.registry));
    if state.install_client(surface.erp) {
        info!("Odoo client initialized successfully");
    } else {
        warn!("Odoo client was already installed; keeping the existing one");
    }
    state
}

pub struct SyncGatewayServer {
    addr: String,
}

impl SyncGatewayServer {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl ToolServer for SyncGatewayServer {
    fn transport(&self) -> TransportKind {
        TransportKind::Sync
    }

    async fn serve(&self, surface: ToolSurface) -> anyhow::Result<()> {
        let app = build_router(gateway_state(surface));
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .with_context(|| format!("failed to bind {}", self.addr))?;
        info!("Starting Odoo HTTP API server on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP API server failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odoo_mcp_client::testing::StubErpClient;
    use odoo_mcp_tool_runtime::ToolRegistry;

    #[test]
    fn serving_state_starts_connected() {
        let surface = ToolSurface::new(
            Arc::new(ToolRegistry::with_builtin_tools()),
            Arc::new(StubErpClient::new()),
        );
        let state = gateway_state(surface);
        assert!(state.is_connected());
        assert!(!state.install_client(Arc::new(StubErpClient::new())));
    }
}
