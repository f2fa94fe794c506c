//! Server startup: banner, environment report and ERP client construction.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use odoo_mcp_client::{ErpClient, OdooClient};
use odoo_mcp_core::config::log_odoo_environment;
use odoo_mcp_core::{Config, OdooConfig};

/// Log what this process is about to do before anything can fail.
pub fn log_banner(config: &Config) {
    let server = &config.server;
    info!("=== Odoo MCP Server Starting ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Transport: {}", server.transport());

    let selection = server.selection();
    if let Some(raw) = &selection.unrecognized {
        warn!("Unknown TRANSPORT '{}', falling back to stdio", raw);
    }
    if selection.from_deployment_mode {
        info!("DEPLOYMENT_MODE=http, serving streaming HTTP");
    }

    config.log_summary();
    log_odoo_environment();
}

/// Load the Odoo settings and authenticate. Any failure here is fatal.
pub async fn connect_erp() -> anyhow::Result<Arc<dyn ErpClient>> {
    let odoo = OdooConfig::from_env().context("Odoo connection is not configured")?;
    let client = OdooClient::connect(&odoo)
        .await
        .context("Failed to initialize Odoo client")?;
    info!("Odoo client initialized (uid {})", client.uid());
    Ok(Arc::new(client))
}
