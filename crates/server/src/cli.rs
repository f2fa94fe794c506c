//! Command-line arguments. Everything here can also be set through the
//! environment; flags win over `TRANSPORT`, `HOST` and `PORT`.

use std::path::PathBuf;

use clap::Parser;

use odoo_mcp_core::TransportKind;

/// Odoo MCP gateway: exposes Odoo model methods as MCP tools over stdio,
/// streaming HTTP/SSE or a plain JSON HTTP API.
#[derive(Parser, Debug)]
#[command(name = "odoo-mcp-server", version, about)]
pub struct CliArgs {
    /// Transport to serve: stdio, http (alias sse) or sync.
    #[arg(long)]
    pub transport: Option<TransportKind>,

    /// Listen address for the network transports.
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port for the network transports.
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for the per-run log file.
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}
