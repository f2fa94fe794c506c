mod api;
mod cli;
mod gateway;
mod router;
mod serve;
mod startup;
mod state;
mod stdio;
mod streaming;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use odoo_mcp_core::{Config, LogConfig};
use odoo_mcp_tool_runtime::ToolRegistry;

use crate::cli::CliArgs;
use crate::serve::ToolSurface;

fn main() -> ExitCode {
    odoo_mcp_core::config::load_dotenv();
    let args = CliArgs::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(dir) = &args.log_dir {
        log_config.dir = dir.clone();
    }
    if let Some(path) = odoo_mcp_core::init_logging(&log_config) {
        info!("Logging to {}", path.display());
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };
    let result = runtime.block_on(run(args, log_config));
    // A pending stdin read holds a blocking thread that never finishes.
    runtime.shutdown_timeout(Duration::from_secs(1));

    match result {
        Ok(()) => {
            info!("MCP server stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs, log: LogConfig) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("invalid server configuration")?;
    config.server = config
        .server
        .with_overrides(args.transport, args.host, args.port);
    config.log = log;
    startup::log_banner(&config);

    let erp = startup::connect_erp().await?;
    let surface = ToolSurface::new(Arc::new(ToolRegistry::with_builtin_tools()), erp);

    let server = serve::server_for(&config.server);
    info!("Serving tools over {}", server.transport());
    server.serve(surface).await
}
