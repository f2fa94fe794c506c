use std::sync::{Arc, OnceLock};

use odoo_mcp_client::ErpClient;
use odoo_mcp_tool_runtime::ToolRegistry;

/// Shared state of the synchronous HTTP gateway.
///
/// The ERP client is installed once after the app is built; until then the
/// gateway answers but refuses tool execution.
pub struct GatewayState {
    pub registry: Arc<ToolRegistry>,
    erp: OnceLock<Arc<dyn ErpClient>>,
}

impl GatewayState {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            erp: OnceLock::new(),
        }
    }

    /// Install the ERP client. Returns `false` if one was already installed.
    pub fn install_client(&self, erp: Arc<dyn ErpClient>) -> bool {
        self.erp.set(erp).is_ok()
    }

    pub fn client(&self) -> Option<Arc<dyn ErpClient>> {
        self.erp.get().cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.erp.get().is_some()
    }
}
