//! ERP client for the Odoo MCP gateway.
//!
//! The gateway only ever needs one operation from the backend: run a method
//! on a model with positional and keyword arguments. [`ErpClient`] is that
//! seam; [`OdooClient`] implements it over Odoo's JSON-RPC endpoint, and
//! tests substitute their own fakes.

pub mod error;
mod jsonrpc;
pub mod odoo;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use error::OdooError;
pub use odoo::OdooClient;

/// A connection able to run methods on ERP models.
///
/// Implementations are shared across concurrent requests as
/// `Arc<dyn ErpClient>` and must not require exclusive access.
#[async_trait]
pub trait ErpClient: Send + Sync {
    /// Call `model.method(*args, **kwargs)` on the backend and return its result.
    async fn execute_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError>;
}
