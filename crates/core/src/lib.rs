//! Shared plumbing for the Odoo MCP gateway: environment configuration,
//! transport selection and log setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod transport;

pub use config::{Config, LogConfig, OdooConfig, ServerConfig};
pub use error::ConfigError;
pub use logging::init_logging;
pub use transport::{TransportKind, TransportSelection};
