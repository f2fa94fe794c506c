//! Endpoints of the synchronous JSON gateway.
//!
//! Each sub-module owns a single concern; the shared error type lives in
//! `error.rs`.

mod error;
mod health;
mod tools;

pub use error::GatewayError;

// ── Re-exports ───────────────────────────────────────────────────

pub use health::{health, root};
pub use tools::{execute_tool, list_tools};
