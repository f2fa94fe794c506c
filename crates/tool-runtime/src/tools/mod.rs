//! Built-in tools exposed by the gateway.

pub mod execute_method;

pub use execute_method::ExecuteMethodTool;
