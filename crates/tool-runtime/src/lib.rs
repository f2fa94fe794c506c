pub mod tool;
pub mod tools;
pub mod registry;

pub use tool::{Tool, ToolContext, ToolDefinition, ToolError};
pub use registry::{RegistryError, ToolRegistry};
pub use tools::ExecuteMethodTool;
