pub mod base;
pub mod registry;

pub use base::{ToolCall, ToolDefinition, ToolHandler, ToolVersion};
pub use registry::{ToolRegistry, ToolSpec};
