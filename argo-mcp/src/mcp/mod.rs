//! Model Context Protocol tools
//!
//! The tools here are transport-agnostic: an MCP server lists them through
//! [`ToolRegistry::list_tools`] and forwards calls to
//! [`ToolRegistry::call_tool`] with a [`ToolContext`] that carries the
//! workflow service and configuration.

pub mod tool_registry;
pub mod tools;
pub mod types;

pub use tool_registry::{BaseToolImpl, McpTool, ToolContext, ToolRegistry};
pub use types::{
    RenderWorkflowManifestRequest, VisualizeWorkflowRequest, VisualizeWorkflowTemplateRequest,
};

/// Registry with every visualization tool registered
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    tools::register_visualization_tools(&mut registry);
    registry
}
