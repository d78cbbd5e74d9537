//! Visualization tools
//!
//! Each tool lives in its own submodule with its description in
//! `description.md` next to it:
//!
//! - **render_manifest**: render manifest text passed in the call
//! - **visualize_workflow**: fetch a submitted workflow and render its live nodes
//! - **visualize_template**: fetch a (cluster) workflow template and render it

pub mod render_manifest;
pub mod visualize_template;
pub mod visualize_workflow;

use crate::mcp::tool_registry::ToolRegistry;

/// Register all visualization tools with the registry
pub fn register_visualization_tools(registry: &mut ToolRegistry) {
    registry.register(render_manifest::RenderWorkflowManifestTool::new());
    registry.register(visualize_workflow::VisualizeWorkflowTool::new());
    registry.register(visualize_template::VisualizeWorkflowTemplateTool::new());
}
