//! Manifest rendering tool for MCP operations

use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::RenderWorkflowManifestRequest;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Tool for rendering a workflow manifest passed as text
#[derive(Default)]
pub struct RenderWorkflowManifestTool;

impl RenderWorkflowManifestTool {
    /// Creates a new instance of the RenderWorkflowManifestTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for RenderWorkflowManifestTool {
    fn name(&self) -> &'static str {
        "render_workflow_manifest"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_of::<RenderWorkflowManifestRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: RenderWorkflowManifestRequest = BaseToolImpl::parse_arguments(arguments)?;
        let format = context.resolve_format(request.format.as_deref())?;
        tracing::info!("Rendering workflow manifest as {}", format);

        let visualization = context
            .visualizer(request.include_status)
            .render_manifest(&request.manifest, format.as_str())
            .map_err(BaseToolImpl::map_error)?;
        BaseToolImpl::create_visualization_response(&visualization)
    }
}
