//! Workflow template visualization tool for MCP operations

use crate::error::ArgoMcpError;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::VisualizeWorkflowTemplateRequest;
use crate::validation::{validate_label, validate_subdomain};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Tool for rendering a stored (cluster) workflow template
#[derive(Default)]
pub struct VisualizeWorkflowTemplateTool;

impl VisualizeWorkflowTemplateTool {
    /// Creates a new instance of the VisualizeWorkflowTemplateTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for VisualizeWorkflowTemplateTool {
    fn name(&self) -> &'static str {
        "visualize_workflow_template"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_of::<VisualizeWorkflowTemplateRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: VisualizeWorkflowTemplateRequest = BaseToolImpl::parse_arguments(arguments)?;
        let format = context.resolve_format(request.format.as_deref())?;
        validate_subdomain("name", &request.name)
            .map_err(|e| BaseToolImpl::map_error(e.into()))?;

        let fetched = if request.cluster_scope.unwrap_or(false) {
            tracing::info!("Visualizing cluster workflow template {} as {}", request.name, format);
            context
                .service
                .get_cluster_workflow_template(&request.name)
                .await
        } else {
            let namespace = context.resolve_namespace(request.namespace);
            validate_label("namespace", &namespace)
                .map_err(|e| BaseToolImpl::map_error(e.into()))?;
            tracing::info!(
                "Visualizing workflow template {}/{} as {}",
                namespace,
                request.name,
                format
            );
            context
                .service
                .get_workflow_template(&namespace, &request.name)
                .await
        };
        let manifest = fetched.map_err(|e| BaseToolImpl::map_error(ArgoMcpError::from(e)))?;

        let visualization = context
            .visualizer(None)
            .render_parsed_manifest(&manifest, format)
            .map_err(BaseToolImpl::map_error)?;
        BaseToolImpl::create_visualization_response(&visualization)
    }
}
