//! Live workflow visualization tool for MCP operations

use crate::error::ArgoMcpError;
use crate::mcp::tool_registry::{BaseToolImpl, McpTool, ToolContext};
use crate::mcp::types::VisualizeWorkflowRequest;
use crate::validation::{validate_label, validate_subdomain};
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use rmcp::Error as McpError;

/// Tool for rendering a submitted workflow and the phases of its nodes
#[derive(Default)]
pub struct VisualizeWorkflowTool;

impl VisualizeWorkflowTool {
    /// Creates a new instance of the VisualizeWorkflowTool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl McpTool for VisualizeWorkflowTool {
    fn name(&self) -> &'static str {
        "visualize_workflow"
    }

    fn description(&self) -> &'static str {
        include_str!("description.md")
    }

    fn schema(&self) -> serde_json::Value {
        BaseToolImpl::schema_of::<VisualizeWorkflowRequest>()
    }

    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let request: VisualizeWorkflowRequest = BaseToolImpl::parse_arguments(arguments)?;
        let format = context.resolve_format(request.format.as_deref())?;
        let namespace = context.resolve_namespace(request.namespace);

        validate_label("namespace", &namespace)
            .and_then(|_| validate_subdomain("name", &request.name))
            .map_err(|e| BaseToolImpl::map_error(e.into()))?;

        tracing::info!("Visualizing workflow {}/{} as {}", namespace, request.name, format);
        let workflow = context
            .service
            .get_workflow(&namespace, &request.name)
            .await
            .map_err(|e| BaseToolImpl::map_error(ArgoMcpError::from(e)))?;

        let visualization = context
            .visualizer(request.include_status)
            .render_live(&workflow, format)
            .map_err(BaseToolImpl::map_error)?;
        BaseToolImpl::create_visualization_response(&visualization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::service::InMemoryWorkflowService;
    use rmcp::model::{ErrorCode, RawContent};
    use std::sync::Arc;

    const RUNNING: &str = r#"{
  "metadata": {"name": "ci-x7k2", "namespace": "argo"},
  "status": {
    "phase": "Running",
    "nodes": {
      "ci-x7k2": {"id": "ci-x7k2", "displayName": "ci-x7k2", "templateName": "main",
                  "type": "Steps", "phase": "Running", "children": ["ci-x7k2-g0"]},
      "ci-x7k2-g0": {"id": "ci-x7k2-g0", "displayName": "[0]", "type": "StepGroup",
                     "phase": "Succeeded", "children": ["ci-x7k2-1"]},
      "ci-x7k2-1": {"id": "ci-x7k2-1", "displayName": "build", "templateName": "build",
                    "type": "Pod", "phase": "Succeeded"}
    }
  }
}"#;

    fn context() -> ToolContext {
        let service = InMemoryWorkflowService::new();
        service.insert_workflow_text("argo", RUNNING).unwrap();
        ToolContext::new(Arc::new(service), Arc::new(Config::default()))
    }

    fn arguments(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[tokio::test]
    async fn test_live_graph_in_default_namespace() {
        let result = VisualizeWorkflowTool::new()
            .execute(
                arguments(serde_json::json!({ "name": "ci-x7k2", "format": "ascii" })),
                &context(),
            )
            .await
            .unwrap();
        let RawContent::Text(text) = &result.content[0].raw else {
            panic!("expected text content");
        };
        assert_eq!(text.text, "◉ ci-x7k2 (main)\n└── ✓ build\n");
        assert!(!text.text.contains("[0]"));
    }

    #[tokio::test]
    async fn test_invalid_name_is_rejected_before_lookup() {
        let err = VisualizeWorkflowTool::new()
            .execute(
                arguments(serde_json::json!({ "name": "../secrets", "namespace": "argo" })),
                &context(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("invalid name"));

        let err = VisualizeWorkflowTool::new()
            .execute(
                arguments(serde_json::json!({ "name": "ci-x7k2", "namespace": "Kube_System" })),
                &context(),
            )
            .await
            .unwrap_err();
        assert!(err.message.contains("invalid namespace"));
    }

    #[tokio::test]
    async fn test_unknown_workflow() {
        let err = VisualizeWorkflowTool::new()
            .execute(
                arguments(serde_json::json!({ "name": "missing", "namespace": "argo" })),
                &context(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("workflow 'missing' not found"));
    }
}
