//! Request types for the visualization MCP tools

use serde::{Deserialize, Serialize};

/// Request to render a workflow manifest given as text
///
/// # Examples
///
/// ```ignore
/// RenderWorkflowManifestRequest {
///     manifest: std::fs::read_to_string("ci.yaml")?,
///     format: Some("ascii".to_string()),
///     include_status: None,
/// }
/// ```
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct RenderWorkflowManifestRequest {
    /// YAML or JSON text of a Workflow, WorkflowTemplate, ClusterWorkflowTemplate or CronWorkflow
    pub manifest: String,
    /// Output format: mermaid, ascii, dot or svg
    #[serde(default)]
    pub format: Option<String>,
    /// Whether to annotate nodes with their phase
    #[serde(default)]
    pub include_status: Option<bool>,
}

/// Request to render a submitted workflow with its live node status
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct VisualizeWorkflowRequest {
    /// Namespace of the workflow; the configured default when omitted
    #[serde(default)]
    pub namespace: Option<String>,
    /// Name of the workflow
    pub name: String,
    /// Output format: mermaid, ascii, dot or svg
    #[serde(default)]
    pub format: Option<String>,
    /// Whether to annotate nodes with their phase
    #[serde(default)]
    pub include_status: Option<bool>,
}

/// Request to render a stored workflow template
#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct VisualizeWorkflowTemplateRequest {
    /// Namespace of the template; ignored for cluster-scoped templates
    #[serde(default)]
    pub namespace: Option<String>,
    /// Name of the template
    pub name: String,
    /// Fetch a ClusterWorkflowTemplate instead of a WorkflowTemplate
    #[serde(default)]
    pub cluster_scope: Option<bool>,
    /// Output format: mermaid, ascii, dot or svg
    #[serde(default)]
    pub format: Option<String>,
}
