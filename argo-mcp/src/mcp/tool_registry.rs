//! Tool registry for MCP operations
//!
//! Tools are registered by name and dispatched through the [`McpTool`] trait.
//! Transport and server wiring live with the embedding server; this module
//! only describes and executes tools.

use crate::config::Config;
use crate::error::ArgoMcpError;
use crate::render::{OutputFormat, RenderOptions};
use crate::service::WorkflowService;
use crate::visualize::{Visualization, WorkflowVisualizer};
use rmcp::model::{Annotated, CallToolResult, RawContent, RawTextContent, Tool};
use rmcp::Error as McpError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Context shared by all tools during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Source of workflows and workflow templates
    pub service: Arc<dyn WorkflowService>,
    /// Defaults for arguments a call leaves out
    pub config: Arc<Config>,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(service: Arc<dyn WorkflowService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }

    /// Format named by a call, or the configured default
    pub fn resolve_format(&self, format: Option<&str>) -> Result<OutputFormat, McpError> {
        match format {
            Some(format) => format
                .parse::<OutputFormat>()
                .map_err(|e| BaseToolImpl::map_error(ArgoMcpError::from(e))),
            None => Ok(self.config.default_format),
        }
    }

    /// Namespace named by a call, or the configured default
    pub fn resolve_namespace(&self, namespace: Option<String>) -> String {
        namespace.unwrap_or_else(|| self.config.default_namespace.clone())
    }

    /// Visualizer for one call
    pub fn visualizer(&self, include_status: Option<bool>) -> WorkflowVisualizer {
        let visualizer = WorkflowVisualizer::from_config(&self.config);
        match include_status {
            Some(include_status) => visualizer.with_options(RenderOptions { include_status }),
            None => visualizer,
        }
    }
}

/// Trait defining the interface for all MCP tools
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Get the tool's name
    fn name(&self) -> &'static str;

    /// Get the tool's description
    fn description(&self) -> &'static str;

    /// Get the tool's JSON schema for arguments
    fn schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments and context
    async fn execute(
        &self,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError>;
}

/// Registry for managing MCP tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn McpTool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool in the registry
    pub fn register<T: McpTool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        self.tools.insert(name, Box::new(tool));
    }

    /// Get a tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn McpTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    /// List all registered tool names, sorted
    pub fn list_tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get all registered tools as Tool objects for MCP list_tools response
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .values()
            .map(|tool| {
                let schema_map = match tool.schema() {
                    serde_json::Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };

                Tool {
                    name: tool.name().into(),
                    description: Some(tool.description().into()),
                    input_schema: Arc::new(schema_map),
                    annotations: None,
                }
            })
            .collect()
    }

    /// Execute a tool by name
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
        context: &ToolContext,
    ) -> std::result::Result<CallToolResult, McpError> {
        let tool = self
            .get_tool(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {name}"), None))?;
        tracing::info!("Calling tool {}", name);
        tool.execute(arguments, context).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Base implementation providing common utility methods for MCP tools
pub struct BaseToolImpl;

impl BaseToolImpl {
    /// Parse tool arguments from a JSON map into a typed struct
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<T, McpError> {
        serde_json::from_value(serde_json::Value::Object(arguments))
            .map_err(|e| McpError::invalid_params(format!("Invalid arguments: {e}"), None))
    }

    /// JSON schema of a request type as a JSON value
    pub fn schema_of<T: schemars::JsonSchema>() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize tool schema: {}", e);
            serde_json::json!({ "type": "object" })
        })
    }

    /// Map a crate error to an MCP error: caller mistakes become invalid
    /// params, everything else an internal error
    pub fn map_error(error: ArgoMcpError) -> McpError {
        if error.is_invalid_input() {
            McpError::invalid_params(error.to_string(), None)
        } else {
            tracing::warn!("Tool call failed: {}", error);
            McpError::internal_error(error.to_string(), None)
        }
    }

    /// Success response carrying rendered output followed by its JSON summary
    pub fn create_visualization_response(
        visualization: &Visualization,
    ) -> std::result::Result<CallToolResult, McpError> {
        let summary = visualization.summary().map_err(Self::map_error)?;
        Ok(CallToolResult {
            content: vec![
                Self::text_content(visualization.output.clone()),
                Self::text_content(summary.to_string()),
            ],
            is_error: Some(false),
        })
    }

    fn text_content(text: String) -> rmcp::model::Content {
        Annotated::new(RawContent::Text(RawTextContent { text }), None)
    }
}
