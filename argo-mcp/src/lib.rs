//! # argo-mcp
//!
//! Graph extraction and rendering for Argo Workflows, exposed as MCP tools.
//!
//! ## Features
//!
//! - **Static graphs**: the entrypoint DAG or steps of a Workflow,
//!   WorkflowTemplate, ClusterWorkflowTemplate or CronWorkflow manifest
//! - **Live graphs**: the executed nodes of a running workflow with their
//!   phases, with retry and group barrier nodes collapsed away
//! - **Output formats**: Mermaid flowcharts, ASCII trees, Graphviz DOT and SVG
//! - **MCP tools**: `render_workflow_manifest`, `visualize_workflow` and
//!   `visualize_workflow_template`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use argo_mcp::WorkflowVisualizer;
//!
//! # fn main() -> argo_mcp::Result<()> {
//! let manifest = std::fs::read_to_string("ci.yaml").unwrap_or_default();
//! let rendered = WorkflowVisualizer::default().render_manifest(&manifest, "mermaid")?;
//! println!("{}", rendered.output);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Configuration loading
pub mod config;

/// Unified error type
pub mod error;

/// Normalized workflow graph and extractors
pub mod graph;

/// Log subscriber setup
pub mod logging;

/// Model Context Protocol tools
pub mod mcp;

/// Graph renderers and the SVG compiler
pub mod render;

/// Workflow service abstraction
pub mod service;

/// Kubernetes name validation
pub mod validation;

/// Render request pipeline
pub mod visualize;

/// Argo resource model
pub mod workflow;

pub use config::{Config, ConfigError};
pub use error::{ArgoMcpError, Result};
pub use graph::{GraphError, Node, NodeKind, WorkflowGraph};
pub use render::{OutputFormat, RenderOptions};
pub use service::{InMemoryWorkflowService, ServiceError, WorkflowService};
pub use visualize::{Visualization, WorkflowVisualizer};
pub use workflow::{LiveWorkflow, Manifest, ManifestKind};
