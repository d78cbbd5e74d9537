//! Unified error handling for argo-mcp
//!
//! Each component has its own error enum; [`ArgoMcpError`] wraps them all so
//! that callers going through [`crate::visualize`] or the MCP tools see one
//! type.

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::render::{CompileError, RenderError};
use crate::service::ServiceError;
use crate::validation::ValidationError;
use crate::workflow::ManifestError;
use thiserror::Error;

/// The main error type for argo-mcp
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArgoMcpError {
    /// Manifest or status text could not be read
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Graph could not be built or is not renderable
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Output format was not recognized
    #[error(transparent)]
    Render(#[from] RenderError),

    /// SVG compilation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Workflow service call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A resource name was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArgoMcpError {
    /// Whether the error was caused by the caller's input rather than by
    /// this process or its collaborators
    pub fn is_invalid_input(&self) -> bool {
        match self {
            ArgoMcpError::Manifest(_)
            | ArgoMcpError::Graph(_)
            | ArgoMcpError::Render(_)
            | ArgoMcpError::Validation(_) => true,
            ArgoMcpError::Service(err) => err.is_not_found(),
            ArgoMcpError::Compile(CompileError::Parse { .. }) => true,
            ArgoMcpError::Compile(_) | ArgoMcpError::Config(_) | ArgoMcpError::Json(_) => false,
        }
    }
}

/// Result type alias for argo-mcp operations
pub type Result<T> = std::result::Result<T, ArgoMcpError>;
