//! Access to workflows and workflow templates
//!
//! The MCP tools fetch resources through the [`WorkflowService`] trait. The
//! Kubernetes-backed client lives outside this crate; [`InMemoryWorkflowService`]
//! holds resources in memory for embedding and tests.

use crate::workflow::{LiveWorkflow, Manifest, ManifestError, ManifestKind};
use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Errors raised by a workflow service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested resource does not exist
    #[error("{resource} '{name}' not found{}", namespace_suffix(.namespace))]
    NotFound {
        /// Resource type
        resource: &'static str,
        /// Namespace searched, none for cluster-scoped resources
        namespace: Option<String>,
        /// Resource name
        name: String,
    },

    /// The backend could not be reached or failed
    #[error("workflow service unavailable: {0}")]
    Unavailable(String),

    /// The backend returned a resource that could not be decoded
    #[error("failed to decode resource: {0}")]
    Decode(#[from] ManifestError),
}

fn namespace_suffix(namespace: &Option<String>) -> String {
    match namespace {
        Some(namespace) => format!(" in namespace '{namespace}'"),
        None => String::new(),
    }
}

impl ServiceError {
    /// Whether the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fetches workflow resources
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// A workflow with its live status
    async fn get_workflow(&self, namespace: &str, name: &str) -> ServiceResult<LiveWorkflow>;

    /// A namespaced workflow template
    async fn get_workflow_template(&self, namespace: &str, name: &str) -> ServiceResult<Manifest>;

    /// A cluster-scoped workflow template
    async fn get_cluster_workflow_template(&self, name: &str) -> ServiceResult<Manifest>;
}

/// Workflow service backed by in-memory maps
#[derive(Debug, Default)]
pub struct InMemoryWorkflowService {
    workflows: DashMap<(String, String), LiveWorkflow>,
    templates: DashMap<(String, String), Manifest>,
    cluster_templates: DashMap<String, Manifest>,
}

impl InMemoryWorkflowService {
    /// Create an empty service
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a workflow under its metadata name, replacing any previous one
    pub fn insert_workflow(&self, namespace: &str, workflow: LiveWorkflow) {
        let name = workflow.metadata.display_name().unwrap_or_default().to_string();
        tracing::debug!("Storing workflow {}/{}", namespace, name);
        self.workflows.insert((namespace.to_string(), name), workflow);
    }

    /// Parse and store a workflow object
    pub fn insert_workflow_text(&self, namespace: &str, text: &str) -> ServiceResult<()> {
        self.insert_workflow(namespace, LiveWorkflow::parse(text)?);
        Ok(())
    }

    /// Store a template manifest. Cluster workflow templates are stored
    /// cluster-wide and `namespace` is ignored for them.
    pub fn insert_template(&self, namespace: &str, manifest: Manifest) {
        let name = manifest.name().unwrap_or_default().to_string();
        match manifest.kind {
            ManifestKind::ClusterWorkflowTemplate => {
                tracing::debug!("Storing cluster workflow template {}", name);
                self.cluster_templates.insert(name, manifest);
            }
            _ => {
                tracing::debug!("Storing workflow template {}/{}", namespace, name);
                self.templates.insert((namespace.to_string(), name), manifest);
            }
        }
    }

    /// Parse and store a template manifest
    pub fn insert_template_text(&self, namespace: &str, text: &str) -> ServiceResult<()> {
        self.insert_template(namespace, Manifest::parse(text)?);
        Ok(())
    }
}

#[async_trait]
impl WorkflowService for InMemoryWorkflowService {
    async fn get_workflow(&self, namespace: &str, name: &str) -> ServiceResult<LiveWorkflow> {
        self.workflows
            .get(&(namespace.to_string(), name.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound {
                resource: "workflow",
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            })
    }

    async fn get_workflow_template(&self, namespace: &str, name: &str) -> ServiceResult<Manifest> {
        self.templates
            .get(&(namespace.to_string(), name.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound {
                resource: "workflow template",
                namespace: Some(namespace.to_string()),
                name: name.to_string(),
            })
    }

    async fn get_cluster_workflow_template(&self, name: &str) -> ServiceResult<Manifest> {
        self.cluster_templates
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound {
                resource: "cluster workflow template",
                namespace: None,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "kind: WorkflowTemplate\nmetadata: {name: ci}\nspec:\n  entrypoint: main\n  templates:\n    - name: main\n      container: {image: alpine}\n";
    const CLUSTER_TEMPLATE: &str = "kind: ClusterWorkflowTemplate\nmetadata: {name: shared}\nspec:\n  templates:\n    - name: main\n      suspend: {}\n";

    #[tokio::test]
    async fn test_templates_by_scope() {
        let service = InMemoryWorkflowService::new();
        service.insert_template_text("argo", TEMPLATE).unwrap();
        service.insert_template_text("argo", CLUSTER_TEMPLATE).unwrap();

        let ci = service.get_workflow_template("argo", "ci").await.unwrap();
        assert_eq!(ci.kind, ManifestKind::WorkflowTemplate);
        assert!(service.get_workflow_template("other", "ci").await.is_err());

        let shared = service.get_cluster_workflow_template("shared").await.unwrap();
        assert_eq!(shared.kind, ManifestKind::ClusterWorkflowTemplate);
        assert!(service.get_workflow_template("argo", "shared").await.is_err());
    }

    #[tokio::test]
    async fn test_workflow_lookup() {
        let service = InMemoryWorkflowService::new();
        service
            .insert_workflow_text("argo", r#"{"metadata": {"name": "run-1"}, "status": {"nodes": {}}}"#)
            .unwrap();

        assert!(service.get_workflow("argo", "run-1").await.is_ok());
        let err = service.get_workflow("argo", "run-2").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "workflow 'run-2' not found in namespace 'argo'");
    }

    #[tokio::test]
    async fn test_cluster_not_found_message() {
        let err = InMemoryWorkflowService::new()
            .get_cluster_workflow_template("nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cluster workflow template 'nope' not found");
    }

    #[test]
    fn test_bad_text_is_decode_error() {
        let service = InMemoryWorkflowService::new();
        assert!(matches!(
            service.insert_template_text("argo", "kind: Pod\nspec: {}\n"),
            Err(ServiceError::Decode(_))
        ));
    }
}
