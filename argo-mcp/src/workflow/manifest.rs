//! Workflow manifests and workflow specs
//!
//! A manifest is the YAML or JSON text of one of the Argo resources that embed
//! a workflow spec. Parsing resolves the resource kind, its name, and the
//! embedded spec.

use super::template::Template;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading manifest text
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest text is empty
    #[error("manifest is empty")]
    Empty,

    /// Manifest text is not valid YAML/JSON or does not have the expected shape
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The resource kind does not embed a workflow spec
    #[error("unsupported manifest kind '{0}': expected Workflow, WorkflowTemplate, ClusterWorkflowTemplate or CronWorkflow")]
    UnsupportedKind(String),

    /// The resource has no workflow spec where its kind puts one
    #[error("{kind} manifest has no workflow spec at {path}")]
    MissingSpec {
        /// Resolved kind of the manifest
        kind: ManifestKind,
        /// Where the spec was expected
        path: &'static str,
    },
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Resource kinds that embed a workflow spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManifestKind {
    /// `Workflow`
    Workflow,
    /// `WorkflowTemplate`
    WorkflowTemplate,
    /// `ClusterWorkflowTemplate`
    ClusterWorkflowTemplate,
    /// `CronWorkflow`
    CronWorkflow,
}

impl ManifestKind {
    /// Resource kind as written in manifests
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestKind::Workflow => "Workflow",
            ManifestKind::WorkflowTemplate => "WorkflowTemplate",
            ManifestKind::ClusterWorkflowTemplate => "ClusterWorkflowTemplate",
            ManifestKind::CronWorkflow => "CronWorkflow",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Workflow" => Ok(ManifestKind::Workflow),
            "WorkflowTemplate" => Ok(ManifestKind::WorkflowTemplate),
            "ClusterWorkflowTemplate" => Ok(ManifestKind::ClusterWorkflowTemplate),
            "CronWorkflow" => Ok(ManifestKind::CronWorkflow),
            other => Err(ManifestError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Resource metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    /// `metadata.name`
    pub name: Option<String>,
    /// `metadata.generateName`
    pub generate_name: Option<String>,
    /// `metadata.namespace`
    pub namespace: Option<String>,
}

impl ObjectMeta {
    /// Display name of the resource: its name, else its generate-name prefix
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.generate_name.as_deref().filter(|n| !n.is_empty()))
    }
}

/// The structural part of a workflow: its entrypoint and named templates
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowSpec {
    /// Name of the template execution starts at; empty means the first template
    pub entrypoint: String,
    /// Templates in declaration order
    pub templates: Vec<Template>,
}

impl WorkflowSpec {
    /// Look up a template by name
    pub fn template(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawManifest {
    kind: Option<String>,
    metadata: ObjectMeta,
    spec: Option<serde_yaml::Value>,
}

/// A parsed manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Resource kind
    pub kind: ManifestKind,
    /// Resource metadata
    pub metadata: ObjectMeta,
    /// The embedded workflow spec
    pub spec: WorkflowSpec,
}

impl Manifest {
    /// Parse manifest text (YAML or JSON).
    ///
    /// A document without `kind` is read as a `Workflow`.
    pub fn parse(text: &str) -> ManifestResult<Self> {
        if text.trim().is_empty() {
            return Err(ManifestError::Empty);
        }

        let raw: RawManifest = serde_yaml::from_str(text)?;
        let kind = match raw.kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => ManifestKind::Workflow,
        };

        let spec = match kind {
            ManifestKind::CronWorkflow => raw
                .spec
                .and_then(|spec| match spec {
                    serde_yaml::Value::Mapping(mut map) => map.remove("workflowSpec"),
                    _ => None,
                })
                .ok_or(ManifestError::MissingSpec {
                    kind,
                    path: ".spec.workflowSpec",
                })?,
            _ => raw.spec.ok_or(ManifestError::MissingSpec {
                kind,
                path: ".spec",
            })?,
        };

        let spec: WorkflowSpec = serde_yaml::from_value(spec)?;
        tracing::debug!(
            "Parsed {} manifest {:?} with {} templates",
            kind,
            raw.metadata.display_name(),
            spec.templates.len()
        );

        Ok(Self {
            kind,
            metadata: raw.metadata,
            spec,
        })
    }

    /// Display name of the manifest, if it has one
    pub fn name(&self) -> Option<&str> {
        self.metadata.display_name()
    }
}
