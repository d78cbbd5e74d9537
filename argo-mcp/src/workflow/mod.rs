//! Argo workflow resources: manifests, templates and live status
//!
//! Only the structural parts of the resources are modelled: what the graph
//! extractors need to build a [`WorkflowGraph`](crate::graph::WorkflowGraph).

mod manifest;
mod status;
mod template;

pub use manifest::{
    Manifest, ManifestError, ManifestKind, ManifestResult, ObjectMeta, WorkflowSpec,
};
pub use status::{LiveWorkflow, NodePhase, NodeStatus, NodeType, WorkflowStatus};
pub use template::{
    depends_targets, DagTask, DagTemplate, Invocation, StepGroup, TaskCall, Template,
    TemplateBody, TemplateKind, TemplateRef, WorkflowStep,
};
