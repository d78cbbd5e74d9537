//! Live workflow status as reported by the workflow engine

use super::manifest::{ManifestError, ManifestResult, ObjectMeta, WorkflowSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Runtime phase of an executed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(from = "String")]
pub enum NodePhase {
    /// Waiting to be scheduled
    Pending,
    /// Executing
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with a non-zero exit
    Failed,
    /// Could not be executed
    Error,
    /// Skipped because its guard was false
    Skipped,
    /// Omitted by an enhanced depends expression
    Omitted,
    /// Not reported or not recognized
    #[default]
    Unset,
}

impl NodePhase {
    /// Phase name as reported by the engine
    pub fn as_str(&self) -> &'static str {
        match self {
            NodePhase::Pending => "Pending",
            NodePhase::Running => "Running",
            NodePhase::Succeeded => "Succeeded",
            NodePhase::Failed => "Failed",
            NodePhase::Error => "Error",
            NodePhase::Skipped => "Skipped",
            NodePhase::Omitted => "Omitted",
            NodePhase::Unset => "",
        }
    }
}

impl From<String> for NodePhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pending" => NodePhase::Pending,
            "Running" => NodePhase::Running,
            "Succeeded" => NodePhase::Succeeded,
            "Failed" => NodePhase::Failed,
            "Error" => NodePhase::Error,
            "Skipped" => NodePhase::Skipped,
            "Omitted" => NodePhase::Omitted,
            _ => NodePhase::Unset,
        }
    }
}

impl fmt::Display for NodePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of an executed node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum NodeType {
    /// A pod running a container or script template
    Pod,
    /// A container of a container set
    Container,
    /// A steps template invocation
    Steps,
    /// Barrier grouping one row of a steps template
    StepGroup,
    /// A DAG template invocation
    Dag,
    /// Barrier grouping the expansion of a looped DAG task
    TaskGroup,
    /// Wrapper holding the attempts of a retried node
    Retry,
    /// A node that was skipped
    Skipped,
    /// A suspend template invocation
    Suspend,
    /// An HTTP template invocation
    Http,
    /// A plugin template invocation
    Plugin,
    /// A type tag this crate does not know about
    Other(String),
}

impl NodeType {
    /// Type tag as reported by the engine
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Pod => "Pod",
            NodeType::Container => "Container",
            NodeType::Steps => "Steps",
            NodeType::StepGroup => "StepGroup",
            NodeType::Dag => "DAG",
            NodeType::TaskGroup => "TaskGroup",
            NodeType::Retry => "Retry",
            NodeType::Skipped => "Skipped",
            NodeType::Suspend => "Suspend",
            NodeType::Http => "HTTP",
            NodeType::Plugin => "Plugin",
            NodeType::Other(tag) => tag,
        }
    }

    /// Whether the node is control-flow bookkeeping with no visual meaning of its own
    pub fn is_virtual(&self) -> bool {
        matches!(self, NodeType::Retry | NodeType::StepGroup | NodeType::TaskGroup)
    }
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Other(String::new())
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Pod" => NodeType::Pod,
            "Container" => NodeType::Container,
            "Steps" => NodeType::Steps,
            "StepGroup" => NodeType::StepGroup,
            "DAG" => NodeType::Dag,
            "TaskGroup" => NodeType::TaskGroup,
            "Retry" => NodeType::Retry,
            "Skipped" => NodeType::Skipped,
            "Suspend" => NodeType::Suspend,
            "HTTP" => NodeType::Http,
            "Plugin" => NodeType::Plugin,
            _ => NodeType::Other(s),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one executed node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeStatus {
    /// Node id, unique within the workflow
    pub id: String,
    /// Fully qualified node name
    pub name: String,
    /// Short name shown to users
    pub display_name: String,
    /// Template the node runs
    pub template_name: String,
    /// Node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Runtime phase
    pub phase: NodePhase,
    /// Ids of nodes started after this one
    pub children: Vec<String>,
    /// Status message, usually set on failure
    pub message: Option<String>,
}

impl NodeStatus {
    /// Label for the node: display name, else name, else `fallback`
    pub fn label<'a>(&'a self, fallback: &'a str) -> &'a str {
        [self.display_name.as_str(), self.name.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(fallback)
    }
}

/// `status:` of a workflow
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowStatus {
    /// Overall phase of the workflow
    pub phase: NodePhase,
    /// Executed nodes keyed by node id
    pub nodes: BTreeMap<String, NodeStatus>,
}

/// A workflow as fetched from the engine, including its live status
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveWorkflow {
    /// Resource metadata
    pub metadata: ObjectMeta,
    /// Submitted spec, when the engine returned it
    pub spec: Option<WorkflowSpec>,
    /// Execution status
    pub status: WorkflowStatus,
}

impl LiveWorkflow {
    /// Parse a workflow object from YAML or JSON text
    pub fn parse(text: &str) -> ManifestResult<Self> {
        if text.trim().is_empty() {
            return Err(ManifestError::Empty);
        }
        Ok(serde_yaml::from_str(text)?)
    }
}
