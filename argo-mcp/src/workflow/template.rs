//! Template types and template classification

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of a workflow template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateKind {
    /// Runs a single container
    Container,
    /// Runs an inline script in a container
    Script,
    /// Directed acyclic graph of tasks
    Dag,
    /// Ordered list of parallel step groups
    Steps,
    /// Creates or manipulates a cluster resource
    Resource,
    /// Pauses the workflow
    Suspend,
    /// Issues an HTTP request
    Http,
    /// Executor plugin call
    Plugin,
    /// Several containers in one pod
    ContainerSet,
    /// Data sourcing and transformation
    Data,
    /// No recognized body
    Unknown,
}

impl TemplateKind {
    /// Get the tag used for this kind in rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Container => "container",
            TemplateKind::Script => "script",
            TemplateKind::Dag => "dag",
            TemplateKind::Steps => "steps",
            TemplateKind::Resource => "resource",
            TemplateKind::Suspend => "suspend",
            TemplateKind::Http => "http",
            TemplateKind::Plugin => "plugin",
            TemplateKind::ContainerSet => "containerSet",
            TemplateKind::Data => "data",
            TemplateKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The body of a template.
///
/// Manifests model the body as mutually exclusive optional fields. When a
/// document populates more than one of them, the first one in the order
/// container, script, dag, steps, resource, suspend, http, plugin,
/// containerSet, data wins.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateBody {
    /// `container:`
    Container(Value),
    /// `script:`
    Script(Value),
    /// `dag:`
    Dag(DagTemplate),
    /// `steps:`
    Steps(Vec<StepGroup>),
    /// `resource:`
    Resource(Value),
    /// `suspend:`
    Suspend(Value),
    /// `http:`
    Http(Value),
    /// `plugin:`
    Plugin(Value),
    /// `containerSet:`
    ContainerSet(Value),
    /// `data:`
    Data(Value),
    /// None of the above
    Unknown,
}

/// A named template of a workflow spec
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawTemplate")]
pub struct Template {
    /// Template name, unique within its spec
    pub name: String,
    /// What the template does
    pub body: TemplateBody,
}

impl Template {
    /// Create a template from a name and body
    pub fn new(name: impl Into<String>, body: TemplateBody) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Classify the template
    pub fn kind(&self) -> TemplateKind {
        match &self.body {
            TemplateBody::Container(_) => TemplateKind::Container,
            TemplateBody::Script(_) => TemplateKind::Script,
            TemplateBody::Dag(_) => TemplateKind::Dag,
            TemplateBody::Steps(_) => TemplateKind::Steps,
            TemplateBody::Resource(_) => TemplateKind::Resource,
            TemplateBody::Suspend(_) => TemplateKind::Suspend,
            TemplateBody::Http(_) => TemplateKind::Http,
            TemplateBody::Plugin(_) => TemplateKind::Plugin,
            TemplateBody::ContainerSet(_) => TemplateKind::ContainerSet,
            TemplateBody::Data(_) => TemplateKind::Data,
            TemplateBody::Unknown => TemplateKind::Unknown,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTemplate {
    name: String,
    container: Option<Value>,
    script: Option<Value>,
    dag: Option<DagTemplate>,
    steps: Option<Vec<StepGroup>>,
    resource: Option<Value>,
    suspend: Option<Value>,
    http: Option<Value>,
    plugin: Option<Value>,
    container_set: Option<Value>,
    data: Option<Value>,
}

impl From<RawTemplate> for Template {
    fn from(mut raw: RawTemplate) -> Self {
        let name = std::mem::take(&mut raw.name);
        let body = match raw {
            RawTemplate {
                container: Some(v), ..
            } => TemplateBody::Container(v),
            RawTemplate { script: Some(v), .. } => TemplateBody::Script(v),
            RawTemplate { dag: Some(dag), .. } => TemplateBody::Dag(dag),
            RawTemplate {
                steps: Some(groups),
                ..
            } => TemplateBody::Steps(groups),
            RawTemplate {
                resource: Some(v), ..
            } => TemplateBody::Resource(v),
            RawTemplate {
                suspend: Some(v), ..
            } => TemplateBody::Suspend(v),
            RawTemplate { http: Some(v), .. } => TemplateBody::Http(v),
            RawTemplate { plugin: Some(v), .. } => TemplateBody::Plugin(v),
            RawTemplate {
                container_set: Some(v),
                ..
            } => TemplateBody::ContainerSet(v),
            RawTemplate { data: Some(v), .. } => TemplateBody::Data(v),
            _ => TemplateBody::Unknown,
        };
        Self { name, body }
    }
}

/// `dag:` body of a template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DagTemplate {
    /// Tasks of the DAG in declaration order
    pub tasks: Vec<DagTask>,
}

/// One row of a `steps:` template; every step of a group runs in parallel
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StepGroup {
    /// Steps of the group in declaration order
    pub steps: Vec<WorkflowStep>,
}

/// Reference to a template living in another (cluster) workflow template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateRef {
    /// Name of the referenced WorkflowTemplate
    pub name: String,
    /// Template within the referenced resource
    pub template: String,
    /// Whether the reference targets a ClusterWorkflowTemplate
    pub cluster_scope: bool,
}

/// The template a task or step runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Invocation<'a> {
    /// `template: name`
    Named(&'a str),
    /// `templateRef: {...}`
    Reference(&'a TemplateRef),
    /// `inline: {...}`
    Inline(&'a Template),
    /// Nothing declared
    Missing,
}

/// Fields shared by DAG tasks and steps
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCall {
    /// `template:`
    pub template: Option<String>,
    /// `templateRef:`
    pub template_ref: Option<TemplateRef>,
    /// `inline:`
    pub inline: Option<Box<Template>>,
    /// `when:` guard expression
    pub when: Option<String>,
    /// `withItems:` inline item list
    pub with_items: Option<Value>,
    /// `withParam:` runtime computed list
    pub with_param: Option<String>,
    /// `withSequence:` generated number sequence
    pub with_sequence: Option<Value>,
}

impl TaskCall {
    /// Resolve which template this call runs
    pub fn invocation(&self) -> Invocation<'_> {
        if let Some(name) = self.template.as_deref().filter(|n| !n.is_empty()) {
            Invocation::Named(name)
        } else if let Some(reference) = &self.template_ref {
            Invocation::Reference(reference)
        } else if let Some(inline) = &self.inline {
            Invocation::Inline(inline)
        } else {
            Invocation::Missing
        }
    }

    /// Non-empty `when:` expression, if any
    pub fn condition(&self) -> Option<&str> {
        self.when
            .as_deref()
            .map(str::trim)
            .filter(|expr| !expr.is_empty())
    }

    /// Whether the call fans out over an inline list or a sequence
    pub fn loops_over_items(&self) -> bool {
        self.with_items.is_some() || self.with_sequence.is_some()
    }

    /// Whether the call fans out over a runtime parameter
    pub fn loops_over_param(&self) -> bool {
        self.with_param.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// A task of a `dag:` template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DagTask {
    /// Task name, unique within the DAG
    pub name: String,
    /// Names of tasks this task waits for
    pub dependencies: Vec<String>,
    /// Enhanced depends expression, e.g. `a && (b.Succeeded || c.Failed)`
    pub depends: Option<String>,
    /// Template invocation
    #[serde(flatten)]
    pub call: TaskCall,
}

impl DagTask {
    /// Dependencies of the task.
    ///
    /// The explicit `dependencies:` list wins; otherwise the task names
    /// referenced by `depends:` are used.
    pub fn dependency_names(&self) -> Vec<String> {
        if !self.dependencies.is_empty() {
            return self.dependencies.clone();
        }
        self.depends
            .as_deref()
            .map(depends_targets)
            .unwrap_or_default()
    }
}

/// A step of a `steps:` template
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowStep {
    /// Step name
    pub name: String,
    /// Template invocation
    #[serde(flatten)]
    pub call: TaskCall,
}

/// Task names referenced by an enhanced depends expression, in first-seen order
pub fn depends_targets(expression: &str) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for token in expression.split(|c: char| "&|!()".contains(c) || c.is_whitespace()) {
        let task = token.split('.').next().unwrap_or_default();
        if !task.is_empty() && !targets.iter().any(|t| t == task) {
            targets.push(task.to_string());
        }
    }
    targets
}
