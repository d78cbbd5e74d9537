//! Graph extraction from a static workflow spec

use super::{GraphError, GraphResult, LoopMarkers, Node, NodeKind, WorkflowGraph};
use crate::workflow::{
    DagTemplate, Invocation, StepGroup, TaskCall, Template, TemplateBody, TemplateKind,
    WorkflowSpec,
};

/// Builds a graph from the entrypoint of a workflow spec.
///
/// Only the entrypoint's own structure is graphed: a DAG or steps template
/// invoked by a task is shown as a single node, not expanded.
pub struct SpecGraphExtractor<'a> {
    spec: &'a WorkflowSpec,
}

impl<'a> SpecGraphExtractor<'a> {
    /// Creates an extractor for the given spec
    pub fn new(spec: &'a WorkflowSpec) -> Self {
        Self { spec }
    }

    /// Name of the entrypoint template: the declared one, else the first template
    pub fn entrypoint_name(&self) -> Option<&'a str> {
        if !self.spec.entrypoint.trim().is_empty() {
            return Some(self.spec.entrypoint.trim());
        }
        self.spec.templates.first().map(|t| t.name.as_str())
    }

    /// Extract the graph.
    ///
    /// A spec without templates yields an empty graph. An entrypoint that does
    /// not name one of the templates is an error.
    pub fn extract(&self) -> GraphResult<WorkflowGraph> {
        if self.spec.templates.is_empty() {
            tracing::debug!("Workflow spec has no templates, graph is empty");
            return Ok(WorkflowGraph::new());
        }

        let entrypoint = self.entrypoint_name().unwrap_or_default();
        let template = self
            .spec
            .template(entrypoint)
            .ok_or_else(|| GraphError::EntrypointNotFound(entrypoint.to_string()))?;

        let graph = match &template.body {
            TemplateBody::Dag(dag) => self.extract_dag(dag),
            TemplateBody::Steps(groups) => self.extract_steps(groups),
            _ => {
                let mut graph = WorkflowGraph::new();
                let node = Node::new(
                    template.name.as_str(),
                    template.name.as_str(),
                    NodeKind::Template(template.kind()),
                );
                graph.insert(template.name.as_str(), node);
                graph
            }
        };

        tracing::debug!(
            "Extracted {} nodes from {} entrypoint '{}'",
            graph.len(),
            template.kind(),
            entrypoint
        );
        Ok(graph)
    }

    fn extract_dag(&self, dag: &DagTemplate) -> WorkflowGraph {
        dag.tasks
            .iter()
            .map(|task| {
                let node = self
                    .call_node(&task.name, &task.call)
                    .with_dependencies(task.dependency_names());
                (task.name.clone(), node)
            })
            .collect()
    }

    fn extract_steps(&self, groups: &[StepGroup]) -> WorkflowGraph {
        let mut graph = WorkflowGraph::new();
        let mut previous: Vec<String> = Vec::new();

        for (index, group) in groups.iter().enumerate() {
            let mut current = Vec::with_capacity(group.steps.len());
            for step in &group.steps {
                let key = step_key(index, &step.name);
                let node = self
                    .call_node(&step.name, &step.call)
                    .with_dependencies(previous.iter().cloned());
                graph.insert(key.clone(), node);
                current.push(key);
            }
            previous = current;
        }

        graph
    }

    fn call_node(&self, name: &str, call: &TaskCall) -> Node {
        let (template_name, kind) = match call.invocation() {
            Invocation::Named(template) => (
                template.to_string(),
                self.spec
                    .template(template)
                    .map(Template::kind)
                    .unwrap_or(TemplateKind::Unknown),
            ),
            Invocation::Reference(reference) => {
                (reference.template.clone(), TemplateKind::Unknown)
            }
            Invocation::Inline(template) => (name.to_string(), template.kind()),
            Invocation::Missing => (name.to_string(), TemplateKind::Unknown),
        };

        let mut node = Node::new(name, template_name, NodeKind::Template(kind)).with_loops(
            LoopMarkers {
                items: call.loops_over_items(),
                param: call.loops_over_param(),
            },
        );
        if let Some(condition) = call.condition() {
            node = node.with_condition(condition);
        }
        node
    }
}

/// Key of a step node: group index and step name, unique across groups
pub fn step_key(group_index: usize, step_name: &str) -> String {
    format!("{group_index}/{step_name}")
}
