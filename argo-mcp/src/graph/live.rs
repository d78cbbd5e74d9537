//! Graph extraction from a live node-status map

use super::{Node, NodeKind, WorkflowGraph};
use crate::workflow::NodeStatus;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Builds a graph from the nodes of an executed workflow.
///
/// Retry wrappers, step-group barriers and task-group barriers are virtual:
/// they are left out of the graph, and edges through them are reconnected to
/// the renderable nodes behind them. Unknown node types are kept.
pub struct LiveGraphExtractor<'a> {
    nodes: &'a BTreeMap<String, NodeStatus>,
}

impl<'a> LiveGraphExtractor<'a> {
    /// Creates an extractor over a node-status map keyed by node id
    pub fn new(nodes: &'a BTreeMap<String, NodeStatus>) -> Self {
        Self { nodes }
    }

    /// Whether the node with this id is kept in the graph
    pub fn is_renderable(&self, id: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|status| !status.node_type.is_virtual())
    }

    /// Extract the graph
    pub fn extract(&self) -> WorkflowGraph {
        let children: BTreeMap<&str, BTreeSet<&str>> = self
            .nodes
            .keys()
            .filter(|id| self.is_renderable(id))
            .map(|id| (id.as_str(), self.renderable_children(id)))
            .collect();

        let mut parents: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (&parent, kids) in &children {
            for &child in kids {
                parents.entry(child).or_default().insert(parent);
            }
        }

        let graph: WorkflowGraph = children
            .iter()
            .map(|(id, kids)| {
                let status = &self.nodes[*id];
                let mut node = Node::new(
                    status.label(id),
                    status.template_name.as_str(),
                    NodeKind::Live(status.node_type.clone()),
                )
                .with_phase(status.phase)
                .with_dependencies(parents.get(id).into_iter().flatten().copied());
                node.children = kids.iter().map(|kid| kid.to_string()).collect();
                (id.to_string(), node)
            })
            .collect();

        tracing::debug!(
            "Extracted {} renderable nodes out of {} live nodes",
            graph.len(),
            self.nodes.len()
        );
        graph
    }

    /// Children of a node with virtual nodes replaced by their own children
    fn renderable_children(&self, id: &str) -> BTreeSet<&'a str> {
        let mut found = BTreeSet::new();
        let mut expanded = HashSet::new();
        self.collect_children(id, &mut found, &mut expanded);
        found
    }

    fn collect_children(
        &self,
        id: &str,
        found: &mut BTreeSet<&'a str>,
        expanded: &mut HashSet<&'a str>,
    ) {
        let Some(status) = self.nodes.get(id) else {
            return;
        };
        for child in &status.children {
            let Some((child_id, child_status)) = self.nodes.get_key_value(child.as_str()) else {
                continue;
            };
            if child_status.node_type.is_virtual() {
                if expanded.insert(child_id.as_str()) {
                    self.collect_children(child_id, found, expanded);
                }
            } else {
                found.insert(child_id.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{NodePhase, NodeType};

    fn status(id: &str, display: &str, node_type: &str, phase: &str, children: &[&str]) -> NodeStatus {
        NodeStatus {
            id: id.to_string(),
            name: format!("wf.{display}"),
            display_name: display.to_string(),
            template_name: display.to_string(),
            node_type: NodeType::from(node_type.to_string()),
            phase: NodePhase::from(phase.to_string()),
            children: children.iter().map(|c| c.to_string()).collect(),
            message: None,
        }
    }

    fn nodes(list: Vec<NodeStatus>) -> BTreeMap<String, NodeStatus> {
        list.into_iter().map(|n| (n.id.clone(), n)).collect()
    }

    /// Steps workflow: wf -> [sg0] -> a -> [sg1] -> (b, retry(c) -> c-attempt)
    fn steps_workflow() -> BTreeMap<String, NodeStatus> {
        nodes(vec![
            status("wf", "wf", "Steps", "Running", &["sg0"]),
            status("sg0", "[0]", "StepGroup", "Succeeded", &["a"]),
            status("a", "a", "Pod", "Succeeded", &["sg1"]),
            status("sg1", "[1]", "StepGroup", "Running", &["b", "c"]),
            status("b", "b", "Pod", "Failed", &[]),
            status("c", "c", "Retry", "Running", &["c1"]),
            status("c1", "c(0)", "Pod", "Running", &[]),
        ])
    }

    #[test]
    fn test_virtual_nodes_are_removed() {
        let nodes = steps_workflow();
        let graph = LiveGraphExtractor::new(&nodes).extract();

        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["a", "b", "c1", "wf"]);
        for (_, node) in graph.iter() {
            for key in node.dependencies.iter().chain(&node.children) {
                assert!(graph.contains(key), "dangling edge to {key}");
                assert!(!["sg0", "sg1", "c"].contains(&key.as_str()));
            }
        }
    }

    #[test]
    fn test_edges_reconnect_through_virtual_nodes() {
        let nodes = steps_workflow();
        let graph = LiveGraphExtractor::new(&nodes).extract();

        assert_eq!(graph.get("wf").unwrap().children, vec!["a"]);
        assert_eq!(graph.get("a").unwrap().children, vec!["b", "c1"]);
        assert_eq!(graph.get("c1").unwrap().dependencies, vec!["a"]);
        assert_eq!(graph.roots(), vec!["wf"]);
    }

    #[test]
    fn test_node_fields() {
        let nodes = steps_workflow();
        let graph = LiveGraphExtractor::new(&nodes).extract();

        let b = graph.get("b").unwrap();
        assert_eq!(b.name, "b");
        assert_eq!(b.phase, Some(NodePhase::Failed));
        assert_eq!(b.kind, NodeKind::Live(NodeType::Pod));
        assert_eq!(graph.get("c1").unwrap().name, "c(0)");
    }

    #[test]
    fn test_unknown_types_are_renderable_and_missing_children_dropped() {
        let nodes = nodes(vec![
            status("root", "root", "DAG", "Running", &["x", "gone"]),
            status("x", "x", "SomethingNew", "", &[]),
            status("tg", "tg", "TaskGroup", "Running", &[]),
        ]);
        let extractor = LiveGraphExtractor::new(&nodes);
        assert!(extractor.is_renderable("x"));
        assert!(!extractor.is_renderable("tg"));
        assert!(!extractor.is_renderable("gone"));

        let graph = extractor.extract();
        assert_eq!(graph.keys().collect::<Vec<_>>(), vec!["root", "x"]);
        assert_eq!(graph.get("root").unwrap().children, vec!["x"]);
        assert_eq!(graph.get("x").unwrap().phase, Some(NodePhase::Unset));
    }

    #[test]
    fn test_only_virtual_nodes_is_empty() {
        let nodes = nodes(vec![
            status("r", "r", "Retry", "Running", &["g"]),
            status("g", "g", "StepGroup", "Running", &["r"]),
        ]);
        assert!(LiveGraphExtractor::new(&nodes).extract().is_empty());
    }
}
