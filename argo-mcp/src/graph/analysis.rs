//! Structural checks run on a graph before it is rendered

use super::{sanitize_key, GraphError, GraphResult, WorkflowGraph};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Analyzes the structure of a workflow graph
pub struct GraphAnalyzer<'a> {
    graph: &'a WorkflowGraph,
    children: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> GraphAnalyzer<'a> {
    /// Creates a new analyzer for the given graph
    pub fn new(graph: &'a WorkflowGraph) -> Self {
        Self {
            graph,
            children: graph.child_map(),
        }
    }

    /// Finds a cycle, if any.
    ///
    /// Keys and children are visited in order, so the same graph always
    /// reports the same cycle. The returned path starts and ends at the same key.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        for key in self.graph.keys() {
            if let Some(cycle) = self.cycle_from(key, &mut visited) {
                return Some(cycle.into_iter().map(String::from).collect());
            }
        }
        None
    }

    /// Fails when two keys sanitize to the same identifier
    pub fn check_identifiers(&self) -> GraphResult<()> {
        let mut identifiers: HashMap<String, &str> = HashMap::new();
        for key in self.graph.keys() {
            match identifiers.entry(sanitize_key(key)) {
                Entry::Occupied(entry) => {
                    return Err(GraphError::IdentifierCollision {
                        first: entry.get().to_string(),
                        second: key.to_string(),
                        identifier: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(key);
                }
            }
        }
        Ok(())
    }

    /// Depth-first search from `start` with an explicit stack. `path` holds
    /// the keys on the current branch and the stack holds, for each of them,
    /// the children still to visit.
    fn cycle_from(
        &self,
        start: &'a str,
        visited: &mut HashSet<&'a str>,
    ) -> Option<Vec<&'a str>> {
        if !visited.insert(start) {
            return None;
        }

        let mut path: Vec<&'a str> = vec![start];
        let mut on_path: HashSet<&'a str> = HashSet::from([start]);
        let mut stack = vec![self.children_of(start)];

        while let Some(children) = stack.last_mut() {
            let Some(child) = children.next() else {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                }
                continue;
            };

            if on_path.contains(child) {
                let position = path.iter().position(|k| *k == child).unwrap_or(0);
                let mut cycle = path.split_off(position);
                cycle.push(child);
                return Some(cycle);
            }
            if !visited.insert(child) {
                continue;
            }

            path.push(child);
            on_path.insert(child);
            stack.push(self.children_of(child));
        }
        None
    }

    fn children_of(&self, key: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.children
            .get(key)
            .into_iter()
            .flat_map(|children| children.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeKind};
    use crate::workflow::TemplateKind;

    fn container(key: &str) -> Node {
        Node::new(key, key, NodeKind::Template(TemplateKind::Container))
    }

    fn graph(edges: &[(&str, &[&str])]) -> WorkflowGraph {
        edges
            .iter()
            .map(|(key, deps)| {
                let node = Node::new(*key, *key, NodeKind::Template(TemplateKind::Container))
                    .with_dependencies(deps.iter().copied());
                (key.to_string(), node)
            })
            .collect()
    }

    #[test]
    fn test_acyclic_diamond() {
        let diamond = graph(&[("a", &[]), ("b", &["a"]), ("c", &["a"]), ("d", &["b", "c"])]);
        assert_eq!(GraphAnalyzer::new(&diamond).find_cycle(), None);
        assert_eq!(diamond.validate(), Ok(()));
    }

    #[test]
    fn test_two_node_cycle() {
        let cyclic = graph(&[("a", &["b"]), ("b", &["a"]), ("c", &["a"])]);
        let cycle = GraphAnalyzer::new(&cyclic).find_cycle().unwrap();
        assert_eq!(cycle, vec!["a", "b", "a"]);
        assert_eq!(
            cyclic.validate().unwrap_err().to_string(),
            "graph contains a cycle: a -> b -> a"
        );
    }

    #[test]
    fn test_self_loop() {
        let looped = graph(&[("a", &["a"])]);
        assert_eq!(
            GraphAnalyzer::new(&looped).find_cycle(),
            Some(vec!["a".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_cycle_reported_deterministically() {
        let cyclic = graph(&[("x", &["z"]), ("y", &["x"]), ("z", &["y"]), ("a", &[])]);
        let first = GraphAnalyzer::new(&cyclic).find_cycle();
        let second = GraphAnalyzer::new(&cyclic).find_cycle();
        assert_eq!(first, second);
        assert_eq!(first.unwrap(), vec!["x", "y", "z", "x"]);
    }

    #[test]
    fn test_long_chain_without_cycle() {
        let keys: Vec<String> = (0..20_000).map(|i| format!("t{i:05}")).collect();
        let chain: WorkflowGraph = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let node = container(key).with_dependencies(i.checked_sub(1).map(|p| keys[p].clone()));
                (key.clone(), node)
            })
            .collect();
        assert_eq!(GraphAnalyzer::new(&chain).find_cycle(), None);
    }

    #[test]
    fn test_cycle_at_end_of_long_chain() {
        let mut edges: Vec<(String, Vec<String>)> = (0..20_000)
            .map(|i| (format!("t{i:05}"), vec![format!("t{:05}", i.max(1) - 1)]))
            .collect();
        edges[0].1 = vec!["t19999".to_string()];
        let looped: WorkflowGraph = edges
            .into_iter()
            .map(|(key, deps)| {
                let node = container(&key).with_dependencies(deps);
                (key, node)
            })
            .collect();
        let cycle = GraphAnalyzer::new(&looped).find_cycle().unwrap();
        assert_eq!(cycle.len(), 20_001);
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle[0], "t00000");
    }

    #[test]
    fn test_identifier_collision() {
        let colliding = graph(&[("a.b", &[]), ("a-b", &[])]);
        assert_eq!(
            colliding.validate(),
            Err(GraphError::IdentifierCollision {
                first: "a-b".to_string(),
                second: "a.b".to_string(),
                identifier: "a_b".to_string(),
            })
        );
    }
}
