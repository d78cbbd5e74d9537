//! Normalized workflow graph
//!
//! Every renderer consumes a [`WorkflowGraph`]: a map from node key to
//! [`Node`]. Graphs are built per render request by one of the extractors:
//!
//! - [`SpecGraphExtractor`] turns a static workflow spec into a graph whose
//!   edges are dependency lists (child names its parents).
//! - [`LiveGraphExtractor`] turns a live node-status map into a graph whose
//!   edges are child lists (parent names its children); the inverse
//!   dependency lists are filled in as well.
//!
//! Iteration over a graph is always in lexicographic key order, which is what
//! makes rendered output byte-for-byte reproducible.

mod analysis;
mod live;
mod spec;

pub use analysis::GraphAnalyzer;
pub use live::LiveGraphExtractor;
pub use spec::SpecGraphExtractor;

use crate::workflow::{NodePhase, NodeType, TemplateKind};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Result of graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while building or checking a graph
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// The spec names an entrypoint that none of its templates has
    #[error("entrypoint template not found: {0}")]
    EntrypointNotFound(String),

    /// Following dependencies leads back to where it started
    #[error("graph contains a cycle: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// Two node keys render to the same identifier
    #[error("node keys '{first}' and '{second}' both render as identifier '{identifier}'")]
    IdentifierCollision {
        /// Key sorted first
        first: String,
        /// Key sorted second
        second: String,
        /// The shared identifier
        identifier: String,
    },
}

/// Map a node key to an identifier made of `[A-Za-z0-9_]`
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// What a node is: a template kind for static graphs, a node type for live ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Kind of the template the node instantiates
    Template(TemplateKind),
    /// Type reported by the engine
    Live(NodeType),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Template(kind) => write!(f, "{kind}"),
            NodeKind::Live(node_type) => write!(f, "{node_type}"),
        }
    }
}

/// Loop constructs of a task or step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopMarkers {
    /// Iterates over an inline item list (`withItems`, `withSequence`)
    pub items: bool,
    /// Iterates over a runtime-computed list (`withParam`)
    pub param: bool,
}

impl LoopMarkers {
    /// Whether the node loops at all
    pub fn any(&self) -> bool {
        self.items || self.param
    }
}

/// A vertex of a workflow graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Name shown to users
    pub name: String,
    /// Template the node instantiates
    pub template_name: String,
    /// Template kind or live node type
    pub kind: NodeKind,
    /// Keys of the nodes this one waits for, as declared
    pub dependencies: Vec<String>,
    /// Guard expression; marks incoming edges as conditional
    pub condition: Option<String>,
    /// Loop constructs
    pub loops: LoopMarkers,
    /// Runtime phase, live graphs only
    pub phase: Option<NodePhase>,
    /// Keys of the nodes started after this one, live graphs only
    pub children: Vec<String>,
}

impl Node {
    /// Create a node with no edges
    pub fn new(name: impl Into<String>, template_name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            template_name: template_name.into(),
            kind,
            dependencies: Vec::new(),
            condition: None,
            loops: LoopMarkers::default(),
            phase: None,
            children: Vec::new(),
        }
    }

    /// Set the dependencies
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// Set the guard expression
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the loop markers
    pub fn with_loops(mut self, loops: LoopMarkers) -> Self {
        self.loops = loops;
        self
    }

    /// Set the runtime phase
    pub fn with_phase(mut self, phase: NodePhase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Whether edges into this node are conditional
    pub fn is_conditional(&self) -> bool {
        self.condition.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// A workflow graph keyed by node key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowGraph {
    nodes: BTreeMap<String, Node>,
}

impl WorkflowGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, replacing any node with the same key
    pub fn insert(&mut self, key: impl Into<String>, node: Node) {
        self.nodes.insert(key.into(), node);
    }

    /// Get a node by key
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Whether the graph has a node with this key
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Forward edges (parent to children) between nodes of this graph.
    ///
    /// Built from both dependency lists and child lists, so it is the same
    /// for static and live graphs. Edges to keys outside the graph are left out.
    pub fn child_map(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut children: BTreeMap<&str, BTreeSet<&str>> =
            self.keys().map(|key| (key, BTreeSet::new())).collect();

        for (key, node) in self.iter() {
            for dependency in &node.dependencies {
                if let Some((parent, _)) = self.nodes.get_key_value(dependency.as_str()) {
                    children.entry(parent.as_str()).or_default().insert(key);
                }
            }
            for child in &node.children {
                if let Some((child, _)) = self.nodes.get_key_value(child.as_str()) {
                    children.entry(key).or_default().insert(child.as_str());
                }
            }
        }

        children
    }

    /// Keys of nodes no other node of the graph leads to, in order
    pub fn roots(&self) -> Vec<&str> {
        let children = self.child_map();
        let reachable: BTreeSet<&str> = children.values().flatten().copied().collect();
        self.keys().filter(|key| !reachable.contains(key)).collect()
    }

    /// Check that the graph can be rendered unambiguously: no cycles and no
    /// two keys sharing a rendered identifier
    pub fn validate(&self) -> GraphResult<()> {
        let analyzer = GraphAnalyzer::new(self);
        if let Some(cycle) = analyzer.find_cycle() {
            return Err(GraphError::CycleDetected(cycle));
        }
        analyzer.check_identifiers()
    }
}

impl FromIterator<(String, Node)> for WorkflowGraph {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
