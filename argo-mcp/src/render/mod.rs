//! Workflow graph rendering
//!
//! This module serializes a [`WorkflowGraph`] into Mermaid flowcharts, ASCII
//! trees and DOT digraphs, and compiles DOT into SVG. All text renderers walk
//! the graph in key order and deduplicate edges, so the same graph always
//! renders to the same bytes.

mod ascii;
mod dot;
mod mermaid;
mod svg;

pub use ascii::AsciiRenderer;
pub use dot::DotRenderer;
pub use mermaid::MermaidRenderer;
pub use svg::{
    compile_with, BuiltinLayout, CleanupErrors, CompileError, GraphvizLayout, LayoutEngine,
    LayoutEngineKind, LayoutError, SvgCompiler,
};

use crate::graph::{Node, WorkflowGraph};
use crate::workflow::NodePhase;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Text shown for a graph without nodes
pub const EMPTY_GRAPH_PLACEHOLDER: &str = "no templates/nodes";

/// Glyph marking a node that loops over items or parameters
pub const LOOP_GLYPH: &str = "↻";

/// Glyph marking a node guarded by a condition
pub const CONDITION_GLYPH: &str = "◇";

/// Errors raised while selecting a renderer
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// The requested format is not one of the supported formats
    #[error("invalid format '{0}': expected one of mermaid, ascii, dot, svg")]
    InvalidFormat(String),
}

/// Output format of a rendered graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Mermaid flowchart
    Mermaid,
    /// ASCII tree
    Ascii,
    /// Graphviz DOT digraph
    Dot,
    /// SVG image compiled from DOT
    Svg,
}

impl OutputFormat {
    /// Format name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mermaid => "mermaid",
            OutputFormat::Ascii => "ascii",
            OutputFormat::Dot => "dot",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mermaid" => Ok(OutputFormat::Mermaid),
            "ascii" => Ok(OutputFormat::Ascii),
            "dot" => Ok(OutputFormat::Dot),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(RenderError::InvalidFormat(s.to_string())),
        }
    }
}

/// Serializes a graph into one text format
pub trait GraphRenderer {
    /// Render the graph; the output ends with a newline
    fn render(&self, graph: &WorkflowGraph) -> String;
}

/// Options shared by the text renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Annotate nodes with their runtime phase when they have one
    pub include_status: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_status: true,
        }
    }
}

/// How a runtime phase is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStyle {
    /// Style class name used in Mermaid output
    pub class: &'static str,
    /// Fill color
    pub color: &'static str,
    /// Symbol used in ASCII output
    pub symbol: &'static str,
}

const PENDING_STYLE: PhaseStyle = PhaseStyle {
    class: "pending",
    color: "#9e9e9e",
    symbol: "○",
};

/// Presentation of a phase; phases without their own style look pending
pub fn phase_style(phase: NodePhase) -> PhaseStyle {
    match phase {
        NodePhase::Succeeded => PhaseStyle {
            class: "succeeded",
            color: "#4caf50",
            symbol: "✓",
        },
        NodePhase::Failed => PhaseStyle {
            class: "failed",
            color: "#f44336",
            symbol: "✗",
        },
        NodePhase::Running => PhaseStyle {
            class: "running",
            color: "#2196f3",
            symbol: "◉",
        },
        NodePhase::Error => PhaseStyle {
            class: "error",
            color: "#b71c1c",
            symbol: "⚠",
        },
        NodePhase::Skipped => PhaseStyle {
            class: "skipped",
            color: "#bdbdbd",
            symbol: "⊘",
        },
        NodePhase::Omitted => PhaseStyle {
            class: "omitted",
            color: "#e0e0e0",
            symbol: "⊗",
        },
        NodePhase::Pending | NodePhase::Unset => PENDING_STYLE,
    }
}

/// Phases with a style class of their own, in palette order
pub const STYLED_PHASES: [NodePhase; 7] = [
    NodePhase::Succeeded,
    NodePhase::Failed,
    NodePhase::Running,
    NodePhase::Pending,
    NodePhase::Error,
    NodePhase::Skipped,
    NodePhase::Omitted,
];

/// Phase style of a node when status output is on and the node has a phase
fn status_style(node: &Node, options: &RenderOptions) -> Option<PhaseStyle> {
    if !options.include_status {
        return None;
    }
    node.phase.map(phase_style)
}

/// `name`, or `name (template)` when the two differ
fn node_label(node: &Node) -> String {
    if node.template_name.is_empty() || node.template_name == node.name {
        node.name.clone()
    } else {
        format!("{} ({})", node.name, node.template_name)
    }
}

/// Bracketed loop and condition annotations, each with a leading space
fn annotation_suffix(node: &Node) -> String {
    let mut suffix = String::new();
    if node.loops.items {
        suffix.push_str(&format!(" [{LOOP_GLYPH} withItems]"));
    }
    if node.loops.param {
        suffix.push_str(&format!(" [{LOOP_GLYPH} withParam]"));
    }
    if let Some(condition) = node.condition.as_deref().filter(|c| !c.is_empty()) {
        suffix.push_str(&format!(" [{CONDITION_GLYPH} when: {condition}]"));
    }
    suffix
}

/// Edges already emitted during one render call
#[derive(Debug, Default)]
struct EdgeSet<'a> {
    seen: HashSet<(&'a str, &'a str)>,
}

impl<'a> EdgeSet<'a> {
    /// Record an edge; false when it was already recorded
    fn insert(&mut self, from: &'a str, to: &'a str) -> bool {
        self.seen.insert((from, to))
    }
}

/// Dependency edges of a graph in emission order: nodes in key order, each
/// node's dependencies in declared order, duplicates dropped
fn dependency_edges(graph: &WorkflowGraph) -> Vec<(&str, &str, &Node)> {
    let mut seen = EdgeSet::default();
    let mut edges = Vec::new();
    for (key, node) in graph.iter() {
        for dependency in &node.dependencies {
            if seen.insert(dependency.as_str(), key) {
                edges.push((dependency.as_str(), key, node));
            }
        }
    }
    edges
}
