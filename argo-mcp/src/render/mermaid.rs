//! Mermaid flowchart output

use super::{
    annotation_suffix, dependency_edges, node_label, phase_style, status_style, GraphRenderer,
    RenderOptions, EMPTY_GRAPH_PLACEHOLDER, STYLED_PHASES,
};
use crate::graph::{sanitize_key, WorkflowGraph};
use std::fmt::Write;

/// Renders a graph as a top-down Mermaid flowchart
#[derive(Debug, Clone, Default)]
pub struct MermaidRenderer {
    options: RenderOptions,
}

impl MermaidRenderer {
    /// Create a renderer with the given options
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

/// Node id for a key. The prefix keeps ids clear of flowchart keywords
/// such as `end`.
fn node_id(key: &str) -> String {
    format!("n_{}", sanitize_key(key))
}

/// Mermaid strings are double-quoted and use entity codes for quotes
fn escape(text: &str) -> String {
    text.replace('"', "#quot;")
}

impl GraphRenderer for MermaidRenderer {
    fn render(&self, graph: &WorkflowGraph) -> String {
        let mut out = String::from("flowchart TD\n");

        if graph.is_empty() {
            let _ = writeln!(out, "    empty[\"{EMPTY_GRAPH_PLACEHOLDER}\"]");
            return out;
        }

        for (key, node) in graph.iter() {
            let label = escape(&format!("{}{}", node_label(node), annotation_suffix(node)));
            let _ = write!(out, "    {}[\"{label}\"]", node_id(key));
            if let Some(style) = status_style(node, &self.options) {
                let _ = write!(out, ":::{}", style.class);
            }
            out.push('\n');
        }

        for (from, to, node) in dependency_edges(graph) {
            let arrow = if node.is_conditional() { "-.->" } else { "-->" };
            let _ = writeln!(out, "    {} {arrow} {}", node_id(from), node_id(to));
        }

        for phase in STYLED_PHASES {
            let style = phase_style(phase);
            let _ = writeln!(
                out,
                "    classDef {} fill:{},stroke:#333333,color:#ffffff",
                style.class, style.color
            );
        }

        out
    }
}
