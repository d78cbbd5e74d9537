//! Graphviz DOT output

use super::{
    annotation_suffix, dependency_edges, node_label, status_style, GraphRenderer, RenderOptions,
    EMPTY_GRAPH_PLACEHOLDER,
};
use crate::graph::{sanitize_key, WorkflowGraph};
use std::fmt::Write;

const GRAPH_HEADER: &str = "digraph workflow {\n";
const NODE_DEFAULTS: &str =
    "    node [shape=box, style=\"rounded,filled\", fillcolor=\"#ffffff\", fontname=\"Helvetica\"];\n";

/// Renders a graph as a DOT digraph
#[derive(Debug, Clone, Default)]
pub struct DotRenderer {
    options: RenderOptions,
}

impl DotRenderer {
    /// Create a renderer with the given options
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

/// Escape text for a double-quoted DOT string
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '"' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl GraphRenderer for DotRenderer {
    fn render(&self, graph: &WorkflowGraph) -> String {
        let mut out = String::from(GRAPH_HEADER);
        out.push_str(NODE_DEFAULTS);

        if graph.is_empty() {
            let _ = writeln!(out, "    \"empty\" [label=\"{EMPTY_GRAPH_PLACEHOLDER}\"];");
            out.push_str("}\n");
            return out;
        }

        for (key, node) in graph.iter() {
            let label = escape(&format!("{}{}", node_label(node), annotation_suffix(node)));
            let _ = write!(out, "    \"{}\" [label=\"{label}\"", sanitize_key(key));
            if let Some(style) = status_style(node, &self.options) {
                let _ = write!(out, ", fillcolor=\"{}\"", style.color);
            }
            out.push_str("];\n");
        }

        for (from, to, node) in dependency_edges(graph) {
            let _ = write!(out, "    \"{}\" -> \"{}\"", sanitize_key(from), sanitize_key(to));
            if node.is_conditional() {
                out.push_str(" [style=dashed]");
            }
            out.push_str(";\n");
        }

        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeKind};
    use crate::workflow::{NodePhase, TemplateKind};

    fn node(name: &str) -> Node {
        Node::new(name, name, NodeKind::Template(TemplateKind::Container))
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
        assert_eq!(escape("two\nlines"), "two\\nlines");
    }

    #[test]
    fn test_chain() {
        let mut graph = WorkflowGraph::new();
        graph.insert("build-app", node("build-app"));
        graph.insert("test", node("test").with_dependencies(["build-app"]));

        let out = DotRenderer::default().render(&graph);
        let expected = format!(
            "{GRAPH_HEADER}{NODE_DEFAULTS}    \"build_app\" [label=\"build-app\"];\n    \"test\" [label=\"test\"];\n    \"build_app\" -> \"test\";\n}}\n"
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_conditional_edge_and_status_color() {
        let mut graph = WorkflowGraph::new();
        graph.insert("a", node("a").with_phase(NodePhase::Failed));
        graph.insert(
            "b",
            node("b")
                .with_dependencies(["a", "a"])
                .with_condition("{{tasks.a.status}} == \"Failed\""),
        );

        let out = DotRenderer::default().render(&graph);
        assert!(out.contains("    \"a\" [label=\"a\", fillcolor=\"#f44336\"];\n"));
        assert!(out.contains("    \"a\" -> \"b\" [style=dashed];\n"));
        assert_eq!(out.matches("\"a\" -> \"b\"").count(), 1);
        assert!(out.contains(r#"[◇ when: {{tasks.a.status}} == \"Failed\"]"#));

        let plain = DotRenderer::new(RenderOptions {
            include_status: false,
        })
        .render(&graph);
        assert!(!plain.contains("#f44336"));
    }

    #[test]
    fn test_empty_graph() {
        let out = DotRenderer::default().render(&WorkflowGraph::new());
        assert!(out.starts_with("digraph workflow {\n"));
        assert!(out.contains("\"empty\" [label=\"no templates/nodes\"];"));
        assert!(out.ends_with("}\n"));
    }
}
