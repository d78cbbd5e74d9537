//! ASCII tree output

use super::{
    annotation_suffix, node_label, status_style, GraphRenderer, RenderOptions,
    EMPTY_GRAPH_PLACEHOLDER,
};
use crate::graph::WorkflowGraph;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders a graph as an indented tree, one line per node.
///
/// A node reachable along several paths is printed under the first parent
/// that reaches it and left out everywhere else.
#[derive(Debug, Clone, Default)]
pub struct AsciiRenderer {
    options: RenderOptions,
}

impl AsciiRenderer {
    /// Create a renderer with the given options
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

/// A node whose children are being walked
struct Frame<'a> {
    key: &'a str,
    children: Vec<&'a str>,
    next: usize,
    /// Length of the shared prefix buffer for this node's child lines
    prefix_len: usize,
}

impl<'a> Frame<'a> {
    fn new(key: &'a str, children: Vec<&'a str>, prefix_len: usize) -> Self {
        Self {
            key,
            children,
            next: 0,
            prefix_len,
        }
    }
}

struct TreeWriter<'a> {
    graph: &'a WorkflowGraph,
    children: BTreeMap<&'a str, BTreeSet<&'a str>>,
    options: &'a RenderOptions,
    visited: HashSet<&'a str>,
    /// Children each node is printed with, once the tree is claimed
    tree: HashMap<&'a str, Vec<&'a str>>,
    out: String,
}

impl<'a> TreeWriter<'a> {
    fn line(&mut self, prefix: &str, branch: &str, key: &str) {
        let Some(node) = self.graph.get(key) else {
            return;
        };
        self.out.push_str(prefix);
        self.out.push_str(branch);
        if let Some(style) = status_style(node, self.options) {
            self.out.push_str(style.symbol);
            self.out.push(' ');
        }
        self.out.push_str(&node_label(node));
        self.out.push_str(&annotation_suffix(node));
        self.out.push('\n');
    }

    fn children_of(&self, key: &str) -> Vec<&'a str> {
        self.children
            .get(key)
            .map(|kids| kids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Write the tree under `root` unless it was already written.
    ///
    /// Both walks use an explicit stack so long chains do not grow the call
    /// stack.
    fn write_tree(&mut self, root: &'a str) {
        if !self.visited.insert(root) {
            return;
        }
        self.claim(root);
        self.print(root);
    }

    /// Depth-first walk assigning each unvisited node to the first parent
    /// that reaches it
    fn claim(&mut self, root: &'a str) {
        let mut stack = vec![Frame::new(root, self.children_of(root), 0)];
        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent = frame.key;
            if !self.visited.insert(child) {
                continue;
            }
            self.tree.entry(parent).or_default().push(child);
            stack.push(Frame::new(child, self.children_of(child), 0));
        }
    }

    fn print(&mut self, root: &'a str) {
        self.line("", "", root);

        let mut prefix = String::new();
        let children = self.tree.remove(root).unwrap_or_default();
        let mut stack = vec![Frame::new(root, children, 0)];
        while let Some(frame) = stack.last_mut() {
            let Some(&child) = frame.children.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let last = frame.next == frame.children.len();
            prefix.truncate(frame.prefix_len);

            self.line(&prefix, if last { LAST_BRANCH } else { BRANCH }, child);

            prefix.push_str(if last { SPACE } else { PIPE });
            let children = self.tree.remove(child).unwrap_or_default();
            stack.push(Frame::new(child, children, prefix.len()));
        }
    }
}

impl GraphRenderer for AsciiRenderer {
    fn render(&self, graph: &WorkflowGraph) -> String {
        if graph.is_empty() {
            return format!("{EMPTY_GRAPH_PLACEHOLDER}\n");
        }

        let mut writer = TreeWriter {
            graph,
            children: graph.child_map(),
            options: &self.options,
            visited: HashSet::new(),
            tree: HashMap::new(),
            out: String::new(),
        };

        for root in graph.roots() {
            writer.write_tree(root);
        }
        // Nodes only reachable from a cycle have no root above them
        for key in graph.keys() {
            writer.write_tree(key);
        }

        writer.out
    }
}
