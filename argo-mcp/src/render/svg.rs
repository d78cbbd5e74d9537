//! DOT to SVG compilation
//!
//! Compilation goes through a [`LayoutEngine`]: the engine is acquired, the
//! DOT source is parsed into a graph handle, the graph is rendered, and then
//! the graph handle and the engine are released. Both releases happen on every
//! path out of [`compile_with`]; when a release fails its error is reported
//! together with whatever error ended the compilation.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use tempfile::TempDir;
use thiserror::Error;

use layout::backends::svg::SVGWriter;
use layout::gv::{DotParser, GraphBuilder};
use layout::topo::layout::VisualGraph;

/// Failure reported by a layout engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutError(pub String);

impl LayoutError {
    /// Create an error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for LayoutError {}

impl From<io::Error> for LayoutError {
    fn from(err: io::Error) -> Self {
        Self(err.to_string())
    }
}

/// Errors from releasing a graph handle or closing an engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupErrors(Vec<LayoutError>);

impl CleanupErrors {
    /// Record the outcome of a release step
    pub fn record(&mut self, result: Result<(), LayoutError>) {
        if let Err(err) = result {
            self.0.push(err);
        }
    }

    /// Whether every release step succeeded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded errors
    pub fn errors(&self) -> &[LayoutError] {
        &self.0
    }
}

impl fmt::Display for CleanupErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

fn cleanup_suffix(cleanup: &CleanupErrors) -> String {
    if cleanup.is_empty() {
        String::new()
    } else {
        format!(" (cleanup also failed: {cleanup})")
    }
}

/// Errors raised while compiling DOT into SVG
#[derive(Debug, Error)]
pub enum CompileError {
    /// The layout engine could not be acquired
    #[error("failed to start layout engine: {0}")]
    Engine(LayoutError),

    /// The layout engine name is not recognized
    #[error("unknown layout engine '{0}': expected one of auto, builtin, graphviz")]
    UnknownEngine(String),

    /// The DOT source was rejected
    #[error("failed to parse DOT source: {source}{}", cleanup_suffix(.cleanup))]
    Parse {
        /// Parser error
        source: LayoutError,
        /// Errors from releasing the engine
        cleanup: CleanupErrors,
    },

    /// Layout or SVG generation failed
    #[error("failed to render SVG: {source}{}", cleanup_suffix(.cleanup))]
    Render {
        /// Renderer error
        source: LayoutError,
        /// Errors from releasing the graph and the engine
        cleanup: CleanupErrors,
    },

    /// Rendering succeeded but releasing resources did not
    #[error("failed to release layout resources: {0}")]
    Cleanup(CleanupErrors),
}

/// A graph layout backend
pub trait LayoutEngine {
    /// Handle to a parsed graph
    type Graph;

    /// Parse DOT source into a graph handle
    fn parse(&mut self, dot: &str) -> Result<Self::Graph, LayoutError>;

    /// Lay out a parsed graph and produce an SVG document
    fn render(&mut self, graph: &mut Self::Graph) -> Result<String, LayoutError>;

    /// Release a graph handle
    fn release_graph(&mut self, graph: Self::Graph) -> Result<(), LayoutError>;

    /// Release the engine itself
    fn close(self) -> Result<(), LayoutError>;
}

/// Compile DOT source to SVG with the given engine, releasing the engine and
/// any parsed graph before returning
pub fn compile_with<E: LayoutEngine>(mut engine: E, dot: &str) -> Result<String, CompileError> {
    let mut graph = match engine.parse(dot) {
        Ok(graph) => graph,
        Err(source) => {
            let mut cleanup = CleanupErrors::default();
            cleanup.record(engine.close());
            return Err(CompileError::Parse { source, cleanup });
        }
    };

    let rendered = engine.render(&mut graph);

    let mut cleanup = CleanupErrors::default();
    cleanup.record(engine.release_graph(graph));
    cleanup.record(engine.close());

    match rendered {
        Ok(svg) if cleanup.is_empty() => Ok(svg),
        Ok(_) => Err(CompileError::Cleanup(cleanup)),
        Err(source) => Err(CompileError::Render { source, cleanup }),
    }
}

/// Run a `layout-rs` call, turning a panic inside it into an error.
///
/// This only works while panics unwind. The release profile keeps the
/// default `panic = "unwind"` for that reason; a binary built with
/// `panic = "abort"` still aborts on a layout panic.
fn guarded<T>(failure: &str, call: impl FnOnce() -> T) -> Result<T, LayoutError> {
    catch_unwind(AssertUnwindSafe(call)).map_err(|_| LayoutError::new(failure))
}

/// The pure-Rust layout engine from `layout-rs`
#[derive(Debug, Default)]
pub struct BuiltinLayout;

impl BuiltinLayout {
    /// Create the engine
    pub fn new() -> Self {
        Self
    }
}

impl LayoutEngine for BuiltinLayout {
    type Graph = VisualGraph;

    fn parse(&mut self, dot: &str) -> Result<Self::Graph, LayoutError> {
        let mut parser = DotParser::new(dot);
        let ast = parser.process().map_err(LayoutError)?;
        guarded("layout engine rejected the graph structure", || {
            let mut builder = GraphBuilder::new();
            builder.visit_graph(&ast);
            builder.get()
        })
    }

    fn render(&mut self, graph: &mut Self::Graph) -> Result<String, LayoutError> {
        guarded("layout engine failed while placing nodes", || {
            let mut writer = SVGWriter::new();
            graph.do_it(false, false, false, &mut writer);
            writer.finalize()
        })
    }

    fn release_graph(&mut self, graph: Self::Graph) -> Result<(), LayoutError> {
        drop(graph);
        Ok(())
    }

    fn close(self) -> Result<(), LayoutError> {
        Ok(())
    }
}

const SOURCE_FILE: &str = "graph.dot";

/// The external Graphviz `dot` executable.
///
/// The engine owns a scratch directory; a parsed graph is the DOT source
/// written into it and checked with `dot -Tcanon`.
#[derive(Debug)]
pub struct GraphvizLayout {
    binary: PathBuf,
    scratch: TempDir,
}

impl GraphvizLayout {
    /// Locate the binary on `PATH` and create the scratch directory
    pub fn new(binary: impl AsRef<OsStr>) -> Result<Self, LayoutError> {
        let binary = which::which(binary.as_ref()).map_err(|err| {
            LayoutError(format!(
                "graphviz binary '{}' not found: {err}",
                binary.as_ref().to_string_lossy()
            ))
        })?;
        let scratch = tempfile::Builder::new().prefix("argo-mcp-").tempdir()?;
        tracing::debug!(
            "Using graphviz at {} with scratch directory {}",
            binary.display(),
            scratch.path().display()
        );
        Ok(Self { binary, scratch })
    }

    fn run(&self, format: &str, source: &Path) -> Result<String, LayoutError> {
        let output = Command::new(&self.binary).arg(format).arg(source).output()?;
        if !output.status.success() {
            return Err(LayoutError(format!(
                "{} {format} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|err| LayoutError(format!("graphviz produced invalid UTF-8: {err}")))
    }
}

impl LayoutEngine for GraphvizLayout {
    type Graph = PathBuf;

    fn parse(&mut self, dot: &str) -> Result<Self::Graph, LayoutError> {
        let source = self.scratch.path().join(SOURCE_FILE);
        fs::write(&source, dot)?;
        self.run("-Tcanon", &source)?;
        Ok(source)
    }

    fn render(&mut self, graph: &mut Self::Graph) -> Result<String, LayoutError> {
        self.run("-Tsvg", graph)
    }

    fn release_graph(&mut self, graph: Self::Graph) -> Result<(), LayoutError> {
        fs::remove_file(&graph)?;
        Ok(())
    }

    fn close(self) -> Result<(), LayoutError> {
        self.scratch.close()?;
        Ok(())
    }
}

/// Which layout engine compiles SVG
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutEngineKind {
    /// Graphviz when its binary is on `PATH`, builtin otherwise
    #[default]
    Auto,
    /// Always the builtin engine
    Builtin,
    /// Always Graphviz
    Graphviz,
}

impl LayoutEngineKind {
    /// Engine name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutEngineKind::Auto => "auto",
            LayoutEngineKind::Builtin => "builtin",
            LayoutEngineKind::Graphviz => "graphviz",
        }
    }
}

impl fmt::Display for LayoutEngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutEngineKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(LayoutEngineKind::Auto),
            "builtin" => Ok(LayoutEngineKind::Builtin),
            "graphviz" => Ok(LayoutEngineKind::Graphviz),
            _ => Err(CompileError::UnknownEngine(s.to_string())),
        }
    }
}

/// Compiles DOT into SVG with a configured engine
#[derive(Debug, Clone)]
pub struct SvgCompiler {
    engine: LayoutEngineKind,
    graphviz_binary: String,
}

impl Default for SvgCompiler {
    fn default() -> Self {
        Self::new(LayoutEngineKind::Auto, "dot")
    }
}

impl SvgCompiler {
    /// Create a compiler using the given engine and Graphviz binary name
    pub fn new(engine: LayoutEngineKind, graphviz_binary: impl Into<String>) -> Self {
        Self {
            engine,
            graphviz_binary: graphviz_binary.into(),
        }
    }

    /// The engine `compile` will use; `Auto` resolves by probing `PATH`
    pub fn resolved_engine(&self) -> LayoutEngineKind {
        match self.engine {
            LayoutEngineKind::Auto if which::which(&self.graphviz_binary).is_ok() => {
                LayoutEngineKind::Graphviz
            }
            LayoutEngineKind::Auto => {
                tracing::warn!(
                    "Graphviz binary '{}' not found, using builtin layout",
                    self.graphviz_binary
                );
                LayoutEngineKind::Builtin
            }
            kind => kind,
        }
    }

    /// Compile DOT source to an SVG document
    pub fn compile(&self, dot: &str) -> Result<String, CompileError> {
        let engine = self.resolved_engine();
        tracing::debug!("Compiling {} bytes of DOT with {} engine", dot.len(), engine);
        match engine {
            LayoutEngineKind::Graphviz => {
                let layout =
                    GraphvizLayout::new(&self.graphviz_binary).map_err(CompileError::Engine)?;
                compile_with(layout, dot)
            }
            _ => compile_with(BuiltinLayout::new(), dot),
        }
    }
}
