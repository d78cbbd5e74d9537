//! Render requests from manifest text or live workflows
//!
//! [`WorkflowVisualizer`] runs the whole pipeline for one request: the format
//! selector is checked first, then the source is parsed, a graph extracted and
//! validated, and finally rendered. Nothing is kept between requests.

use crate::config::Config;
use crate::error::Result;
use crate::graph::{LiveGraphExtractor, SpecGraphExtractor, WorkflowGraph};
use crate::render::{
    AsciiRenderer, DotRenderer, GraphRenderer, MermaidRenderer, OutputFormat, RenderOptions,
    SvgCompiler,
};
use crate::workflow::{LiveWorkflow, Manifest, ManifestKind, WorkflowSpec};
use serde::Serialize;

/// A rendered graph and what it was rendered from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visualization {
    /// Format of `output`
    pub format: OutputFormat,
    /// Rendered text
    #[serde(skip)]
    pub output: String,
    /// Number of nodes in the rendered graph
    pub node_count: usize,
    /// Kind of the source resource
    #[serde(rename = "kind")]
    pub source_kind: ManifestKind,
    /// Name of the source resource
    #[serde(rename = "name")]
    pub source_name: Option<String>,
}

/// Runs render requests
#[derive(Debug, Clone, Default)]
pub struct WorkflowVisualizer {
    options: RenderOptions,
    compiler: SvgCompiler,
}

impl WorkflowVisualizer {
    /// Create a visualizer
    pub fn new(options: RenderOptions, compiler: SvgCompiler) -> Self {
        Self { options, compiler }
    }

    /// Create a visualizer using configured options and layout engine
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.render_options(), config.svg_compiler())
    }

    /// Replace the render options
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Render the entrypoint graph of a manifest
    pub fn render_manifest(&self, text: &str, format: &str) -> Result<Visualization> {
        let format: OutputFormat = format.parse()?;
        let manifest = Manifest::parse(text)?;
        self.render_spec(
            manifest.kind,
            manifest.name().map(String::from),
            &manifest.spec,
            format,
        )
    }

    /// Render the entrypoint graph of a parsed manifest
    pub fn render_parsed_manifest(
        &self,
        manifest: &Manifest,
        format: OutputFormat,
    ) -> Result<Visualization> {
        self.render_spec(
            manifest.kind,
            manifest.name().map(String::from),
            &manifest.spec,
            format,
        )
    }

    /// Render the node graph of a live workflow.
    ///
    /// A workflow that has no nodes yet is rendered from its stored spec when
    /// it has one.
    pub fn render_live(&self, workflow: &LiveWorkflow, format: OutputFormat) -> Result<Visualization> {
        let name = workflow.metadata.display_name().map(String::from);

        if workflow.status.nodes.is_empty() {
            if let Some(spec) = &workflow.spec {
                tracing::debug!("Workflow {:?} has no nodes yet, rendering its spec", name);
                return self.render_spec(ManifestKind::Workflow, name, spec, format);
            }
        }

        let graph = LiveGraphExtractor::new(&workflow.status.nodes).extract();
        self.finish(graph, format, ManifestKind::Workflow, name)
    }

    /// Render the node graph of a live workflow given as text
    pub fn render_live_text(&self, text: &str, format: &str) -> Result<Visualization> {
        let format: OutputFormat = format.parse()?;
        let workflow = LiveWorkflow::parse(text)?;
        self.render_live(&workflow, format)
    }

    fn render_spec(
        &self,
        kind: ManifestKind,
        name: Option<String>,
        spec: &WorkflowSpec,
        format: OutputFormat,
    ) -> Result<Visualization> {
        let graph = SpecGraphExtractor::new(spec).extract()?;
        self.finish(graph, format, kind, name)
    }

    fn finish(
        &self,
        graph: WorkflowGraph,
        format: OutputFormat,
        source_kind: ManifestKind,
        source_name: Option<String>,
    ) -> Result<Visualization> {
        let output = self.render_graph(&graph, format)?;
        tracing::debug!(
            "Rendered {} {:?} as {} ({} nodes, {} bytes)",
            source_kind,
            source_name,
            format,
            graph.len(),
            output.len()
        );
        Ok(Visualization {
            format,
            output,
            node_count: graph.len(),
            source_kind,
            source_name,
        })
    }

    /// Validate a graph and render it in the given format
    pub fn render_graph(&self, graph: &WorkflowGraph, format: OutputFormat) -> Result<String> {
        graph.validate()?;
        let output = match format {
            OutputFormat::Mermaid => MermaidRenderer::new(self.options).render(graph),
            OutputFormat::Ascii => AsciiRenderer::new(self.options).render(graph),
            OutputFormat::Dot => DotRenderer::new(self.options).render(graph),
            OutputFormat::Svg => {
                let dot = DotRenderer::new(self.options).render(graph);
                self.compiler.compile(&dot)?
            }
        };
        Ok(output)
    }
}

impl Visualization {
    /// JSON summary: format, node count, source kind and name
    pub fn summary(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
