use argo_mcp::graph::GraphError;
use argo_mcp::mcp::{default_registry, ToolContext};
use argo_mcp::render::{LayoutEngineKind, RenderError, SvgCompiler};
use argo_mcp::{
    ArgoMcpError, Config, InMemoryWorkflowService, ManifestKind, OutputFormat, RenderOptions,
    WorkflowVisualizer,
};
use rmcp::model::RawContent;
use std::sync::Arc;

const PIPELINE: &str = r#"
apiVersion: argoproj.io/v1alpha1
kind: Workflow
metadata:
  name: pipeline
spec:
  entrypoint: main
  templates:
    - name: main
      dag:
        tasks:
          - name: build
            template: build
          - name: test
            template: test
            dependencies: [build]
          - name: deploy
            template: deploy
            dependencies: [test]
    - name: build
      container: {image: golang}
    - name: test
      container: {image: golang}
    - name: deploy
      container: {image: kubectl}
"#;

const RELEASE: &str = r#"
kind: WorkflowTemplate
metadata:
  name: release
spec:
  entrypoint: main
  templates:
    - name: main
      dag:
        tasks:
          - {name: build, template: run}
          - name: shard
            template: run
            depends: build.Succeeded
            withItems: [a, b, c]
          - name: publish
            template: run
            depends: "shard"
            when: "{{workflow.parameters.publish}} == true"
    - name: run
      container: {image: alpine}
"#;

const RUNNING: &str = r#"{
  "metadata": {"name": "ci-x7k2", "namespace": "argo"},
  "status": {
    "phase": "Running",
    "nodes": {
      "ci-x7k2": {"id": "ci-x7k2", "displayName": "ci-x7k2", "templateName": "main",
                  "type": "DAG", "phase": "Running", "children": ["ci-x7k2-r"]},
      "ci-x7k2-r": {"id": "ci-x7k2-r", "displayName": "build", "templateName": "build",
                    "type": "Retry", "phase": "Succeeded", "children": ["ci-x7k2-r0", "ci-x7k2-r1"]},
      "ci-x7k2-r0": {"id": "ci-x7k2-r0", "displayName": "build(0)", "templateName": "build",
                     "type": "Pod", "phase": "Failed", "children": ["ci-x7k2-t"]},
      "ci-x7k2-r1": {"id": "ci-x7k2-r1", "displayName": "build(1)", "templateName": "build",
                     "type": "Pod", "phase": "Succeeded", "children": ["ci-x7k2-t"]},
      "ci-x7k2-t": {"id": "ci-x7k2-t", "displayName": "test", "templateName": "test",
                    "type": "Pod", "phase": "Running"}
    }
  }
}"#;

fn visualizer() -> WorkflowVisualizer {
    WorkflowVisualizer::new(
        RenderOptions::default(),
        SvgCompiler::new(LayoutEngineKind::Builtin, "dot"),
    )
}

fn all_formats() -> [&'static str; 4] {
    ["mermaid", "ascii", "dot", "svg"]
}

#[test]
fn test_dag_pipeline_as_mermaid() {
    let rendered = visualizer().render_manifest(PIPELINE, "mermaid").unwrap();

    assert!(rendered.output.starts_with("flowchart TD\n"));
    assert_eq!(rendered.output.matches("[\"").count(), 3);
    assert!(rendered.output.contains("    n_build --> n_test\n"));
    assert!(rendered.output.contains("    n_test --> n_deploy\n"));
    assert_eq!(rendered.output.matches("-->").count(), 2);
    assert_eq!(rendered.node_count, 3);
    assert_eq!(rendered.source_kind, ManifestKind::Workflow);
    assert_eq!(rendered.source_name.as_deref(), Some("pipeline"));
}

#[test]
fn test_dag_pipeline_as_ascii() {
    let rendered = visualizer().render_manifest(PIPELINE, "ascii").unwrap();
    assert_eq!(rendered.output, "build\n└── test\n    └── deploy\n");
}

#[test]
fn test_dag_pipeline_as_dot() {
    let rendered = visualizer().render_manifest(PIPELINE, "dot").unwrap();
    assert!(rendered.output.starts_with("digraph workflow {\n"));
    assert!(rendered.output.contains("    \"build\" -> \"test\";\n"));
    assert!(rendered.output.contains("    \"test\" -> \"deploy\";\n"));
    assert!(rendered.output.ends_with("}\n"));
}

#[test]
fn test_dag_pipeline_as_svg() {
    let rendered = visualizer().render_manifest(PIPELINE, "svg").unwrap();
    assert_eq!(rendered.format, OutputFormat::Svg);
    assert!(rendered.output.contains("<svg"));
}

#[test]
fn test_missing_entrypoint_fails_every_format() {
    let manifest = PIPELINE.replace("entrypoint: main", "entrypoint: nonexistent");
    for format in all_formats() {
        let err = visualizer().render_manifest(&manifest, format).unwrap_err();
        assert!(
            matches!(
                err,
                ArgoMcpError::Graph(GraphError::EntrypointNotFound(ref name)) if name == "nonexistent"
            ),
            "unexpected error for {format}: {err}"
        );
    }
}

#[test]
fn test_unknown_format_rejected_before_parsing() {
    let err = visualizer()
        .render_manifest("not: [valid", "xml")
        .unwrap_err();
    assert!(matches!(
        err,
        ArgoMcpError::Render(RenderError::InvalidFormat(ref format)) if format == "xml"
    ));
    assert!(err.is_invalid_input());
}

#[test]
fn test_empty_templates_render_placeholder() {
    let manifest = "kind: Workflow\nmetadata: {name: empty}\nspec:\n  templates: []\n";
    for format in all_formats() {
        let rendered = visualizer().render_manifest(manifest, format).unwrap();
        assert_eq!(rendered.node_count, 0);
        if format != "svg" {
            assert!(
                rendered.output.contains("no templates/nodes"),
                "{format} output lacks placeholder: {}",
                rendered.output
            );
        }
    }
}

#[test]
fn test_annotations_and_conditional_edges() {
    let mermaid = visualizer().render_manifest(RELEASE, "mermaid").unwrap();
    assert_eq!(mermaid.source_kind, ManifestKind::WorkflowTemplate);
    assert!(mermaid.output.contains("    n_build --> n_shard\n"));
    assert!(mermaid.output.contains("    n_shard -.-> n_publish\n"));
    assert!(mermaid.output.contains("[↻ withItems]"));
    assert!(mermaid.output.contains("[◇ when: "));

    let dot = visualizer().render_manifest(RELEASE, "dot").unwrap();
    assert!(dot.output.contains("    \"shard\" -> \"publish\" [style=dashed];\n"));
    assert!(dot.output.contains("    \"build\" -> \"shard\";\n"));
}

#[test]
fn test_rendering_is_deterministic() {
    for format in all_formats() {
        let first = visualizer().render_manifest(RELEASE, format).unwrap();
        let second = visualizer().render_manifest(RELEASE, format).unwrap();
        assert_eq!(first, second, "{format} output differs between runs");
    }
}

#[test]
fn test_cycle_is_rejected() {
    let manifest = r#"
spec:
  entrypoint: main
  templates:
    - name: main
      dag:
        tasks:
          - {name: a, template: t, dependencies: [b]}
          - {name: b, template: t, dependencies: [a]}
    - name: t
      container: {image: alpine}
"#;
    let err = visualizer().render_manifest(manifest, "ascii").unwrap_err();
    assert!(matches!(err, ArgoMcpError::Graph(GraphError::CycleDetected(_))));
}

#[test]
fn test_colliding_identifiers_are_rejected() {
    let manifest = r#"
spec:
  entrypoint: main
  templates:
    - name: main
      dag:
        tasks:
          - {name: fetch-data, template: t}
          - {name: fetch.data, template: t}
    - name: t
      container: {image: alpine}
"#;
    let err = visualizer().render_manifest(manifest, "mermaid").unwrap_err();
    assert!(matches!(
        err,
        ArgoMcpError::Graph(GraphError::IdentifierCollision { .. })
    ));
}

#[test]
fn test_live_graph_skips_retry_wrappers() {
    let rendered = visualizer().render_live_text(RUNNING, "mermaid").unwrap();

    assert_eq!(rendered.node_count, 4);
    assert!(!rendered.output.contains("n_ci_x7k2_r["));
    assert!(rendered.output.contains("    n_ci_x7k2 --> n_ci_x7k2_r0\n"));
    assert!(rendered.output.contains("    n_ci_x7k2 --> n_ci_x7k2_r1\n"));
    assert!(rendered.output.contains("    n_ci_x7k2_r1 --> n_ci_x7k2_t\n"));
    assert!(rendered.output.contains(":::failed"));
    assert!(rendered.output.contains(":::running"));
}

#[test]
fn test_live_graph_without_status() {
    let rendered = visualizer()
        .with_options(RenderOptions {
            include_status: false,
        })
        .render_live_text(RUNNING, "mermaid")
        .unwrap();
    assert!(!rendered.output.contains(":::"));
    assert!(rendered.output.contains("    classDef failed fill:#f44336"));
}

#[test]
fn test_live_ascii_shares_join_node() {
    let rendered = visualizer().render_live_text(RUNNING, "ascii").unwrap();
    assert_eq!(
        rendered.output,
        "◉ ci-x7k2 (main)\n├── ✗ build(0) (build)\n│   └── ◉ test\n└── ✓ build(1) (build)\n"
    );
    assert_eq!(rendered.output.matches("test").count(), 1);
    assert_eq!(rendered.output.lines().count(), rendered.node_count);
}

#[test]
fn test_steps_barrier_prints_each_node_once() {
    let manifest = r#"
spec:
  entrypoint: main
  templates:
    - name: main
      steps:
        - - {name: a, template: t}
        - - {name: b, template: t}
          - {name: c, template: t}
        - - {name: d, template: t}
    - name: t
      container: {image: alpine}
"#;
    let rendered = visualizer().render_manifest(manifest, "ascii").unwrap();
    assert_eq!(rendered.node_count, 4);
    assert_eq!(
        rendered.output,
        "a (t)\n├── b (t)\n│   └── d (t)\n└── c (t)\n"
    );
}

/// DAG manifest where each task depends on the one before it
fn chain_manifest(length: usize) -> String {
    let mut yaml = String::from(
        "spec:\n  entrypoint: main\n  templates:\n    - name: main\n      dag:\n        tasks:\n",
    );
    yaml.push_str("          - {name: t0, template: run}\n");
    for index in 1..length {
        yaml.push_str(&format!(
            "          - {{name: t{index}, template: run, dependencies: [t{}]}}\n",
            index - 1
        ));
    }
    yaml.push_str("    - name: run\n      container: {image: alpine}\n");
    yaml
}

#[test]
fn test_long_chain_in_every_text_format() {
    let length = 10_000;
    let manifest = chain_manifest(length);
    for format in ["mermaid", "ascii", "dot"] {
        let rendered = visualizer().render_manifest(&manifest, format).unwrap();
        assert_eq!(rendered.node_count, length, "{format}");
        if format == "ascii" {
            assert_eq!(rendered.output.lines().count(), length);
            assert!(rendered.output.ends_with("└── t9999 (run)\n"));
        }
    }
}

#[tokio::test]
async fn test_registry_dispatch() {
    let service = InMemoryWorkflowService::new();
    service.insert_workflow_text("argo", RUNNING).unwrap();
    service.insert_template_text("ci", RELEASE).unwrap();
    let context = ToolContext::new(Arc::new(service), Arc::new(Config::default()));
    let registry = default_registry();

    let arguments = |value: serde_json::Value| match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    };

    let result = registry
        .call_tool(
            "render_workflow_manifest",
            arguments(serde_json::json!({ "manifest": PIPELINE, "format": "ascii" })),
            &context,
        )
        .await
        .unwrap();
    let RawContent::Text(text) = &result.content[0].raw else {
        panic!("expected text content");
    };
    assert_eq!(text.text, "build\n└── test\n    └── deploy\n");

    let result = registry
        .call_tool(
            "visualize_workflow_template",
            arguments(serde_json::json!({ "namespace": "ci", "name": "release" })),
            &context,
        )
        .await
        .unwrap();
    let RawContent::Text(text) = &result.content[0].raw else {
        panic!("expected text content");
    };
    assert!(text.text.starts_with("flowchart TD\n"));

    let result = registry
        .call_tool(
            "visualize_workflow",
            arguments(serde_json::json!({ "name": "ci-x7k2", "format": "dot" })),
            &context,
        )
        .await
        .unwrap();
    let RawContent::Text(summary) = &result.content[1].raw else {
        panic!("expected text content");
    };
    let summary: serde_json::Value = serde_json::from_str(&summary.text).unwrap();
    assert_eq!(summary["node_count"], 4);
    assert_eq!(summary["kind"], "Workflow");
}
