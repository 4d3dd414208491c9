//! Integration tests for tfla
//!
//! These tests run the parser, assembler, cycle report and renderer together
//! on configuration trees written to a temporary directory.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;
use tfla_core::{BuildOptions, EdgeKind, GraphDocument, NodeId, NodeKind, build_graph, find_cycles};
use tfla_parser::{ParseOptions, parse_directory};
use tfla_render::{RenderOptions, render_html};

fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in files {
        let full_path = temp_dir.path().join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, content).unwrap();
    }
    temp_dir
}

fn sample_tree() -> TempDir {
    write_tree(&[
        (
            "envs/prod/main.tf",
            r#"
module "network" {
  source = "../../modules/network"
}

module "vpc" {
  source = "terraform-aws-modules/vpc/aws"
}
"#,
        ),
        (
            "envs/prod/app.tf",
            r#"
module "app" {
  source     = "git::https://github.com/acme/app.git//deploy?ref=v2"
  network_id = module.network.id
}
"#,
        ),
        (
            "envs/prod/api.tf",
            r#"
module "api" {
  source     = "../../modules/network"
  app_url    = module.app.url
  depends_on = [module.network]
}

resource "aws_s3_bucket" "assets" {
  bucket     = "assets"
  depends_on = [module.api]
}
"#,
        ),
        (
            "modules/network/main.tf",
            "resource \"aws_vpc\" \"this\" {\n  cidr_block = \"10.0.0.0/16\"\n}\n",
        ),
    ])
}

fn build(root: &Path, include_resources: bool) -> GraphDocument {
    let parsed = parse_directory(root, &ParseOptions::default()).unwrap();
    let graph = build_graph(&parsed, BuildOptions { include_resources });
    let cycles = find_cycles(&graph);
    GraphDocument::from_graph(&graph, cycles)
}

fn has_edge(doc: &GraphDocument, source: &str, target: &str, kind: EdgeKind) -> bool {
    doc.edges
        .iter()
        .any(|e| e.source.as_str() == source && e.target.as_str() == target && e.kind == kind)
}

#[test]
fn test_end_to_end_graph() {
    let temp_dir = sample_tree();
    let doc = build(temp_dir.path(), false);

    // External entities
    assert!(has_edge(
        &doc,
        "module:envs/prod:vpc",
        "registry:terraform-aws-modules/vpc/aws",
        EdgeKind::ExternalSource
    ));
    assert!(has_edge(
        &doc,
        "module:envs/prod:app",
        "git:git::https://github.com/acme/app.git//deploy?ref=v2",
        EdgeKind::ExternalSource
    ));

    // Git modules originate no data dependencies
    assert!(!has_edge(&doc, "module:envs/prod:app", "module:envs/prod:network", EdgeKind::DataDependency));

    // Cross-file references and explicit depends_on
    assert!(has_edge(&doc, "module:envs/prod:api", "module:envs/prod:app", EdgeKind::DataDependency));
    assert!(has_edge(&doc, "module:envs/prod:api", "module:envs/prod:network", EdgeKind::DependsOn));

    // One source module providing both callers
    let provider = "source_module:modules/network:network";
    assert!(has_edge(&doc, provider, "module:envs/prod:network", EdgeKind::Provides));
    assert!(has_edge(&doc, provider, "module:envs/prod:api", EdgeKind::Provides));

    // Resources excluded by default
    assert!(doc.nodes.iter().all(|n| n.kind() != NodeKind::Resource));
    assert!(doc.cycles.is_empty());
}

#[test]
fn test_end_to_end_with_resources() {
    let temp_dir = sample_tree();
    let doc = build(temp_dir.path(), true);

    assert_eq!(doc.stats.nodes_by_kind.get("resource"), Some(&2));
    assert!(has_edge(
        &doc,
        "resource:envs/prod:aws_s3_bucket.assets",
        "module:envs/prod:api",
        EdgeKind::DependsOn
    ));
    // Source module contains the module directory's file
    let root = fs::canonicalize(temp_dir.path()).unwrap();
    let network_file = NodeId::file(&root.join("modules/network/main.tf"));
    assert!(has_edge(
        &doc,
        "source_module:modules/network:network",
        network_file.as_str(),
        EdgeKind::Contains
    ));
}

#[test]
fn test_end_to_end_is_deterministic() {
    let temp_dir = sample_tree();
    let first = build(temp_dir.path(), true).to_json_pretty().unwrap();
    let second = build(temp_dir.path(), true).to_json_pretty().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_end_to_end_cycle_reaches_page() {
    let temp_dir = write_tree(&[
        ("a/main.tf", "module \"a\" {\n  source = \"x\"\n  v = module.b.out\n}\n"),
        ("b/main.tf", "module \"b\" {\n  source = \"y\"\n  v = module.a.out\n}\n"),
    ]);
    let doc = build(temp_dir.path(), false);
    assert_eq!(
        doc.cycles,
        vec![vec![NodeId::from("module:a:a"), NodeId::from("module:b:b")]]
    );

    let html = render_html(&doc, &RenderOptions::default()).unwrap();
    assert!(html.contains(r#"[["module:a:a","module:b:b"]]"#));
}

/// Test that the CLI writes the page and JSON document
#[test]
fn test_cli_generate() {
    let temp_dir = sample_tree();
    let out_dir = TempDir::new().unwrap();
    let html_path = out_dir.path().join("lineage.html");
    let json_path = out_dir.path().join("lineage.json");

    let output = Command::new(env!("CARGO_BIN_EXE_tfla"))
        .arg("generate")
        .arg("--input")
        .arg(temp_dir.path())
        .arg("--output")
        .arg(&html_path)
        .arg("--json")
        .arg(&json_path)
        .arg("--no-timestamp")
        .args(["--layout", "flat", "--color-by", "environment"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("forceAtlas2Based"));
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert!(doc["stats"]["node_count"].as_u64().unwrap() > 0);
}

#[test]
fn test_cli_rejects_missing_input() {
    let out_dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_tfla"))
        .args(["inspect", "--input"])
        .arg(out_dir.path().join("missing"))
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_tfla"))
        .arg("version")
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tfla v"));
}
