//! Unit tests for tfla-parser

use std::fs;
use std::path::Path;

use tfla_core::refs::normalize_reference;
use tfla_core::{ModuleKind, NodeId};

use crate::terraform::relative_dir;
use crate::test_utils::{create_sample_tree, create_tree};
use crate::*;

fn parse(root: &Path) -> tfla_core::ParsedTerraform {
    parse_directory(root, &ParseOptions::default()).unwrap()
}

#[test]
fn test_sample_tree_entities() {
    let temp_dir = create_sample_tree();
    let parsed = parse(temp_dir.path());

    let mut ids: Vec<_> = parsed.modules.keys().map(|id| id.to_string()).collect();
    ids.sort();
    assert_eq!(
        ids,
        vec![
            "module:envs/dev:network",
            "module:envs/dev:vpc",
            "module:envs/prod:app",
            "module:envs/prod:dns",
            "module:envs/prod:network",
            "source_module:modules/app:app",
            "source_module:modules/network:network",
        ]
    );
    assert_eq!(parsed.resources.len(), 2);
    assert!(
        parsed
            .resources
            .contains_key(&NodeId::from("resource:modules/network:aws_vpc.this"))
    );
}

#[test]
fn test_module_attributes() {
    let temp_dir = create_sample_tree();
    let parsed = parse(temp_dir.path());

    let app = &parsed.modules[&NodeId::from("module:envs/prod:app")];
    assert_eq!(app.source.as_deref(), Some("../../modules/app"));
    assert_eq!(app.file_name.as_deref(), Some("main.tf"));
    assert_eq!(app.explicit_deps.len(), 1);
    assert_eq!(normalize_reference(&app.explicit_deps[0]), "module.network");
    assert_eq!(app.implicit_module_refs, vec!["network".to_string()]);

    let inputs = app.inputs.as_object().unwrap();
    assert!(!inputs.contains_key("source"));
    assert!(!inputs.contains_key("depends_on"));
    assert!(inputs["vpc_id"].as_str().unwrap().contains("module.network.vpc_id"));

    let vpc = &parsed.modules[&NodeId::from("module:envs/dev:vpc")];
    assert_eq!(vpc.source.as_deref(), Some("terraform-aws-modules/vpc/aws"));
    assert_eq!(vpc.inputs["version"], "5.0.0");
    assert!(vpc.implicit_module_refs.is_empty());
}

#[test]
fn test_resource_attributes() {
    let temp_dir = create_sample_tree();
    let parsed = parse(temp_dir.path());

    let logs = &parsed.resources[&NodeId::from("resource:envs/dev:aws_s3_bucket.logs")];
    assert_eq!(logs.resource_type, "aws_s3_bucket");
    assert_eq!(logs.name, "logs");
    assert_eq!(logs.explicit_deps.len(), 1);
    assert_eq!(normalize_reference(&logs.explicit_deps[0]), "module.vpc");
    assert_eq!(logs.config["bucket"], "dev-logs");
    assert_eq!(logs.config["tags"][0]["env"], "dev");
    assert!(logs.config.get("depends_on").is_none());

    assert_eq!(
        parsed.name_index.resolve("aws_s3_bucket.logs"),
        &[NodeId::from("resource:envs/dev:aws_s3_bucket.logs")]
    );
}

#[test]
fn test_local_source_recorded_once() {
    let temp_dir = create_sample_tree();
    let parsed = parse(temp_dir.path());
    let root = fs::canonicalize(temp_dir.path()).unwrap();

    let network: Vec<_> = parsed
        .source_modules()
        .filter(|m| m.name == "network")
        .collect();
    assert_eq!(network.len(), 1);
    assert_eq!(network[0].kind, ModuleKind::SourceModule);
    assert_eq!(network[0].file_name.as_deref(), Some("[source module]"));
    assert_eq!(network[0].file_path.as_deref(), Some(root.join("modules/network").as_path()));

    // Two call sites plus the source module share the name.
    assert_eq!(parsed.name_index.resolve("network").len(), 3);
}

#[test]
fn test_external_sources_are_not_followed() {
    let temp_dir = create_sample_tree();
    let parsed = parse(temp_dir.path());
    let names: Vec<_> = parsed.source_modules().map(|m| m.name.as_str()).collect();
    assert!(!names.contains(&"zones"));
    assert!(!names.contains(&"aws"));
}

#[test]
fn test_source_outside_root() {
    let temp_dir = create_tree(&[
        (
            "live/main.tf",
            "module \"shared\" {\n  source = \"../shared\"\n}\n",
        ),
        ("shared/main.tf", "# shared\n"),
    ]);
    let parsed = parse(&temp_dir.path().join("live"));
    let shared_dir = fs::canonicalize(temp_dir.path().join("shared")).unwrap();

    let source_modules: Vec<_> = parsed.source_modules().collect();
    assert_eq!(source_modules.len(), 1);
    assert_eq!(source_modules[0].dir, shared_dir.display().to_string());
    assert!(parsed.modules.contains_key(&NodeId::from("module:.:shared")));
}

#[test]
fn test_missing_and_self_sources_are_skipped() {
    let temp_dir = create_tree(&[(
        "main.tf",
        r#"
module "ghost" {
  source = "./does-not-exist"
}

module "itself" {
  source = "."
}
"#,
    )]);
    let parsed = parse(temp_dir.path());
    assert_eq!(parsed.modules.len(), 2);
    assert_eq!(parsed.source_modules().count(), 0);
}

#[test]
fn test_skip_dirs() {
    let temp_dir = create_tree(&[
        ("main.tf", "module \"a\" {\n  source = \"x\"\n}\n"),
        (".terraform/modules/a/main.tf", "module \"cached\" {\n  source = \"y\"\n}\n"),
        ("vendor/main.tf", "module \"vendored\" {\n  source = \"z\"\n}\n"),
    ]);

    let parsed = parse(temp_dir.path());
    let names: Vec<_> = parsed.modules.values().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a", "vendored"]);

    let options = ParseOptions {
        skip_dirs: vec![".terraform".to_string(), "vendor".to_string()],
    };
    let parsed = parse_directory(temp_dir.path(), &options).unwrap();
    assert_eq!(parsed.modules.len(), 1);
}

#[test]
fn test_invalid_file_is_skipped() {
    let temp_dir = create_tree(&[
        ("broken.tf", "module \"x\" {\n  source = \n"),
        ("good.tf", "module \"y\" {\n  source = \"./y\"\n}\n"),
        ("notes.txt", "module \"z\" {}\n"),
    ]);
    let parsed = parse(temp_dir.path());
    assert_eq!(parsed.modules.len(), 1);
    assert!(parsed.modules.contains_key(&NodeId::from("module:.:y")));

    let root = fs::canonicalize(temp_dir.path()).unwrap();
    let err = parse_file(&root, &root.join("broken.tf")).unwrap_err();
    assert!(matches!(err, ParseError::Hcl { .. }));
}

#[test]
fn test_root_errors() {
    let temp_dir = create_tree(&[("main.tf", "")]);

    let missing = parse_directory(&temp_dir.path().join("nope"), &ParseOptions::default());
    assert!(matches!(missing, Err(ParseError::RootNotFound { .. })));

    let file = parse_directory(&temp_dir.path().join("main.tf"), &ParseOptions::default());
    assert!(matches!(file, Err(ParseError::NotADirectory(_))));
}

#[test]
fn test_discovery_is_sorted() {
    let temp_dir = create_tree(&[
        ("b/main.tf", ""),
        ("a/z.tf", ""),
        ("a/b.tf", ""),
        ("a/readme.md", ""),
    ]);
    let files = discover_tf_files(temp_dir.path(), &[]);
    let rel: Vec<_> = files
        .iter()
        .map(|f| relative_dir(temp_dir.path(), f))
        .collect();
    assert_eq!(rel, vec!["a/b.tf", "a/z.tf", "b/main.tf"]);
}

#[test]
fn test_relative_dir() {
    let root = Path::new("/repo");
    assert_eq!(relative_dir(root, Path::new("/repo")), ".");
    assert_eq!(relative_dir(root, Path::new("/repo/envs/prod")), "envs/prod");
    assert_eq!(relative_dir(root, Path::new("/elsewhere/mod")), "/elsewhere/mod");
}
