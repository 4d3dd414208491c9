//! Test utilities: hand-built nodes and documents

use std::path::{Path, PathBuf};

use tfla_core::model::layer;
use tfla_core::{
    BuildOptions, GraphDocument, GraphNode, ModuleInfo, ModuleType, NodeData, NodeId, ParsedTerraform,
    build_graph, find_cycles,
};

pub fn module_node(name: &str, module_type: ModuleType, directory: &str, file_path: &str) -> GraphNode {
    GraphNode {
        id: NodeId::module(directory, name),
        name: name.to_string(),
        label: format!("{}\n{}", name, module_type.tag()),
        layer: layer::ENTITY,
        data: NodeData::Module {
            module_type,
            directory: directory.to_string(),
            source: String::new(),
            file_path: file_path.to_string(),
            file_name: Path::new(file_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        },
    }
}

pub fn folder_node(path: &str) -> GraphNode {
    let path = PathBuf::from(path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    GraphNode {
        id: NodeId::folder(&path),
        label: format!("{name}\n[folder]"),
        name,
        layer: layer::FOLDER,
        data: NodeData::Folder {
            display_path: path.display().to_string(),
            parent_path: path.parent().map(Path::to_path_buf),
            folder_path: path,
        },
    }
}

pub fn registry_node(source: &str, url: &str) -> GraphNode {
    GraphNode {
        id: NodeId::registry(source),
        name: "vpc".to_string(),
        label: "vpc\nmain module\n[public registry]".to_string(),
        layer: layer::EXTERNAL,
        data: NodeData::RegistryEntity {
            source: source.to_string(),
            submodule: "main module".to_string(),
            registry_source: format!("registry.terraform.io/{source}"),
            registry_url: url.to_string(),
        },
    }
}

pub fn git_node(source: &str, url: &str) -> GraphNode {
    GraphNode {
        id: NodeId::git(source),
        name: "acme/dns".to_string(),
        label: "acme/dns\nroot\n[git repository]".to_string(),
        layer: layer::EXTERNAL,
        data: NodeData::GitEntity {
            source: source.to_string(),
            path: "root".to_string(),
            reference: "main".to_string(),
            git_url: url.to_string(),
        },
    }
}

/// Two modules referencing each other across files, plus a registry call.
pub fn sample_document() -> GraphDocument {
    let mut parsed = ParsedTerraform::new("/repo");
    let mut a = ModuleInfo::call("envs/prod", "a", None, Path::new("/repo/envs/prod/a.tf"));
    a.inputs = serde_json::json!({ "x": "${module.b.x}" });
    let mut b = ModuleInfo::call("envs/prod", "b", None, Path::new("/repo/envs/prod/b.tf"));
    b.inputs = serde_json::json!({ "y": "${module.a.y}" });
    let vpc = ModuleInfo::call(
        "envs/prod",
        "vpc",
        Some("terraform-aws-modules/vpc/aws".to_string()),
        Path::new("/repo/envs/prod/a.tf"),
    );
    parsed.add_module(a);
    parsed.add_module(b);
    parsed.add_module(vpc);

    let graph = build_graph(&parsed, BuildOptions::default());
    let cycles = find_cycles(&graph);
    GraphDocument::from_graph(&graph, cycles)
}
