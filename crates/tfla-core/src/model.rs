//! Core data structures for the lineage graph

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Presentation layers, left to right. Carries no algorithmic meaning.
pub mod layer {
    pub const FOLDER: u8 = 0;
    pub const FILE: u8 = 1;
    pub const ENTITY: u8 = 2;
    pub const EXTERNAL: u8 = 3;
}

/// Unique, stable identifier for a node.
///
/// Derived from the node kind and its defining path/name, so discovering the
/// same logical entity twice always yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn module(dir: &str, name: &str) -> Self {
        NodeId(format!("module:{dir}:{name}"))
    }

    pub fn source_module(dir: &str, name: &str) -> Self {
        NodeId(format!("source_module:{dir}:{name}"))
    }

    pub fn resource(dir: &str, resource_type: &str, name: &str) -> Self {
        NodeId(format!("resource:{dir}:{resource_type}.{name}"))
    }

    pub fn folder(path: &Path) -> Self {
        NodeId(format!("folder:{}", path.display()))
    }

    pub fn file(path: &Path) -> Self {
        NodeId(format!("file:{}", path.display()))
    }

    /// Registry entities are keyed by the raw source string.
    pub fn registry(source: &str) -> Self {
        NodeId(format!("registry:{source}"))
    }

    /// Git entities are keyed by the raw source string.
    pub fn git(source: &str) -> Self {
        NodeId(format!("git:{source}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Discriminates what kind of entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // ── Structural ──────────────────────────────────────────
    Folder,
    File,

    // ── Configuration units ─────────────────────────────────
    Module,
    Resource,

    // ── External references ─────────────────────────────────
    RegistryEntity,
    GitEntity,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
            NodeKind::Module => "module",
            NodeKind::Resource => "resource",
            NodeKind::RegistryEntity => "registry_entity",
            NodeKind::GitEntity => "git_entity",
        }
    }
}

/// Subtype of a module node, fully determined by source classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    #[serde(rename = "local_module")]
    Local,
    #[serde(rename = "registry_module")]
    Registry,
    #[serde(rename = "git_module")]
    Git,
    #[serde(rename = "source_module")]
    Source,
}

impl ModuleType {
    /// Bracketed tag shown under the module name.
    pub fn tag(&self) -> &'static str {
        match self {
            ModuleType::Local => "[module]",
            ModuleType::Registry => "[registry]",
            ModuleType::Git => "[git module]",
            ModuleType::Source => "[source module]",
        }
    }
}

/// Kind-specific descriptive fields of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    Folder {
        folder_path: PathBuf,
        display_path: String,
        parent_path: Option<PathBuf>,
    },
    File {
        file_path: PathBuf,
        file_name: String,
        folder_path: PathBuf,
        folder_name: String,
    },
    Module {
        module_type: ModuleType,
        directory: String,
        source: String,
        file_path: String,
        file_name: String,
    },
    Resource {
        resource_type: String,
        directory: String,
        file_path: String,
        file_name: String,
    },
    RegistryEntity {
        source: String,
        submodule: String,
        registry_source: String,
        registry_url: String,
    },
    GitEntity {
        source: String,
        path: String,
        reference: String,
        git_url: String,
    },
}

/// A single node in the lineage graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub name: String,
    /// Multi-line display label.
    pub label: String,
    pub layer: u8,
    #[serde(flatten)]
    pub data: NodeData,
}

impl GraphNode {
    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Folder { .. } => NodeKind::Folder,
            NodeData::File { .. } => NodeKind::File,
            NodeData::Module { .. } => NodeKind::Module,
            NodeData::Resource { .. } => NodeKind::Resource,
            NodeData::RegistryEntity { .. } => NodeKind::RegistryEntity,
            NodeData::GitEntity { .. } => NodeKind::GitEntity,
        }
    }

    pub fn module_type(&self) -> Option<ModuleType> {
        match self.data {
            NodeData::Module { module_type, .. } => Some(module_type),
            _ => None,
        }
    }

    /// Configuration directory for modules/resources, folder path for folders.
    pub fn directory(&self) -> Option<String> {
        match &self.data {
            NodeData::Module { directory, .. } | NodeData::Resource { directory, .. } => {
                Some(directory.clone())
            }
            NodeData::Folder { display_path, .. } => Some(display_path.clone()),
            _ => None,
        }
    }
}

/// What kind of relationship this edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Filesystem or source-module containment.
    Contains,
    /// Explicit `depends_on`.
    DependsOn,
    /// Inferred from `module.<name>` occurrences in inputs.
    DataDependency,
    /// Source module to each module instantiating it.
    Provides,
    /// Module to the registry/git entity it is sourced from.
    ExternalSource,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::DependsOn => "depends_on",
            EdgeKind::DataDependency => "data_dependency",
            EdgeKind::Provides => "provides",
            EdgeKind::ExternalSource => "external_source",
        }
    }
}

/// Presentation hint for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

/// A directed edge in the lineage graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

impl GraphEdge {
    fn plain(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        GraphEdge {
            source,
            target,
            kind,
            label: None,
            style: None,
        }
    }

    pub fn contains(source: NodeId, target: NodeId) -> Self {
        GraphEdge {
            style: Some(EdgeStyle::Dashed),
            ..Self::plain(source, target, EdgeKind::Contains)
        }
    }

    pub fn depends_on(source: NodeId, target: NodeId) -> Self {
        Self::plain(source, target, EdgeKind::DependsOn)
    }

    pub fn data_dependency(source: NodeId, target: NodeId, name: &str) -> Self {
        GraphEdge {
            label: Some(format!("uses {name}")),
            ..Self::plain(source, target, EdgeKind::DataDependency)
        }
    }

    pub fn provides(source: NodeId, target: NodeId) -> Self {
        Self::plain(source, target, EdgeKind::Provides)
    }

    pub fn external_source(source: NodeId, target: NodeId) -> Self {
        Self::plain(source, target, EdgeKind::ExternalSource)
    }
}
