//! Parsed configuration entities and the name index

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::NodeId;

/// Whether a module record is a call site or a synthetic source module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    Module,
    SourceModule,
}

/// File name recorded for synthetic source modules.
pub const SOURCE_MODULE_FILE_NAME: &str = "[source module]";

/// A `module` block, or a whole local module directory seen as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: NodeId,
    pub kind: ModuleKind,
    pub name: String,
    /// Directory relative to the root (`.` for the root itself).
    pub dir: String,
    pub source: Option<String>,
    /// Declaring file; the module directory itself for source modules.
    pub file_path: Option<PathBuf>,
    pub file_name: Option<String>,
    pub inputs: Value,
    pub explicit_deps: Vec<String>,
    pub implicit_module_refs: Vec<String>,
}

impl ModuleInfo {
    /// A `module "<name>"` call declared in `file_path`.
    pub fn call(dir: &str, name: &str, source: Option<String>, file_path: &Path) -> Self {
        ModuleInfo {
            id: NodeId::module(dir, name),
            kind: ModuleKind::Module,
            name: name.to_string(),
            dir: dir.to_string(),
            source,
            file_path: Some(file_path.to_path_buf()),
            file_name: file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            inputs: Value::Object(Default::default()),
            explicit_deps: Vec::new(),
            implicit_module_refs: Vec::new(),
        }
    }

    /// The synthetic module standing for the whole directory `path`.
    pub fn source_module(dir: &str, path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        ModuleInfo {
            id: NodeId::source_module(dir, &name),
            kind: ModuleKind::SourceModule,
            name,
            dir: dir.to_string(),
            source: None,
            file_path: Some(path.to_path_buf()),
            file_name: Some(SOURCE_MODULE_FILE_NAME.to_string()),
            inputs: Value::Object(Default::default()),
            explicit_deps: Vec::new(),
            implicit_module_refs: Vec::new(),
        }
    }

    pub fn is_source_module(&self) -> bool {
        self.kind == ModuleKind::SourceModule
    }
}

/// A `resource "<type>" "<name>"` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub id: NodeId,
    pub name: String,
    pub resource_type: String,
    pub dir: String,
    pub file_path: Option<PathBuf>,
    pub file_name: Option<String>,
    pub config: Value,
    pub explicit_deps: Vec<String>,
}

impl ResourceInfo {
    pub fn new(dir: &str, resource_type: &str, name: &str, file_path: &Path) -> Self {
        ResourceInfo {
            id: NodeId::resource(dir, resource_type, name),
            name: name.to_string(),
            resource_type: resource_type.to_string(),
            dir: dir.to_string(),
            file_path: Some(file_path.to_path_buf()),
            file_name: file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            config: Value::Object(Default::default()),
            explicit_deps: Vec::new(),
        }
    }

    /// The `type.name` key this resource is referenced by.
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

/// Multi-valued lookup from a bare reference name to every entity sharing it.
///
/// All entries under a name are valid resolution targets; no attempt is made
/// to pick the closest one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameIndex {
    entries: BTreeMap<String, Vec<NodeId>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` under `name`. Registering the same pair twice is a no-op.
    pub fn insert(&mut self, name: impl Into<String>, id: NodeId) {
        let ids = self.entries.entry(name.into()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    /// Every entity registered under `name`, in registration order.
    pub fn resolve(&self, name: &str) -> &[NodeId] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The entity model produced by the parser for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTerraform {
    pub root_dir: PathBuf,
    pub modules: BTreeMap<NodeId, ModuleInfo>,
    pub resources: BTreeMap<NodeId, ResourceInfo>,
    pub name_index: NameIndex,
}

impl ParsedTerraform {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        ParsedTerraform {
            root_dir: root_dir.into(),
            modules: BTreeMap::new(),
            resources: BTreeMap::new(),
            name_index: NameIndex::new(),
        }
    }

    /// Insert a module and index it by name. Re-adding an id replaces the
    /// record without duplicating its index entry.
    pub fn add_module(&mut self, module: ModuleInfo) {
        self.name_index.insert(module.name.clone(), module.id.clone());
        self.modules.insert(module.id.clone(), module);
    }

    /// Insert a resource and index it by `type.name`.
    pub fn add_resource(&mut self, resource: ResourceInfo) {
        self.name_index.insert(resource.address(), resource.id.clone());
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn source_modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.values().filter(|m| m.is_source_module())
    }

    /// Resolve a possibly root-relative path against the root directory.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_dir.join(path)
        }
    }

    /// Absolute directory of a root-relative `dir` string.
    pub fn dir_path(&self, dir: &str) -> PathBuf {
        if dir == "." || dir.is_empty() {
            self.root_dir.clone()
        } else {
            self.absolute(Path::new(dir))
        }
    }
}
