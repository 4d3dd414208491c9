//! Folder/file containment tree derived from entity file paths

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::entity::ParsedTerraform;
use crate::model::{GraphNode, NodeData, NodeId, layer};

/// One distinct directory on the way from a file up to the root.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderInfo {
    pub id: NodeId,
    pub path: PathBuf,
    pub name: String,
    /// Root-relative when possible, else absolute.
    pub display_path: String,
    pub parent: Option<PathBuf>,
    /// Files whose immediate parent is this folder.
    pub files: BTreeSet<NodeId>,
}

/// One configuration file and the entities it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub id: NodeId,
    pub path: PathBuf,
    pub name: String,
    pub folder: PathBuf,
    /// Declared modules/resources, in registration order.
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hierarchy {
    root: PathBuf,
    folders: BTreeMap<PathBuf, FolderInfo>,
    files: BTreeMap<NodeId, FileInfo>,
}

impl Hierarchy {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Hierarchy {
            root: root.into(),
            folders: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Build the tree for every module call (and resource, when included)
    /// that has a file path. Source modules are not files and are skipped.
    pub fn build(parsed: &ParsedTerraform, include_resources: bool) -> Self {
        let mut hierarchy = Hierarchy::new(parsed.root_dir.clone());
        for module in parsed.modules.values().filter(|m| !m.is_source_module()) {
            if let (Some(path), Some(name)) = (&module.file_path, &module.file_name) {
                hierarchy.register(&parsed.absolute(path), name, module.id.clone());
            }
        }
        if include_resources {
            for resource in parsed.resources.values() {
                if let (Some(path), Some(name)) = (&resource.file_path, &resource.file_name) {
                    hierarchy.register(&parsed.absolute(path), name, resource.id.clone());
                }
            }
        }
        tracing::debug!(
            "Hierarchy: {} folders, {} files",
            hierarchy.folders.len(),
            hierarchy.files.len()
        );
        hierarchy
    }

    /// Record `member` as declared in `file_path`, creating the file and
    /// every folder up to the root on first sight.
    pub fn register(&mut self, file_path: &Path, file_name: &str, member: NodeId) {
        let file_id = NodeId::file(file_path);
        if let Some(file) = self.files.get_mut(&file_id) {
            if !file.members.contains(&member) {
                file.members.push(member);
            }
            return;
        }

        let folder = file_path.parent().map(Path::to_path_buf).unwrap_or_default();
        self.files.insert(
            file_id.clone(),
            FileInfo {
                id: file_id.clone(),
                path: file_path.to_path_buf(),
                name: file_name.to_string(),
                folder: folder.clone(),
                members: vec![member],
            },
        );

        let stop = self.root.parent().map(Path::to_path_buf);
        let mut current = Some(folder.as_path());
        while let Some(dir) = current {
            if stop.as_deref() == Some(dir) || dir.as_os_str().is_empty() {
                break;
            }
            if !self.folders.contains_key(dir) {
                let info = self.folder_info(dir);
                self.folders.insert(dir.to_path_buf(), info);
            }
            current = dir.parent();
        }

        // Only the immediate parent lists the file.
        if let Some(parent) = self.folders.get_mut(&folder) {
            parent.files.insert(file_id);
        }
    }

    fn folder_info(&self, dir: &Path) -> FolderInfo {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let display_path = match dir.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => name.clone(),
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => dir.display().to_string(),
        };
        FolderInfo {
            id: NodeId::folder(dir),
            path: dir.to_path_buf(),
            name,
            display_path,
            parent: dir.parent().map(Path::to_path_buf),
            files: BTreeSet::new(),
        }
    }

    pub fn folders(&self) -> impl Iterator<Item = &FolderInfo> {
        self.folders.values()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileInfo> {
        self.files.values()
    }

    pub fn folder(&self, path: &Path) -> Option<&FolderInfo> {
        self.folders.get(path)
    }

    pub fn file(&self, id: &NodeId) -> Option<&FileInfo> {
        self.files.get(id)
    }

    /// Parent → child pairs for folders whose parent is also a folder.
    pub fn folder_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.folders
            .values()
            .filter_map(|folder| {
                let parent = self.folders.get(folder.parent.as_ref()?)?;
                Some((parent.id.clone(), folder.id.clone()))
            })
            .collect()
    }

    /// Folder → file pairs, immediate parent only.
    pub fn file_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.folders
            .values()
            .flat_map(|folder| {
                folder
                    .files
                    .iter()
                    .map(move |file| (folder.id.clone(), file.clone()))
            })
            .collect()
    }

    pub fn folder_nodes(&self) -> Vec<GraphNode> {
        self.folders
            .values()
            .map(|folder| GraphNode {
                id: folder.id.clone(),
                name: folder.name.clone(),
                label: format!("{}\n[folder]", folder.name),
                layer: layer::FOLDER,
                data: NodeData::Folder {
                    folder_path: folder.path.clone(),
                    display_path: folder.display_path.clone(),
                    parent_path: folder.parent.clone(),
                },
            })
            .collect()
    }

    pub fn file_nodes(&self) -> Vec<GraphNode> {
        self.files
            .values()
            .map(|file| {
                let folder_name = file
                    .folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                GraphNode {
                    id: file.id.clone(),
                    name: file.name.clone(),
                    label: format!("{}\n[terraform file]", file.name),
                    layer: layer::FILE,
                    data: NodeData::File {
                        file_path: file.path.clone(),
                        file_name: file.name.clone(),
                        folder_path: file.folder.clone(),
                        folder_name,
                    },
                }
            })
            .collect()
    }
}
