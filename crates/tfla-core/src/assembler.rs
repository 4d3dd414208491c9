//! Graph assembly: node creation followed by independent edge passes
//!
//! Every pass reads the entity model and the finished node set and returns
//! its own edge list. The lists are merged in pass order; a later edge for an
//! ordered node pair replaces the earlier one, so a data dependency overrides
//! a plain `depends_on` between the same modules. Edges touching unknown
//! nodes are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use crate::entity::{ModuleInfo, ParsedTerraform};
use crate::graph::Graph;
use crate::hierarchy::Hierarchy;
use crate::model::*;
use crate::refs::{find_module_refs, module_reference_name, normalize_reference, resource_reference_name};
use crate::source::{SourceClass, classify_opt};

/// Caller-selected assembly options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Add resource nodes and their containment/dependency edges.
    pub include_resources: bool,
}

static UNCLASSIFIED: SourceClass = SourceClass::Unclassified;

/// Read-only inputs shared by every edge pass.
struct Context<'a> {
    parsed: &'a ParsedTerraform,
    hierarchy: &'a Hierarchy,
    classes: BTreeMap<&'a NodeId, SourceClass>,
    options: BuildOptions,
}

impl Context<'_> {
    fn class(&self, id: &NodeId) -> &SourceClass {
        self.classes.get(id).unwrap_or(&UNCLASSIFIED)
    }

    /// Modules allowed to originate dependency edges.
    fn dependency_origins(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.parsed
            .modules
            .values()
            .filter(|m| !self.class(&m.id).is_external())
    }
}

/// Build the lineage graph for one parsed model. Never fails: unresolvable
/// references simply produce no edge.
pub fn build_graph(parsed: &ParsedTerraform, options: BuildOptions) -> Graph {
    let hierarchy = Hierarchy::build(parsed, options.include_resources);
    let classes = parsed
        .modules
        .iter()
        .map(|(id, m)| (id, classify_opt(m.source.as_deref())))
        .collect();
    let cx = Context {
        parsed,
        hierarchy: &hierarchy,
        classes,
        options,
    };

    let mut graph = Graph::new();
    for node in create_nodes(&cx) {
        graph.add_node(node);
    }

    let passes: [(&str, Vec<GraphEdge>); 6] = [
        ("containment", containment_edges(&cx)),
        ("explicit", explicit_dependency_edges(&cx)),
        ("implicit", implicit_dependency_edges(&cx)),
        ("resource", resource_dependency_edges(&cx)),
        ("external", external_source_edges(&cx)),
        ("provision", provision_edges(&cx)),
    ];

    for (name, edges) in passes {
        let total = edges.len();
        let kept = edges.into_iter().filter_map(|e| graph.set_edge(e).then_some(())).count();
        tracing::debug!("Pass {}: {} edges derived, {} kept", name, total, kept);
    }

    tracing::info!(
        "Built graph with {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}

// ── Nodes ───────────────────────────────────────────────

fn create_nodes(cx: &Context<'_>) -> Vec<GraphNode> {
    let mut nodes = cx.hierarchy.folder_nodes();
    nodes.extend(cx.hierarchy.file_nodes());
    nodes.extend(cx.parsed.modules.values().map(|m| module_node(m, cx.class(&m.id))));
    if cx.options.include_resources {
        nodes.extend(cx.parsed.resources.values().map(|r| GraphNode {
            id: r.id.clone(),
            name: r.name.clone(),
            label: format!("{}\n[resource]", r.address()),
            layer: layer::ENTITY,
            data: NodeData::Resource {
                resource_type: r.resource_type.clone(),
                directory: r.dir.clone(),
                file_path: display_opt(r.file_path.as_deref()),
                file_name: r.file_name.clone().unwrap_or_default(),
            },
        }));
    }
    nodes.extend(external_nodes(cx).into_values());
    nodes
}

fn module_node(module: &ModuleInfo, class: &SourceClass) -> GraphNode {
    let module_type = if module.is_source_module() {
        ModuleType::Source
    } else {
        class.module_type()
    };
    GraphNode {
        id: module.id.clone(),
        name: module.name.clone(),
        label: format!("{}\n{}", module.name, module_type.tag()),
        layer: layer::ENTITY,
        data: NodeData::Module {
            module_type,
            directory: module.dir.clone(),
            source: module.source.clone().unwrap_or_default(),
            file_path: display_opt(module.file_path.as_deref()),
            file_name: module.file_name.clone().unwrap_or_default(),
        },
    }
}

/// Registry and git entities, one per distinct raw source string.
fn external_nodes(cx: &Context<'_>) -> BTreeMap<NodeId, GraphNode> {
    let mut cache = BTreeMap::new();
    for module in cx.parsed.modules.values() {
        let Some(source) = module.source.as_deref() else {
            continue;
        };
        match cx.class(&module.id) {
            SourceClass::Registry(registry) => {
                let id = NodeId::registry(source);
                cache.entry(id.clone()).or_insert_with(|| GraphNode {
                    id,
                    name: registry.name.clone(),
                    label: format!("{}\n{}\n[public registry]", registry.name, registry.submodule),
                    layer: layer::EXTERNAL,
                    data: NodeData::RegistryEntity {
                        source: source.to_string(),
                        submodule: registry.submodule.clone(),
                        registry_source: registry.registry_source(source),
                        registry_url: registry.browse_url(),
                    },
                });
            }
            SourceClass::Git(git) => {
                let id = NodeId::git(source);
                cache.entry(id.clone()).or_insert_with(|| GraphNode {
                    id,
                    name: git.repository.clone(),
                    label: format!("{}\n{}\n[git repository]", git.repository, git.path_label()),
                    layer: layer::EXTERNAL,
                    data: NodeData::GitEntity {
                        source: source.to_string(),
                        path: git.path_label(),
                        reference: git.reference.clone(),
                        git_url: git.url.clone(),
                    },
                });
            }
            SourceClass::Local | SourceClass::Unclassified => {}
        }
    }
    cache
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

// ── Pass 1: containment ─────────────────────────────────

fn containment_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    let hierarchy = cx.hierarchy;
    let mut edges: Vec<GraphEdge> = hierarchy
        .folder_edges()
        .into_iter()
        .chain(hierarchy.file_edges())
        .map(|(parent, child)| GraphEdge::contains(parent, child))
        .collect();

    for file in hierarchy.files() {
        edges.extend(
            file.members
                .iter()
                .map(|member| GraphEdge::contains(file.id.clone(), member.clone())),
        );
    }

    for source_module in cx.parsed.source_modules() {
        let dir = source_module
            .file_path
            .as_deref()
            .map(|p| cx.parsed.absolute(p))
            .unwrap_or_else(|| cx.parsed.dir_path(&source_module.dir));
        edges.extend(
            hierarchy
                .files()
                .filter(|file| file.path.starts_with(&dir))
                .map(|file| GraphEdge::contains(source_module.id.clone(), file.id.clone())),
        );
    }
    edges
}

// ── Pass 2: explicit depends_on ─────────────────────────

fn explicit_dependency_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for module in cx.dependency_origins() {
        for target in resolve_module_refs(cx.parsed, &module.explicit_deps) {
            edges.push(GraphEdge::depends_on(module.id.clone(), target.clone()));
        }
    }
    edges
}

fn resolve_module_refs<'a>(parsed: &'a ParsedTerraform, deps: &[String]) -> Vec<&'a NodeId> {
    deps.iter()
        .filter_map(|dep| {
            let dep = normalize_reference(dep);
            module_reference_name(&dep).map(str::to_string)
        })
        .flat_map(|name| parsed.name_index.resolve(&name))
        .collect()
}

// ── Pass 3: implicit data dependencies ──────────────────

fn implicit_dependency_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for module in cx.dependency_origins() {
        let mut names: BTreeSet<String> = find_module_refs(&module.inputs);
        names.extend(module.implicit_module_refs.iter().cloned());

        for name in &names {
            for target in cx.parsed.name_index.resolve(name) {
                let same_file = cx
                    .parsed
                    .modules
                    .get(target)
                    .is_some_and(|t| t.file_path == module.file_path);
                if same_file {
                    continue;
                }
                edges.push(GraphEdge::data_dependency(
                    module.id.clone(),
                    target.clone(),
                    name,
                ));
            }
        }
    }
    edges
}

// ── Pass 4: resource dependencies ───────────────────────

fn resource_dependency_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    if !cx.options.include_resources {
        return Vec::new();
    }
    let mut edges = Vec::new();
    for resource in cx.parsed.resources.values() {
        for dep in &resource.explicit_deps {
            let dep = normalize_reference(dep);
            let name = match module_reference_name(&dep) {
                Some(name) => Some(name.to_string()),
                None => resource_reference_name(&dep),
            };
            let Some(name) = name else { continue };
            for target in cx.parsed.name_index.resolve(&name) {
                edges.push(GraphEdge::depends_on(resource.id.clone(), target.clone()));
            }
        }
    }
    edges
}

// ── Pass 5: external source linkage ─────────────────────

fn external_source_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    cx.parsed
        .modules
        .values()
        .filter_map(|module| {
            let source = module.source.as_deref()?;
            let target = match cx.class(&module.id) {
                SourceClass::Registry(_) => NodeId::registry(source),
                SourceClass::Git(_) => NodeId::git(source),
                SourceClass::Local | SourceClass::Unclassified => return None,
            };
            Some(GraphEdge::external_source(module.id.clone(), target))
        })
        .collect()
}

// ── Pass 6: source-module provision ─────────────────────

fn provision_edges(cx: &Context<'_>) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for module in cx.parsed.modules.values() {
        if !cx.class(&module.id).is_local() {
            continue;
        }
        let Some(dir_name) = local_source_dir_name(cx.parsed, module) else {
            continue;
        };
        for source_module in cx.parsed.source_modules() {
            if source_module.id != module.id && source_module.name == dir_name {
                edges.push(GraphEdge::provides(
                    source_module.id.clone(),
                    module.id.clone(),
                ));
            }
        }
    }
    edges
}

/// Final segment of a local source resolved against the module's directory.
/// `None` when the resolved directory neither exists nor is the directory of
/// a known source module.
fn local_source_dir_name(parsed: &ParsedTerraform, module: &ModuleInfo) -> Option<String> {
    let source = module.source.as_deref()?;
    let resolved = normalize_path(&parsed.dir_path(&module.dir).join(source));
    let known = parsed.source_modules().any(|sm| {
        sm.file_path
            .as_deref()
            .is_some_and(|p| normalize_path(&parsed.absolute(p)) == resolved)
    });
    if !known && !resolved.is_dir() {
        tracing::debug!("{}: local source {} does not resolve", module.id, source);
        return None;
    }
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}

/// Lexically resolve `.` and `..` components.
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
