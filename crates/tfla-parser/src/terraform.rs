//! Terraform configuration loading
//!
//! The root directory is processed first: every `*.tf` file below it is
//! parsed for `module` and `resource` blocks. Module calls whose source is a
//! local path queue that directory, which is then recorded as a single
//! source module. Each physical directory is processed at most once.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Component, Path, PathBuf};

use hcl::{Block, Body, Expression};
use serde_json::{Map, Value};
use tfla_core::entity::{ModuleInfo, ParsedTerraform, ResourceInfo};
use tfla_core::refs::find_module_refs;
use tfla_core::source::classify;

use crate::error::ParseError;
use crate::walker::discover_tf_files;

/// Directory names pruned from discovery unless configured otherwise.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[".terraform"];

/// Attributes of a `module` block that are not inputs.
const MODULE_META_ATTRIBUTES: &[&str] = &["source", "depends_on"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Directory names skipped wherever they occur.
    pub skip_dirs: Vec<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Entities declared in a single file.
#[derive(Debug, Default)]
pub struct FileEntities {
    pub modules: Vec<ModuleInfo>,
    pub resources: Vec<ResourceInfo>,
}

enum Visit {
    Configuration,
    SourceModule,
}

/// Parse the configuration tree rooted at `root`.
///
/// Fails only when `root` is missing or not a directory. Files that cannot
/// be read or parsed are logged and skipped.
pub fn parse_directory(root: &Path, options: &ParseOptions) -> Result<ParsedTerraform, ParseError> {
    let root = fs::canonicalize(root).map_err(|source| ParseError::RootNotFound {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(ParseError::NotADirectory(root));
    }
    tracing::info!("Parsing Terraform configuration in {}", root.display());

    let mut parsed = ParsedTerraform::new(root.clone());
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue = VecDeque::from([(root.clone(), Visit::Configuration)]);
    let mut file_count = 0usize;

    while let Some((dir, visit)) = queue.pop_front() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        match visit {
            Visit::SourceModule => {
                let module = ModuleInfo::source_module(&relative_dir(&root, &dir), &dir);
                tracing::debug!("Source module {} at {}", module.name, dir.display());
                parsed.add_module(module);
            }
            Visit::Configuration => {
                for file in discover_tf_files(&dir, &options.skip_dirs) {
                    let entities = match parse_file(&root, &file) {
                        Ok(entities) => entities,
                        Err(e) => {
                            tracing::warn!("Skipping file: {}", e);
                            continue;
                        }
                    };
                    file_count += 1;

                    for module in entities.modules {
                        if let Some(local) = local_source_dir(&file, module.source.as_deref()) {
                            queue.push_back((local, Visit::SourceModule));
                        }
                        parsed.add_module(module);
                    }
                    for resource in entities.resources {
                        parsed.add_resource(resource);
                    }
                }
            }
        }
    }

    tracing::info!(
        "Parsed {} files: {} modules, {} resources",
        file_count,
        parsed.modules.len(),
        parsed.resources.len()
    );
    Ok(parsed)
}

/// Parse one `.tf` file. `root` anchors the relative directory recorded on
/// every entity.
pub fn parse_file(root: &Path, path: &Path) -> Result<FileEntities, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let body: Body = hcl::parse(&content).map_err(|source| ParseError::Hcl {
        path: path.to_path_buf(),
        source,
    })?;

    let dir = path
        .parent()
        .map(|parent| relative_dir(root, parent))
        .unwrap_or_else(|| ".".to_string());

    let mut entities = FileEntities::default();
    for block in body.blocks() {
        match block.identifier() {
            "module" => {
                if let Some(module) = module_from_block(&dir, path, block) {
                    entities.modules.push(module);
                }
            }
            "resource" => {
                if let Some(resource) = resource_from_block(&dir, path, block) {
                    entities.resources.push(resource);
                }
            }
            _ => {}
        }
    }
    Ok(entities)
}

fn module_from_block(dir: &str, path: &Path, block: &Block) -> Option<ModuleInfo> {
    let Some(name) = block.labels().first() else {
        tracing::debug!("Unlabeled module block in {}", path.display());
        return None;
    };
    let body = block.body();
    let source = attribute_json(body, "source").and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    });

    let mut module = ModuleInfo::call(dir, name.as_str(), source, path);
    module.explicit_deps = depends_on(body);
    module.inputs = Value::Object(body_to_json(body, MODULE_META_ATTRIBUTES));
    module.implicit_module_refs = find_module_refs(&module.inputs).into_iter().collect();
    tracing::debug!(
        "Module {} (source: {})",
        module.id,
        module.source.as_deref().unwrap_or("-")
    );
    Some(module)
}

fn resource_from_block(dir: &str, path: &Path, block: &Block) -> Option<ResourceInfo> {
    let [resource_type, name, ..] = block.labels() else {
        tracing::debug!("Resource block without type and name in {}", path.display());
        return None;
    };
    let body = block.body();
    let mut resource = ResourceInfo::new(dir, resource_type.as_str(), name.as_str(), path);
    resource.explicit_deps = depends_on(body);
    resource.config = Value::Object(body_to_json(body, &["depends_on"]));
    Some(resource)
}

/// Existing directory named by a local module source, resolved against the
/// declaring file's directory.
fn local_source_dir(file: &Path, source: Option<&str>) -> Option<PathBuf> {
    let source = source?;
    if !classify(source).is_local() {
        return None;
    }
    let candidate = file.parent()?.join(source);
    let resolved = fs::canonicalize(&candidate).ok()?;
    resolved.is_dir().then_some(resolved)
}

/// Root-relative directory with `/` separators, `.` for the root itself, the
/// absolute path when outside the root.
pub fn relative_dir(root: &Path, dir: &Path) -> String {
    match dir.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => dir.display().to_string(),
    }
}

// ── HCL to JSON ─────────────────────────────────────────

fn attribute_json(body: &Body, key: &str) -> Option<Value> {
    body.attributes()
        .find(|attr| attr.key() == key)
        .map(|attr| expression_json(attr.expr()))
}

/// `depends_on` as a list of raw reference strings.
fn depends_on(body: &Body) -> Vec<String> {
    let as_string = |value: Value| match value {
        Value::String(s) => s,
        other => other.to_string(),
    };
    match attribute_json(body, "depends_on") {
        Some(Value::Array(items)) => items.into_iter().map(as_string).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![as_string(other)],
    }
}

/// Literal expressions map to their JSON value. Anything else (traversals,
/// function calls, templates) becomes a string such as `${module.vpc.id}`.
fn expression_json(expr: &Expression) -> Value {
    let value = hcl::Value::from(expr.clone());
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Attributes keyed by name; nested blocks as arrays under their identifier,
/// with labels as nested object keys.
fn body_to_json(body: &Body, skip: &[&str]) -> Map<String, Value> {
    let mut map = Map::new();
    for attr in body.attributes() {
        if skip.contains(&attr.key()) {
            continue;
        }
        map.insert(attr.key().to_string(), expression_json(attr.expr()));
    }
    for block in body.blocks() {
        let mut value = Value::Object(body_to_json(block.body(), &[]));
        for label in block.labels().iter().rev() {
            let mut wrapper = Map::new();
            wrapper.insert(label.as_str().to_string(), value);
            value = Value::Object(wrapper);
        }
        let slot = map
            .entry(block.identifier().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = slot {
            items.push(value);
        }
    }
    map
}
