//! Test utilities: synthetic entity models rooted at `/repo`

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::entity::{ModuleInfo, ParsedTerraform, ResourceInfo};

pub const ROOT: &str = "/repo";

pub fn root_path(rel: &str) -> PathBuf {
    Path::new(ROOT).join(rel)
}

/// Empty model rooted at [`ROOT`].
pub fn empty_model() -> ParsedTerraform {
    ParsedTerraform::new(ROOT)
}

/// A module call named `name` declared in root-relative `file`.
pub fn module(name: &str, source: Option<&str>, file: &str) -> ModuleInfo {
    let path = root_path(file);
    let dir = Path::new(file)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| ".".to_string());
    ModuleInfo::call(&dir, name, source.map(str::to_string), &path)
}

pub fn with_inputs(mut module: ModuleInfo, inputs: Value) -> ModuleInfo {
    module.implicit_module_refs = crate::refs::find_module_refs(&inputs).into_iter().collect();
    module.inputs = inputs;
    module
}

pub fn with_depends_on(mut module: ModuleInfo, deps: &[&str]) -> ModuleInfo {
    module.explicit_deps = deps.iter().map(|d| d.to_string()).collect();
    module
}

/// The synthetic source module for root-relative directory `dir`.
pub fn source_module(dir: &str) -> ModuleInfo {
    ModuleInfo::source_module(dir, &root_path(dir))
}

pub fn resource(resource_type: &str, name: &str, file: &str, deps: &[&str]) -> ResourceInfo {
    let path = root_path(file);
    let dir = Path::new(file)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let mut resource = ResourceInfo::new(&dir, resource_type, name, &path);
    resource.explicit_deps = deps.iter().map(|d| d.to_string()).collect();
    resource
}

/// Model built from the given modules and resources.
pub fn model_with(modules: Vec<ModuleInfo>, resources: Vec<ResourceInfo>) -> ParsedTerraform {
    let mut parsed = empty_model();
    for m in modules {
        parsed.add_module(m);
    }
    for r in resources {
        parsed.add_resource(r);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_dir_is_root_relative() {
        assert_eq!(module("a", None, "main.tf").dir, ".");
        assert_eq!(module("a", None, "envs/prod/main.tf").dir, "envs/prod");
        assert_eq!(
            module("a", None, "envs/prod/main.tf").file_name.as_deref(),
            Some("main.tf")
        );
    }
}
