//! Node colors, shapes and tooltips

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tfla_core::{GraphNode, ModuleType, NodeData, NodeKind};

// ── Palette ─────────────────────────────────────────────

const FOLDER: &str = "#ffc107";
const FILE: &str = "#9e9e9e";
const RESOURCE: &str = "#00bcd4";
const SOURCE_MODULE: &str = "#2196f3";
const SOURCE_MODULE_STATUS: &str = "#e91e63";
const REGISTRY_MODULE: &str = "#795548";
const REGISTRY_ENTITY: &str = "#4caf50";
const GIT_MODULE: &str = "#3f51b5";
const GIT_ENTITY: &str = "#2196f3";
const LOCAL_MODULE: &str = "#ff9800";
const LOCAL_MODULE_STATUS: &str = "#03a9f4";
const UNKNOWN_ENVIRONMENT: &str = "#607d8b";

const LINK_STYLE: &str = "color: #0066cc; text-decoration: underline; font-weight: bold;";

/// Environment keywords matched against directory paths, in priority order.
const ENVIRONMENTS: &[(&str, &str)] = &[
    ("dev", "#4caf50"),
    ("test", "#2196f3"),
    ("stage", "#9c27b0"),
    ("staging", "#9c27b0"),
    ("prod", "#f44336"),
];

/// Node coloring strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBy {
    #[default]
    Type,
    Environment,
    Status,
}

/// Graph layout used by the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Hierarchical,
    Flat,
}

impl FromStr for ColorBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "type" => Ok(ColorBy::Type),
            "environment" | "env" => Ok(ColorBy::Environment),
            "status" => Ok(ColorBy::Status),
            other => Err(format!("unknown color strategy: {other}")),
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hierarchical" => Ok(Layout::Hierarchical),
            "flat" => Ok(Layout::Flat),
            other => Err(format!("unknown layout: {other}")),
        }
    }
}

impl fmt::Display for ColorBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorBy::Type => "type",
            ColorBy::Environment => "environment",
            ColorBy::Status => "status",
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Hierarchical => "hierarchical",
            Layout::Flat => "flat",
        })
    }
}

/// Visual class of a node; the first matching row wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Folder,
    File,
    Resource,
    SourceModule,
    RegistryModule,
    RegistryEntity,
    GitModule,
    GitEntity,
    LocalModule,
}

fn class_of(node: &GraphNode) -> Class {
    match (node.kind(), node.module_type()) {
        (NodeKind::Folder, _) => Class::Folder,
        (NodeKind::File, _) => Class::File,
        (NodeKind::Resource, _) => Class::Resource,
        (NodeKind::RegistryEntity, _) => Class::RegistryEntity,
        (NodeKind::GitEntity, _) => Class::GitEntity,
        (NodeKind::Module, Some(ModuleType::Source)) => Class::SourceModule,
        (NodeKind::Module, Some(ModuleType::Registry)) => Class::RegistryModule,
        (NodeKind::Module, Some(ModuleType::Git)) => Class::GitModule,
        (NodeKind::Module, _) => Class::LocalModule,
    }
}

/// Background color of `node` under `color_by`.
pub fn color_for(node: &GraphNode, color_by: ColorBy) -> String {
    let class = class_of(node);
    let fixed = match class {
        Class::Folder => Some(FOLDER),
        Class::File => Some(FILE),
        Class::Resource => Some(RESOURCE),
        Class::RegistryModule => Some(REGISTRY_MODULE),
        Class::RegistryEntity => Some(REGISTRY_ENTITY),
        Class::GitModule => Some(GIT_MODULE),
        Class::GitEntity => Some(GIT_ENTITY),
        Class::SourceModule | Class::LocalModule => None,
    };
    if let Some(color) = fixed {
        return color.to_string();
    }

    let source = class == Class::SourceModule;
    match color_by {
        ColorBy::Type if source => SOURCE_MODULE.to_string(),
        ColorBy::Type => LOCAL_MODULE.to_string(),
        ColorBy::Status if source => SOURCE_MODULE_STATUS.to_string(),
        ColorBy::Status => LOCAL_MODULE_STATUS.to_string(),
        ColorBy::Environment => {
            let base = node
                .directory()
                .and_then(|dir| infer_environment(&dir))
                .map_or(UNKNOWN_ENVIRONMENT, |(_, color)| color);
            if source {
                darken(base)
            } else {
                base.to_string()
            }
        }
    }
}

/// Environment keyword and its color for a directory path, matched on a
/// `/<keyword>` segment start or a `<keyword>` suffix.
pub fn infer_environment(dir: &str) -> Option<(&'static str, &'static str)> {
    let dir = dir.to_ascii_lowercase();
    ENVIRONMENTS
        .iter()
        .find(|(key, _)| dir.contains(&format!("/{key}")) || dir.ends_with(key))
        .copied()
}

/// Scale each RGB channel of `#rrggbb` to 70%. Other strings are returned
/// unchanged.
pub fn darken(hex: &str) -> String {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return hex.to_string();
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => {
            let scale = |c: u8| (f64::from(c) * 0.7) as u8;
            format!("#{:02x}{:02x}{:02x}", scale(r), scale(g), scale(b))
        }
        _ => hex.to_string(),
    }
}

pub fn shape_for(node: &GraphNode) -> &'static str {
    match node.kind() {
        NodeKind::Folder => "ellipse",
        NodeKind::File => "diamond",
        NodeKind::Module => "box",
        NodeKind::Resource => "triangle",
        NodeKind::RegistryEntity | NodeKind::GitEntity => "ellipse",
    }
}

/// White on the dark git and registry backgrounds, black elsewhere.
pub fn font_color_for(node: &GraphNode) -> &'static str {
    match class_of(node) {
        Class::GitModule | Class::GitEntity | Class::RegistryModule => "white",
        _ => "black",
    }
}

/// `vscode://file/<path>` with forward slashes.
pub fn vscode_url(path: &str) -> String {
    format!("vscode://file/{}", path.replace('\\', "/"))
}

/// HTML tooltip with a link to the node's file, folder or upstream page.
pub fn tooltip(node: &GraphNode) -> String {
    match &node.data {
        NodeData::Folder { folder_path, .. } => {
            let path = folder_path.display().to_string();
            link(&vscode_url(&path), &path, false)
        }
        NodeData::File { file_path, .. } => {
            let path = file_path.display().to_string();
            link(&vscode_url(&path), &path, false)
        }
        NodeData::GitEntity { git_url, .. } if !git_url.is_empty() => link(git_url, git_url, true),
        NodeData::RegistryEntity {
            registry_source,
            registry_url,
            ..
        } => link(registry_url, registry_source, true),
        NodeData::Module {
            file_path,
            directory,
            ..
        }
        | NodeData::Resource {
            file_path,
            directory,
            ..
        } => {
            if !file_path.is_empty() {
                link(&vscode_url(file_path), file_path, false)
            } else if !directory.is_empty() && directory != "." {
                link(&vscode_url(directory), directory, false)
            } else {
                escape_html(&node.name)
            }
        }
        NodeData::GitEntity { .. } => escape_html(&node.name),
    }
}

fn link(href: &str, text: &str, new_tab: bool) -> String {
    let target = if new_tab { r#" target="_blank""# } else { "" };
    format!(
        r#"<a href="{}"{} style="{}">{}</a>"#,
        escape_html(href),
        target,
        LINK_STYLE,
        escape_html(text)
    )
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
