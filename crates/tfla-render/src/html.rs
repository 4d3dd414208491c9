//! Interactive HTML page built on vis-network

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tfla_core::{EdgeKind, EdgeStyle, GraphDocument, GraphEdge, GraphNode};

use crate::assets::{PAGE_TEMPLATE, text_asset};
use crate::style::{ColorBy, Layout, color_for, escape_html, font_color_for, shape_for, tooltip};

const FONT_FACE: &str = "Segoe UI";
const FONT_SIZE: u32 = 16;
const CONTAINMENT_COLOR: &str = "#666666";
const DATA_DEPENDENCY_COLOR: &str = "#ff6b6b";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("embedded asset {0} is missing")]
    MissingAsset(&'static str),

    #[error("failed to serialize graph data")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: Layout,
    pub color_by: ColorBy,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            layout: Layout::default(),
            color_by: ColorBy::default(),
            title: "Terraform Lineage".to_string(),
        }
    }
}

// ── vis-network data ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisFont {
    pub face: &'static str,
    pub size: u32,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub color: String,
    pub shape: &'static str,
    pub font: VisFont,
    pub level: u8,
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdgeFont {
    pub color: &'static str,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub arrows: &'static str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dashes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<VisEdgeFont>,
}

pub fn vis_node(node: &GraphNode, color_by: ColorBy) -> VisNode {
    VisNode {
        id: node.id.to_string(),
        label: node.label.clone(),
        title: tooltip(node),
        color: color_for(node, color_by),
        shape: shape_for(node),
        font: VisFont {
            face: FONT_FACE,
            size: FONT_SIZE,
            color: font_color_for(node),
        },
        level: node.layer,
        kind: node.kind().as_str(),
    }
}

/// Dashed gray for containment, labeled red for data dependencies, plain
/// arrows otherwise.
pub fn vis_edge(edge: &GraphEdge) -> VisEdge {
    let mut vis = VisEdge {
        from: edge.source.to_string(),
        to: edge.target.to_string(),
        arrows: "to",
        kind: edge.kind.as_str(),
        dashes: false,
        color: None,
        width: None,
        label: None,
        font: None,
    };
    if edge.style == Some(EdgeStyle::Dashed) {
        vis.dashes = true;
        vis.color = Some(CONTAINMENT_COLOR);
        vis.width = Some(2.0);
    } else if edge.kind == EdgeKind::DataDependency {
        vis.color = Some(DATA_DEPENDENCY_COLOR);
        vis.width = Some(1.5);
        vis.label = edge.label.clone();
        vis.font = Some(VisEdgeFont {
            color: DATA_DEPENDENCY_COLOR,
            size: 10,
        });
    }
    vis
}

/// vis-network options for `layout`.
pub fn network_options(layout: Layout) -> Value {
    let interaction = json!({ "dragNodes": true, "dragView": true, "zoomView": true });
    match layout {
        Layout::Hierarchical => json!({
            "physics": { "enabled": false },
            "layout": {
                "hierarchical": {
                    "enabled": true,
                    "levelSeparation": 200,
                    "nodeSpacing": 120,
                    "treeSpacing": 180,
                    "direction": "LR",
                    "sortMethod": "directed",
                    "shakeTowards": "roots"
                }
            },
            "interaction": interaction,
            "nodes": { "physics": false },
            "edges": { "arrows": { "to": { "enabled": true } }, "smooth": { "type": "cubicBezier" } }
        }),
        Layout::Flat => json!({
            "physics": {
                "enabled": true,
                "solver": "forceAtlas2Based",
                "forceAtlas2Based": {
                    "gravitationalConstant": -26,
                    "centralGravity": 0.005,
                    "springLength": 230,
                    "springConstant": 0.18,
                    "damping": 0.4,
                    "avoidOverlap": 1.5
                },
                "stabilization": { "enabled": true, "iterations": 1000, "updateInterval": 25 }
            },
            "interaction": interaction,
            "nodes": {
                "borderWidth": 2,
                "borderWidthSelected": 3,
                "font": { "size": FONT_SIZE, "face": FONT_FACE },
                "margin": { "top": 10, "bottom": 10, "left": 15, "right": 15 }
            },
            "edges": {
                "arrows": { "to": { "enabled": true, "scaleFactor": 0.8 } },
                "smooth": { "type": "continuous", "forceDirection": "none", "roundness": 0.1 },
                "length": 200,
                "width": 2
            }
        }),
    }
}

// ── Page ────────────────────────────────────────────────

/// Render `doc` as a self-contained HTML page.
pub fn render_html(doc: &GraphDocument, options: &RenderOptions) -> Result<String, RenderError> {
    let template = text_asset(PAGE_TEMPLATE).ok_or(RenderError::MissingAsset(PAGE_TEMPLATE))?;

    let nodes: Vec<VisNode> = doc
        .nodes
        .iter()
        .map(|n| vis_node(n, options.color_by))
        .collect();
    let edges: Vec<VisEdge> = doc.edges.iter().map(vis_edge).collect();

    let title = escape_html(&options.title);
    let values = [
        ("TITLE", title),
        ("OPTIONS", script_json(&network_options(options.layout))?),
        ("NODES", script_json(&nodes)?),
        ("EDGES", script_json(&edges)?),
        ("CYCLES", script_json(&doc.cycles)?),
        ("STATS", script_json(&doc.stats)?),
    ];
    let html = fill_template(&template, &values);

    tracing::debug!(
        "Rendered {} nodes, {} edges ({} layout, colored by {})",
        nodes.len(),
        edges.len(),
        options.layout,
        options.color_by
    );
    Ok(html)
}

/// Render `doc` and write the page to `path`.
pub fn write_html(doc: &GraphDocument, path: &Path, options: &RenderOptions) -> Result<(), RenderError> {
    let html = render_html(doc, options)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| RenderError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, html).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

/// JSON safe to inline in a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Substitute `{{KEY}}` placeholders in one pass, so substituted text is
/// never scanned again. Unknown placeholders are left as they are.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let replacement = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v, end))
        });
        match replacement {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
