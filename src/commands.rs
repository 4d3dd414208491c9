//! CLI command implementations

use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tfla_core::{BuildOptions, GraphDocument, NodeId, ParsedTerraform, build_graph, find_cycles};
use tfla_parser::{ParseOptions, parse_directory};
use tfla_render::{ColorBy, Layout, RenderOptions, write_html};

use crate::config::{TflaConfig, load_config};

/// Suffix format appended to output file names.
const TIMESTAMP_FORMAT: &str = "%H%M%S%d%m%Y";

pub struct GenerateArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub include_resources: bool,
    pub layout: Option<Layout>,
    pub color_by: Option<ColorBy>,
    pub json: Option<PathBuf>,
    pub no_timestamp: bool,
    pub open: bool,
    pub debug: bool,
}

pub fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = load_config(&args.input)?;
    let include_resources = args.include_resources || config.include_resources;
    let layout = args.layout.unwrap_or(config.layout);
    let color_by = args.color_by.unwrap_or(config.color_by);

    let doc = analyze(&args.input, &config, include_resources, args.debug)?;

    let output = if args.no_timestamp {
        args.output
    } else {
        timestamped_path(&args.output, Local::now().naive_local())
    };
    let options = RenderOptions {
        layout,
        color_by,
        title: page_title(&args.input),
    };
    write_html(&doc, &output, &options)
        .with_context(|| format!("Failed to render {}", output.display()))?;
    println!("Wrote {}", output.display());

    if let Some(json_path) = args.json {
        fs::write(&json_path, doc.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        println!("Wrote {}", json_path.display());
    }

    if args.open {
        open::that(&output).with_context(|| format!("Failed to open {}", output.display()))?;
    }
    Ok(())
}

pub fn inspect(input: PathBuf, include_resources: bool) -> anyhow::Result<()> {
    let config = load_config(&input)?;
    let include_resources = include_resources || config.include_resources;
    let doc = analyze(&input, &config, include_resources, false)?;
    println!("{}", doc.to_json_pretty()?);
    Ok(())
}

/// Parse, assemble and check for cycles.
fn analyze(
    input: &Path,
    config: &TflaConfig,
    include_resources: bool,
    debug: bool,
) -> anyhow::Result<GraphDocument> {
    let parse_options = ParseOptions {
        skip_dirs: config.skip_dirs.clone(),
    };
    let parsed = parse_directory(input, &parse_options)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    if debug {
        log_module_sources(&parsed);
    }

    let graph = build_graph(&parsed, BuildOptions { include_resources });
    if debug {
        for edge in graph.all_edges() {
            tracing::debug!("{} -[{}]-> {}", edge.source, edge.kind.as_str(), edge.target);
        }
    }

    let cycles = find_cycles(&graph);
    report_cycles(&cycles);
    Ok(GraphDocument::from_graph(&graph, cycles))
}

fn log_module_sources(parsed: &ParsedTerraform) {
    for module in parsed.modules.values() {
        tracing::debug!(
            "{} source={}",
            module.id,
            module.source.as_deref().unwrap_or("-")
        );
    }
}

fn report_cycles(cycles: &[Vec<NodeId>]) {
    if cycles.is_empty() {
        return;
    }
    tracing::warn!("Detected {} dependency cycles", cycles.len());
    for cycle in cycles {
        let path: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
        tracing::debug!("Cycle: {}", path.join(" -> "));
    }
}

fn page_title(input: &Path) -> String {
    let name = fs::canonicalize(input)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| input.display().to_string());
    format!("Terraform Lineage: {name}")
}

/// `dir/name_<stamp>.ext` for `dir/name.ext`.
fn timestamped_path(path: &Path, now: NaiveDateTime) -> PathBuf {
    let stamp = now.format(TIMESTAMP_FORMAT);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{stamp}"),
    };
    path.with_file_name(file_name)
}
