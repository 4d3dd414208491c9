//! tfla CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tfla_render::{ColorBy, Layout};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tfla")]
#[command(about = "Terraform lineage analyzer: module dependency graphs as interactive HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration tree and write the lineage page
    Generate {
        /// Root directory of the Terraform configuration
        #[arg(short, long)]
        input: PathBuf,

        /// HTML output file
        #[arg(short, long)]
        output: PathBuf,

        /// Include resources in the graph
        #[arg(long)]
        include_resources: bool,

        /// hierarchical or flat
        #[arg(long)]
        layout: Option<Layout>,

        /// type, environment or status
        #[arg(long)]
        color_by: Option<ColorBy>,

        /// Also write the graph document as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Do not suffix the output file name with a timestamp
        #[arg(long)]
        no_timestamp: bool,

        /// Open the page in a browser when done
        #[arg(long)]
        open: bool,

        /// Log every module source and edge
        #[arg(long)]
        debug: bool,
    },
    /// Print the graph document as JSON
    Inspect {
        /// Root directory of the Terraform configuration
        #[arg(short, long)]
        input: PathBuf,

        /// Include resources in the graph
        #[arg(long)]
        include_resources: bool,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let debug = matches!(cli.command, Commands::Generate { debug: true, .. });
    let log_level = if cli.verbose || debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("tfla={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            include_resources,
            layout,
            color_by,
            json,
            no_timestamp,
            open,
            debug,
        } => commands::generate(commands::GenerateArgs {
            input,
            output,
            include_resources,
            layout,
            color_by,
            json,
            no_timestamp,
            open,
            debug,
        }),
        Commands::Inspect {
            input,
            include_resources,
        } => commands::inspect(input, include_resources),
        Commands::Version => {
            println!("tfla v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
