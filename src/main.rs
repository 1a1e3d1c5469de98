//! Binary entry point for tabgraph.
//!
//! This binary exports labels from a JSON graph snapshot to CSV tables and
//! imports such tables back into a snapshot.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tabgraph::TabgraphConfig;
use tabgraph::cli::{LoadCommand, SaveCommand};
use tabgraph::observability;

/// Tabgraph - friendly graph exporter.
#[derive(Parser)]
#[command(name = "tabgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "TABGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Field delimiter, overriding the configuration.
    #[arg(short, long, global = true)]
    delimiter: Option<char>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Export labels to CSV tables.
    Save {
        /// Labels to export.
        #[arg(required = true)]
        labels: Vec<String>,

        /// Graph snapshot (JSON) to export from.
        #[arg(short, long)]
        graph: PathBuf,

        /// Output folder.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Archive name; the tables stay loose when omitted.
        #[arg(short, long)]
        archive: Option<String>,

        /// Do not export relationships.
        #[arg(long)]
        no_relationships: bool,

        /// Follow relationships to export neighbor labels too.
        #[arg(short, long)]
        neighbors: bool,
    },

    /// Import a zip archive or folder of CSV tables.
    Load {
        /// Archive or folder to import.
        path: PathBuf,

        /// Graph snapshot (JSON) to import into.
        #[arg(short, long)]
        graph: PathBuf,
    },
}

fn main() -> ExitCode {
    // Load .env before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<Vec<String>> {
    let mut config = match &cli.config {
        Some(path) => TabgraphConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TabgraphConfig::load_default(),
    };
    if let Some(delimiter) = cli.delimiter {
        config.io = config.io.with_delimiter(delimiter);
        config.io.validate()?;
    }

    if let Err(e) = observability::init_logging(&config.logging, cli.verbose) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let lines = match cli.command {
        Commands::Save {
            labels,
            graph,
            output,
            archive,
            no_relationships,
            neighbors,
        } => SaveCommand {
            graph,
            labels,
            output,
            archive,
            save_relationships: !no_relationships,
            consider_neighbors: neighbors,
        }
        .run(&config.io)?,
        Commands::Load { path, graph } => LoadCommand { path, graph }.run(&config.io)?,
    };
    Ok(lines)
}
