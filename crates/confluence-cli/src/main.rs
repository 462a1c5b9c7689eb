//! Confluence CLI - Web API catalog extraction from object graph snapshots

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use confluence_extract::batch::{discover_snapshots, extract_snapshots};
use confluence_extract::{extract_catalog, locate_api, ExtractionConfig, NodeHit};
use confluence_graph::{ReleaseInfo, SnapshotGraph};

#[derive(Parser)]
#[command(name = "confluence")]
#[command(about = "Extract Web API catalogs from browser object graph snapshots", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract API catalogs from snapshot files or directories
    Extract {
        /// Snapshot files, or directories holding window_*.json snapshots
        snapshots: Vec<PathBuf>,
        /// Extraction configuration (JSON); defaults apply otherwise
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write one <snapshot>.catalog.json per snapshot into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the source node of every member
        #[arg(long)]
        provenance: bool,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Find graph nodes that may hold a member missing from the catalog
    Locate {
        /// Snapshot file
        snapshot: PathBuf,
        /// Member as "Interface#api"
        api: String,
    },
    /// Show statistics about a snapshot and its catalog
    Info {
        /// Snapshot file
        snapshot: PathBuf,
        /// Extraction configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the default extraction configuration
    DefaultConfig,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            snapshots,
            config,
            output,
            provenance,
            pretty,
        } => cmd_extract(&snapshots, config.as_deref(), output.as_deref(), provenance, pretty),
        Commands::Locate { snapshot, api } => cmd_locate(&snapshot, &api),
        Commands::Info { snapshot, config } => cmd_info(&snapshot, config.as_deref()),
        Commands::DefaultConfig => cmd_default_config(),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> ExtractionConfig {
    let Some(path) = path else {
        return ExtractionConfig::default();
    };
    match ExtractionConfig::from_json_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config {}: {} [{}]", path.display(), e, e.code());
            std::process::exit(1);
        }
    }
}

fn load_snapshot(path: &Path) -> SnapshotGraph {
    match SnapshotGraph::load(path) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error loading {}: {} [{}]", path.display(), e, e.code());
            std::process::exit(1);
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

/// Expand directories into the snapshot files they hold
fn collect_snapshots(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match discover_snapshots(input) {
                Ok(found) => paths.extend(found),
                Err(e) => {
                    eprintln!("Error reading {}: {}", input.display(), e);
                    std::process::exit(1);
                }
            }
        } else {
            paths.push(input.clone());
        }
    }
    paths
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_extract(
    inputs: &[PathBuf],
    config: Option<&Path>,
    output: Option<&Path>,
    provenance: bool,
    pretty: bool,
) {
    let config = load_config(config);
    let paths = collect_snapshots(inputs);
    if paths.is_empty() {
        eprintln!("No snapshots to extract");
        std::process::exit(1);
    }
    debug!(snapshots = paths.len(), "starting extraction");

    if let Some(dir) = output {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Error creating {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }

    let mut failed = 0;
    let mut collected = BTreeMap::new();
    for outcome in extract_snapshots(&paths, &config) {
        let extraction = match outcome.result {
            Ok(extraction) => extraction,
            Err(e) => {
                eprintln!("✗ {} - {} [{}]", outcome.path.display(), e, e.code());
                failed += 1;
                continue;
            }
        };
        let json = if provenance {
            to_json(&extraction, pretty)
        } else {
            to_json(&extraction.catalog, pretty)
        };

        match output {
            Some(dir) => {
                let out_path = dir.join(format!("{}.catalog.json", file_stem(&outcome.path)));
                if let Err(e) = fs::write(&out_path, json) {
                    eprintln!("Error writing {}: {}", out_path.display(), e);
                    failed += 1;
                    continue;
                }
                let release = outcome
                    .release
                    .as_ref()
                    .map(ReleaseInfo::to_string)
                    .unwrap_or_else(|| "unknown release".to_string());
                println!(
                    "✓ {} ({}) - {} interfaces, {} APIs",
                    out_path.display(),
                    release,
                    extraction.catalog.len(),
                    extraction.catalog.api_count()
                );
            }
            None => {
                collected.insert(file_stem(&outcome.path), json);
            }
        }
    }

    if output.is_none() {
        // Entries are already serialized; stitch them into one object
        let body: Vec<String> = collected
            .iter()
            .map(|(name, json)| format!("{}:{}", to_json(name, false), json))
            .collect();
        println!("{{{}}}", body.join(","));
    }

    if failed > 0 {
        eprintln!("{} of {} snapshots failed", failed, paths.len());
        std::process::exit(1);
    }
}

fn cmd_locate(snapshot: &Path, api: &str) {
    let graph = load_snapshot(snapshot);
    let location = match locate_api(&graph, api) {
        Ok(location) => location,
        Err(e) => {
            eprintln!("Error: {} [{}]", e, e.code());
            std::process::exit(1);
        }
    };

    if location.is_empty() {
        println!("No graph paths mention {}", api);
        return;
    }
    print_tier("Likely", &location.likely);
    print_tier("Possible", &location.possible);
    print_tier("Unlikely", &location.unlikely);
}

fn print_tier(label: &str, hits: &[NodeHit]) {
    if hits.is_empty() {
        return;
    }
    println!("{} ({}):", label, hits.len());
    for hit in hits {
        println!("  node {}: {}", hit.id, hit.paths.join(", "));
    }
}

fn cmd_info(snapshot: &Path, config: Option<&Path>) {
    let config = load_config(config);
    let graph = load_snapshot(snapshot);

    println!("Snapshot: {}", snapshot.display());
    if let Ok(release) = ReleaseInfo::from_path(snapshot) {
        println!("Release: {}", release);
    }
    println!();
    println!("Graph:");
    println!("  Nodes: {}", graph.len());
    println!("  Objects: {}", graph.object_count());
    println!("  Primitives: {}", graph.primitive_count());
    println!("  Named functions: {}", graph.function_count());

    match extract_catalog(&graph, &config) {
        Ok(catalog) => {
            println!();
            println!("Catalog:");
            println!("  Interfaces: {}", catalog.len());
            println!("  APIs: {}", catalog.api_count());
        }
        Err(e) => {
            eprintln!("Extraction failed: {} [{}]", e, e.code());
            std::process::exit(1);
        }
    }
}

fn cmd_default_config() {
    match ExtractionConfig::default().to_json_pretty() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            std::process::exit(1);
        }
    }
}
