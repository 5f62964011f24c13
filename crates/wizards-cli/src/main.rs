//! Wizard tree tools CLI.
//!
//! Provides the `wizards` binary with subcommands for working with wizard
//! tree snapshot files. A snapshot is a JSON document holding the
//! persisted nodes plus the language catalog; `export` materializes trees
//! out of it, `save` applies an edited tree back, `roots` lists the
//! published wizards.
//!
//! Uses the same `TreeReader`/`TreeWriter` pipeline a hosting service
//! would, ensuring identical behavior from both entry points.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use wizards_core::NodeId;
use wizards_storage::{EntityStore, LanguageCatalog, Snapshot};
use wizards_tree::{Actor, AuthenticatedGuard, SaveInput, TreeReader, TreeWriter};

/// Wizard tree inspection and editing tools.
#[derive(Parser)]
#[command(name = "wizards", about = "Wizard tree inspection and editing tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the published wizard roots in a snapshot.
    Roots {
        /// Path to the snapshot file.
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Print a tree from a snapshot as JSON.
    Export {
        /// Path to the snapshot file.
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Root node ID to export (default: every published wizard).
        #[arg(short, long)]
        root: Option<i64>,

        /// Emit the flattened shape instead of the nested one.
        #[arg(long)]
        flat: bool,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Apply an edited tree to a snapshot and rewrite it.
    Save {
        /// Path to the snapshot file.
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Path to the edited tree JSON (either wire shape).
        #[arg(short, long)]
        tree: PathBuf,

        /// Acting principal recorded as node owner.
        #[arg(short, long)]
        actor: i64,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Roots { snapshot } => run_roots(&snapshot),
        Commands::Export {
            snapshot,
            root,
            flat,
            pretty,
        } => run_export(&snapshot, root.map(NodeId), flat, pretty),
        Commands::Save {
            snapshot,
            tree,
            actor,
        } => run_save(&snapshot, &tree, actor),
    };
    process::exit(exit_code);
}

/// Execute the roots subcommand.
///
/// Returns exit code: 0 = success, 3 = I/O error.
fn run_roots(snapshot_path: &PathBuf) -> i32 {
    let (store, _languages) = match load_snapshot(snapshot_path) {
        Ok(backends) => backends,
        Err(code) => return code,
    };

    match store.query_roots() {
        Ok(roots) => {
            for root in roots {
                println!("{}", root);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: failed to query roots: {}", e);
            3
        }
    }
}

/// Execute the export subcommand.
///
/// Returns exit code: 0 = success, 1 = unknown root, 3 = I/O error.
fn run_export(snapshot_path: &PathBuf, root: Option<NodeId>, flat: bool, pretty: bool) -> i32 {
    let (store, languages) = match load_snapshot(snapshot_path) {
        Ok(backends) => backends,
        Err(code) => return code,
    };
    let reader = TreeReader::new(&store, &languages);

    let rendered = match (root, flat) {
        (Some(id), true) => match reader.build_flattened_from(id) {
            Ok(Some(tree)) => to_json(&tree, pretty),
            Ok(None) => {
                eprintln!("Error: no tree node with id {}", id);
                return 1;
            }
            Err(e) => {
                eprintln!("Error: failed to build tree: {}", e);
                return 3;
            }
        },
        (Some(id), false) => match reader.build_nested_from(id) {
            Ok(Some(tree)) => to_json(&tree, pretty),
            Ok(None) => {
                eprintln!("Error: no tree node with id {}", id);
                return 1;
            }
            Err(e) => {
                eprintln!("Error: failed to build tree: {}", e);
                return 3;
            }
        },
        (None, true) => match reader.build_flattened_all() {
            Ok(trees) => to_json(&trees, pretty),
            Err(e) => {
                eprintln!("Error: failed to build trees: {}", e);
                return 3;
            }
        },
        (None, false) => match reader.build_nested_all() {
            Ok(trees) => to_json(&trees, pretty),
            Err(e) => {
                eprintln!("Error: failed to build trees: {}", e);
                return 3;
            }
        },
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            3
        }
    }
}

/// Execute the save subcommand.
///
/// Returns exit code: 0 = clean save, 1 = bad input or per-node failures,
/// 2 = permission denied, 3 = I/O error.
fn run_save(snapshot_path: &PathBuf, tree_path: &PathBuf, actor_id: i64) -> i32 {
    let (mut store, languages) = match load_snapshot(snapshot_path) {
        Ok(backends) => backends,
        Err(code) => return code,
    };

    let raw = match std::fs::read_to_string(tree_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", tree_path.display(), e);
            return 3;
        }
    };
    let input: SaveInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: '{}' is not a wizard tree: {}", tree_path.display(), e);
            return 1;
        }
    };

    let actor = Actor::authenticated(wizards_core::ActorId(actor_id));
    let guard = AuthenticatedGuard;
    let mut writer = TreeWriter::new(&mut store, &guard);
    let report = match writer.save(input, &actor) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    // Print the report as JSON to stdout for machine-readable output.
    let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"failed to serialize report: {}\"}}", e)
    });
    println!("{}", json);

    let languages = languages.available_languages();
    let snapshot = Snapshot::from_store(store, languages);
    if let Err(e) = snapshot.write(snapshot_path) {
        eprintln!(
            "Error: failed to rewrite '{}': {}",
            snapshot_path.display(),
            e
        );
        return 3;
    }

    if report.is_clean() {
        0
    } else {
        1
    }
}

/// Load a snapshot file into live backends.
fn load_snapshot(
    path: &PathBuf,
) -> Result<(wizards_storage::InMemoryStore, wizards_storage::StaticLanguageCatalog), i32> {
    match Snapshot::read(path) {
        Ok(snapshot) => Ok(snapshot.into_store()),
        Err(e) => {
            eprintln!("Error: failed to open snapshot '{}': {}", path.display(), e);
            Err(3)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
