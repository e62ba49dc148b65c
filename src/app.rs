// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod host;
pub mod models;
pub mod scanner;
pub mod tally;
pub mod transform;
pub mod traverse;
pub mod worker;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use self::cli::Cli;
use self::config::resolve_config;
use self::formatter::OutputGenerator;
use self::host::{FileSelection, FsHost};
use self::models::{Node, RuntimeConfig, Scope};
use self::scanner::{find_project_root, Scanner};
use self::tally::Tally;
use self::transform::Transformer;
use self::traverse::{apply_to_selection, LeafFailure, Traverser};
use self::worker::spawn_traversal;

/// Aggregated result of one invocation.
#[derive(Debug)]
pub struct Outcome {
    pub tally: Tally,
    pub failures: Vec<LeafFailure>,
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    let level = if args.command.args().verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // 2. Identify Project Name for preset auto-detection
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 3. Resolve Configuration
    let config = resolve_config(args.command, project_name)?;
    let scope = config.scope;
    let dry_run = config.dry_run;
    let filtering_stdin =
        scope == Scope::Selection && config.paths.len() == 1 && config.paths[0] == Path::new("-");

    // 4. Convert off the calling thread, wait for the single result
    let outcome = spawn_traversal(move || execute(&config))?.wait()??;

    // 5. Report once
    let report = OutputGenerator::format_report(&outcome.tally, scope, &outcome.failures, dry_run);
    if filtering_stdin {
        eprintln!("{}", report);
    } else {
        println!("{}", report);
    }

    if !outcome.failures.is_empty() {
        bail!("{} file(s) could not be processed", outcome.failures.len());
    }
    Ok(())
}

/// Runs one conversion synchronously with the filesystem host.
pub fn execute(config: &RuntimeConfig) -> Result<Outcome> {
    let transformer =
        Transformer::new(&config.settings()).context("Invalid indent or tab size")?;

    let mut host = FsHost::new(config.dry_run);
    let mut traverser = Traverser::new(&transformer, &config.extensions, &mut host);
    let mut tally = Tally::default();

    match config.scope {
        Scope::Selection => return execute_selection(config, &transformer),
        Scope::File => {
            for path in &config.paths {
                if path.is_dir() {
                    bail!(
                        "{} is a directory; use --scope folder to convert its contents",
                        path.display()
                    );
                }
                tally.fold(&traverser.traverse(&Node::Leaf(path.clone())));
            }
        }
        Scope::Folder => {
            for path in &config.paths {
                let tree = scan_directory(path, &config.exclude)?;
                tally.fold(&traverser.traverse(&tree));
            }
        }
        Scope::Project => {
            let mut visited = HashSet::new();
            for path in &config.paths {
                let root = find_project_root(path).unwrap_or_else(|| enclosing_directory(path));
                if !visited.insert(root.clone()) {
                    continue;
                }
                log::info!("Converting project at {}", root.display());
                let tree = scan_directory(&root, &config.exclude)?;
                tally.fold_project(&traverser.traverse(&tree));
            }
        }
        Scope::Solution => {
            for path in &config.paths {
                if !path.is_dir() {
                    bail!("{} is not a directory", path.display());
                }
                let collection = Scanner::new(path.clone(), &config.exclude)?.scan_collection();
                tally.fold(&traverser.traverse_collection(&collection));
            }
        }
    }

    Ok(Outcome {
        tally,
        failures: traverser.into_failures(),
    })
}

fn scan_directory(path: &Path, exclude: &[String]) -> Result<Node<PathBuf>> {
    if !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    Ok(Scanner::new(path.to_path_buf(), exclude)?.scan())
}

fn enclosing_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if path.is_file() => parent.to_path_buf(),
        _ => path.to_path_buf(),
    }
}

fn execute_selection(config: &RuntimeConfig, transformer: &Transformer) -> Result<Outcome> {
    let [path] = config.paths.as_slice() else {
        bail!("Selection scope takes exactly one document");
    };
    let mut doc = FileSelection::load(path, config.lines)?;
    let tally = apply_to_selection(transformer, &mut doc)?;
    doc.save(config.dry_run)?;
    Ok(Outcome {
        tally,
        failures: Vec::new(),
    })
}
