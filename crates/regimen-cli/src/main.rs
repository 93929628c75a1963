//! Regimen CLI
//!
//! Resolves programs and checks library drift against a filesystem document
//! store:
//! - `resolve`: the fully resolved program for one user, as JSON
//! - `snapshot`: library versions a program currently references
//! - `drift`: compare a stored snapshot with the live library
//!
//! JSON goes to stdout; logs (`RUST_LOG`, default `warn`) and status lines go
//! to stderr.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use regimen_model::{Outcome, ProgramTemplate, Resolved, VersionSnapshot};
use regimen_resolver::{RegimenConfig, Resolver};
use regimen_store::FsStore;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "regimen")]
#[command(author, version, about = "Regimen: program content resolution")]
struct Cli {
    /// JSON file with `layout` and `resolver` settings.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory of the filesystem document store.
    #[arg(long, global = true, default_value = ".")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a program for one user and print it as JSON.
    Resolve {
        #[arg(long)]
        user: String,
        #[arg(long)]
        program: String,
        /// Print `{ program, gaps }` instead of the bare program.
        #[arg(long)]
        gaps: bool,
    },

    /// Print the library versions a program template references.
    Snapshot {
        #[arg(long)]
        program: String,
    },

    /// Compare a stored version snapshot with the creator's library.
    Drift {
        #[arg(long)]
        creator: String,
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(store = %cli.store.display(), "opening filesystem store");
    let resolver = Resolver::with_config(FsStore::new(&cli.store), config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("failed to initialize tokio runtime: {e}"))?;

    let output = runtime.block_on(async {
        match cli.command {
            Commands::Resolve {
                user,
                program,
                gaps,
            } => cmd_resolve(&resolver, &user, &program, gaps).await,
            Commands::Snapshot { program } => cmd_snapshot(&resolver, &program).await,
            Commands::Drift { creator, snapshot } => {
                cmd_drift(&resolver, &creator, &snapshot).await
            }
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RegimenConfig> {
    let Some(path) = path else {
        return Ok(RegimenConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    RegimenConfig::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
}

async fn load_template(
    resolver: &Resolver<FsStore>,
    program_id: &str,
) -> Result<Resolved<ProgramTemplate>> {
    resolver
        .load_program_template(program_id)
        .await
        .with_context(|| format!("loading program {program_id}"))?
        .ok_or_else(|| anyhow!("program {program_id} not found"))
}

async fn cmd_resolve(
    resolver: &Resolver<FsStore>,
    user_id: &str,
    program_id: &str,
    with_gaps: bool,
) -> Result<Value> {
    let (template, mut gaps) = load_template(resolver, program_id).await?.into_parts();
    let mut resolved = resolver
        .resolve_client_program(user_id, program_id, template)
        .await
        .with_context(|| format!("resolving program {program_id} for {user_id}"))?;
    gaps.append(&mut resolved.gaps);
    let resolved = Resolved::with_gaps(resolved.value, gaps);

    match resolved.outcome() {
        Outcome::Resolved => eprintln!(
            "{} resolved {} ({} modules)",
            "ok".green().bold(),
            program_id.bold(),
            resolved.value.modules.len()
        ),
        Outcome::ResolvedWithGaps(gaps) => {
            eprintln!(
                "{} resolved {} with {} gap(s)",
                "warn".yellow().bold(),
                program_id.bold(),
                gaps.len()
            );
            for path in resolved.missing_paths() {
                eprintln!("  missing {path}");
            }
        }
    }

    if with_gaps {
        Ok(json!({ "program": resolved.value, "gaps": resolved.gaps }))
    } else {
        Ok(serde_json::to_value(&resolved.value)?)
    }
}

async fn cmd_snapshot(resolver: &Resolver<FsStore>, program_id: &str) -> Result<Value> {
    let template = load_template(resolver, program_id).await?.value;
    let Some(creator_id) = template.creator() else {
        bail!("program {program_id} has no creator id");
    };
    let snapshot = resolver
        .extract_library_versions(creator_id, &template.modules)
        .await;
    eprintln!(
        "{} {} modules, {} sessions",
        "snapshot".green().bold(),
        snapshot.modules.len(),
        snapshot.sessions.len()
    );
    Ok(serde_json::to_value(&snapshot)?)
}

async fn cmd_drift(resolver: &Resolver<FsStore>, creator_id: &str, snapshot: &Path) -> Result<Value> {
    let text = fs::read_to_string(snapshot)
        .with_context(|| format!("reading snapshot {}", snapshot.display()))?;
    let stored: VersionSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("parsing snapshot {}", snapshot.display()))?;

    let report = resolver
        .check_library_versions_changed(creator_id, &stored)
        .await;
    if report.needs_update {
        eprintln!("{} library changed since snapshot", "drift".yellow().bold());
    } else if report.has_unknown() {
        eprintln!("{} some versions could not be read", "unknown".yellow().bold());
    } else {
        eprintln!("{} library unchanged", "ok".green().bold());
    }
    Ok(serde_json::to_value(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    fn write(root: &Path, path: &str, body: Value) {
        let file = root.join(format!("{path}.json"));
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, serde_json::to_vec(&body).unwrap()).unwrap();
    }

    fn seed(root: &Path) {
        write(root, "creator_libraries/c1/modules/M1", json!({ "version": 3, "sessionRefs": ["S1"] }));
        write(root, "creator_libraries/c1/sessions/S1", json!({ "title": "Push", "version": 1 }));
        write(
            root,
            "courses/P1",
            json!({
                "creator_id": "c1",
                "modules": [{ "id": "PM1", "libraryModuleRef": "M1", "sessions": [{ "librarySessionRef": "S1" }] }]
            }),
        );
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn resolve_snapshot_and_drift_round_trip() {
        let dir = tempdir().unwrap();
        seed(dir.path());
        let resolver = Resolver::new(FsStore::new(dir.path()));

        let program = cmd_resolve(&resolver, "u1", "P1", true).await.unwrap();
        assert_eq!(program["program"]["modules"][0]["sessions"][0]["title"], json!("Push"));
        assert_eq!(program["gaps"], json!([]));

        let snapshot = cmd_snapshot(&resolver, "P1").await.unwrap();
        assert_eq!(snapshot, json!({ "modules": { "M1": 3 }, "sessions": { "S1": 1 } }));

        let snapshot_file = dir.path().join("snapshot.json");
        fs::write(&snapshot_file, json!({ "modules": { "M1": 2 } }).to_string()).unwrap();
        let report = cmd_drift(&resolver, "c1", &snapshot_file).await.unwrap();
        assert_eq!(report["needsUpdate"], json!(true));
        assert_eq!(report["changedModules"][0]["newVersion"], json!(3));
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let dir = tempdir().unwrap();
        let resolver = Resolver::new(FsStore::new(dir.path()));
        let err = cmd_resolve(&resolver, "u1", "nope", false).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
