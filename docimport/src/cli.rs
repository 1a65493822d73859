//! This module implements the CLI interface for docimport: command parsing,
//! argument validation, and the async entrypoint used by `main` and by tests.
//!
//! All import logic (input model, store contract, reconciliation) lives in the
//! [`docimport-core`] crate. This module is strictly CLI glue: it loads config
//! and parser output, opens the snapshot-backed store, runs the importer and
//! prints the end-of-run summary.
//!
//! ## How To Use
//! - Command line: `docimport import --input parsed.json [--config docimport.yaml]`.
//! - Programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`docimport-core`]: ../../docimport-core/
use crate::load_config::{load_config, CliConfig};
use crate::load_input::load_input;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docimport_core::{Importer, MemoryStore};
use std::path::PathBuf;

/// CLI for docimport: reconcile parsed documentation into a content store.
#[derive(Parser)]
#[clap(
    name = "docimport",
    version,
    about = "Import parsed code documentation into a content store",
    long_about = "Import parsed code documentation into a content store, \
                  one record per function, class and method"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a parser JSON export into the store
    Import {
        /// Path to the parser's JSON output
        #[clap(long)]
        input: PathBuf,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Store snapshot file; overrides `store.snapshot` from the config
        #[clap(long)]
        snapshot: Option<PathBuf>,
        /// Do not pause between batches of imported items
        #[clap(long)]
        skip_sleep: bool,
        /// Also import entities tagged @internal
        #[clap(long)]
        import_internal: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Import {
            input,
            config,
            snapshot,
            skip_sleep,
            import_internal,
        } => {
            let mut config = match config {
                Some(path) => load_config(path)?,
                None => CliConfig::default(),
            };
            if skip_sleep {
                config.import.skip_throttle = true;
            }
            if import_internal {
                config.import.import_internal = true;
            }
            let snapshot = snapshot.unwrap_or_else(|| config.store.snapshot.clone());
            config.import.trace_loaded();

            let files = load_input(&input)?;
            let store = MemoryStore::load(&snapshot)
                .await
                .with_context(|| format!("Failed to open store snapshot {}", snapshot.display()))?;

            tracing::info!(command = "import", files = files.len(), "Starting import");
            let mut importer =
                Importer::new(&store, config.import).context("Invalid import configuration")?;
            let report = importer.import(&files).await;

            store
                .save(&snapshot)
                .await
                .with_context(|| format!("Failed to save store snapshot {}", snapshot.display()))?;

            println!("Import complete: {}", report.summary());
            if report.has_errors() {
                println!("Errors:");
                for error in &report.errors {
                    println!("{}", error.trim_start());
                }
                tracing::error!(
                    command = "import",
                    errors = report.errors.len(),
                    "Import finished with errors"
                );
                anyhow::bail!("import finished with {} error(s)", report.errors.len());
            }
            tracing::info!(command = "import", ?report, "Import complete");
            Ok(())
        }
    }
}
