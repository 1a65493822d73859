//! Reconciles parsed documentation against a [`ContentStore`].
//!
//! One [`Importer`] holds the session state of a run: the source-file term of
//! the file currently being imported and the ordered list of human-readable
//! diagnostics collected so far. The work is split three ways:
//!
//!   - [`Importer::import_file`] (reconcile.rs): per-file orchestration, the
//!     source-file term and throttling between batches
//!   - [`Importer::import_item`] (entity.rs): upsert of a single function,
//!     method or class record with its terms and metadata
//!   - [`Importer::import_class`] (class.rs): a class record, its class-only
//!     metadata, then each of its methods
//!
//! # Error Handling
//! Nothing here aborts a run because of one bad entity. Failures are appended
//! to [`Importer::errors`] and returned as [`ImportError`] so the caller can
//! move on to the next sibling. `@internal` entities come back as
//! [`ItemOutcome::Skipped`], which is not an error.
//!
//! # Concurrency
//! Every store call is awaited in order. Ordering matters: throttle counters
//! and log lines follow input order.

mod class;
mod entity;
mod reconcile;

use std::fmt;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ImportConfig;
use crate::contract::{ContentStore, EntityKind, Pause, RecordId, Term, TokioPause, NO_PARENT};
use crate::error::{ConfigError, ImportError, StoreError};
use crate::model::SourceFile;

/// Which kind of entity a record is being written for; drives message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Class,
    Method,
    Function,
}

impl Role {
    pub fn of(kind: EntityKind, class_post_id: RecordId) -> Self {
        match kind {
            EntityKind::Class => Role::Class,
            EntityKind::Function if class_post_id != NO_PARENT => Role::Method,
            EntityKind::Function => Role::Function,
        }
    }

    /// Progress-line indentation: methods nest one level below their class.
    pub fn indent(&self) -> &'static str {
        match self {
            Role::Method => "\t\t",
            Role::Class | Role::Function => "\t",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Class => "class",
            Role::Method => "method",
            Role::Function => "function",
        })
    }
}

/// Result of importing one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A new record was inserted.
    Imported(RecordId),
    /// An existing record with the same identity was updated.
    Updated(RecordId),
    /// Tagged `@internal` and not imported.
    Skipped,
}

impl ItemOutcome {
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            ItemOutcome::Imported(id) | ItemOutcome::Updated(id) => Some(*id),
            ItemOutcome::Skipped => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ItemOutcome::Imported(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Summary of [`Importer::import`].
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub files: usize,
    pub stats: ImportStats,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} file(s): {} imported, {} updated, {} skipped, {} failed, {} error(s)",
            self.files,
            self.stats.imported,
            self.stats.updated,
            self.stats.skipped,
            self.stats.failed,
            self.errors.len()
        )
    }
}

/// Import session against a borrowed store.
pub struct Importer<'a, S, P = TokioPause>
where
    S: ContentStore,
    P: Pause,
{
    store: &'a S,
    pause: P,
    config: ImportConfig,
    file_meta: Option<Term>,
    errors: Vec<String>,
    stats: ImportStats,
}

impl<'a, S> Importer<'a, S, TokioPause>
where
    S: ContentStore,
{
    /// Fails if `config` does not pass [`ImportConfig::validate`].
    pub fn new(store: &'a S, config: ImportConfig) -> Result<Self, ConfigError> {
        Self::with_pause(store, config, TokioPause)
    }
}

impl<'a, S, P> Importer<'a, S, P>
where
    S: ContentStore,
    P: Pause,
{
    pub fn with_pause(store: &'a S, config: ImportConfig, pause: P) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store,
            pause,
            config,
            file_meta: None,
            errors: Vec::new(),
            stats: ImportStats::default(),
        })
    }

    /// Diagnostics accumulated over every file imported so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn stats(&self) -> ImportStats {
        self.stats
    }

    /// Source-file term of the file currently (or last) imported.
    pub fn file_meta(&self) -> Option<&Term> {
        self.file_meta.as_ref()
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports every file in order using the configured throttle and
    /// `@internal` settings, then reports what happened.
    pub async fn import(&mut self, files: &[SourceFile]) -> ImportReport {
        let skip_throttle = self.config.skip_throttle;
        let import_internal = self.config.import_internal;

        info!(
            files = files.len(),
            skip_throttle, import_internal, "[IMPORT] Starting import run"
        );

        for (index, file) in files.iter().enumerate() {
            info!(
                file = %file.path,
                position = index + 1,
                total = files.len(),
                "[IMPORT][FILE] Processing file {} of {}: {}",
                index + 1,
                files.len(),
                file.path
            );
            self.import_file(file, skip_throttle, import_internal).await;
        }

        let report = ImportReport {
            files: files.len(),
            stats: self.stats,
            errors: self.errors.clone(),
        };

        if report.has_errors() {
            warn!(
                errors = report.errors.len(),
                "[IMPORT] Import finished with errors: {}",
                report.summary()
            );
        } else {
            info!("[IMPORT] Import finished: {}", report.summary());
        }
        report
    }

    /// Records a fatal-to-entity failure and builds the error to return.
    fn write_failed(&mut self, role: Role, name: &str, source: StoreError) -> ImportError {
        error!(%role, name, error = %source, "[IMPORT][ERROR] Record write failed");
        let err = ImportError::Write {
            role,
            name: name.to_string(),
            source,
        };
        self.errors.push(format!("{}{}", role.indent(), err));
        self.stats.failed += 1;
        err
    }
}
