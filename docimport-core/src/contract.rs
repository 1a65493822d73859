//! # contract: interfaces to the content store and pacing
//!
//! This module defines the two seams the importer talks through:
//!
//! - [`ContentStore`]: the persistent store that owns records, taxonomy terms,
//!   record metadata and record/term relationships. The importer only ever
//!   reads and writes through this trait; identifiers are assigned by the store.
//! - [`Pause`]: the courtesy delay applied between batches of writes so a
//!   rate-limited backend is not hit with bursts.
//!
//! Both traits are annotated for `mockall` so tests can script exact call
//! sequences, including store failures.
//!
//! ## Value types
//! - [`RecordAttributes`] is the full attribute set written for one entity.
//! - [`RecordOverrides`] is the partial set a caller may force on top of the
//!   defaults (the class importer forces `kind = Class`).
//! - [`Term`] is a taxonomy term: a source-file grouping or a `@since` version.
//!
//! ## Implementing a store
//! - Return [`StoreError`] for every failure; never panic.
//! - `attach_term` replaces whatever term of that taxonomy the record had.
//! - `find_record` must match `(slug, kind, parent)` exactly.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Store-assigned record identifier. `0` is reserved for "no parent".
pub type RecordId = u64;

/// Store-assigned term identifier.
pub type TermId = u64;

/// Parent id used for top-level functions and classes.
pub const NO_PARENT: RecordId = 0;

/// Kind of content record. Methods are stored with the function kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "docs-function",
            EntityKind::Class => "docs-class",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Taxonomy {
    /// One term per parsed source file.
    SourceFile,
    /// One term per distinct `@since` value.
    Since,
}

impl Taxonomy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::SourceFile => "docs-source-file",
            Taxonomy::Since => "docs-since",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Published,
    Draft,
}

/// Metadata keys written by the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKey {
    Args,
    LineNum,
    Tags,
    Final,
    Abstract,
    Static,
    Visibility,
}

impl MetaKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKey::Args => "_docimport_args",
            MetaKey::LineNum => "_docimport_line_num",
            MetaKey::Tags => "_docimport_tags",
            MetaKey::Final => "_docimport_final",
            MetaKey::Abstract => "_docimport_abstract",
            MetaKey::Static => "_docimport_static",
            MetaKey::Visibility => "_docimport_visibility",
        }
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A taxonomy term as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub slug: String,
    pub taxonomy: Taxonomy,
}

/// Attributes written for one record on insert and on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAttributes {
    pub title: String,
    pub slug: String,
    pub kind: EntityKind,
    pub parent: RecordId,
    pub status: RecordStatus,
    /// Short description.
    pub summary: String,
    /// Long description.
    pub body: String,
}

/// Partial record attributes that take precedence over the importer's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordOverrides {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub kind: Option<EntityKind>,
    pub parent: Option<RecordId>,
    pub status: Option<RecordStatus>,
    pub summary: Option<String>,
    pub body: Option<String>,
}

impl RecordOverrides {
    /// Overrides that only force the record kind.
    pub fn kind(kind: EntityKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn apply(self, mut attrs: RecordAttributes) -> RecordAttributes {
        if let Some(title) = self.title {
            attrs.title = title;
        }
        if let Some(slug) = self.slug {
            attrs.slug = slug;
        }
        if let Some(kind) = self.kind {
            attrs.kind = kind;
        }
        if let Some(parent) = self.parent {
            attrs.parent = parent;
        }
        if let Some(status) = self.status {
            attrs.status = status;
        }
        if let Some(summary) = self.summary {
            attrs.summary = summary;
        }
        if let Some(body) = self.body {
            attrs.body = body;
        }
        attrs
    }
}

/// Persistent content store the importer reconciles against.
///
/// The trait is implemented by real backends, by [`crate::memory_store::MemoryStore`]
/// and by test mocks. Calls are awaited strictly one after another by the importer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Look up a term by its slug within a taxonomy.
    async fn find_term_by_slug(
        &self,
        slug: &str,
        taxonomy: Taxonomy,
    ) -> Result<Option<Term>, StoreError>;

    /// Create a new term.
    async fn create_term(
        &self,
        name: &str,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Term, StoreError>;

    /// Look up a term whose name is exactly `value`.
    async fn term_exists(&self, value: &str, taxonomy: Taxonomy)
        -> Result<Option<Term>, StoreError>;

    /// Find the record identified by `(slug, kind, parent)`, if any.
    async fn find_record(
        &self,
        slug: &str,
        kind: EntityKind,
        parent: RecordId,
    ) -> Result<Option<RecordId>, StoreError>;

    async fn insert_record(&self, attrs: &RecordAttributes) -> Result<RecordId, StoreError>;

    async fn update_record(
        &self,
        id: RecordId,
        attrs: &RecordAttributes,
    ) -> Result<RecordId, StoreError>;

    /// Overwrite one metadata value on a record.
    async fn set_metadata(&self, id: RecordId, key: MetaKey, value: Value)
        -> Result<(), StoreError>;

    /// Associate a term with a record, replacing any prior term of the same taxonomy.
    async fn attach_term(
        &self,
        id: RecordId,
        term_id: TermId,
        taxonomy: Taxonomy,
    ) -> Result<(), StoreError>;
}

/// Delay applied between batches of imported items.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Default [`Pause`]: sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
