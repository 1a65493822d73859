//! In-process [`ContentStore`] with JSON snapshots.
//!
//! Holds records, terms, record metadata and record/term relationships behind
//! a `tokio` mutex. `insert_record` refuses a second record with the same
//! `(slug, kind, parent)`, so the identity invariant holds even if two
//! importers race on the same entity.
//!
//! The CLI uses it as its local backing store: the snapshot is loaded before
//! a run and written back afterwards, which keeps repeated imports idempotent.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::contract::{
    ContentStore, EntityKind, MetaKey, RecordAttributes, RecordId, Taxonomy, Term, TermId,
};
use crate::error::{SnapshotError, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub attrs: RecordAttributes,
}

/// Serialisable state of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    next_id: u64,
    records: BTreeMap<RecordId, StoredRecord>,
    terms: BTreeMap<TermId, Term>,
    /// Record id -> metadata key -> value.
    metadata: BTreeMap<RecordId, BTreeMap<String, Value>>,
    /// Record id -> taxonomy -> term id. One term per taxonomy.
    record_terms: BTreeMap<RecordId, BTreeMap<String, TermId>>,
}

impl StoreSnapshot {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// `slug`, or `slug-2`, `slug-3`, ... when another term of the taxonomy holds it.
    fn unique_term_slug(&self, slug: &str, taxonomy: Taxonomy) -> String {
        let taken = |candidate: &str| {
            self.terms
                .values()
                .any(|term| term.taxonomy == taxonomy && term.slug == candidate)
        };
        if !taken(slug) {
            return slug.to_string();
        }
        (2u64..)
            .map(|n| format!("{slug}-{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| slug.to_string())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    /// Loads a snapshot file, or starts empty if the file does not exist.
    pub async fn load(path: &Path) -> Result<Self, SnapshotError> {
        if !tokio::fs::try_exists(path).await? {
            info!(snapshot = %path.display(), "No snapshot found, starting with an empty store");
            return Ok(Self::new());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)?;
        info!(
            snapshot = %path.display(),
            records = snapshot.records.len(),
            terms = snapshot.terms.len(),
            "Loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = {
            let state = self.state.lock().await;
            serde_json::to_string_pretty(&*state)?
        };
        tokio::fs::write(path, json).await?;
        debug!(snapshot = %path.display(), "Saved store snapshot");
        Ok(())
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn records(&self) -> Vec<StoredRecord> {
        self.state.lock().await.records.values().cloned().collect()
    }

    pub async fn terms(&self, taxonomy: Taxonomy) -> Vec<Term> {
        self.state
            .lock()
            .await
            .terms
            .values()
            .filter(|term| term.taxonomy == taxonomy)
            .cloned()
            .collect()
    }

    /// Term of `taxonomy` currently attached to a record.
    pub async fn record_term(&self, id: RecordId, taxonomy: Taxonomy) -> Option<TermId> {
        self.state
            .lock()
            .await
            .record_terms
            .get(&id)
            .and_then(|terms| terms.get(taxonomy.as_str()))
            .copied()
    }

    pub async fn metadata(&self, id: RecordId, key: MetaKey) -> Option<Value> {
        self.state
            .lock()
            .await
            .metadata
            .get(&id)
            .and_then(|meta| meta.get(key.as_str()))
            .cloned()
    }
}

fn same_identity(record: &StoredRecord, slug: &str, kind: EntityKind, parent: RecordId) -> bool {
    record.attrs.slug == slug && record.attrs.kind == kind && record.attrs.parent == parent
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn find_term_by_slug(
        &self,
        slug: &str,
        taxonomy: Taxonomy,
    ) -> Result<Option<Term>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .terms
            .values()
            .find(|term| term.taxonomy == taxonomy && term.slug == slug)
            .cloned())
    }

    async fn create_term(
        &self,
        name: &str,
        taxonomy: Taxonomy,
        slug: &str,
    ) -> Result<Term, StoreError> {
        if slug.is_empty() {
            return Err(StoreError::Rejected(format!(
                "term \"{name}\" has an empty slug"
            )));
        }
        let mut state = self.state.lock().await;
        if state
            .terms
            .values()
            .any(|term| term.taxonomy == taxonomy && term.name == name)
        {
            return Err(StoreError::Rejected(format!(
                "a {taxonomy} term named \"{name}\" already exists"
            )));
        }
        let slug = state.unique_term_slug(slug, taxonomy);
        let term = Term {
            id: state.allocate_id(),
            name: name.to_string(),
            slug,
            taxonomy,
        };
        state.terms.insert(term.id, term.clone());
        Ok(term)
    }

    async fn term_exists(
        &self,
        value: &str,
        taxonomy: Taxonomy,
    ) -> Result<Option<Term>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .terms
            .values()
            .find(|term| term.taxonomy == taxonomy && term.name == value)
            .cloned())
    }

    async fn find_record(
        &self,
        slug: &str,
        kind: EntityKind,
        parent: RecordId,
    ) -> Result<Option<RecordId>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .values()
            .find(|record| same_identity(record, slug, kind, parent))
            .map(|record| record.id))
    }

    async fn insert_record(&self, attrs: &RecordAttributes) -> Result<RecordId, StoreError> {
        if attrs.slug.is_empty() {
            return Err(StoreError::Rejected(format!(
                "record \"{}\" has an empty slug",
                attrs.title
            )));
        }
        let mut state = self.state.lock().await;
        if state
            .records
            .values()
            .any(|record| same_identity(record, &attrs.slug, attrs.kind, attrs.parent))
        {
            return Err(StoreError::Rejected(format!(
                "duplicate {} record \"{}\" under parent {}",
                attrs.kind, attrs.slug, attrs.parent
            )));
        }
        let id = state.allocate_id();
        state.records.insert(
            id,
            StoredRecord {
                id,
                attrs: attrs.clone(),
            },
        );
        Ok(id)
    }

    async fn update_record(
        &self,
        id: RecordId,
        attrs: &RecordAttributes,
    ) -> Result<RecordId, StoreError> {
        let mut state = self.state.lock().await;
        if state.records.values().any(|record| {
            record.id != id && same_identity(record, &attrs.slug, attrs.kind, attrs.parent)
        }) {
            return Err(StoreError::Rejected(format!(
                "update would duplicate {} record \"{}\"",
                attrs.kind, attrs.slug
            )));
        }
        let record = state
            .records
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))?;
        record.attrs = attrs.clone();
        Ok(id)
    }

    async fn set_metadata(
        &self,
        id: RecordId,
        key: MetaKey,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.records.contains_key(&id) {
            return Err(StoreError::NotFound(format!("record {id}")));
        }
        state
            .metadata
            .entry(id)
            .or_default()
            .insert(key.as_str().to_string(), value);
        Ok(())
    }

    async fn attach_term(
        &self,
        id: RecordId,
        term_id: TermId,
        taxonomy: Taxonomy,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if !state.records.contains_key(&id) {
            return Err(StoreError::NotFound(format!("record {id}")));
        }
        match state.terms.get(&term_id) {
            Some(term) if term.taxonomy == taxonomy => {}
            Some(_) => {
                return Err(StoreError::Rejected(format!(
                    "term {term_id} does not belong to {taxonomy}"
                )))
            }
            None => return Err(StoreError::NotFound(format!("term {term_id}"))),
        }
        state
            .record_terms
            .entry(id)
            .or_default()
            .insert(taxonomy.as_str().to_string(), term_id);
        Ok(())
    }
}
