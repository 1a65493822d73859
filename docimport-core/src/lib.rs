#![doc = "docimport-core: reconciles parsed documentation trees against a content store."]

//! This crate holds all import logic: the input model produced by the
//! documentation parser, the store contract, and the importer that upserts
//! one record per documented function, method and class.
//!
//! # Usage
//! Build a [`importer::Importer`] around any [`contract::ContentStore`] and feed it
//! [`model::SourceFile`]s. [`memory_store::MemoryStore`] is a ready-made store.

pub mod config;
pub mod contract;
pub mod error;
pub mod importer;
pub mod memory_store;
pub mod model;
pub mod slug;

pub use config::ImportConfig;
pub use contract::{ContentStore, EntityKind, MetaKey, Pause, RecordId, Taxonomy, Term};
pub use error::{ImportError, StoreError};
pub use importer::{ImportReport, ImportStats, Importer, ItemOutcome, Role};
pub use memory_store::MemoryStore;
pub use model::{DocTag, DocTags, Docblock, DocumentedEntity, SourceFile};
