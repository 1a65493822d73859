use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{Importer, ItemOutcome, Role};
use crate::contract::{
    ContentStore, EntityKind, MetaKey, Pause, RecordAttributes, RecordId, RecordOverrides,
    RecordStatus, Taxonomy, Term,
};
use crate::error::{ImportError, StoreError};
use crate::model::DocumentedEntity;
use crate::slug;

impl RecordAttributes {
    /// Default attributes for an entity, before overrides.
    pub fn for_entity(data: &DocumentedEntity, class_post_id: RecordId) -> Self {
        Self {
            title: data.name.clone(),
            slug: slug::normalize(&data.name),
            kind: EntityKind::Function,
            parent: class_post_id,
            status: RecordStatus::Published,
            summary: data.doc.description.clone(),
            body: data.doc.long_description.clone(),
        }
    }
}

impl<'a, S, P> Importer<'a, S, P>
where
    S: ContentStore,
    P: Pause,
{
    /// Inserts or updates the record for one function, method or class.
    ///
    /// The record is matched on `(slug, kind, parent)`, so importing the same
    /// entity again updates the record it created the first time. After the
    /// write, the `@since` term, the current source-file term and the
    /// argument/line/tag metadata are (re)attached.
    ///
    /// Entities tagged `@internal` return [`ItemOutcome::Skipped`] unless
    /// `import_internal` is set. A failed write is logged to
    /// [`Importer::errors`] and returned as [`ImportError::Write`].
    pub async fn import_item(
        &mut self,
        data: &DocumentedEntity,
        class_post_id: RecordId,
        import_internal: bool,
        overrides: RecordOverrides,
    ) -> Result<ItemOutcome, ImportError> {
        let role = Role::of(overrides.kind.unwrap_or(EntityKind::Function), class_post_id);

        if !import_internal && data.doc.tags.has("internal") {
            info!(
                %role,
                name = %data.name,
                "{}Skipped importing @internal {} \"{}\"",
                role.indent(),
                role,
                data.name
            );
            self.stats.skipped += 1;
            return Ok(ItemOutcome::Skipped);
        }

        let attrs = overrides.apply(RecordAttributes::for_entity(data, class_post_id));

        let store = self.store;
        let found = store.find_record(&attrs.slug, attrs.kind, attrs.parent).await;
        let existing = match found {
            Ok(existing) => existing,
            Err(e) => return Err(self.write_failed(role, &data.name, e)),
        };

        let written = match existing {
            Some(id) => store.update_record(id, &attrs).await,
            None => store.insert_record(&attrs).await,
        };
        let id = match written {
            Ok(id) if id != 0 => id,
            Ok(_) => {
                let e = StoreError::Rejected("store returned no record id".to_string());
                return Err(self.write_failed(role, &data.name, e));
            }
            Err(e) => return Err(self.write_failed(role, &data.name, e)),
        };
        debug!(
            %role,
            name = %data.name,
            record_id = id,
            slug = %attrs.slug,
            "[IMPORT] Record written"
        );

        if let Some(since) = data.doc.tags.first("since") {
            self.tag_since(id, &data.name, &since.content).await;
        }

        self.persist_auxiliary(id, data).await;

        let outcome = if existing.is_some() {
            self.stats.updated += 1;
            ItemOutcome::Updated(id)
        } else {
            self.stats.imported += 1;
            ItemOutcome::Imported(id)
        };
        let verb = if outcome.is_new() { "Imported" } else { "Updated" };
        info!(
            %role,
            name = %data.name,
            record_id = id,
            "{}{} {} \"{}\"",
            role.indent(),
            verb,
            role,
            data.name
        );
        Ok(outcome)
    }

    /// Attaches the `@since` term, creating it on first use. Failures only warn.
    async fn tag_since(&self, id: RecordId, name: &str, version: &str) {
        let version = version.trim();
        if version.is_empty() {
            warn!(name, record_id = id, "Cannot set @since term: empty @since tag");
            return;
        }

        let term = match self.resolve_since_term(version).await {
            Ok(term) => term,
            Err(e) => {
                warn!(name, record_id = id, version, error = %e, "Cannot set @since term: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.attach_term(id, term.id, Taxonomy::Since).await {
            warn!(name, record_id = id, version, error = %e, "Cannot set @since term: {}", e);
        }
    }

    async fn resolve_since_term(&self, version: &str) -> Result<Term, StoreError> {
        if let Some(term) = self.store.term_exists(version, Taxonomy::Since).await? {
            return Ok(term);
        }
        let term = self
            .store
            .create_term(version, Taxonomy::Since, &slug::normalize(version))
            .await?;
        debug!(version, term_id = term.id, "[IMPORT] Created @since term");
        Ok(term)
    }

    /// Source-file term plus argument, line and tag metadata. Last import wins.
    async fn persist_auxiliary(&self, id: RecordId, data: &DocumentedEntity) {
        match &self.file_meta {
            Some(file_meta) => {
                if let Err(e) = self
                    .store
                    .attach_term(id, file_meta.id, Taxonomy::SourceFile)
                    .await
                {
                    warn!(
                        name = %data.name,
                        record_id = id,
                        error = %e,
                        "Cannot set source file term"
                    );
                }
            }
            None => debug!(name = %data.name, "[IMPORT] No source file term active, skipping"),
        }

        let mut entries = vec![
            (MetaKey::Args, Value::Array(data.arguments.clone())),
            (MetaKey::LineNum, json!(data.line)),
        ];
        match serde_json::to_value(&data.doc.tags) {
            Ok(tags) => entries.push((MetaKey::Tags, tags)),
            Err(e) => {
                warn!(name = %data.name, record_id = id, error = %e, "Cannot serialize doc tags")
            }
        }
        for (key, value) in entries {
            self.set_meta(id, &data.name, key, value).await;
        }
    }

    pub(super) async fn set_meta(&self, id: RecordId, name: &str, key: MetaKey, value: Value) {
        if let Err(e) = self.store.set_metadata(id, key, value).await {
            warn!(name, record_id = id, %key, error = %e, "Cannot set record metadata");
        }
    }
}
