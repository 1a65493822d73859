use serde_json::Value;
use tracing::debug;

use super::{Importer, ItemOutcome};
use crate::contract::{ContentStore, EntityKind, MetaKey, NO_PARENT, Pause, RecordOverrides};
use crate::error::ImportError;
use crate::model::DocumentedEntity;

impl<'a, S, P> Importer<'a, S, P>
where
    S: ContentStore,
    P: Pause,
{
    /// Imports a class record, its class-only metadata and then its methods.
    ///
    /// If the class record itself fails (or is skipped as `@internal`) no
    /// metadata is written and no methods are imported. A failed method does
    /// not fail the class.
    pub async fn import_class(
        &mut self,
        data: &DocumentedEntity,
        import_internal: bool,
    ) -> Result<ItemOutcome, ImportError> {
        let outcome = self
            .import_item(
                data,
                NO_PARENT,
                import_internal,
                RecordOverrides::kind(EntityKind::Class),
            )
            .await?;
        let Some(class_id) = outcome.record_id() else {
            return Ok(outcome);
        };

        let flags = [
            (MetaKey::Final, Value::Bool(data.is_final)),
            (MetaKey::Abstract, Value::Bool(data.is_abstract)),
            (MetaKey::Static, Value::Bool(data.is_static)),
            (MetaKey::Visibility, Value::String(data.visibility.clone())),
        ];
        for (key, value) in flags {
            self.set_meta(class_id, &data.name, key, value).await;
        }

        for method in &data.methods {
            if let Err(e) = self
                .import_item(method, class_id, import_internal, RecordOverrides::default())
                .await
            {
                debug!(class = %data.name, error = %e, "[IMPORT] Continuing after failed method");
            }
        }

        Ok(outcome)
    }
}
