use tracing::{debug, error, info};

use super::Importer;
use crate::contract::{ContentStore, Pause, RecordOverrides, Taxonomy, Term, NO_PARENT};
use crate::error::{ImportError, StoreError};
use crate::model::SourceFile;
use crate::slug;

impl<'a, S, P> Importer<'a, S, P>
where
    S: ContentStore,
    P: Pause,
{
    /// Imports one parsed file: its source-file term, then every top-level
    /// function, then every class with its methods.
    ///
    /// Failures are only visible through [`Importer::errors`]. If the
    /// source-file term cannot be resolved nothing from the file is imported.
    pub async fn import_file(
        &mut self,
        file: &SourceFile,
        skip_throttle: bool,
        import_internal: bool,
    ) {
        // --- Step 1: resolve (or create) the source-file term ---
        self.file_meta = None;
        let file_meta = match self.resolve_file_term(file).await {
            Ok(term) => term,
            Err(e) => {
                error!(
                    file = %file.path,
                    error = %e,
                    "[IMPORT][ERROR] Aborting file, source file term unavailable"
                );
                self.errors.push(e.to_string());
                return;
            }
        };
        debug!(
            file = %file.path,
            term_id = file_meta.id,
            slug = %file_meta.slug,
            "[IMPORT][FILE] Source file term ready"
        );
        self.file_meta = Some(file_meta);

        // --- Step 2: top-level functions ---
        let mut count = 0;
        for function in &file.functions {
            if let Err(e) = self
                .import_item(function, NO_PARENT, import_internal, RecordOverrides::default())
                .await
            {
                debug!(error = %e, "[IMPORT] Continuing after failed function");
            }
            count += 1;
            self.throttle(count, skip_throttle).await;
        }

        // --- Step 3: classes and their methods ---
        let mut count = 0;
        for class in &file.classes {
            if let Err(e) = self.import_class(class, import_internal).await {
                debug!(error = %e, "[IMPORT] Continuing after failed class");
            }
            count += 1;
            self.throttle(count, skip_throttle).await;
        }

        info!(
            file = %file.path,
            functions = file.functions.len(),
            classes = file.classes.len(),
            "[IMPORT][FILE] File processed"
        );
    }

    async fn resolve_file_term(&self, file: &SourceFile) -> Result<Term, ImportError> {
        let slug = slug::file_slug(&file.path);
        let grouping_error = |source: StoreError| ImportError::GroupingTerm {
            slug: slug.clone(),
            path: file.path.clone(),
            source,
        };

        let existing = self
            .store
            .find_term_by_slug(&slug, Taxonomy::SourceFile)
            .await
            .map_err(&grouping_error)?;
        if existing.is_none() {
            let created = self
                .store
                .create_term(&file.path, Taxonomy::SourceFile, &slug)
                .await
                .map_err(&grouping_error)?;
            info!(
                file = %file.path,
                term_id = created.id,
                "[IMPORT][FILE] Created source file term"
            );
        }

        // Re-read: some stores only return a partial term from create.
        self.store
            .find_term_by_slug(&slug, Taxonomy::SourceFile)
            .await
            .map_err(&grouping_error)?
            .ok_or_else(|| grouping_error(StoreError::NotFound(format!("source file term {slug}"))))
    }

    /// Pauses after every full batch of `throttle_batch` items.
    async fn throttle(&self, count: usize, skip_throttle: bool) {
        if skip_throttle || count % self.config.throttle_batch != 0 {
            return;
        }
        debug!(
            items = count,
            pause_ms = self.config.throttle_pause.as_millis() as u64,
            "[IMPORT] Throttling between batches"
        );
        self.pause.pause(self.config.throttle_pause).await;
    }
}
