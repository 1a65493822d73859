use std::sync::{Arc, Mutex};

use docimport_core::contract::{MockContentStore, MockPause, RecordAttributes, NO_PARENT};
use docimport_core::model::{DocTag, DocTags, Docblock, DocumentedEntity, SourceFile};
use docimport_core::error::ConfigError;
use docimport_core::{
    ImportConfig, ImportError, Importer, ItemOutcome, StoreError, Taxonomy, Term,
};

fn entity(name: &str) -> DocumentedEntity {
    DocumentedEntity {
        name: name.to_string(),
        line: 1,
        doc: Docblock {
            description: format!("{name} summary"),
            ..Docblock::default()
        },
        ..DocumentedEntity::default()
    }
}

fn file_term(slug: &str) -> Term {
    Term {
        id: 500,
        name: "file.php".into(),
        slug: slug.into(),
        taxonomy: Taxonomy::SourceFile,
    }
}

/// A store where the source-file term already exists and every auxiliary write succeeds.
fn store_with_file_term(slug: &str) -> MockContentStore {
    let mut store = MockContentStore::new();
    let term = file_term(slug);
    store
        .expect_find_term_by_slug()
        .returning(move |_, _| Ok(Some(term.clone())));
    store.expect_attach_term().returning(|_, _, _| Ok(()));
    store.expect_set_metadata().returning(|_, _, _| Ok(()));
    store
}

fn quiet_pause() -> MockPause {
    let mut pause = MockPause::new();
    pause.expect_pause().returning(|_| ());
    pause
}

fn importer(store: &MockContentStore) -> Importer<'_, MockContentStore, MockPause> {
    Importer::with_pause(store, ImportConfig::default(), quiet_pause()).expect("valid config")
}

#[tokio::test]
async fn test_grouping_term_failure_aborts_the_file() {
    let mut store = MockContentStore::new();
    store.expect_find_term_by_slug().times(1).returning(|_, _| Ok(None));
    store
        .expect_create_term()
        .times(1)
        .returning(|_, _, _| Err(StoreError::Backend("connection reset".into())));
    store.expect_find_record().never();
    store.expect_insert_record().never();

    let file = SourceFile {
        path: "broken.php".into(),
        functions: vec![entity("a"), entity("b")],
        classes: vec![entity("C")],
        ..SourceFile::default()
    };

    let mut importer = importer(&store);
    importer.import_file(&file, true, false).await;

    assert_eq!(
        importer.errors(),
        &[
            "Problem creating file tax item \"broken-php\" for broken.php: backend error: connection reset".to_string(),
        ]
    );
    assert_eq!(importer.stats().imported, 0);
}

#[tokio::test]
async fn test_missing_term_after_create_aborts_the_file() {
    let mut store = MockContentStore::new();
    store.expect_find_term_by_slug().times(2).returning(|_, _| Ok(None));
    store.expect_create_term().times(1).returning(|name, taxonomy, slug| {
        Ok(Term {
            id: 1,
            name: name.to_string(),
            slug: slug.to_string(),
            taxonomy,
        })
    });
    store.expect_insert_record().never();

    let file = SourceFile {
        path: "ghost.php".into(),
        functions: vec![entity("a")],
        ..SourceFile::default()
    };

    let mut importer = importer(&store);
    importer.import_file(&file, true, false).await;

    assert_eq!(importer.errors().len(), 1);
    assert!(importer.errors()[0].starts_with("Problem creating file tax item \"ghost-php\""));
}

#[tokio::test]
async fn test_failed_method_does_not_block_siblings() {
    let mut store = store_with_file_term("klass-php");
    store.expect_find_record().returning(|_, _, _| Ok(None));

    let inserted = Arc::new(Mutex::new(Vec::<(String, u64)>::new()));
    let log = inserted.clone();
    let mut next_id = 0;
    store
        .expect_insert_record()
        .times(4)
        .returning(move |attrs: &RecordAttributes| {
            if attrs.slug == "method_two" {
                return Err(StoreError::Rejected("write refused".into()));
            }
            next_id += 1;
            log.lock().unwrap().push((attrs.slug.clone(), attrs.parent));
            Ok(next_id)
        });

    let class = DocumentedEntity {
        methods: vec![entity("method_one"), entity("method_two"), entity("method_three")],
        ..entity("Klass")
    };
    let file = SourceFile {
        path: "klass.php".into(),
        classes: vec![class],
        ..SourceFile::default()
    };

    let mut importer = importer(&store);
    importer.import_file(&file, true, false).await;

    let inserted = inserted.lock().unwrap().clone();
    assert_eq!(
        inserted,
        vec![
            ("klass".to_string(), NO_PARENT),
            ("method_one".to_string(), 1),
            ("method_three".to_string(), 1),
        ]
    );
    assert_eq!(
        importer.errors(),
        &[
            "\t\tProblem inserting/updating post for method \"method_two\": write refused".to_string(),
        ]
    );
    assert_eq!(importer.stats().imported, 3);
    assert_eq!(importer.stats().failed, 1);
}

#[tokio::test]
async fn test_failed_class_skips_metadata_and_methods() {
    let mut store = MockContentStore::new();
    store.expect_find_record().times(1).returning(|_, _, _| Ok(None));
    store
        .expect_insert_record()
        .times(1)
        .returning(|_| Err(StoreError::Rejected("class table locked".into())));
    store.expect_set_metadata().never();
    store.expect_attach_term().never();

    let class = DocumentedEntity {
        is_abstract: true,
        methods: vec![entity("run")],
        ..entity("Broken_Class")
    };

    let mut importer = importer(&store);
    let result = importer.import_class(&class, false).await;

    match result {
        Err(ImportError::Write { name, .. }) => assert_eq!(name, "Broken_Class"),
        other => panic!("expected a write failure, got {other:?}"),
    }
    assert_eq!(
        importer.errors(),
        &[
            "\tProblem inserting/updating post for class \"Broken_Class\": class table locked".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_function_is_reported_with_function_wording() {
    let mut store = MockContentStore::new();
    store
        .expect_find_record()
        .returning(|_, _, _| Err(StoreError::Backend("timeout".into())));
    store.expect_insert_record().never();
    store.expect_update_record().never();

    let mut importer = importer(&store);
    let result = importer
        .import_item(&entity("get_post"), NO_PARENT, false, Default::default())
        .await;

    assert!(result.is_err());
    assert_eq!(
        importer.errors(),
        &[
            "\tProblem inserting/updating post for function \"get_post\": backend error: timeout".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_zero_record_id_counts_as_failure() {
    let mut store = MockContentStore::new();
    store.expect_find_record().returning(|_, _, _| Ok(Some(7)));
    store.expect_update_record().times(1).returning(|_, _| Ok(0));
    store.expect_set_metadata().never();

    let mut importer = importer(&store);
    let result = importer
        .import_item(&entity("get_post"), NO_PARENT, false, Default::default())
        .await;

    assert!(matches!(result, Err(ImportError::Write { .. })));
    assert_eq!(importer.errors().len(), 1);
}

#[tokio::test]
async fn test_since_term_failure_only_warns() {
    let mut store = store_with_file_term("f-php");
    store.expect_find_record().returning(|_, _, _| Ok(None));
    store.expect_insert_record().returning(|_| Ok(11));
    store
        .expect_term_exists()
        .returning(|_, _| Err(StoreError::Backend("taxonomy offline".into())));
    store.expect_create_term().never();

    let mut data = entity("get_post");
    data.doc.tags = DocTags::from(vec![DocTag::new("since", "2.0")]);

    let mut importer = importer(&store);
    importer
        .import_file(
            &SourceFile {
                path: "f.php".into(),
                ..SourceFile::default()
            },
            true,
            false,
        )
        .await;
    let outcome = importer
        .import_item(&data, NO_PARENT, false, Default::default())
        .await
        .expect("since failure must not fail the entity");

    assert_eq!(outcome, ItemOutcome::Imported(11));
    assert!(importer.errors().is_empty());
}

#[tokio::test]
async fn test_since_term_is_created_once_then_reused() {
    let mut store = store_with_file_term("f-php");
    store.expect_find_record().returning(|_, _, _| Ok(None));
    let mut next_id = 100;
    store.expect_insert_record().returning(move |_| {
        next_id += 1;
        Ok(next_id)
    });

    let created = Arc::new(Mutex::new(None::<Term>));
    let lookup = created.clone();
    store
        .expect_term_exists()
        .withf(|value, taxonomy| value == "2.0" && *taxonomy == Taxonomy::Since)
        .returning(move |_, _| Ok(lookup.lock().unwrap().clone()));
    let store_created = created.clone();
    store
        .expect_create_term()
        .times(1)
        .returning(move |name, taxonomy, slug| {
            let term = Term {
                id: 9,
                name: name.to_string(),
                slug: slug.to_string(),
                taxonomy,
            };
            *store_created.lock().unwrap() = Some(term.clone());
            Ok(term)
        });

    let with_since = |name: &str| DocumentedEntity {
        doc: Docblock {
            tags: DocTags::from(vec![DocTag::new("since", "2.0")]),
            ..Docblock::default()
        },
        ..entity(name)
    };
    let file = SourceFile {
        path: "f.php".into(),
        functions: vec![with_since("one"), with_since("two")],
        ..SourceFile::default()
    };

    let mut importer = importer(&store);
    importer.import_file(&file, true, false).await;

    assert!(importer.errors().is_empty());
    assert_eq!(created.lock().unwrap().as_ref().map(|t| t.slug.as_str()), Some("2-0"));
}

#[tokio::test]
async fn test_errors_accumulate_across_files() {
    let mut store = MockContentStore::new();
    store.expect_find_term_by_slug().returning(|_, _| Ok(None));
    store
        .expect_create_term()
        .returning(|_, _, _| Err(StoreError::Rejected("read-only".into())));

    let files = vec![
        SourceFile {
            path: "one.php".into(),
            ..SourceFile::default()
        },
        SourceFile {
            path: "two.php".into(),
            ..SourceFile::default()
        },
    ];

    let config = ImportConfig {
        skip_throttle: true,
        ..ImportConfig::default()
    };
    let mut importer = Importer::with_pause(&store, config, quiet_pause()).expect("valid config");
    let report = importer.import(&files).await;

    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].contains("one.php"));
    assert!(report.errors[1].contains("two.php"));
    assert_eq!(importer.errors().len(), 2);
}

#[test]
fn test_importer_rejects_zero_throttle_batch() {
    let store = MockContentStore::new();
    let config = ImportConfig {
        throttle_batch: 0,
        ..ImportConfig::default()
    };

    let result = Importer::with_pause(&store, config.clone(), MockPause::new());
    assert!(matches!(result, Err(ConfigError::ZeroThrottleBatch)));
    assert!(matches!(
        Importer::new(&store, config),
        Err(ConfigError::ZeroThrottleBatch)
    ));
}

#[tokio::test]
async fn test_failed_grouping_term_clears_previous_file_term() {
    let mut store = MockContentStore::new();
    store.expect_find_term_by_slug().returning(|slug, _| {
        if slug == "good-php" {
            Ok(Some(file_term("good-php")))
        } else {
            Err(StoreError::Backend("taxonomy offline".into()))
        }
    });

    let mut importer = importer(&store);
    importer
        .import_file(
            &SourceFile {
                path: "good.php".into(),
                ..SourceFile::default()
            },
            true,
            false,
        )
        .await;
    assert_eq!(importer.file_meta().map(|t| t.slug.as_str()), Some("good-php"));

    importer
        .import_file(
            &SourceFile {
                path: "bad.php".into(),
                ..SourceFile::default()
            },
            true,
            false,
        )
        .await;
    assert!(importer.file_meta().is_none());
    assert_eq!(importer.errors().len(), 1);
}
