//! Integration tests for the incremental driver and write-section isolation.

mod common;

use common::*;
use cxindex_core::{
    IndexingConfig, NameRole, PersistedRef, RecordId, StorageConfig, TranslationUnit,
};
use cxindex_linkage::c_linkage::C_VARIABLE;
use cxindex_linkage::{Database, Indexer, Linkage};
use std::rc::Rc;

fn units<'a>(units: &'a [MockUnit]) -> impl Iterator<Item = &'a dyn TranslationUnit> {
    units.iter().map(|u| u as &dyn TranslationUnit)
}

fn file_database(dir: &tempfile::TempDir) -> Database {
    let config = StorageConfig {
        reader_connections: 2,
        ..StorageConfig::default()
    };
    Database::open_at(&dir.path().join("index.db"), &config).unwrap()
}

fn lookup(db: &Database, name: &str, role: NameRole) -> usize {
    db.store()
        .read(|reader| {
            db.c_linkage()
                .resolve_binding(reader, &MockName::new(name, role, Target::Unresolved))
        })
        .unwrap()
        .len()
}

fn geometry_unit() -> MockUnit {
    let point = structure("point");
    let area = function("area");
    MockUnit::new(
        "geometry.c",
        "struct point { int x; int y; }; int area(void);",
        vec![
            MockName::defining(&point),
            MockName::defining(&field(&point, "x")),
            MockName::defining(&field(&point, "y")),
            MockName::defining(&area),
            MockName::referring(&area, NameRole::CallTarget),
        ],
    )
}

#[test]
fn indexes_units_and_skips_unchanged_ones() {
    let db = Database::open_in_memory().unwrap();
    let batch = vec![geometry_unit()];

    let mut indexer = Indexer::new(&db, IndexingConfig::default());
    let first = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(first.units_indexed, 1);
    assert_eq!(first.names_seen, 5);
    assert_eq!(first.bindings_recorded, 5);
    assert!(first.records_created >= 4);
    assert_eq!(lookup(&db, "area", NameRole::CallTarget), 1);

    let second = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(second.units_skipped, 1);
    assert_eq!(second.units_indexed, 0);

    // A fresh indexer picks the committed hashes up from the store.
    let mut reopened = Indexer::new(&db, IndexingConfig::default());
    assert_eq!(reopened.change_detector().tracked_count(), 1);
    let third = reopened.index_units(units(&batch)).unwrap();
    assert_eq!(third.units_skipped, 1);
}

#[test]
fn reindexing_unchanged_content_creates_nothing_new() {
    let db = Database::open_in_memory().unwrap();
    let config = IndexingConfig {
        skip_unchanged: false,
        refresh_definitions: false,
    };
    let batch = vec![geometry_unit()];

    let mut indexer = Indexer::new(&db, config);
    indexer.index_units(units(&batch)).unwrap();
    let again = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(again.units_indexed, 1);
    assert_eq!(again.bindings_recorded, 5);
    assert_eq!(again.records_created, 0);
}

#[test]
fn failing_unit_is_abandoned_without_affecting_others() {
    let db = Database::open_in_memory().unwrap();

    let mut dangling = Decl::new(Kind::Variable, "dangling");
    dangling.persisted = Some(PersistedRef {
        store: db.store().id().clone(),
        record: RecordId(9_999),
        node_type: C_VARIABLE,
    });
    let dangling = dangling.rc();
    let early = variable("early");

    let batch = vec![
        geometry_unit(),
        MockUnit::new(
            "broken.c",
            "int early; int dangling;",
            vec![
                MockName::defining(&early),
                MockName::referring(&dangling, NameRole::IdExpression),
            ],
        ),
    ];

    let mut indexer = Indexer::new(&db, IndexingConfig::default());
    let result = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(result.units_seen, 2);
    assert_eq!(result.units_indexed, 1);
    assert_eq!(result.units_failed, 1);

    assert_eq!(lookup(&db, "area", NameRole::CallTarget), 1);
    assert_eq!(
        lookup(&db, "early", NameRole::IdExpression),
        0,
        "writes of the abandoned unit must be rolled back"
    );
    let hashes = db.store().load_unit_hashes().unwrap();
    assert!(hashes.contains_key("geometry.c"));
    assert!(!hashes.contains_key("broken.c"));
}

#[test]
fn unknown_linkage_fails_only_that_unit() {
    let db = Database::open_in_memory().unwrap();
    let mut cpp = MockUnit::new("widget.cpp", "class W {};", Vec::new());
    cpp.linkage = "C++".to_string();
    let batch = vec![cpp, geometry_unit()];

    let mut indexer = Indexer::new(&db, IndexingConfig::default());
    let result = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(result.units_failed, 1);
    assert_eq!(result.units_indexed, 1);
}

#[test]
fn refresh_at_definitions_updates_existing_bindings() {
    let db = Database::open_in_memory().unwrap();
    let mut indexer = Indexer::new(&db, IndexingConfig::default());

    let first = variable("limit");
    let batch = vec![MockUnit::new("limits.c", "int limit;", vec![MockName::defining(&first)])];
    indexer.index_units(units(&batch)).unwrap();

    let mut now_static = Decl::new(Kind::Variable, "limit").with_type(int());
    now_static.is_static = true;
    let now_static = now_static.rc();
    let batch = vec![MockUnit::new(
        "limits.c",
        "static int limit;",
        vec![MockName::defining(&now_static)],
    )];
    let result = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(result.units_indexed, 1);

    let stored = db
        .store()
        .read(|reader| db.c_linkage().adapt_binding(reader, &*first))
        .unwrap()
        .unwrap();
    assert!(db.c_linkage().is_file_local_binding(&stored));
}

#[test]
fn forgetting_a_unit_forces_reindex() {
    let db = Database::open_in_memory().unwrap();
    let batch = vec![geometry_unit()];
    let mut indexer = Indexer::new(&db, IndexingConfig::default());
    indexer.index_units(units(&batch)).unwrap();

    assert!(indexer.forget_unit("geometry.c").unwrap());
    assert!(!indexer.forget_unit("geometry.c").unwrap());
    let result = indexer.index_units(units(&batch)).unwrap();
    assert_eq!(result.units_indexed, 1);
}

// ── Write-section visibility ───────────────────────────────────────────────

#[test]
fn readers_never_observe_uncommitted_bindings() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir);
    let linkage = db.c_linkage();
    let pending = variable("pending");

    let section = db.store().begin_write().unwrap();
    let binding = linkage.add_binding(&section, &*pending).unwrap().unwrap();
    assert!(linkage
        .adapt_binding(&section.reader(), &*pending)
        .unwrap()
        .is_some());
    assert_eq!(lookup(&db, "pending", NameRole::IdExpression), 0);

    section.commit().unwrap();
    assert_eq!(lookup(&db, "pending", NameRole::IdExpression), 1);
    let node = db
        .store()
        .read(|reader| linkage.get_node(reader, binding.record()))
        .unwrap();
    assert!(node.is_some());
}

#[test]
fn abandoned_section_leaves_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir);
    let linkage = db.c_linkage();
    let before = db.store().read(|reader| reader.record_count()).unwrap();

    let point = structure("point");
    let section = db.store().begin_write().unwrap();
    for name in ["x", "y", "z"] {
        linkage.add_binding(&section, &*field(&point, name)).unwrap();
    }
    section.abandon().unwrap();

    assert_eq!(db.store().read(|reader| reader.record_count()).unwrap(), before);
    assert_eq!(lookup(&db, "point", NameRole::ElaboratedType), 0);

    // Dropping an open section behaves the same.
    {
        let section = db.store().begin_write().unwrap();
        linkage.add_binding(&section, &*point).unwrap();
    }
    assert_eq!(db.store().read(|reader| reader.record_count()).unwrap(), before);
}

#[test]
fn committed_bindings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let colors: Rc<Decl>;
    {
        let db = file_database(&dir);
        colors = enumeration("colors");
        let batch = vec![MockUnit::new(
            "colors.c",
            "enum colors { RED, GREEN };",
            vec![
                MockName::defining(&colors),
                MockName::defining(&enumerator(&colors, "RED", 0)),
                MockName::defining(&enumerator(&colors, "GREEN", 1)),
            ],
        )];
        let result = Indexer::new(&db, IndexingConfig::default())
            .index_units(units(&batch))
            .unwrap();
        assert_eq!(result.units_indexed, 1);
    }

    let db = file_database(&dir);
    let linkage = db.c_linkage();
    let stored = db
        .store()
        .read(|reader| linkage.adapt_binding(reader, &*colors))
        .unwrap()
        .unwrap();
    let members = db
        .store()
        .read(|reader| stored.read_members(reader, linkage))
        .unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(lookup(&db, "GREEN", NameRole::IdExpression), 1);
}
