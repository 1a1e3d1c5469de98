//! Export/import integration tests.
//!
//! Drives the two orchestrators end to end against the in-memory store and
//! real files: label export, table import with identifier rebinding, and a
//! full round trip through a zip archive.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::fs;
use tabgraph::io::RunState;
use tabgraph::{
    Direction, ExportOptions, ExportService, GraphStore, ImportOptions, ImportService,
    InMemoryGraphStore, IoConfig, PropertyMap, PropertyValue,
};
use tempfile::TempDir;

fn props(pairs: &[(&str, PropertyValue)]) -> PropertyMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Three people (one without an age) and two cities.
fn people_and_cities() -> InMemoryGraphStore {
    let store = InMemoryGraphStore::new();
    let person = labels(&["Person"]);
    let city = labels(&["City"]);

    let alice = store
        .create_node(&person, props(&[("name", "Alice".into()), ("age", 30_i64.into())]))
        .unwrap();
    let bob = store
        .create_node(&person, props(&[("name", "Bob".into())]))
        .unwrap();
    store
        .create_node(&person, props(&[("name", "Carol".into()), ("age", 41_i64.into())]))
        .unwrap();
    let paris = store
        .create_node(&city, props(&[("name", "Paris".into())]))
        .unwrap();
    store
        .create_node(&city, props(&[("name", "Lyon".into())]))
        .unwrap();

    store
        .create_relationship(alice, bob, "KNOWS", PropertyMap::new())
        .unwrap();
    store
        .create_relationship(alice, paris, "LIVES_IN", PropertyMap::new())
        .unwrap();
    store
}

/// Counts nodes per label and relationships per type.
fn census(store: &InMemoryGraphStore, node_labels: &[&str]) -> (BTreeMap<String, usize>, BTreeMap<String, usize>) {
    let mut nodes = BTreeMap::new();
    let mut relationships = BTreeMap::new();
    for label in node_labels {
        let found = store.find_nodes(label).unwrap();
        nodes.insert((*label).to_string(), found.len());
        for node in found {
            for rel in store.relationships(node.id, Direction::Outgoing).unwrap() {
                *relationships.entry(rel.rel_type).or_insert(0) += 1;
            }
        }
    }
    (nodes, relationships)
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_single_label_table() {
    let store = people_and_cities();
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(&store, IoConfig::default());

    let result = service
        .export(&ExportOptions::new(["Person"], dir.path()).with_relationships(false))
        .unwrap();

    let entries: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, ["node_Person.csv"]);

    let text = fs::read_to_string(dir.path().join("node_Person.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "id;age;name");
    assert_eq!(lines.len(), 4);
    assert!(lines.contains(&"1;;Bob"));
    assert_eq!(result.nodes_written, 3);
    assert_eq!(result.states.last(), Some(&RunState::Done));
}

#[test]
fn test_export_empty_label_list_rejected() {
    let store = people_and_cities();
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(&store, IoConfig::default());

    let err = service
        .export(&ExportOptions::new(Vec::<String>::new(), dir.path()))
        .unwrap_err();
    assert!(matches!(err, tabgraph::Error::InvalidInput(_)));
}

#[test]
fn test_export_only_missing_labels_fails() {
    let store = people_and_cities();
    let dir = TempDir::new().unwrap();
    let service = ExportService::new(&store, IoConfig::default());

    let result = service.export(&ExportOptions::new(["Ghost"], dir.path()));
    assert!(result.is_err());
    assert!(!store.in_transaction());
}

// ============================================================================
// Import
// ============================================================================

#[test]
fn test_import_skips_dangling_relationships() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("node_A.csv"), "id;name\n1;one\n2;two\n").unwrap();
    fs::write(
        dir.path().join("relationship_R.csv"),
        "source;destination\n1;2\n1;99\n",
    )
    .unwrap();

    let store = InMemoryGraphStore::new();
    let service = ImportService::new(&store, IoConfig::default());
    let result = service.import(&ImportOptions::new(dir.path())).unwrap();

    assert_eq!(result.nodes_created, 2);
    assert_eq!(result.relationships_created, 1);
    assert_eq!(result.relationships_skipped, 1);
    assert_eq!(result.files_ignored, 0);
    assert_eq!(store.node_count(), 2);
    assert_eq!(store.relationship_count(), 1);

    let nodes = store.find_nodes("A").unwrap();
    let one = nodes
        .iter()
        .find(|n| n.properties.get("name") == Some(&PropertyValue::from("one")))
        .unwrap();
    let outgoing = store.relationships(one.id, Direction::Outgoing).unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].rel_type, "R");
}

#[test]
fn test_import_ignores_unrecognized_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("node_A.csv"), "id;n\n1;5\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "hello").unwrap();

    let store = InMemoryGraphStore::new();
    let service = ImportService::new(&store, IoConfig::default());
    let result = service.import(&ImportOptions::new(dir.path())).unwrap();

    assert_eq!(result.node_files_processed, 1);
    assert_eq!(result.files_ignored, 1);
    let node = &store.find_nodes("A").unwrap()[0];
    assert_eq!(node.properties.get("n"), Some(&PropertyValue::Integer(5)));
}

#[test]
fn test_import_missing_path_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = InMemoryGraphStore::new();
    let service = ImportService::new(&store, IoConfig::default());

    let err = service
        .import(&ImportOptions::new(dir.path().join("absent.zip")))
        .unwrap_err();
    assert!(matches!(err, tabgraph::Error::NotFound(_)));
    assert_eq!(store.node_count(), 0);
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_roundtrip_through_archive() {
    let source = people_and_cities();
    let dir = TempDir::new().unwrap();

    let exported = ExportService::new(&source, IoConfig::default())
        .export(
            &ExportOptions::new(["Person"], dir.path())
                .with_neighbors(true)
                .with_archive_name("graph"),
        )
        .unwrap();
    let archive = exported.archive.clone().unwrap();
    assert!(archive.ends_with("graph.zip"));
    assert!(!dir.path().join("node_Person.csv").exists());

    let target = InMemoryGraphStore::new();
    let imported = ImportService::new(&target, IoConfig::default())
        .import(&ImportOptions::new(&archive))
        .unwrap();

    assert_eq!(imported.node_files_processed, 2);
    assert_eq!(imported.relationship_files_processed, 2);
    assert_eq!(imported.nodes_created, exported.nodes_written);
    assert_eq!(imported.relationships_created, exported.relationships_written);
    assert_eq!(
        census(&source, &["Person", "City"]),
        census(&target, &["Person", "City"])
    );
}

#[test]
fn test_roundtrip_preserves_endpoints() {
    let source = people_and_cities();
    let dir = TempDir::new().unwrap();

    ExportService::new(&source, IoConfig::default())
        .export(&ExportOptions::new(["Person", "City"], dir.path()))
        .unwrap();
    let target = InMemoryGraphStore::new();
    ImportService::new(&target, IoConfig::default())
        .import(&ImportOptions::new(dir.path()))
        .unwrap();

    let name_of = |store: &InMemoryGraphStore, id| {
        store.get_node(id).unwrap().unwrap().properties.get("name").cloned()
    };
    let alice = target
        .find_nodes("Person")
        .unwrap()
        .into_iter()
        .find(|n| n.properties.get("name") == Some(&PropertyValue::from("Alice")))
        .unwrap();

    let mut neighbors: Vec<_> = target
        .relationships(alice.id, Direction::Outgoing)
        .unwrap()
        .into_iter()
        .map(|r| (r.rel_type.clone(), name_of(&target, r.destination)))
        .collect();
    neighbors.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        neighbors,
        [
            ("KNOWS".to_string(), Some(PropertyValue::from("Bob"))),
            ("LIVES_IN".to_string(), Some(PropertyValue::from("Paris"))),
        ]
    );
}

#[test]
fn test_roundtrip_custom_delimiter() {
    let source = people_and_cities();
    let dir = TempDir::new().unwrap();
    let config = IoConfig::default().with_delimiter(',');

    ExportService::new(&source, config.clone())
        .export(&ExportOptions::new(["City"], dir.path()))
        .unwrap();
    let text = fs::read_to_string(dir.path().join("node_City.csv")).unwrap();
    assert_eq!(text.lines().next(), Some("id,name"));

    let target = InMemoryGraphStore::new();
    let result = ImportService::new(&target, config)
        .import(&ImportOptions::new(dir.path()))
        .unwrap();
    assert_eq!(result.nodes_created, 2);
}

#[test]
fn test_roundtrip_keeps_properties_named_like_other_tables_columns() {
    let source = InMemoryGraphStore::new();
    let person = labels(&["Person"]);
    let alice = source
        .create_node(&person, props(&[("name", "Alice".into()), ("source", "wikipedia".into())]))
        .unwrap();
    let bob = source
        .create_node(&person, props(&[("name", "Bob".into())]))
        .unwrap();
    source
        .create_relationship(alice, bob, "KNOWS", props(&[("id", "abc-1".into())]))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let exported = ExportService::new(&source, IoConfig::default())
        .export(&ExportOptions::new(["Person"], dir.path()))
        .unwrap();
    assert!(exported.shadowed_properties.is_empty());

    let node_text = fs::read_to_string(dir.path().join("node_Person.csv")).unwrap();
    assert_eq!(node_text.lines().next(), Some("id;name;source"));
    let rel_text = fs::read_to_string(dir.path().join("relationship_KNOWS.csv")).unwrap();
    assert_eq!(rel_text.lines().next(), Some("source;destination;id"));

    let target = InMemoryGraphStore::new();
    ImportService::new(&target, IoConfig::default())
        .import(&ImportOptions::new(dir.path()))
        .unwrap();

    let alice = target
        .find_nodes("Person")
        .unwrap()
        .into_iter()
        .find(|n| n.properties.get("name") == Some(&PropertyValue::from("Alice")))
        .unwrap();
    assert_eq!(
        alice.properties.get("source"),
        Some(&PropertyValue::from("wikipedia"))
    );
    let knows = target.relationships(alice.id, Direction::Outgoing).unwrap();
    assert_eq!(knows.len(), 1);
    assert_eq!(
        knows[0].properties.get("id"),
        Some(&PropertyValue::from("abc-1"))
    );
}

#[test]
fn test_export_reports_properties_shadowed_by_reserved_columns() {
    let source = InMemoryGraphStore::new();
    source
        .create_node(&labels(&["Person"]), props(&[("id", 7_i64.into()), ("name", "Alice".into())]))
        .unwrap();

    let dir = TempDir::new().unwrap();
    let exported = ExportService::new(&source, IoConfig::default())
        .export(&ExportOptions::new(["Person"], dir.path()).with_relationships(false))
        .unwrap();

    assert_eq!(exported.shadowed_properties, ["Person.id"]);
    assert!(exported
        .summary()
        .iter()
        .any(|line| line.ends_with("reserved column: Person.id")));
    let text = fs::read_to_string(dir.path().join("node_Person.csv")).unwrap();
    assert_eq!(text.lines().next(), Some("id;name"));
}
