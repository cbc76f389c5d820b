use pretty_assertions::assert_eq;
use serde_json::json;

use ontograph::error::LoadError;
use ontograph::loader::{Dialect, OntologyLoader, parse_with_report};
use ontograph::ontology::Ontology;
use ontograph::{build_graph, parse_ontology};

// =============================================================================
// Standard dialect
// =============================================================================

#[test]
fn spec_standard_self_loop() {
    let doc = json!({
        "classes": {"Person": {"@id": "schema:Person", "rdfs:label": "Person"}},
        "relationships": {"knows": {"rdfs:domain": "schema:Person", "rdfs:range": "schema:Person"}}
    });
    let ontology = parse_ontology(&doc, "people.json").unwrap();
    assert_eq!(ontology.entities.len(), 1);
    assert_eq!(ontology.entities[0].label, "Person");
    assert_eq!(ontology.relationships.len(), 1);
    assert_eq!(ontology.relationships[0].source, "schema:Person");
    assert_eq!(ontology.relationships[0].target, "schema:Person");

    let graph = build_graph(&ontology);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.contains_edge("schema:Person", "schema:Person"));
}

#[test]
fn spec_standard_header_fields() {
    let doc = json!({
        "@id": "test:ontology",
        "name": "Test Ontology",
        "version": "1.0.0",
        "classes": {"Person": {"rdfs:label": "Person", "w4m:entityType": "Core"}},
        "relationships": {
            "knows": {
                "rdfs:domain": "Person",
                "rdfs:range": "Person",
                "w4m:cardinality": "n:m"
            }
        }
    });
    let ontology = parse_ontology(&doc, "test.json").unwrap();
    assert_eq!(ontology.id, "test:ontology");
    assert_eq!(ontology.name, "Test Ontology");
    assert_eq!(ontology.version, "1.0.0");
    assert_eq!(ontology.entities[0].entity_type, "Core");
    assert_eq!(ontology.relationships[0].cardinality, "n:m");
}

#[test]
fn spec_standard_defaults() {
    let doc = json!({"classes": {"Thing": {}}, "relationships": {"r": {}}});
    let ontology = parse_ontology(&doc, "dir/things.json").unwrap();
    assert_eq!(ontology.name, "things");
    assert_eq!(ontology.version, "1.0.0");
    assert_eq!(ontology.entities[0].id, "Thing");
    assert_eq!(ontology.entities[0].entity_type, "Class");
    assert_eq!(ontology.relationships[0].cardinality, "1:*");
    assert_eq!(ontology.relationships[0].source, "");
}

#[test]
fn spec_standard_round_trip() {
    let doc = json!({
        "name": "Round",
        "version": "3.1.0",
        "classes": {"A": {}, "B": {"rdfs:subClassOf": "A"}},
        "relationships": {"ab": {"rdfs:domain": "A", "rdfs:range": "B"}}
    });
    let ontology = parse_ontology(&doc, "round.json").unwrap();
    let back: Ontology = serde_json::from_value(ontology.to_value()).unwrap();
    assert_eq!(back.name, "Round");
    assert_eq!(back.version, "3.1.0");
    assert_eq!(back.entities.len(), 2);
    assert_eq!(back.relationships.len(), 1);
    assert_eq!(back, ontology);
}

// =============================================================================
// Registry dialects
// =============================================================================

#[test]
fn spec_registry_entry_summary() {
    let doc = json!({
        "@context": {"@vocab": "https://schema.org/"},
        "@id": "registry:entry:test",
        "registryEntry": {
            "ontologyId": "test:ont",
            "version": "2.0.0",
            "domain": "Testing",
            "entities": {"count": 3, "list": ["A", "B", "C"]},
            "relationships": {"count": 2, "list": ["r1", "r2"]}
        }
    });
    let (ontology, report) = parse_with_report(&doc, "registry.json").unwrap();
    assert_eq!(report.dialect, Dialect::Registry);
    assert_eq!(ontology.version, "2.0.0");
    assert_eq!(ontology.name, "Testing");
    assert_eq!(ontology.entities.len(), 3);
    assert_eq!(ontology.relationships.len(), 2);

    let graph = build_graph(&ontology);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn spec_registry_tolerates_null_ids() {
    let doc = json!({"registryEntry": {"entities": {"list": ["A", null, "C"]}}});
    let (ontology, report) = parse_with_report(&doc, "registry.json").unwrap();
    assert_eq!(ontology.entities.len(), 2);
    assert_eq!(report.skipped, vec!["registryEntry.entities.list[1]".to_string()]);
    assert_eq!(build_graph(&ontology).node_count(), 2);
}

#[test]
fn spec_uniregistry_wraps_standard() {
    let doc = json!({
        "ontologyDefinition": {
            "name": "Wrapped",
            "classes": {"Order": {}, "Line": {}},
            "relationships": {"has": {"rdfs:domain": "Order", "rdfs:range": "Line"}}
        },
        "registryMetadata": {"owner": "sales"}
    });
    let (ontology, report) = parse_with_report(&doc, "uni.json").unwrap();
    assert_eq!(report.dialect, Dialect::UniRegistry);
    assert_eq!(ontology.name, "Wrapped");
    assert_eq!(ontology.entities.len(), 2);
    assert_eq!(ontology.metadata["registryMetadata"], json!({"owner": "sales"}));
}

// =============================================================================
// @graph and inferred dialects
// =============================================================================

#[test]
fn spec_graph_dialect_classifies_nodes() {
    let doc = json!({
        "@graph": [
            {"@id": "ex:Person", "@type": "owl:Class", "rdfs:label": "Person"},
            {"@id": "ex:Org", "@type": ["rdfs:Class"], "rdfs:label": "Org"},
            {"@id": "ex:worksFor", "@type": "owl:ObjectProperty",
             "rdfs:domain": {"@id": "ex:Person"}, "rdfs:range": {"@id": "ex:Org"}},
            {"@id": "ex:alice", "@type": "ex:Person"}
        ]
    });
    let (ontology, report) = parse_with_report(&doc, "graph.json").unwrap();
    assert_eq!(report.dialect, Dialect::Graph);
    assert_eq!(ontology.entities.len(), 2);
    assert_eq!(ontology.relationships[0].source, "ex:Person");
    assert_eq!(ontology.relationships[0].target, "ex:Org");
    assert_eq!(report.skipped, vec!["ex:alice".to_string()]);
}

#[test]
fn spec_graph_dialect_reads_subclass_of() {
    let doc = json!({
        "@graph": [
            {"@id": "ex:Animal", "@type": "owl:Class"},
            {"@id": "ex:Dog", "@type": "owl:Class", "rdfs:subClassOf": {"@id": "ex:Animal"}}
        ]
    });
    let ontology = parse_ontology(&doc, "zoo.json").unwrap();
    assert_eq!(ontology.entities[1].parent_class.as_deref(), Some("ex:Animal"));

    let graph = build_graph(&ontology);
    assert_eq!(graph.edge("ex:Dog", "ex:Animal").unwrap().label, "subClassOf");
}

#[test]
fn spec_inferred_containers() {
    let doc = json!({
        "entities": [{"id": "A", "label": "Alpha"}, "B", 42],
        "concepts": {"C": {"label": "Gamma"}}
    });
    let (ontology, report) = parse_with_report(&doc, "loose.json").unwrap();
    assert_eq!(report.dialect, Dialect::Inferred);
    let ids: Vec<&str> = ontology.entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(report.skipped, vec!["entities[2]".to_string()]);
    assert_eq!(ontology.metadata["format"], json!("inferred"));
}

#[test]
fn spec_wrong_shape_is_an_error() {
    let doc = json!({"classes": ["not", "an", "object"]});
    let err = parse_ontology(&doc, "bad.json").unwrap_err();
    assert!(matches!(err, LoadError::Shape { .. }), "got: {err}");
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn spec_load_file_relative_to_base() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("file.json"),
        r#"{"name": "File Test", "classes": {"A": {}}}"#,
    )
    .unwrap();
    let ontology = OntologyLoader::new(dir.path()).load_file("file.json").unwrap();
    assert_eq!(ontology.name, "File Test");

    let absolute = ontograph::load_file(dir.path().join("file.json")).unwrap();
    assert_eq!(absolute, ontology);
}

#[test]
fn spec_load_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let loader = OntologyLoader::new(dir.path());
    assert!(matches!(
        loader.load_file("missing.json").unwrap_err(),
        LoadError::Io { .. }
    ));

    std::fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    let err = loader.load_file("broken.json").unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }));
    assert!(err.to_string().contains("broken.json"), "got: {err}");
}
