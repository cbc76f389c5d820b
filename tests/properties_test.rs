use std::collections::HashSet;

use proptest::prelude::*;

use ontograph::graph::OntologyGraph;
use ontograph::ontology::{Entity, Ontology, Relationship};
use ontograph::visual::Domain;
use ontograph::{build_graph, filter_by_domain, get_graph_stats, render_text};

/// Entity ids `E0..E5`, endpoints drawn from those plus dangling `X0..X2`.
fn ontology_strategy() -> impl Strategy<Value = Ontology> {
    let entity_ids = prop::collection::vec(0usize..6, 1..6);
    let endpoint = prop_oneof![
        (0usize..6).prop_map(|i| format!("E{i}")),
        (0usize..3).prop_map(|i| format!("X{i}")),
    ];
    let links = prop::collection::vec((endpoint.clone(), endpoint), 0..10);
    (entity_ids, links).prop_map(|(entity_ids, links)| {
        let mut ontology = Ontology::new("prop", "Property");
        ontology.entities = entity_ids
            .into_iter()
            .map(|i| Entity::bare(format!("E{i}")))
            .collect();
        ontology.relationships = links
            .into_iter()
            .filter(|(source, target)| source != target)
            .enumerate()
            .map(|(i, (source, target))| {
                Relationship::new(format!("r{i}"), format!("rel{i}"), source, target)
            })
            .collect();
        ontology
    })
}

fn ids(graph: &OntologyGraph) -> HashSet<String> {
    graph.nodes().map(|(id, _)| id.to_string()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Property: every entity and every relationship endpoint becomes a node
    #[test]
    fn prop_nodes_cover_entities_and_endpoints(ontology in ontology_strategy()) {
        let graph = build_graph(&ontology);
        let mut expected: HashSet<String> =
            ontology.entities.iter().map(|e| e.id.clone()).collect();
        for rel in &ontology.relationships {
            expected.insert(rel.source.clone());
            expected.insert(rel.target.clone());
        }
        prop_assert!(graph.node_count() >= ontology.entities.iter().map(|e| &e.id).collect::<HashSet<_>>().len());
        prop_assert_eq!(ids(&graph), expected);
    }

    // Property: every relationship with both endpoints yields an edge
    #[test]
    fn prop_relationships_become_edges(ontology in ontology_strategy()) {
        let graph = build_graph(&ontology);
        for rel in &ontology.relationships {
            prop_assert!(graph.contains_edge(&rel.source, &rel.target));
        }
    }

    // Property: density of a loop-free graph stays within [0, 1]
    #[test]
    fn prop_density_is_bounded(ontology in ontology_strategy()) {
        let stats = get_graph_stats(&build_graph(&ontology));
        prop_assert!((0.0..=1.0).contains(&stats.density), "density {}", stats.density);
        prop_assert!(stats.components >= 1);
    }

    // Property: domain filtering only ever narrows the graph
    #[test]
    fn prop_filter_is_a_subgraph(ontology in ontology_strategy()) {
        let graph = build_graph(&ontology);
        let all = ids(&graph);
        for domain in [Domain::Agent, Domain::VE, Domain::CE, Domain::Framework, Domain::Core] {
            let isolated = ids(&filter_by_domain(&graph, domain, false));
            let connected = ids(&filter_by_domain(&graph, domain, true));
            prop_assert!(isolated.is_subset(&connected));
            prop_assert!(connected.is_subset(&all));
        }
    }

    // Property: text rendering shows every node
    #[test]
    fn prop_text_shows_every_node(ontology in ontology_strategy()) {
        let graph = build_graph(&ontology);
        let output = render_text(&graph).unwrap();
        for id in ids(&graph) {
            prop_assert!(output.contains(&format!(" {id} ")), "missing {id} in\n{output}");
        }
    }
}
