use std::collections::BTreeMap;
use std::path::Path;

use petgraph::algo::{connected_components, is_cyclic_directed};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::graph::*;
use crate::loader::{OntologyLoader, parse_ontology};
use crate::ontology::Ontology;
use crate::theme::Theme;

pub const INHERITANCE_LABEL: &str = "subClassOf";

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub graph: OntologyGraph,
    /// Relationship ids left out because an endpoint was empty.
    pub skipped_relationships: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    theme: Theme,
}

impl GraphBuilder {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn build(&self, ontology: &Ontology) -> BuildOutcome {
        let mut graph = OntologyGraph::new(GraphMeta {
            name: ontology.name.clone(),
            version: ontology.version.clone(),
            description: ontology.description.clone(),
            ontology_id: ontology.id.clone(),
            kind: None,
            business_rules: ontology.business_rules.clone(),
        });

        for entity in &ontology.entities {
            graph.upsert_node(
                &entity.id,
                NodeAttrs::new(entity.label.as_str())
                    .with_description(entity.description.as_str())
                    .with_entity_type(entity.entity_type.as_str())
                    .with_properties(entity.properties.clone())
                    .with_node_type(NodeType::Entity)
                    .with_color(self.theme.entity_color(&entity.entity_type)),
            );
        }

        let mut skipped_relationships = Vec::new();
        for rel in &ontology.relationships {
            if !rel.has_endpoints() {
                debug!(id = %rel.id, "skipping relationship without both endpoints");
                skipped_relationships.push(rel.id.clone());
                continue;
            }
            for endpoint in [&rel.source, &rel.target] {
                graph.ensure_node(endpoint, || self.placeholder(endpoint, NodeType::Entity));
            }
            graph.upsert_edge(
                &rel.source,
                &rel.target,
                EdgeAttrs::new(rel.label.as_str())
                    .with_id(rel.id.as_str())
                    .with_cardinality(rel.cardinality.as_str())
                    .with_description(rel.description.as_str())
                    .with_edge_type(EdgeType::Relationship)
                    .with_color(self.theme.relationship_color.as_str()),
            );
        }

        for entity in &ontology.entities {
            let Some(parent) = entity.parent_class.as_deref() else {
                continue;
            };
            graph.ensure_node(parent, || self.placeholder(parent, NodeType::External));
            graph.upsert_edge(
                &entity.id,
                parent,
                EdgeAttrs::new(INHERITANCE_LABEL)
                    .with_edge_type(EdgeType::Inheritance)
                    .with_color(self.theme.inheritance_color.as_str())
                    .dashed(),
            );
        }

        info!(
            name = %graph.meta.name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built ontology graph"
        );
        BuildOutcome {
            graph,
            skipped_relationships,
        }
    }

    pub fn from_json(&self, data: &Value) -> Result<OntologyGraph, LoadError> {
        let ontology = parse_ontology(data, "")?;
        Ok(self.build(&ontology).graph)
    }

    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<OntologyGraph, LoadError> {
        let ontology = OntologyLoader::default().load_file(path)?;
        Ok(self.build(&ontology).graph)
    }

    fn placeholder(&self, id: &str, node_type: NodeType) -> NodeAttrs {
        NodeAttrs::new(id)
            .with_node_type(node_type)
            .with_color(self.theme.default_entity_color.as_str())
    }
}

pub fn build_graph(ontology: &Ontology) -> OntologyGraph {
    GraphBuilder::default().build(ontology).graph
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub is_dag: bool,
    /// Weakly connected components.
    pub components: usize,
    pub node_types: BTreeMap<String, usize>,
    pub edge_types: BTreeMap<String, usize>,
}

pub fn get_graph_stats(graph: &OntologyGraph) -> GraphStats {
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let density = if nodes <= 1 {
        0.0
    } else {
        edges as f64 / (nodes * (nodes - 1)) as f64
    };
    let has_self_loop = graph.edges().any(|(source, target, _)| source == target);

    let mut node_types = BTreeMap::new();
    for (_, attrs) in graph.nodes() {
        let tag = attrs.node_type.map_or("unknown", NodeType::as_str);
        *node_types.entry(tag.to_string()).or_insert(0) += 1;
    }
    let mut edge_types = BTreeMap::new();
    for (_, _, attrs) in graph.edges() {
        let tag = attrs.edge_type.map_or("unknown", EdgeType::as_str);
        *edge_types.entry(tag.to_string()).or_insert(0) += 1;
    }

    GraphStats {
        nodes,
        edges,
        density,
        is_dag: !has_self_loop && !is_cyclic_directed(graph.inner()),
        components: connected_components(graph.inner()),
        node_types,
        edge_types,
    }
}
