use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ontology::BusinessRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Entity,
    External,
    Agent,
    Ontology,
    VeLayer,
    VsomLevel,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Entity => "entity",
            NodeType::External => "external",
            NodeType::Agent => "agent",
            NodeType::Ontology => "ontology",
            NodeType::VeLayer => "ve_layer",
            NodeType::VsomLevel => "vsom_level",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Relationship,
    Inheritance,
    Binding,
    ValueFlow,
    Feedback,
    LayerContent,
    VsomCascade,
    VsomContent,
    OntologyBinding,
    ValueChain,
    AgentLayer,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Relationship => "relationship",
            EdgeType::Inheritance => "inheritance",
            EdgeType::Binding => "binding",
            EdgeType::ValueFlow => "value_flow",
            EdgeType::Feedback => "feedback",
            EdgeType::LayerContent => "layer_content",
            EdgeType::VsomCascade => "vsom_cascade",
            EdgeType::VsomContent => "vsom_content",
            EdgeType::OntologyBinding => "ontology_binding",
            EdgeType::ValueChain => "value_chain",
            EdgeType::AgentLayer => "agent_layer",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeAttrs {
    pub label: String,
    pub description: String,
    pub node_type: Option<NodeType>,
    pub entity_type: Option<String>,
    pub color: String,
    pub size: Option<u32>,
    pub shape: Option<String>,
    pub layer_index: Option<usize>,
    pub highlighted: bool,
    pub properties: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl NodeAttrs {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_node_type(mut self, node_type: NodeType) -> Self {
        self.node_type = Some(node_type);
        self
    }

    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_layer_index(mut self, index: usize) -> Self {
        self.layer_index = Some(index);
        self
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Fields set on `other` overwrite; unset fields keep their value.
    pub fn merge(&mut self, other: NodeAttrs) {
        overwrite_text(&mut self.label, other.label);
        overwrite_text(&mut self.description, other.description);
        overwrite_text(&mut self.color, other.color);
        self.node_type = other.node_type.or(self.node_type);
        self.entity_type = other.entity_type.or(self.entity_type.take());
        self.size = other.size.or(self.size);
        self.shape = other.shape.or(self.shape.take());
        self.layer_index = other.layer_index.or(self.layer_index);
        self.highlighted |= other.highlighted;
        self.properties.extend(other.properties);
        self.extra.extend(other.extra);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeAttrs {
    pub id: Option<String>,
    pub label: String,
    pub edge_type: Option<EdgeType>,
    pub cardinality: Option<String>,
    pub description: String,
    pub color: Option<String>,
    pub width: Option<u32>,
    pub weight: Option<f64>,
    pub style: EdgeStyle,
    pub extra: Map<String, Value>,
}

impl EdgeAttrs {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_edge_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = Some(edge_type);
        self
    }

    pub fn with_cardinality(mut self, cardinality: impl Into<String>) -> Self {
        self.cardinality = Some(cardinality.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn dashed(mut self) -> Self {
        self.style = EdgeStyle::Dashed;
        self
    }

    pub fn merge(&mut self, other: EdgeAttrs) {
        overwrite_text(&mut self.label, other.label);
        overwrite_text(&mut self.description, other.description);
        self.id = other.id.or(self.id.take());
        self.edge_type = other.edge_type.or(self.edge_type);
        self.cardinality = other.cardinality.or(self.cardinality.take());
        self.color = other.color.or(self.color.take());
        self.width = other.width.or(self.width);
        self.weight = other.weight.or(self.weight);
        if other.style != EdgeStyle::Solid {
            self.style = other.style;
        }
        self.extra.extend(other.extra);
    }
}

fn overwrite_text(slot: &mut String, value: String) {
    if !value.is_empty() {
        *slot = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphMeta {
    pub name: String,
    pub version: String,
    pub description: String,
    pub ontology_id: String,
    /// Template kind such as `framework` or `vsom`; `None` for plain projections.
    pub kind: Option<String>,
    pub business_rules: Vec<BusinessRule>,
}

impl GraphMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub attrs: NodeAttrs,
}

#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    graph: DiGraph<GraphNode, EdgeAttrs>,
    index: HashMap<String, NodeIndex>,
    pub meta: GraphMeta,
}

impl OntologyGraph {
    pub fn new(meta: GraphMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    pub fn upsert_node(&mut self, id: &str, attrs: NodeAttrs) -> NodeIndex {
        match self.index.get(id) {
            Some(&ix) => {
                self.graph[ix].attrs.merge(attrs);
                ix
            }
            None => {
                let ix = self.graph.add_node(GraphNode {
                    id: id.to_string(),
                    attrs,
                });
                self.index.insert(id.to_string(), ix);
                ix
            }
        }
    }

    pub fn ensure_node(&mut self, id: &str, attrs: impl FnOnce() -> NodeAttrs) -> NodeIndex {
        match self.index.get(id) {
            Some(&ix) => ix,
            None => self.upsert_node(id, attrs()),
        }
    }

    /// Adds the single edge `source -> target` or merges `attrs` into it.
    /// Missing endpoints are created with their id as label.
    pub fn upsert_edge(&mut self, source: &str, target: &str, attrs: EdgeAttrs) -> EdgeIndex {
        let a = self.ensure_node(source, || NodeAttrs::new(source));
        let b = self.ensure_node(target, || NodeAttrs::new(target));
        match self.graph.find_edge(a, b) {
            Some(e) => {
                self.graph[e].merge(attrs);
                e
            }
            None => self.graph.add_edge(a, b, attrs),
        }
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge(source, target).is_some()
    }

    pub fn node(&self, id: &str) -> Option<&NodeAttrs> {
        self.index.get(id).map(|&ix| &self.graph[ix].attrs)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeAttrs> {
        let ix = *self.index.get(id)?;
        Some(&mut self.graph[ix].attrs)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeAttrs> {
        let e = self.find_edge(source, target)?;
        Some(&self.graph[e])
    }

    pub fn edge_mut(&mut self, source: &str, target: &str) -> Option<&mut EdgeAttrs> {
        let e = self.find_edge(source, target)?;
        Some(&mut self.graph[e])
    }

    fn find_edge(&self, source: &str, target: &str) -> Option<EdgeIndex> {
        let a = *self.index.get(source)?;
        let b = *self.index.get(target)?;
        self.graph.find_edge(a, b)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttrs)> {
        self.graph
            .node_weights()
            .map(|node| (node.id.as_str(), &node.attrs))
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeAttrs)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].id.as_str(),
                self.graph[e.target()].id.as_str(),
                e.weight(),
            )
        })
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Neighbors ordered by when the connecting edge was added.
    fn neighbors(&self, id: &str, dir: Direction) -> Vec<&str> {
        let Some(&ix) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(ix, dir).collect();
        edges.sort_by_key(|e| e.id());
        edges
            .into_iter()
            .map(|e| {
                let other = if e.source() == ix { e.target() } else { e.source() };
                self.graph[other].id.as_str()
            })
            .collect()
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    pub fn id_of(&self, ix: NodeIndex) -> &str {
        &self.graph[ix].id
    }

    pub fn inner(&self) -> &DiGraph<GraphNode, EdgeAttrs> {
        &self.graph
    }

    pub fn subgraph(&self, keep: &HashSet<&str>) -> OntologyGraph {
        let mut sub = OntologyGraph::new(self.meta.clone());
        for (id, attrs) in self.nodes().filter(|(id, _)| keep.contains(id)) {
            sub.upsert_node(id, attrs.clone());
        }
        for (source, target, attrs) in self.edges() {
            if keep.contains(source) && keep.contains(target) {
                sub.upsert_edge(source, target, attrs.clone());
            }
        }
        sub
    }

    /// Adds every node and edge of `other`; its attributes win on conflict.
    pub fn compose(&mut self, other: &OntologyGraph) {
        for (id, attrs) in other.nodes() {
            self.upsert_node(id, attrs.clone());
        }
        for (source, target, attrs) in other.edges() {
            self.upsert_edge(source, target, attrs.clone());
        }
    }
}
