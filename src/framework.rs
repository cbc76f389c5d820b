use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::{betweenness_centrality, simple_paths};
use crate::builder::GraphBuilder;
use crate::error::AnalysisError;
use crate::graph::*;
use crate::ontology::Ontology;

pub const LAYER_PREFIX: &str = "layer_";
pub const MAX_FLOW_HOPS: usize = 10;
pub const MAX_FLOW_PATHS: usize = 5;
pub const MAX_BOTTLENECKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct W4mLayer {
    pub index: usize,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub key_entities: Vec<String>,
    #[serde(default)]
    pub ontology_id: Option<String>,
}

impl W4mLayer {
    fn new(index: usize, name: &str, description: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            description: description.to_string(),
            key_entities: Vec::new(),
            ontology_id: None,
        }
    }

    pub fn node_id(&self) -> String {
        layer_node_id(self.index)
    }
}

pub fn layer_node_id(index: usize) -> String {
    format!("{LAYER_PREFIX}{index}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct W4mFramework {
    pub layers: Vec<W4mLayer>,
    /// Gradient from dark to light, indexed by layer.
    pub colors: Vec<String>,
    pub layer_size: u32,
    pub flow_color: String,
    pub feedback_color: String,
    pub content_color: String,
}

impl Default for W4mFramework {
    fn default() -> Self {
        Self {
            layers: vec![
                W4mLayer::new(0, "Problem Space", "Customer pain points and market gaps"),
                W4mLayer::new(1, "ICP", "Ideal Customer Profile definition"),
                W4mLayer::new(2, "Solution", "Product/service offering"),
                W4mLayer::new(3, "Value Proposition", "Unique value delivery"),
                W4mLayer::new(4, "Business Model", "Revenue and cost structure"),
                W4mLayer::new(5, "Competitive Analysis", "Market positioning vs competitors"),
                W4mLayer::new(6, "Market Positioning", "Brand and market strategy"),
                W4mLayer::new(7, "Strategy", "VSOM - Vision, Strategy, Objectives, Metrics"),
            ],
            colors: [
                "#1A237E", "#283593", "#303F9F", "#3949AB", "#3F51B5", "#5C6BC0", "#7986CB",
                "#9FA8DA",
            ]
            .map(String::from)
            .to_vec(),
            layer_size: 50,
            flow_color: "#37474F".to_string(),
            feedback_color: "#78909C".to_string(),
            content_color: "#90A4AE".to_string(),
        }
    }
}

impl W4mFramework {
    /// Case-insensitive containment match in either direction; the first
    /// layer in order wins.
    pub fn get_layer(&self, name: &str) -> Option<&W4mLayer> {
        let wanted = name.to_lowercase();
        self.layers.iter().find(|layer| {
            let layer_name = layer.name.to_lowercase();
            layer_name.contains(&wanted) || wanted.contains(&layer_name)
        })
    }

    pub fn get_layer_by_index(&self, index: usize) -> Option<&W4mLayer> {
        self.layers.get(index)
    }

    pub fn layer_color(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return "";
        }
        &self.colors[index % self.colors.len()]
    }

    fn last_index(&self) -> Option<usize> {
        self.layers.len().checked_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VsomLevel {
    Vision,
    Strategy,
    Objectives,
    Metrics,
}

impl VsomLevel {
    pub fn id(self) -> &'static str {
        match self {
            VsomLevel::Vision => "vision",
            VsomLevel::Strategy => "strategy",
            VsomLevel::Objectives => "objectives",
            VsomLevel::Metrics => "metrics",
        }
    }
}

impl fmt::Display for VsomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsomLevelSpec {
    pub level: VsomLevel,
    pub label: String,
    pub description: String,
    pub color: String,
    /// Lowercase substrings that place an entity at this level.
    pub keywords: Vec<String>,
}

impl VsomLevelSpec {
    fn new(level: VsomLevel, label: &str, description: &str, color: &str, keywords: &[&str]) -> Self {
        Self {
            level,
            label: label.to_string(),
            description: description.to_string(),
            color: color.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsomConfig {
    /// Ordered top-down; earlier levels win keyword ties.
    pub levels: Vec<VsomLevelSpec>,
    pub base_size: u32,
    pub size_step: u32,
}

impl Default for VsomConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                VsomLevelSpec::new(
                    VsomLevel::Vision,
                    "Vision",
                    "Long-term aspirational state",
                    "#1565C0",
                    &["vision", "mission", "purpose"],
                ),
                VsomLevelSpec::new(
                    VsomLevel::Strategy,
                    "Strategy",
                    "Approach to achieve vision",
                    "#1976D2",
                    &["strategy", "plan", "approach"],
                ),
                VsomLevelSpec::new(
                    VsomLevel::Objectives,
                    "Objectives",
                    "Measurable goals",
                    "#1E88E5",
                    &["objective", "goal", "target", "okr"],
                ),
                VsomLevelSpec::new(
                    VsomLevel::Metrics,
                    "Metrics",
                    "KPIs and measurements",
                    "#2196F3",
                    &["metric", "kpi", "measure", "indicator"],
                ),
            ],
            base_size: 45,
            size_step: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsomPlacement {
    Level(VsomLevel),
    Unclassified,
}

impl VsomConfig {
    pub fn infer_vsom_level(&self, id: &str, label: &str) -> VsomPlacement {
        let id = id.to_lowercase();
        let label = label.to_lowercase();
        self.levels
            .iter()
            .find(|spec| {
                spec.keywords
                    .iter()
                    .any(|k| id.contains(k.as_str()) || label.contains(k.as_str()))
            })
            .map_or(VsomPlacement::Unclassified, |spec| VsomPlacement::Level(spec.level))
    }
}

#[derive(Debug, Clone)]
pub struct TemplateMerge {
    pub graph: OntologyGraph,
    /// Layer names that matched no W4M layer and were skipped.
    pub unmatched_layers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VsomGraph {
    pub graph: OntologyGraph,
    /// Placement of every ontology node, in ontology graph order.
    pub placements: Vec<(String, VsomPlacement)>,
    /// Ontology nodes left out because no level keyword matched.
    pub unclassified: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub node: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowMetrics {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub layer_count: usize,
    pub avg_layer_connections: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueFlowAnalysis {
    pub source: String,
    pub target: String,
    pub paths: Vec<Vec<String>>,
    pub bottlenecks: Vec<Bottleneck>,
    pub metrics: FlowMetrics,
}

#[derive(Debug, Clone, Default)]
pub struct DomainGraphBuilder {
    framework: W4mFramework,
    vsom: VsomConfig,
    builder: GraphBuilder,
}

impl DomainGraphBuilder {
    pub fn new(framework: W4mFramework, vsom: VsomConfig, builder: GraphBuilder) -> Self {
        Self {
            framework,
            vsom,
            builder,
        }
    }

    pub fn framework(&self) -> &W4mFramework {
        &self.framework
    }

    pub fn vsom(&self) -> &VsomConfig {
        &self.vsom
    }

    pub fn build_w4m_framework_graph(&self) -> OntologyGraph {
        let fw = &self.framework;
        let mut graph = OntologyGraph::new(GraphMeta::named("W4M Business Framework").with_kind("framework"));

        for layer in &fw.layers {
            graph.upsert_node(
                &layer.node_id(),
                NodeAttrs::new(layer.name.as_str())
                    .with_description(layer.description.as_str())
                    .with_node_type(NodeType::VeLayer)
                    .with_layer_index(layer.index)
                    .with_color(fw.layer_color(layer.index))
                    .with_size(fw.layer_size),
            );
        }

        for pair in fw.layers.windows(2) {
            graph.upsert_edge(
                &pair[0].node_id(),
                &pair[1].node_id(),
                EdgeAttrs::new("informs")
                    .with_edge_type(EdgeType::ValueFlow)
                    .with_weight(1.0)
                    .with_color(fw.flow_color.as_str()),
            );
        }

        if let Some((strategy, rest)) = fw.layers.split_last() {
            for layer in rest {
                graph.upsert_edge(
                    &strategy.node_id(),
                    &layer.node_id(),
                    EdgeAttrs::new("guides")
                        .with_edge_type(EdgeType::Feedback)
                        .with_weight(0.5)
                        .with_color(fw.feedback_color.as_str())
                        .dashed(),
                );
            }
        }
        graph
    }

    /// Framework graph with each ontology's nodes copied under
    /// `<layer_name>_<id>` and attached to the matching layer.
    pub fn build_ve_value_chain<S: AsRef<str>>(&self, layer_ontologies: &[(S, Ontology)]) -> TemplateMerge {
        let mut graph = self.build_w4m_framework_graph();
        let mut unmatched_layers = Vec::new();

        for (layer_name, ontology) in layer_ontologies {
            let layer_name = layer_name.as_ref();
            let Some(layer) = self.framework.get_layer(layer_name) else {
                debug!(layer = layer_name, "no W4M layer matches, skipping ontology");
                unmatched_layers.push(layer_name.to_string());
                continue;
            };
            let layer_node = layer.node_id();
            let ont_graph = self.builder.build(ontology).graph;
            let prefixed = |id: &str| format!("{layer_name}_{id}");

            for (id, attrs) in ont_graph.nodes() {
                let node = prefixed(id);
                graph.upsert_node(&node, attrs.clone());
                graph.upsert_edge(
                    &layer_node,
                    &node,
                    EdgeAttrs::new("contains")
                        .with_edge_type(EdgeType::LayerContent)
                        .with_color(self.framework.content_color.as_str()),
                );
            }
            for (source, target, attrs) in ont_graph.edges() {
                graph.upsert_edge(&prefixed(source), &prefixed(target), attrs.clone());
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unmatched = unmatched_layers.len(),
            "built value chain"
        );
        TemplateMerge {
            graph,
            unmatched_layers,
        }
    }

    pub fn build_value_chain_graph<S: AsRef<str>>(
        &self,
        layer_graphs: &[(S, OntologyGraph)],
    ) -> TemplateMerge {
        let fw = &self.framework;
        let mut graph = OntologyGraph::new(GraphMeta::named("Value Chain").with_kind("value_chain"));
        for layer in &fw.layers {
            graph.upsert_node(
                &layer.node_id(),
                NodeAttrs::new(layer.name.as_str())
                    .with_description(layer.description.as_str())
                    .with_node_type(NodeType::VeLayer)
                    .with_layer_index(layer.index)
                    .with_color(fw.layer_color(layer.index)),
            );
        }
        for pair in fw.layers.windows(2) {
            graph.upsert_edge(
                &pair[0].node_id(),
                &pair[1].node_id(),
                EdgeAttrs::new("informs")
                    .with_edge_type(EdgeType::ValueChain)
                    .with_weight(1.0),
            );
        }

        let mut unmatched_layers = Vec::new();
        for (layer_name, ont_graph) in layer_graphs {
            let Some(layer) = fw.get_layer(layer_name.as_ref()) else {
                unmatched_layers.push(layer_name.as_ref().to_string());
                continue;
            };
            let layer_node = layer.node_id();
            for (id, attrs) in ont_graph.nodes() {
                graph.upsert_node(id, attrs.clone());
                graph.upsert_edge(
                    &layer_node,
                    id,
                    EdgeAttrs::new("contains").with_edge_type(EdgeType::LayerContent),
                );
            }
            for (source, target, attrs) in ont_graph.edges() {
                graph.upsert_edge(source, target, attrs.clone());
            }
        }
        TemplateMerge {
            graph,
            unmatched_layers,
        }
    }

    pub fn build_vsom_graph(&self, ontology: &Ontology) -> VsomGraph {
        let mut graph = OntologyGraph::new(GraphMeta::named("VSOM Framework").with_kind("vsom"));

        let mut previous: Option<VsomLevel> = None;
        for (i, spec) in self.vsom.levels.iter().enumerate() {
            let size = self
                .vsom
                .base_size
                .saturating_sub(self.vsom.size_step * i as u32);
            graph.upsert_node(
                spec.level.id(),
                NodeAttrs::new(spec.label.as_str())
                    .with_description(spec.description.as_str())
                    .with_node_type(NodeType::VsomLevel)
                    .with_color(spec.color.as_str())
                    .with_size(size)
                    .with_extra("level", i),
            );
            if let Some(prev) = previous {
                graph.upsert_edge(
                    prev.id(),
                    spec.level.id(),
                    EdgeAttrs::new("cascades_to").with_edge_type(EdgeType::VsomCascade),
                );
            }
            previous = Some(spec.level);
        }

        let ont_graph = self.builder.build(ontology).graph;
        let mut placements = Vec::new();
        let mut unclassified = Vec::new();
        for (id, attrs) in ont_graph.nodes() {
            let placement = self.vsom.infer_vsom_level(id, &attrs.label);
            match placement {
                VsomPlacement::Level(level) => {
                    graph.upsert_node(id, attrs.clone());
                    graph.upsert_edge(
                        level.id(),
                        id,
                        EdgeAttrs::new("includes").with_edge_type(EdgeType::VsomContent),
                    );
                }
                VsomPlacement::Unclassified => {
                    debug!(node = id, "no VSOM level keyword, dropping node");
                    unclassified.push(id.to_string());
                }
            }
            placements.push((id.to_string(), placement));
        }

        for (source, target, attrs) in ont_graph.edges() {
            if graph.contains_node(source) && graph.contains_node(target) {
                graph.upsert_edge(source, target, attrs.clone());
            }
        }

        info!(
            placed = placements.len() - unclassified.len(),
            unclassified = unclassified.len(),
            "built VSOM graph"
        );
        VsomGraph {
            graph,
            placements,
            unclassified,
        }
    }

    pub fn analyze_value_flow(
        &self,
        graph: &OntologyGraph,
        source_layer: usize,
        target_layer: usize,
    ) -> Result<ValueFlowAnalysis, AnalysisError> {
        let count = self.framework.layers.len();
        let layer = |index: usize| {
            self.framework
                .get_layer_by_index(index)
                .ok_or(AnalysisError::LayerOutOfRange { index, count })
        };
        let source = layer(source_layer)?;
        let target = layer(target_layer)?;

        let label_of = |id: &str| display_label(graph, id);
        let paths: Vec<Vec<String>> = simple_paths(
            graph,
            &source.node_id(),
            &target.node_id(),
            MAX_FLOW_HOPS,
            MAX_FLOW_PATHS,
        )
        .into_iter()
        .map(|path| path.into_iter().map(label_of).collect())
        .collect();

        let mut bottlenecks = Vec::new();
        if graph.node_count() > 2 {
            let mut scores = betweenness_centrality(graph);
            scores.sort_by(|a, b| b.1.total_cmp(&a.1));
            bottlenecks = scores
                .into_iter()
                .take(MAX_BOTTLENECKS)
                .filter(|(_, score)| *score > 0.0)
                .map(|(id, score)| Bottleneck {
                    node: label_of(id),
                    score,
                })
                .collect();
        }

        let layer_count = graph
            .nodes()
            .filter(|(id, _)| id.starts_with(LAYER_PREFIX))
            .count();
        let total_edges = graph.edge_count();
        let metrics = FlowMetrics {
            total_nodes: graph.node_count(),
            total_edges,
            layer_count,
            avg_layer_connections: total_edges as f64 / layer_count.max(1) as f64,
        };

        info!(
            source = %source.name,
            target = %target.name,
            paths = paths.len(),
            bottlenecks = bottlenecks.len(),
            "analyzed value flow"
        );
        Ok(ValueFlowAnalysis {
            source: source.name.clone(),
            target: target.name.clone(),
            paths,
            bottlenecks,
            metrics,
        })
    }

    pub fn last_layer(&self) -> usize {
        self.framework.last_index().unwrap_or(0)
    }
}

fn display_label(graph: &OntologyGraph, id: &str) -> String {
    match graph.node(id) {
        Some(attrs) if !attrs.label.is_empty() => attrs.label.clone(),
        _ => id.to_string(),
    }
}

pub fn build_w4m_framework_graph() -> OntologyGraph {
    DomainGraphBuilder::default().build_w4m_framework_graph()
}

pub fn analyze_value_flow(
    graph: &OntologyGraph,
    source_layer: usize,
    target_layer: usize,
) -> Result<ValueFlowAnalysis, AnalysisError> {
    DomainGraphBuilder::default().analyze_value_flow(graph, source_layer, target_layer)
}
