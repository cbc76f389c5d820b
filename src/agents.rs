use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::framework::W4mFramework;
use crate::graph::*;
use crate::theme::Theme;

pub const AGENT_VE_SIZE: u32 = 55;

fn default_agent_id() -> String {
    "agent".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub ontology_bindings: OntologyBindings,
    #[serde(default)]
    pub w4m_alignment: W4mAlignment,
}

impl AgentSpec {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            agent_name: None,
            ontology_bindings: OntologyBindings::default(),
            w4m_alignment: W4mAlignment::default(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn label(&self) -> &str {
        self.agent_name.as_deref().unwrap_or(&self.agent_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OntologyBindings {
    #[serde(rename = "CONSUMES", default)]
    pub consumes: Vec<OntologyRef>,
    #[serde(rename = "PRODUCES", default)]
    pub produces: Vec<OntologyRef>,
    #[serde(rename = "REQUIRES", default)]
    pub requires: Vec<OntologyRef>,
}

impl OntologyBindings {
    /// Bindings in CONSUMES, PRODUCES, REQUIRES order.
    pub fn iter(&self) -> impl Iterator<Item = (BindingKind, &str)> {
        [
            (BindingKind::Consumes, &self.consumes),
            (BindingKind::Produces, &self.produces),
            (BindingKind::Requires, &self.requires),
        ]
        .into_iter()
        .flat_map(|(kind, refs)| refs.iter().map(move |r| (kind, r.id())))
    }
}

/// An ontology reference: a bare id or `{"ontologyId": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OntologyRef {
    Id(String),
    Object {
        #[serde(rename = "ontologyId", default)]
        ontology_id: String,
    },
}

impl OntologyRef {
    pub fn id(&self) -> &str {
        match self {
            OntologyRef::Id(id) => id,
            OntologyRef::Object { ontology_id } => ontology_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct W4mAlignment {
    #[serde(default)]
    pub primary_layers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Consumes,
    Produces,
    Requires,
}

impl BindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BindingKind::Consumes => "CONSUMES",
            BindingKind::Produces => "PRODUCES",
            BindingKind::Requires => "REQUIRES",
        }
    }

    pub fn from_agent(self) -> bool {
        self == BindingKind::Produces
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentContextBuilder {
    theme: Theme,
    framework: W4mFramework,
}

impl AgentContextBuilder {
    pub fn new(theme: Theme, framework: W4mFramework) -> Self {
        Self { theme, framework }
    }

    pub fn build_agent_context_graph(
        &self,
        spec: &AgentSpec,
        ontology_graphs: &HashMap<String, OntologyGraph>,
    ) -> OntologyGraph {
        let agent = spec.agent_id.as_str();
        let mut graph = OntologyGraph::new(GraphMeta::named(spec.label()).with_kind("agent_context"));
        graph.upsert_node(
            agent,
            NodeAttrs::new(spec.label())
                .with_node_type(NodeType::Agent)
                .with_color(self.theme.agent_color.as_str()),
        );

        for (kind, ont_id) in spec.ontology_bindings.iter() {
            if ont_id.is_empty() {
                debug!(agent, kind = kind.as_str(), "skipping binding without ontology id");
                continue;
            }
            graph.ensure_node(ont_id, || {
                NodeAttrs::new(ont_id)
                    .with_node_type(NodeType::Ontology)
                    .with_color(self.theme.ontology_color.as_str())
            });
            let (source, target) = oriented(kind, agent, ont_id);
            graph.upsert_edge(
                source,
                target,
                EdgeAttrs::new(kind.as_str()).with_edge_type(EdgeType::Binding),
            );
            if let Some(ont_graph) = ontology_graphs.get(ont_id) {
                graph.compose(ont_graph);
            }
        }
        graph
    }

    /// Copy of `ve_graph` with the agent attached to its primary layers and
    /// to every node whose id contains a bound ontology id.
    pub fn build_agent_ve_context(&self, spec: &AgentSpec, ve_graph: &OntologyGraph) -> OntologyGraph {
        let agent = spec.agent_id.as_str();
        let mut graph = ve_graph.clone();
        graph.upsert_node(
            agent,
            NodeAttrs::new(spec.label())
                .with_node_type(NodeType::Agent)
                .with_color(self.theme.agent_color.as_str())
                .with_size(AGENT_VE_SIZE),
        );

        for layer_name in &spec.w4m_alignment.primary_layers {
            let Some(layer) = self.framework.get_layer(layer_name) else {
                debug!(agent, layer = %layer_name, "primary layer matches no W4M layer");
                continue;
            };
            graph.upsert_edge(
                agent,
                &layer.node_id(),
                EdgeAttrs::new("operates_in")
                    .with_edge_type(EdgeType::AgentLayer)
                    .with_weight(1.0)
                    .with_color(self.theme.agent_color.as_str()),
            );
        }

        for (kind, ont_id) in spec.ontology_bindings.iter() {
            if ont_id.is_empty() {
                continue;
            }
            let matching: Vec<String> = graph
                .nodes()
                .map(|(id, _)| id)
                .filter(|id| *id != agent && id.contains(ont_id))
                .map(str::to_string)
                .collect();
            for node in &matching {
                let (source, target) = oriented(kind, agent, node);
                graph.upsert_edge(
                    source,
                    target,
                    EdgeAttrs::new(kind.as_str().to_lowercase())
                        .with_edge_type(EdgeType::OntologyBinding)
                        .with_color(self.theme.binding_color.as_str()),
                );
            }
        }
        graph
    }
}

fn oriented<'a>(kind: BindingKind, agent: &'a str, other: &'a str) -> (&'a str, &'a str) {
    if kind.from_agent() {
        (agent, other)
    } else {
        (other, agent)
    }
}
