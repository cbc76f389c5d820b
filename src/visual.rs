use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::analysis::shortest_path;
use crate::graph::{NodeAttrs, NodeType, OntologyGraph};

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#FF5722";
pub const HIGHLIGHT_WIDTH: u32 = 4;

const VE_MARKERS: [&str; 3] = ["vsom", "vesm", "value"];
const CE_MARKERS: [&str; 2] = ["context", "org"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Agent,
    /// Value engineering.
    VE,
    /// Context engineering.
    CE,
    Framework,
    Core,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Agent => "Agent",
            Domain::VE => "VE",
            Domain::CE => "CE",
            Domain::Framework => "Framework",
            Domain::Core => "Core",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agent" => Ok(Domain::Agent),
            "ve" => Ok(Domain::VE),
            "ce" => Ok(Domain::CE),
            "framework" => Ok(Domain::Framework),
            "core" => Ok(Domain::Core),
            _ => Err(format!(
                "unknown domain `{s}` (expected Agent, VE, CE, Framework or Core)"
            )),
        }
    }
}

/// Every node falls into exactly one domain; `Core` catches the rest.
pub fn classify_domain(id: &str, attrs: &NodeAttrs) -> Domain {
    let id = id.to_lowercase();
    let label = attrs.label.to_lowercase();
    let mentions = |markers: &[&str]| {
        markers
            .iter()
            .any(|m| id.contains(m) || label.contains(m))
    };

    if attrs.node_type == Some(NodeType::Agent) {
        Domain::Agent
    } else if mentions(&VE_MARKERS) {
        Domain::VE
    } else if mentions(&CE_MARKERS) {
        Domain::CE
    } else if attrs.entity_type.as_deref() == Some("Framework") {
        Domain::Framework
    } else {
        Domain::Core
    }
}

/// Induced subgraph on the nodes of `domain`, widened by one hop in both
/// directions when `include_connected` is set.
pub fn filter_by_domain(graph: &OntologyGraph, domain: Domain, include_connected: bool) -> OntologyGraph {
    let matching: Vec<&str> = graph
        .nodes()
        .filter(|(id, attrs)| classify_domain(id, attrs) == domain)
        .map(|(id, _)| id)
        .collect();

    let mut keep: HashSet<&str> = matching.iter().copied().collect();
    if include_connected {
        for id in &matching {
            keep.extend(graph.predecessors(id));
            keep.extend(graph.successors(id));
        }
    }
    graph.subgraph(&keep)
}

#[derive(Debug, Clone)]
pub struct Highlighted {
    pub graph: OntologyGraph,
    pub path: Option<Vec<String>>,
}

pub fn highlight_path(graph: &OntologyGraph, start: &str, end: &str, color: &str) -> Highlighted {
    let mut copy = graph.clone();
    let Some(path) = shortest_path(graph, start, end) else {
        warn!(start, end, "no path found");
        return Highlighted {
            graph: copy,
            path: None,
        };
    };

    for id in &path {
        if let Some(attrs) = copy.node_mut(id) {
            attrs.color = color.to_string();
            attrs.highlighted = true;
        }
    }
    for pair in path.windows(2) {
        if let Some(edge) = copy.edge_mut(pair[0], pair[1]) {
            edge.color = Some(color.to_string());
            edge.width = Some(HIGHLIGHT_WIDTH);
        }
    }
    Highlighted {
        graph: copy,
        path: Some(path.into_iter().map(str::to_string).collect()),
    }
}
