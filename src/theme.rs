//! Presentation constants.
//!
//! Colors, sizes, shapes and widths are plain data. A [`Theme`] is created
//! once (default or from a JSON file) and passed to the builders and
//! renderers; omitted fields in a theme file keep their defaults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::graph::{EdgeType, NodeType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub entity_colors: BTreeMap<String, String>,
    pub default_entity_color: String,
    pub relationship_color: String,
    pub inheritance_color: String,
    pub agent_color: String,
    pub ontology_color: String,
    pub binding_color: String,
    pub default_edge_color: String,
    pub highlight_color: String,
    pub node_sizes: BTreeMap<String, u32>,
    pub default_node_size: u32,
    pub node_shapes: BTreeMap<String, String>,
    pub default_node_shape: String,
    pub edge_widths: BTreeMap<String, u32>,
    pub default_edge_width: u32,
    pub canvas_height: String,
    pub canvas_width: String,
    pub gravity: i32,
    pub spring_length: u32,
}

fn table<V: Clone>(pairs: &[(&str, V)]) -> BTreeMap<String, V> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            entity_colors: table(&[
                ("Core", "#4CAF50".to_string()),
                ("Framework", "#2196F3".to_string()),
                ("Supporting", "#FF9800".to_string()),
                ("External", "#9E9E9E".to_string()),
                ("Class", "#673AB7".to_string()),
                ("Agent", "#E91E63".to_string()),
            ]),
            default_entity_color: "#607D8B".to_string(),
            relationship_color: "#666666".to_string(),
            inheritance_color: "#999999".to_string(),
            agent_color: "#E91E63".to_string(),
            ontology_color: "#2196F3".to_string(),
            binding_color: "#9C27B0".to_string(),
            default_edge_color: "#666666".to_string(),
            highlight_color: "#FF5722".to_string(),
            node_sizes: table(&[
                ("agent", 40),
                ("ontology", 35),
                ("ve_layer", 45),
                ("entity", 25),
                ("external", 20),
            ]),
            default_node_size: 25,
            node_shapes: table(&[
                ("agent", "star".to_string()),
                ("ontology", "database".to_string()),
                ("ve_layer", "box".to_string()),
                ("entity", "dot".to_string()),
                ("external", "triangle".to_string()),
            ]),
            default_node_shape: "dot".to_string(),
            edge_widths: table(&[
                ("relationship", 2),
                ("inheritance", 1),
                ("binding", 3),
                ("value_chain", 4),
            ]),
            default_edge_width: 2,
            canvas_height: "800px".to_string(),
            canvas_width: "100%".to_string(),
            gravity: -3000,
            spring_length: 200,
        }
    }
}

impl Theme {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ThemeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn entity_color(&self, entity_type: &str) -> &str {
        self.entity_colors
            .get(entity_type)
            .map(String::as_str)
            .unwrap_or(&self.default_entity_color)
    }

    /// Untyped nodes are sized as entities.
    pub fn node_size(&self, node_type: Option<NodeType>) -> u32 {
        let tag = node_type.unwrap_or(NodeType::Entity).as_str();
        self.node_sizes
            .get(tag)
            .copied()
            .unwrap_or(self.default_node_size)
    }

    pub fn node_shape(&self, node_type: Option<NodeType>) -> &str {
        let tag = node_type.unwrap_or(NodeType::Entity).as_str();
        self.node_shapes
            .get(tag)
            .map(String::as_str)
            .unwrap_or(&self.default_node_shape)
    }

    /// Untyped edges are weighted as relationships.
    pub fn edge_width(&self, edge_type: Option<EdgeType>) -> u32 {
        let tag = edge_type.unwrap_or(EdgeType::Relationship).as_str();
        self.edge_widths
            .get(tag)
            .copied()
            .unwrap_or(self.default_edge_width)
    }
}
