use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_ENTITY_TYPE: &str = "Class";
pub const DEFAULT_CARDINALITY: &str = "1:*";
pub const DEFAULT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Open tag such as `Core`, `Framework`, `Agent` or `Class`.
    #[serde(rename = "type", default = "default_entity_type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Inheritance reference, not ownership.
    #[serde(rename = "parent", default)]
    pub parent_class: Option<String>,
}

fn default_entity_type() -> String {
    DEFAULT_ENTITY_TYPE.to_string()
}

impl Entity {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            entity_type: default_entity_type(),
            properties: Map::new(),
            parent_class: None,
        }
    }

    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_class = Some(parent.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// A directed, labeled connection between two entity identifiers.
///
/// Endpoints are not checked against the entity list; dangling references
/// become placeholder nodes when the graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default = "default_cardinality")]
    pub cardinality: String,
    #[serde(default)]
    pub description: String,
}

fn default_cardinality() -> String {
    DEFAULT_CARDINALITY.to_string()
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: source.into(),
            target: target.into(),
            cardinality: default_cardinality(),
            description: String::new(),
        }
    }

    pub fn bare(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), id, "", "")
    }

    pub fn with_cardinality(mut self, cardinality: impl Into<String>) -> Self {
        self.cardinality = cardinality.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_endpoints(&self) -> bool {
        !self.source.is_empty() && !self.target.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    pub id: String,
    pub rule: String,
}

impl BusinessRule {
    pub fn new(id: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rule: rule.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Prefix to URI (or term definition). Display only.
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
    /// Provenance: source path, timestamps, creator and dialect extras.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl Ontology {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: default_version(),
            description: String::new(),
            context: Map::new(),
            entities: Vec::new(),
            relationships: Vec::new(),
            business_rules: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().rev().find(|e| e.id == id)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn entity_defaults() {
        let entity = Entity::new("test:Entity", "Test Entity").with_type("Core");
        assert_eq!(entity.id, "test:Entity");
        assert_eq!(entity.label, "Test Entity");
        assert_eq!(entity.entity_type, "Core");
        assert_eq!(entity.parent_class, None);
    }

    #[test]
    fn relationship_default_cardinality() {
        let rel = Relationship::new("r1", "relates", "A", "B");
        assert_eq!(rel.source, "A");
        assert_eq!(rel.target, "B");
        assert_eq!(rel.cardinality, "1:*");
        assert!(rel.has_endpoints());
        assert!(!Relationship::bare("r2").has_endpoints());
    }

    #[test]
    fn dictionary_form_uses_short_keys() {
        let mut ontology = Ontology::new("ont:1", "Demo");
        ontology
            .entities
            .push(Entity::new("A", "Alpha").with_parent("B"));
        let value = ontology.to_value();
        assert_eq!(value["entities"][0]["type"], json!("Class"));
        assert_eq!(value["entities"][0]["parent"], json!("B"));
        assert_eq!(value["version"], json!("1.0.0"));
    }

    #[test]
    fn entity_lookup_last_write_wins() {
        let mut ontology = Ontology::new("ont:1", "Demo");
        ontology.entities.push(Entity::new("A", "First"));
        ontology.entities.push(Entity::new("A", "Second"));
        assert_eq!(ontology.entity("A").map(|e| e.label.as_str()), Some("Second"));
    }
}
