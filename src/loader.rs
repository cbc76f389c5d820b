//! Ontology document loading.
//!
//! A document is sniffed by its top-level keys and handed to the parser for
//! one [`Dialect`]. Every parser is a pure function from the decoded JSON
//! to an [`Ontology`]; fields are extracted shallowly and nothing is
//! validated against RDFS/OWL semantics.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::ontology::*;

const CLASS_IRIS: [&str; 2] = ["owl:Class", "rdfs:Class"];

const INFERRED_CONTAINERS: [&str; 4] = ["entities", "types", "concepts", "terms"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `registryEntry` summary with bare entity/relationship lists.
    Registry,
    UniRegistry,
    Standard,
    Graph,
    /// Best-effort scan of common container keys.
    Inferred,
}

impl Dialect {
    pub fn detect(doc: &Map<String, Value>) -> Self {
        if doc.contains_key("registryEntry") {
            Dialect::Registry
        } else if doc.contains_key("ontologyDefinition") {
            Dialect::UniRegistry
        } else if doc.contains_key("classes") {
            Dialect::Standard
        } else if doc.contains_key("@graph") {
            Dialect::Graph
        } else {
            Dialect::Inferred
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Registry => "registry",
            Dialect::UniRegistry => "uniregistry",
            Dialect::Standard => "standard",
            Dialect::Graph => "graph",
            Dialect::Inferred => "inferred",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub dialect: Dialect,
    /// Inputs dropped without error, by identifier or field path.
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphNodeKind {
    Entity,
    Relationship,
    Unclassified,
}

pub fn classify_graph_node(types: &[String]) -> GraphNodeKind {
    if types
        .iter()
        .any(|t| t.contains("Class") || CLASS_IRIS.contains(&t.as_str()))
    {
        GraphNodeKind::Entity
    } else if types.iter().any(|t| t.contains("Property")) {
        GraphNodeKind::Relationship
    } else {
        GraphNodeKind::Unclassified
    }
}

#[derive(Debug, Clone)]
pub struct OntologyLoader {
    base_path: PathBuf,
}

impl Default for OntologyLoader {
    fn default() -> Self {
        let base_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { base_path }
    }
}

impl OntologyLoader {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Ontology, LoadError> {
        self.load_file_with_report(path).map(|(ontology, _)| ontology)
    }

    pub fn load_file_with_report(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(Ontology, ParseReport), LoadError> {
        let path = self.resolve(path.as_ref());
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let data: Value = serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode {
            path: path.clone(),
            source,
        })?;
        parse_with_report(&data, &path.to_string_lossy())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }
}

pub fn parse_ontology(data: &Value, source: &str) -> Result<Ontology, LoadError> {
    parse_with_report(data, source).map(|(ontology, _)| ontology)
}

pub fn parse_with_report(data: &Value, source: &str) -> Result<(Ontology, ParseReport), LoadError> {
    let doc = as_object(data, "$")?;
    let dialect = Dialect::detect(doc);
    debug!(dialect = dialect.as_str(), source, "detected ontology dialect");

    let mut report = ParseReport {
        dialect,
        skipped: Vec::new(),
    };
    let ontology = match dialect {
        Dialect::Registry => parse_registry(doc, source, &mut report)?,
        Dialect::UniRegistry => parse_uniregistry(doc, source, &mut report)?,
        Dialect::Standard => parse_standard(doc, source, "", &mut report)?,
        Dialect::Graph => parse_graph(doc, source, "", &mut report)?,
        Dialect::Inferred => parse_inferred(doc, source, &mut report)?,
    };

    info!(
        name = %ontology.name,
        entities = ontology.entities.len(),
        relationships = ontology.relationships.len(),
        skipped = report.skipped.len(),
        "parsed ontology"
    );
    Ok((ontology, report))
}

fn parse_standard(
    doc: &Map<String, Value>,
    source: &str,
    scope: &str,
    report: &mut ParseReport,
) -> Result<Ontology, LoadError> {
    let mut ontology = header(doc, source, scope)?;
    ontology.context = context(doc.get("@context"), &join(scope, "@context"))?;

    let classes_at = join(scope, "classes");
    if let Some(classes) = object_field(doc, "classes", scope)? {
        for (key, def) in classes {
            let at = join(&classes_at, key);
            let def = as_object(def, &at)?;
            ontology.entities.push(Entity {
                id: text_field(def, &["@id", "id"], &at)?.unwrap_or_else(|| key.clone()),
                label: text_field(def, &["rdfs:label", "label"], &at)?
                    .unwrap_or_else(|| key.clone()),
                description: text_field(def, &["rdfs:comment", "description"], &at)?
                    .unwrap_or_default(),
                entity_type: text_field(def, &["w4m:entityType"], &at)?
                    .unwrap_or_else(|| DEFAULT_ENTITY_TYPE.to_string()),
                properties: object_field(def, "properties", &at)?
                    .cloned()
                    .unwrap_or_default(),
                parent_class: reference_field(def, &["rdfs:subClassOf"], &at)?
                    .filter(|p| !p.is_empty()),
            });
        }
    }

    // `relationships` wins whenever the key is present, even if unusable.
    let rel_key = if doc.contains_key("relationships") {
        "relationships"
    } else {
        "objectProperties"
    };
    if let Some(Value::Object(rels)) = doc.get(rel_key) {
        let rels_at = join(scope, rel_key);
        for (key, def) in rels {
            let at = join(&rels_at, key);
            let Value::Object(def) = def else {
                debug!(at = %at, "skipping non-object relationship entry");
                report.skipped.push(at);
                continue;
            };
            ontology.relationships.push(Relationship {
                id: text_field(def, &["@id", "id"], &at)?.unwrap_or_else(|| key.clone()),
                label: text_field(def, &["rdfs:label", "label"], &at)?
                    .unwrap_or_else(|| key.clone()),
                source: reference_field(def, &["rdfs:domain"], &at)?.unwrap_or_default(),
                target: reference_field(def, &["rdfs:range"], &at)?.unwrap_or_default(),
                cardinality: text_field(def, &["w4m:cardinality"], &at)?
                    .unwrap_or_else(|| DEFAULT_CARDINALITY.to_string()),
                description: text_field(def, &["rdfs:comment", "description"], &at)?
                    .unwrap_or_default(),
            });
        }
    }

    ontology.business_rules = business_rules(doc, scope)?;

    ontology.metadata.insert("source".into(), Value::from(source));
    for key in ["dateCreated", "dateModified", "creator"] {
        ontology
            .metadata
            .insert(key.into(), doc.get(key).cloned().unwrap_or(Value::Null));
    }
    Ok(ontology)
}

fn parse_registry(
    doc: &Map<String, Value>,
    source: &str,
    report: &mut ParseReport,
) -> Result<Ontology, LoadError> {
    let empty = Map::new();
    let entry = object_field(doc, "registryEntry", "")?.unwrap_or(&empty);
    let at = "registryEntry";

    let domain = text_field(entry, &["domain"], at)?;
    let id = match text_field(doc, &["@id"], "")? {
        Some(id) => id,
        None => text_field(entry, &["ontologyId"], at)?.unwrap_or_else(|| source.to_string()),
    };
    let mut ontology = Ontology::new(id, domain.clone().unwrap_or_else(|| file_stem(source)));
    if let Some(version) = text_field(entry, &["version"], at)? {
        ontology.version = version;
    }
    ontology.description = format!("Domain: {}", domain.unwrap_or_default());
    ontology.context = context(doc.get("@context"), "@context")?;

    for id in summary_list(entry, "entities", report)? {
        ontology.entities.push(Entity::bare(id));
    }
    for id in summary_list(entry, "relationships", report)? {
        ontology.relationships.push(Relationship::bare(id));
    }

    let metadata = &mut ontology.metadata;
    metadata.insert("source".into(), Value::from(source));
    for key in ["status", "registrationDate"] {
        metadata.insert(key.into(), entry.get(key).cloned().unwrap_or(Value::Null));
    }
    for key in ["subDomains", "useCases", "consumers"] {
        metadata.insert(
            key.into(),
            entry.get(key).cloned().unwrap_or_else(|| Value::Array(Vec::new())),
        );
    }
    Ok(ontology)
}

/// Reads `registryEntry.<key>.list` as identifiers; `null` items are skipped.
fn summary_list(
    entry: &Map<String, Value>,
    key: &str,
    report: &mut ParseReport,
) -> Result<Vec<String>, LoadError> {
    let at = join("registryEntry", key);
    let Some(summary) = object_field(entry, key, "registryEntry")? else {
        return Ok(Vec::new());
    };
    let Some(items) = array_field(summary, "list", &at)? else {
        return Ok(Vec::new());
    };
    let list_at = join(&at, "list");
    let mut ids = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let item_at = format!("{list_at}[{i}]");
        if item.is_null() {
            report.skipped.push(item_at);
            continue;
        }
        ids.push(required_text(item, &item_at)?);
    }
    Ok(ids)
}

fn parse_uniregistry(
    doc: &Map<String, Value>,
    source: &str,
    report: &mut ParseReport,
) -> Result<Ontology, LoadError> {
    let empty = Map::new();
    let definition = object_field(doc, "ontologyDefinition", "")?.unwrap_or(&empty);
    let mut ontology = if definition.contains_key("@graph") {
        parse_graph(definition, source, "ontologyDefinition", report)?
    } else {
        parse_standard(definition, source, "ontologyDefinition", report)?
    };
    if let Some(registry) = doc.get("registryMetadata").filter(|v| !v.is_null()) {
        ontology
            .metadata
            .insert("registryMetadata".into(), registry.clone());
    }
    Ok(ontology)
}

fn parse_graph(
    doc: &Map<String, Value>,
    source: &str,
    scope: &str,
    report: &mut ParseReport,
) -> Result<Ontology, LoadError> {
    let mut ontology = header(doc, source, scope)?;
    ontology.context = context(doc.get("@context"), &join(scope, "@context"))?;

    let graph_at = join(scope, "@graph");
    let nodes = array_field(doc, "@graph", scope)?.map(Vec::as_slice).unwrap_or(&[]);
    for (i, node) in nodes.iter().enumerate() {
        let at = format!("{graph_at}[{i}]");
        let node = as_object(node, &at)?;
        let id = text_field(node, &["@id"], &at)?.unwrap_or_default();
        match classify_graph_node(&type_tags(node.get("@type"))) {
            GraphNodeKind::Entity => ontology.entities.push(Entity {
                id,
                label: text_field(node, &["rdfs:label", "name"], &at)?.unwrap_or_default(),
                description: text_field(node, &["rdfs:comment", "description"], &at)?
                    .unwrap_or_default(),
                entity_type: DEFAULT_ENTITY_TYPE.to_string(),
                properties: Map::new(),
                parent_class: reference_field(node, &["rdfs:subClassOf"], &at)?
                    .filter(|p| !p.is_empty()),
            }),
            GraphNodeKind::Relationship => ontology.relationships.push(Relationship {
                id,
                label: text_field(node, &["rdfs:label", "name"], &at)?.unwrap_or_default(),
                source: reference_field(node, &["rdfs:domain"], &at)?.unwrap_or_default(),
                target: reference_field(node, &["rdfs:range"], &at)?.unwrap_or_default(),
                cardinality: DEFAULT_CARDINALITY.to_string(),
                description: text_field(node, &["rdfs:comment", "description"], &at)?
                    .unwrap_or_default(),
            }),
            GraphNodeKind::Unclassified => {
                debug!(at = %at, id = %id, "dropping unclassified @graph node");
                report.skipped.push(if id.is_empty() { at } else { id });
            }
        }
    }

    ontology.metadata.insert("source".into(), Value::from(source));
    Ok(ontology)
}

fn parse_inferred(
    doc: &Map<String, Value>,
    source: &str,
    report: &mut ParseReport,
) -> Result<Ontology, LoadError> {
    let mut ontology = header(doc, source, "")?;
    ontology.context = context(doc.get("@context"), "@context")?;

    for key in INFERRED_CONTAINERS {
        match doc.get(key) {
            Some(Value::Object(items)) => {
                for (id, def) in items {
                    let at = join(key, id);
                    let entity = match def {
                        Value::Object(def) => Entity::new(
                            id.clone(),
                            text_field(def, &["label"], &at)?.unwrap_or_else(|| id.clone()),
                        )
                        .with_description(
                            text_field(def, &["description"], &at)?.unwrap_or_default(),
                        ),
                        _ => Entity::bare(id.clone()),
                    };
                    ontology.entities.push(entity);
                }
            }
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let at = format!("{key}[{i}]");
                    match item {
                        Value::String(id) => ontology.entities.push(Entity::bare(id.clone())),
                        Value::Object(def) => ontology.entities.push(
                            Entity::new(
                                text_field(def, &["@id", "id"], &at)?.unwrap_or_default(),
                                text_field(def, &["label", "name"], &at)?.unwrap_or_default(),
                            )
                            .with_description(
                                text_field(def, &["description"], &at)?.unwrap_or_default(),
                            ),
                        ),
                        _ => {
                            debug!(at = %at, "skipping unusable inferred item");
                            report.skipped.push(at);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    ontology.metadata.insert("source".into(), Value::from(source));
    ontology.metadata.insert("format".into(), Value::from("inferred"));
    Ok(ontology)
}

fn header(doc: &Map<String, Value>, source: &str, scope: &str) -> Result<Ontology, LoadError> {
    let id = text_field(doc, &["@id"], scope)?.unwrap_or_else(|| source.to_string());
    let name = text_field(doc, &["name"], scope)?.unwrap_or_else(|| file_stem(source));
    let mut ontology = Ontology::new(id, name);
    if let Some(version) = text_field(doc, &["version"], scope)? {
        ontology.version = version;
    }
    ontology.description = text_field(doc, &["description"], scope)?.unwrap_or_default();
    Ok(ontology)
}

fn business_rules(doc: &Map<String, Value>, scope: &str) -> Result<Vec<BusinessRule>, LoadError> {
    let key = if doc.contains_key("businessRules") {
        "businessRules"
    } else {
        "w4m:cardinalRules"
    };
    let at = join(scope, key);
    match doc.get(key) {
        Some(Value::Object(rules)) => Ok(rules
            .iter()
            .map(|(id, rule)| BusinessRule::new(id.clone(), rule_text(rule)))
            .collect()),
        Some(Value::Array(rules)) => rules
            .iter()
            .enumerate()
            .map(|(i, rule)| listed_rule(rule, i, &format!("{at}[{i}]")))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

fn listed_rule(rule: &Value, index: usize, at: &str) -> Result<BusinessRule, LoadError> {
    let fallback_id = || format!("rule_{}", index + 1);
    match rule {
        Value::String(text) => Ok(BusinessRule::new(fallback_id(), text.clone())),
        Value::Object(fields) => Ok(BusinessRule::new(
            text_field(fields, &["id", "@id"], at)?.unwrap_or_else(fallback_id),
            text_field(fields, &["rule", "text", "description"], at)?.unwrap_or_default(),
        )),
        other => Err(shape(at, "rule object or text", other)),
    }
}

fn rule_text(rule: &Value) -> String {
    match rule {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn context(value: Option<&Value>, at: &str) -> Result<Map<String, Value>, LoadError> {
    let mut context = Map::new();
    match value {
        None | Some(Value::Null) => {}
        Some(Value::String(vocab)) => {
            context.insert("@vocab".into(), Value::from(vocab.as_str()));
        }
        Some(Value::Object(map)) => context = map.clone(),
        Some(Value::Array(parts)) => {
            for (i, part) in parts.iter().enumerate() {
                match part {
                    Value::Null => {}
                    Value::String(vocab) => {
                        context.insert("@vocab".into(), Value::from(vocab.as_str()));
                    }
                    Value::Object(map) => {
                        context.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    other => return Err(shape(&format!("{at}[{i}]"), "context", other)),
                }
            }
        }
        Some(other) => return Err(shape(at, "context", other)),
    }
    Ok(context)
}

fn type_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(tag)) => vec![tag.clone()],
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn file_stem(source: &str) -> String {
    Path::new(source)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn join(scope: &str, key: &str) -> String {
    if scope.is_empty() {
        key.to_string()
    } else {
        format!("{scope}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn shape(at: &str, expected: &'static str, found: &Value) -> LoadError {
    LoadError::Shape {
        at: at.to_string(),
        expected,
        found: kind(found),
    }
}

fn as_object<'a>(value: &'a Value, at: &str) -> Result<&'a Map<String, Value>, LoadError> {
    value.as_object().ok_or_else(|| shape(at, "object", value))
}

/// Present, non-null field that must be an object.
fn object_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    scope: &str,
) -> Result<Option<&'a Map<String, Value>>, LoadError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_object(value, &join(scope, key)).map(Some),
    }
}

fn array_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    scope: &str,
) -> Result<Option<&'a Vec<Value>>, LoadError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(shape(&join(scope, key), "array", other)),
    }
}

/// Text of a JSON-LD value: strings, scalars, `{"@value": ..}` and the
/// first usable element of an array.
fn text(value: &Value, at: &str) -> Result<Option<String>, LoadError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Object(map) => match map.get("@value") {
            Some(inner) => text(inner, at),
            None => Err(shape(at, "text", value)),
        },
        Value::Array(items) => first_of(items, at, text),
    }
}

fn reference(value: &Value, at: &str) -> Result<Option<String>, LoadError> {
    match value {
        Value::Object(map) => match map.get("@id").or_else(|| map.get("@value")) {
            Some(inner) => reference(inner, at),
            None => Err(shape(at, "reference", value)),
        },
        Value::Array(items) => first_of(items, at, reference),
        other => text(other, at),
    }
}

fn first_of(
    items: &[Value],
    at: &str,
    extract: fn(&Value, &str) -> Result<Option<String>, LoadError>,
) -> Result<Option<String>, LoadError> {
    for (i, item) in items.iter().enumerate() {
        if let Some(found) = extract(item, &format!("{at}[{i}]"))? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn required_text(value: &Value, at: &str) -> Result<String, LoadError> {
    text(value, at)?.ok_or_else(|| shape(at, "text", value))
}

fn text_field(
    obj: &Map<String, Value>,
    keys: &[&str],
    scope: &str,
) -> Result<Option<String>, LoadError> {
    field_with(obj, keys, scope, text)
}

fn reference_field(
    obj: &Map<String, Value>,
    keys: &[&str],
    scope: &str,
) -> Result<Option<String>, LoadError> {
    field_with(obj, keys, scope, reference)
}

fn field_with(
    obj: &Map<String, Value>,
    keys: &[&str],
    scope: &str,
    extract: fn(&Value, &str) -> Result<Option<String>, LoadError>,
) -> Result<Option<String>, LoadError> {
    for key in keys {
        if let Some(value) = obj.get(*key).filter(|v| !v.is_null()) {
            return extract(value, &join(scope, key));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn detect_precedence() {
        let doc = json!({"classes": {}, "@graph": [], "registryEntry": {}});
        assert_eq!(Dialect::detect(doc.as_object().unwrap()), Dialect::Registry);
        let doc = json!({"classes": {}, "@graph": [], "ontologyDefinition": {}});
        assert_eq!(Dialect::detect(doc.as_object().unwrap()), Dialect::UniRegistry);
        let doc = json!({"classes": {}, "@graph": []});
        assert_eq!(Dialect::detect(doc.as_object().unwrap()), Dialect::Standard);
        let doc = json!({"@graph": []});
        assert_eq!(Dialect::detect(doc.as_object().unwrap()), Dialect::Graph);
        let doc = json!({"terms": []});
        assert_eq!(Dialect::detect(doc.as_object().unwrap()), Dialect::Inferred);
    }

    #[test]
    fn standard_person_knows_person() {
        let doc = json!({
            "classes": {"Person": {"@id": "schema:Person", "rdfs:label": "Person"}},
            "relationships": {"knows": {"rdfs:domain": "schema:Person", "rdfs:range": "schema:Person"}}
        });
        let ontology = parse_ontology(&doc, "people.json").unwrap();
        assert_eq!(ontology.entities.len(), 1);
        assert_eq!(ontology.entities[0].id, "schema:Person");
        assert_eq!(ontology.entities[0].label, "Person");
        assert_eq!(ontology.entities[0].entity_type, "Class");
        assert_eq!(ontology.relationships.len(), 1);
        let rel = &ontology.relationships[0];
        assert_eq!(rel.id, "knows");
        assert_eq!(rel.label, "knows");
        assert_eq!(rel.source, "schema:Person");
        assert_eq!(rel.target, "schema:Person");
        assert_eq!(rel.cardinality, "1:*");
        assert_eq!(ontology.name, "people");
        assert_eq!(ontology.version, "1.0.0");
        assert_eq!(ontology.id, "people.json");
    }

    #[test]
    fn standard_keys_fall_back_to_map_key() {
        let doc = json!({"name": "T", "classes": {"Thing": {"rdfs:comment": "anything"}}});
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.entities[0].id, "Thing");
        assert_eq!(ontology.entities[0].label, "Thing");
        assert_eq!(ontology.entities[0].description, "anything");
    }

    #[test]
    fn standard_object_properties_fallback() {
        let doc = json!({
            "classes": {},
            "objectProperties": {"owns": {"rdfs:domain": "A", "rdfs:range": "B", "w4m:cardinality": "1:1"}}
        });
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.relationships.len(), 1);
        assert_eq!(ontology.relationships[0].cardinality, "1:1");
    }

    #[test]
    fn present_relationships_key_shadows_object_properties() {
        let doc = json!({
            "classes": {},
            "relationships": [],
            "objectProperties": {"owns": {"rdfs:domain": "A", "rdfs:range": "B"}}
        });
        let ontology = parse_ontology(&doc, "").unwrap();
        assert!(ontology.relationships.is_empty());
    }

    #[test]
    fn non_object_relationship_entries_are_reported() {
        let doc = json!({
            "classes": {},
            "relationships": {"note": "free text", "r": {"rdfs:domain": "A", "rdfs:range": "B"}}
        });
        let (ontology, report) = parse_with_report(&doc, "").unwrap();
        assert_eq!(ontology.relationships.len(), 1);
        assert_eq!(report.skipped, vec!["relationships.note".to_string()]);
    }

    #[test]
    fn business_rules_from_mapping_and_list() {
        let doc = json!({"classes": {}, "businessRules": {"BR1": "Must have a vision"}});
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.business_rules, vec![BusinessRule::new("BR1", "Must have a vision")]);

        let doc = json!({"classes": {}, "w4m:cardinalRules": [{"id": "C1", "rule": "one"}, "two"]});
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(
            ontology.business_rules,
            vec![BusinessRule::new("C1", "one"), BusinessRule::new("rule_2", "two")]
        );
    }

    #[test]
    fn string_context_is_wrapped_as_vocab() {
        let doc = json!({"@context": "https://schema.org/", "classes": {}});
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.context.get("@vocab"), Some(&json!("https://schema.org/")));
    }

    #[test]
    fn json_ld_value_and_id_objects() {
        let doc = json!({
            "classes": {"Dog": {
                "rdfs:label": {"@value": "Dog", "@language": "en"},
                "rdfs:subClassOf": {"@id": "ex:Animal"}
            }}
        });
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.entities[0].label, "Dog");
        assert_eq!(ontology.entities[0].parent_class.as_deref(), Some("ex:Animal"));
    }

    #[test]
    fn registry_entry_bare_lists() {
        let doc = json!({"registryEntry": {
            "domain": "Sales",
            "version": "2.0.0",
            "status": "active",
            "entities": {"list": ["A", "B", "C"]},
            "relationships": {"list": ["r1", "r2"]}
        }});
        let ontology = parse_ontology(&doc, "reg.json").unwrap();
        assert_eq!(ontology.name, "Sales");
        assert_eq!(ontology.version, "2.0.0");
        assert_eq!(ontology.description, "Domain: Sales");
        assert_eq!(ontology.entities.len(), 3);
        assert_eq!(ontology.relationships.len(), 2);
        assert_eq!(ontology.relationships[0].source, "");
        assert_eq!(ontology.metadata.get("status"), Some(&json!("active")));
        assert_eq!(ontology.metadata.get("useCases"), Some(&json!([])));
    }

    #[test]
    fn registry_null_items_are_skipped() {
        let doc = json!({"registryEntry": {
            "entities": {"list": ["A", null, "C"]},
            "relationships": {"list": [null]}
        }});
        let (ontology, report) = parse_with_report(&doc, "reg.json").unwrap();
        let ids: Vec<&str> = ontology.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert!(ontology.relationships.is_empty());
        assert_eq!(
            report.skipped,
            vec![
                "registryEntry.entities.list[1]".to_string(),
                "registryEntry.relationships.list[0]".to_string(),
            ]
        );
    }

    #[test]
    fn uniregistry_delegates_to_graph_or_standard() {
        let doc = json!({"ontologyDefinition": {"@graph": [{"@id": "ex:A", "@type": "owl:Class"}]}});
        let (ontology, report) = parse_with_report(&doc, "").unwrap();
        assert_eq!(report.dialect, Dialect::UniRegistry);
        assert_eq!(ontology.entities.len(), 1);

        let doc = json!({"ontologyDefinition": {"name": "Inner", "classes": {"A": {}}}});
        let ontology = parse_ontology(&doc, "").unwrap();
        assert_eq!(ontology.name, "Inner");
        assert_eq!(ontology.entities[0].id, "A");
    }

    #[test]
    fn graph_dialect_classifies_nodes() {
        let doc = json!({"@graph": [
            {"@id": "ex:Person", "@type": "owl:Class", "rdfs:label": "Person"},
            {"@id": "ex:Org", "@type": ["rdfs:Class"], "name": "Org", "description": "group"},
            {"@id": "ex:worksFor", "@type": "owl:ObjectProperty", "rdfs:domain": "ex:Person", "rdfs:range": {"@id": "ex:Org"}},
            {"@id": "ex:alice", "@type": "ex:Person"}
        ]});
        let (ontology, report) = parse_with_report(&doc, "").unwrap();
        assert_eq!(ontology.entities.len(), 2);
        assert_eq!(ontology.entities[1].label, "Org");
        assert_eq!(ontology.entities[1].description, "group");
        assert_eq!(ontology.relationships.len(), 1);
        assert_eq!(ontology.relationships[0].target, "ex:Org");
        assert_eq!(report.skipped, vec!["ex:alice".to_string()]);
    }

    #[test]
    fn classify_is_case_sensitive() {
        assert_eq!(classify_graph_node(&["owl:class".into()]), GraphNodeKind::Unclassified);
        assert_eq!(classify_graph_node(&["rdf:Property".into()]), GraphNodeKind::Relationship);
        assert_eq!(classify_graph_node(&[]), GraphNodeKind::Unclassified);
    }

    #[test]
    fn inferred_scans_all_containers_in_order() {
        let doc = json!({
            "terms": ["t1"],
            "entities": {"e1": {"label": "Entity One"}, "e2": "plain"},
            "concepts": [{"id": "c1", "name": "Concept"}, 7]
        });
        let (ontology, report) = parse_with_report(&doc, "x.json").unwrap();
        let ids: Vec<&str> = ontology.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "c1", "t1"]);
        assert_eq!(ontology.entities[0].label, "Entity One");
        assert_eq!(ontology.entities[2].label, "Concept");
        assert!(ontology.relationships.is_empty());
        assert_eq!(ontology.metadata.get("format"), Some(&json!("inferred")));
        assert_eq!(report.skipped, vec!["concepts[1]".to_string()]);
    }

    #[test]
    fn shape_errors_name_the_field() {
        let doc = json!({"classes": {"A": "not an object"}});
        let err = parse_ontology(&doc, "").unwrap_err();
        match err {
            LoadError::Shape { at, expected, found } => {
                assert_eq!(at, "classes.A");
                assert_eq!(expected, "object");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_ontology(&json!(["not", "a", "mapping"]), "").is_err());
        assert!(parse_ontology(&json!({"classes": 3}), "").is_err());
    }
}
