use serde_json::{Value, json};

use crate::cardinality::Cardinality;
use crate::graph::{EdgeAttrs, EdgeStyle, NodeAttrs, OntologyGraph};
use crate::svg_renderer::escape_xml;
use crate::theme::Theme;

const VIS_NETWORK_CDN: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/vis-network/9.1.9/vis-network.min.js";
const DESCRIPTION_PREVIEW: usize = 200;

pub fn render(graph: &OntologyGraph, theme: &Theme, physics: bool) -> String {
    let title = if graph.meta.name.is_empty() {
        "Ontology Graph"
    } else {
        graph.meta.name.as_str()
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="{cdn}"></script>
    <style>
        body {{ margin: 0; font-family: sans-serif; }}
        #graph {{ width: {width}; height: {height}; border: 1px solid #dddddd; }}
    </style>
</head>
<body>
    <div id="graph"></div>
    <script>
        const nodes = new vis.DataSet({nodes});
        const edges = new vis.DataSet({edges});
        const options = {options};
        const container = document.getElementById('graph');
        new vis.Network(container, {{ nodes, edges }}, options);
    </script>
</body>
</html>
"#,
        title = escape_xml(title),
        cdn = VIS_NETWORK_CDN,
        width = theme.canvas_width,
        height = theme.canvas_height,
        nodes = script_json(&nodes_payload(graph, theme)),
        edges = script_json(&edges_payload(graph, theme)),
        options = script_json(&options_payload(theme, physics)),
    )
}

pub fn nodes_payload(graph: &OntologyGraph, theme: &Theme) -> Value {
    graph
        .nodes()
        .map(|(id, attrs)| {
            let mut node = json!({
                "id": id,
                "label": if attrs.label.is_empty() { id } else { attrs.label.as_str() },
                "title": node_tooltip(id, attrs),
                "color": if attrs.color.is_empty() { theme.default_entity_color.as_str() } else { attrs.color.as_str() },
                "size": attrs.size.unwrap_or_else(|| theme.node_size(attrs.node_type)),
                "shape": attrs.shape.as_deref().unwrap_or_else(|| theme.node_shape(attrs.node_type)),
            });
            if attrs.highlighted {
                node["borderWidth"] = json!(3);
            }
            node
        })
        .collect()
}

pub fn edges_payload(graph: &OntologyGraph, theme: &Theme) -> Value {
    graph
        .edges()
        .map(|(source, target, attrs)| {
            json!({
                "from": source,
                "to": target,
                "label": attrs.label,
                "title": edge_tooltip(attrs),
                "color": attrs.color.as_deref().unwrap_or(theme.default_edge_color.as_str()),
                "width": attrs.width.unwrap_or_else(|| theme.edge_width(attrs.edge_type)),
                "arrows": "to",
                "dashes": attrs.style == EdgeStyle::Dashed,
            })
        })
        .collect()
}

pub fn options_payload(theme: &Theme, physics: bool) -> Value {
    let physics = if physics {
        json!({
            "enabled": true,
            "solver": "barnesHut",
            "barnesHut": {
                "gravitationalConstant": theme.gravity,
                "springLength": theme.spring_length,
            },
        })
    } else {
        json!({ "enabled": false })
    };
    json!({
        "physics": physics,
        "interaction": { "hover": true },
    })
}

pub fn node_tooltip(id: &str, attrs: &NodeAttrs) -> String {
    let label = if attrs.label.is_empty() { id } else { attrs.label.as_str() };
    let mut out = format!("<b>{}</b>", escape_xml(label));
    if !attrs.description.is_empty() {
        let preview: String = attrs.description.chars().take(DESCRIPTION_PREVIEW).collect();
        out.push_str(&format!("<br>{}...", escape_xml(&preview)));
    }
    if let Some(node_type) = attrs.node_type {
        out.push_str(&format!("<br><i>Type: {node_type}</i>"));
    }
    if !attrs.properties.is_empty() {
        out.push_str(&format!("<br>Properties: {}", attrs.properties.len()));
    }
    out
}

pub fn edge_tooltip(attrs: &EdgeAttrs) -> String {
    let label = if attrs.label.is_empty() { "relationship" } else { attrs.label.as_str() };
    let mut out = format!("<b>{}</b>", escape_xml(label));
    if let Some(raw) = attrs.cardinality.as_deref().filter(|c| !c.is_empty()) {
        let card = Cardinality::parse(raw);
        out.push_str(&format!(
            "<br>Cardinality: {} ({})",
            escape_xml(raw),
            escape_xml(&card.describe())
        ));
    }
    if !attrs.description.is_empty() {
        out.push_str(&format!("<br>{}", escape_xml(&attrs.description)));
    }
    out
}

/// JSON that is safe to inline in a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace('<', "\\u003c")
}
