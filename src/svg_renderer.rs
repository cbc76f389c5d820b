use std::collections::{BTreeSet, HashMap};

use crate::graph::{EdgeStyle, NodeAttrs, OntologyGraph};
use crate::layout::{EdgeRoute, GraphLayout, NodeLayout, NodeShape};
use crate::theme::Theme;

const CHAR_WIDTH: f64 = 8.0;
const ROW_HEIGHT: f64 = 16.0;
const MARGIN: f64 = 20.0;
const TITLE_HEIGHT: f64 = 32.0;
const LEGEND_ROW: f64 = 18.0;
const LOOP_SPREAD: f64 = 14.0;
const DEFAULT_TITLE: &str = "Ontology Graph";

struct Frame {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Frame {
    fn of(node: &NodeLayout) -> Self {
        Self {
            x: MARGIN + node.x as f64 * CHAR_WIDTH,
            y: MARGIN + TITLE_HEIGHT + node.y as f64 * ROW_HEIGHT,
            w: node.width as f64 * CHAR_WIDTH,
            h: node.height as f64 * ROW_HEIGHT,
        }
    }

    fn cx(&self) -> f64 {
        self.x + self.w / 2.0
    }

    fn cy(&self) -> f64 {
        self.y + self.h / 2.0
    }
}

/// `layout` must have been computed from `graph`; edges are matched by
/// position.
pub fn render(graph: &OntologyGraph, layout: &GraphLayout, theme: &Theme) -> String {
    let legend = legend_entries(graph, theme);
    let listed = layout
        .edges
        .iter()
        .filter(|e| e.route == EdgeRoute::Listed)
        .count();

    let width = MARGIN * 2.0 + layout.width as f64 * CHAR_WIDTH + listed as f64 * LOOP_SPREAD + 40.0;
    let drawing_bottom = MARGIN + TITLE_HEIGHT + layout.height as f64 * ROW_HEIGHT;
    let height = drawing_bottom + MARGIN + legend.len() as f64 * LEGEND_ROW + MARGIN;

    let title = if graph.meta.name.is_empty() {
        DEFAULT_TITLE
    } else {
        graph.meta.name.as_str()
    };

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" \
         viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"sans-serif\">\n"
    ));
    out.push_str(
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" \
         markerWidth=\"8\" markerHeight=\"8\" orient=\"auto-start-reverse\">\
         <path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"context-stroke\"/></marker></defs>\n",
    );
    out.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    out.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"16\" font-weight=\"bold\">{}</text>\n",
        MARGIN,
        MARGIN + 8.0,
        escape_xml(title)
    ));

    let frames: HashMap<&str, Frame> = layout
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), Frame::of(n)))
        .collect();

    let mut bulge = 0.0;
    for ((_, _, attrs), edge) in graph.edges().zip(&layout.edges) {
        let (Some(from), Some(to)) = (
            frames.get(edge.from_id.as_str()),
            frames.get(edge.to_id.as_str()),
        ) else {
            continue;
        };
        let color = attrs
            .color
            .as_deref()
            .unwrap_or(theme.default_edge_color.as_str());
        let stroke_width = attrs.width.unwrap_or_else(|| theme.edge_width(attrs.edge_type));
        let dash = if attrs.style == EdgeStyle::Dashed {
            " stroke-dasharray=\"6 4\""
        } else {
            ""
        };

        let (path, label_x, label_y) = match edge.route {
            EdgeRoute::Adjacent => {
                let (x1, y1, x2, y2) = (from.cx(), from.y + from.h, to.cx(), to.y);
                (
                    format!("M {x1:.1} {y1:.1} L {x2:.1} {y2:.1}"),
                    (x1 + x2) / 2.0 + 4.0,
                    (y1 + y2) / 2.0,
                )
            }
            EdgeRoute::Listed if edge.from_id == edge.to_id => {
                let x = from.x + from.w;
                let (y1, y2) = (from.cy() - 4.0, from.cy() + 4.0);
                let reach = x + 24.0;
                (
                    format!("M {x:.1} {y1:.1} C {reach:.1} {:.1}, {reach:.1} {:.1}, {x:.1} {y2:.1}", y1 - 16.0, y2 + 16.0),
                    reach + 2.0,
                    from.cy(),
                )
            }
            EdgeRoute::Listed => {
                bulge += LOOP_SPREAD;
                let (x1, y1) = (from.x + from.w, from.cy());
                let (x2, y2) = (to.x + to.w, to.cy());
                let reach = x1.max(x2) + 20.0 + bulge;
                (
                    format!("M {x1:.1} {y1:.1} C {reach:.1} {y1:.1}, {reach:.1} {y2:.1}, {x2:.1} {y2:.1}"),
                    reach - 4.0,
                    (y1 + y2) / 2.0,
                )
            }
        };

        out.push_str(&format!(
            "<path d=\"{path}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke_width}\"{dash} marker-end=\"url(#arrow)\"/>\n",
            escape_xml(color)
        ));
        if !attrs.label.is_empty() {
            out.push_str(&format!(
                "<text x=\"{label_x:.1}\" y=\"{label_y:.1}\" font-size=\"9\" fill=\"#444444\">{}</text>\n",
                escape_xml(&attrs.label)
            ));
        }
    }

    for node in &layout.nodes {
        let Some(attrs) = graph.node(&node.id) else {
            continue;
        };
        let f = &frames[node.id.as_str()];
        let fill = escape_xml(node_color(attrs, theme));
        let stroke = if attrs.highlighted { "#000000" } else { "#333333" };

        out.push_str("<g>");
        out.push_str(&format!("<title>{}</title>", escape_xml(&attrs.label)));
        match node.shape {
            NodeShape::Box => out.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
                f.x, f.y, f.w, f.h
            )),
            NodeShape::Round => out.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
                f.x, f.y, f.w, f.h, f.h / 2.0
            )),
            NodeShape::Diamond => out.push_str(&format!(
                "<polygon points=\"{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
                f.cx(), f.y, f.x + f.w, f.cy(), f.cx(), f.y + f.h, f.x, f.cy()
            )),
        }
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
            f.cx(),
            f.cy(),
            escape_xml(&node.label)
        ));
        out.push_str("</g>\n");
    }

    let mut y = drawing_bottom + MARGIN;
    for (node_type, color) in &legend {
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\
             <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            MARGIN,
            y,
            escape_xml(color),
            MARGIN + 18.0,
            y + 10.0,
            escape_xml(node_type)
        ));
        y += LEGEND_ROW;
    }

    out.push_str("</svg>\n");
    out
}

pub fn legend_entries(graph: &OntologyGraph, theme: &Theme) -> BTreeSet<(String, String)> {
    graph
        .nodes()
        .map(|(_, attrs)| {
            let node_type = attrs.node_type.map_or("entity", |t| t.as_str());
            (node_type.to_string(), node_color(attrs, theme).to_string())
        })
        .collect()
}

fn node_color<'a>(attrs: &'a NodeAttrs, theme: &'a Theme) -> &'a str {
    if attrs.color.is_empty() {
        &theme.default_entity_color
    } else {
        &attrs.color
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
