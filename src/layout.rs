//! Top-down layered layout of an [`OntologyGraph`].
//!
//! Nodes are ranked by longest path from the sources after back edges
//! (found by depth-first search in insertion order) are set aside. Only
//! edges that go from one rank to the next are routed; everything else is
//! marked [`EdgeRoute::Listed`] for the renderer to print separately.

use std::collections::{HashMap, HashSet};

use crate::display_width::{display_width, single_line, truncate};
use crate::error::RenderError;
use crate::graph::{EdgeStyle, OntologyGraph};
use crate::theme::Theme;

pub const MAX_LABEL_WIDTH: usize = 24;

const BOX_HEIGHT: usize = 3;
const TD_RANK_SPACING: usize = 2;
const TD_NODE_GAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Box,
    Round,
    Diamond,
}

impl NodeShape {
    pub fn from_hint(shape: &str) -> Self {
        match shape {
            "box" | "database" | "square" => NodeShape::Box,
            "diamond" | "triangle" | "star" => NodeShape::Diamond,
            _ => NodeShape::Round,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub rank: usize,
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub center_x: usize,
    pub center_y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRoute {
    Adjacent,
    /// Back edge, self-loop or rank skip.
    Listed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub from_id: String,
    pub to_id: String,
    pub label: Option<String>,
    pub cardinality: Option<String>,
    pub dashed: bool,
    pub route: EdgeRoute,
}

#[derive(Debug, Clone)]
struct NodeSpec {
    id: String,
    label: String,
    shape: NodeShape,
}

pub fn compute(graph: &OntologyGraph, theme: &Theme) -> Result<GraphLayout, RenderError> {
    compute_with_gap(graph, theme, TD_NODE_GAP)
}

/// Retries with narrower gaps until the drawing fits `max_width` columns.
pub fn compute_with_max_width(
    graph: &OntologyGraph,
    theme: &Theme,
    max_width: usize,
) -> Result<GraphLayout, RenderError> {
    for node_gap in (0..=TD_NODE_GAP).rev() {
        let layout = compute_with_gap(graph, theme, node_gap)?;
        if layout.width <= max_width {
            return Ok(layout);
        }
    }
    Err(RenderError::TooWide { max_width })
}

fn compute_with_gap(
    graph: &OntologyGraph,
    theme: &Theme,
    node_gap: usize,
) -> Result<GraphLayout, RenderError> {
    if graph.is_empty() {
        return Err(RenderError::EmptyGraph);
    }

    let ids: Vec<&str> = graph.nodes().map(|(id, _)| id).collect();
    let pairs: Vec<(&str, &str)> = graph.edges().map(|(s, t, _)| (s, t)).collect();
    let back = back_edges(&ids, &pairs);
    let ranks = assign_ranks(&ids, &pairs, &back);
    let max_rank = *ranks.values().max().unwrap_or(&0);

    let mut ranks_nodes: Vec<Vec<NodeSpec>> = vec![Vec::new(); max_rank + 1];
    for (id, attrs) in graph.nodes() {
        let text = if attrs.label.is_empty() { id } else { attrs.label.as_str() };
        let hint = attrs
            .shape
            .as_deref()
            .unwrap_or_else(|| theme.node_shape(attrs.node_type));
        ranks_nodes[ranks[id]].push(NodeSpec {
            id: id.to_string(),
            label: truncate(&single_line(text), MAX_LABEL_WIDTH),
            shape: NodeShape::from_hint(hint),
        });
    }

    let nodes = layout_td(&ranks_nodes, &ranks, node_gap);

    let edges: Vec<EdgeLayout> = graph
        .edges()
        .enumerate()
        .map(|(i, (source, target, attrs))| {
            let adjacent = !back.contains(&i) && ranks[target] == ranks[source] + 1;
            EdgeLayout {
                from_id: source.to_string(),
                to_id: target.to_string(),
                label: Some(truncate(&single_line(&attrs.label), MAX_LABEL_WIDTH))
                    .filter(|l| !l.is_empty()),
                cardinality: attrs.cardinality.clone(),
                dashed: attrs.style == EdgeStyle::Dashed,
                route: if adjacent {
                    EdgeRoute::Adjacent
                } else {
                    EdgeRoute::Listed
                },
            }
        })
        .collect();

    let width = nodes.iter().map(|n| n.x + n.width).max().unwrap_or(0);
    let height = nodes.iter().map(|n| n.y + n.height).max().unwrap_or(0);

    Ok(GraphLayout {
        nodes,
        edges,
        width,
        height,
    })
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    OnStack,
    Done,
}

/// Indices of edges that close a cycle, self-loops included. Search starts
/// from source nodes so that chains keep their natural direction.
fn back_edges(ids: &[&str], edges: &[(&str, &str)]) -> HashSet<usize> {
    let mut out: HashMap<&str, Vec<(usize, &str)>> = HashMap::new();
    let mut has_pred: HashSet<&str> = HashSet::new();
    for (i, &(from, to)) in edges.iter().enumerate() {
        out.entry(from).or_default().push((i, to));
        if from != to {
            has_pred.insert(to);
        }
    }

    let mut state: HashMap<&str, Visit> = HashMap::new();
    let mut back = HashSet::new();
    let roots = ids.iter().filter(|id| !has_pred.contains(*id));
    for &id in roots.chain(ids.iter()) {
        if !state.contains_key(id) {
            visit(id, &out, &mut state, &mut back);
        }
    }
    back
}

fn visit<'a>(
    id: &'a str,
    out: &HashMap<&'a str, Vec<(usize, &'a str)>>,
    state: &mut HashMap<&'a str, Visit>,
    back: &mut HashSet<usize>,
) {
    state.insert(id, Visit::OnStack);
    for &(edge, next) in out.get(id).map(Vec::as_slice).unwrap_or(&[]) {
        match state.get(next) {
            Some(Visit::OnStack) => {
                back.insert(edge);
            }
            Some(Visit::Done) => {}
            None => visit(next, out, state, back),
        }
    }
    state.insert(id, Visit::Done);
}

fn assign_ranks(
    ids: &[&str],
    edges: &[(&str, &str)],
    back: &HashSet<usize>,
) -> HashMap<String, usize> {
    let mut in_edges: HashMap<String, Vec<String>> = HashMap::new();
    for id in ids {
        in_edges.entry(id.to_string()).or_default();
    }
    for (i, (from, to)) in edges.iter().enumerate() {
        if back.contains(&i) {
            continue;
        }
        in_edges
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
    }

    let mut ranks: HashMap<String, usize> = HashMap::new();
    for id in ids {
        if !ranks.contains_key(*id) {
            compute_rank(id, &in_edges, &mut ranks);
        }
    }
    ranks
}

fn compute_rank(
    id: &str,
    in_edges: &HashMap<String, Vec<String>>,
    ranks: &mut HashMap<String, usize>,
) -> usize {
    if let Some(&r) = ranks.get(id) {
        return r;
    }

    let predecessors = in_edges.get(id).cloned().unwrap_or_default();
    if predecessors.is_empty() {
        ranks.insert(id.to_string(), 0);
        return 0;
    }

    let max_pred = predecessors
        .iter()
        .map(|p| compute_rank(p, in_edges, ranks))
        .max()
        .unwrap_or(0);
    let rank = max_pred + 1;
    ranks.insert(id.to_string(), rank);
    rank
}

fn layout_td(
    ranks_nodes: &[Vec<NodeSpec>],
    ranks: &HashMap<String, usize>,
    node_gap: usize,
) -> Vec<NodeLayout> {
    let mut layouts = Vec::new();

    let rank_widths: Vec<usize> = ranks_nodes
        .iter()
        .map(|rank_nodes| {
            rank_nodes
                .iter()
                .map(|n| box_width(&n.label))
                .sum::<usize>()
                + rank_nodes.len().saturating_sub(1) * node_gap
        })
        .collect();
    let max_width = *rank_widths.iter().max().unwrap_or(&0);

    let mut y = 0;
    for (rank, rank_nodes) in ranks_nodes.iter().enumerate() {
        let mut x = (max_width - rank_widths[rank]) / 2;
        for node in rank_nodes {
            let w = box_width(&node.label);
            layouts.push(NodeLayout {
                id: node.id.clone(),
                label: node.label.clone(),
                shape: node.shape,
                rank: ranks.get(&node.id).copied().unwrap_or(rank),
                x,
                y,
                width: w,
                height: BOX_HEIGHT,
                center_x: x + w / 2,
                center_y: y + BOX_HEIGHT / 2,
            });
            x += w + node_gap;
        }
        y += BOX_HEIGHT + TD_RANK_SPACING;
    }

    layouts
}

fn box_width(label: &str) -> usize {
    display_width(label) + 4
}
