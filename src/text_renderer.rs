//! Box-drawing text rendering of a [`GraphLayout`].
//!
//! Edges between consecutive ranks are drawn as connectors. Edges that the
//! drawing cannot show in full (back edges, self-loops, rank skips, and
//! labels hidden by a shared bus) are listed below the diagram.

use std::collections::HashMap;

use crate::cardinality::Cardinality;
use crate::display_width::display_width;
use crate::layout::{EdgeLayout, EdgeRoute, GraphLayout, NodeLayout, NodeShape};

struct Grid {
    cells: Vec<Vec<char>>,
    width: usize,
    height: usize,
}

impl Grid {
    fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            width,
            height,
        }
    }

    fn set(&mut self, row: usize, col: usize, ch: char) {
        if row < self.height && col < self.width {
            if self.cells[row][col] == '\0' && col > 0 && self.cells[row][col - 1] != '\0' {
                self.cells[row][col - 1] = ' ';
            }
            self.cells[row][col] = ch;
        }
    }

    fn write_str(&mut self, row: usize, col: usize, s: &str) {
        let mut offset = 0;
        for ch in s.chars() {
            self.set(row, col + offset, ch);
            let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1);
            for j in 1..w {
                self.set(row, col + offset + j, '\0');
            }
            offset += w;
        }
    }

    fn set_merge(&mut self, row: usize, col: usize, ch: char) {
        if row < self.height && col < self.width {
            let existing = self.cells[row][col];
            let merged = merge_box_drawing(existing, ch);
            self.set(row, col, merged);
        }
    }

    fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                let line: String = row.iter().filter(|&&ch| ch != '\0').collect();
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn render(layout: &GraphLayout) -> String {
    let mut grid = Grid::new(layout.width, layout.height);
    let node_map: HashMap<&str, &NodeLayout> =
        layout.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    for node in &layout.nodes {
        draw_node(&mut grid, node);
    }

    let mut listed: Vec<&EdgeLayout> = Vec::new();
    for edge in &layout.edges {
        let drawn_in_full = match edge.route {
            EdgeRoute::Adjacent => {
                let from = node_map[edge.from_id.as_str()];
                let to = node_map[edge.to_id.as_str()];
                draw_td_edge(&mut grid, from, to, edge, layout)
            }
            EdgeRoute::Listed => false,
        };
        if !drawn_in_full {
            listed.push(edge);
        }
    }

    let mut out = grid.render();
    if !listed.is_empty() {
        out.push_str("\n\n");
        let lines: Vec<String> = listed
            .iter()
            .map(|edge| listed_edge_line(edge, &node_map))
            .collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

fn draw_node(grid: &mut Grid, node: &NodeLayout) {
    match node.shape {
        NodeShape::Box => draw_box(grid, node.x, node.y, node.width, &node.label),
        NodeShape::Round => draw_round(grid, node.x, node.y, node.width, &node.label),
        NodeShape::Diamond => draw_diamond(grid, node.x, node.y, node.width, &node.label),
    }
}

fn draw_box(grid: &mut Grid, x: usize, y: usize, width: usize, label: &str) {
    grid.set(y, x, '┌');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y, col, '─');
    }
    grid.set(y, x + width - 1, '┐');

    grid.set(y + 1, x, '│');
    grid.write_str(y + 1, x + 2, label);
    grid.set(y + 1, x + width - 1, '│');

    grid.set(y + 2, x, '└');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y + 2, col, '─');
    }
    grid.set(y + 2, x + width - 1, '┘');
}

fn draw_round(grid: &mut Grid, x: usize, y: usize, width: usize, label: &str) {
    grid.set(y, x, '╭');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y, col, '─');
    }
    grid.set(y, x + width - 1, '╮');

    grid.set(y + 1, x, '│');
    let inner = width - 2;
    let pad_left = (inner - display_width(label)) / 2;
    grid.write_str(y + 1, x + 1 + pad_left, label);
    grid.set(y + 1, x + width - 1, '│');

    grid.set(y + 2, x, '╰');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y + 2, col, '─');
    }
    grid.set(y + 2, x + width - 1, '╯');
}

fn draw_diamond(grid: &mut Grid, x: usize, y: usize, width: usize, label: &str) {
    grid.set(y, x, '╱');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y, col, '─');
    }
    grid.set(y, x + width - 1, '╲');

    grid.set(y + 1, x, '│');
    grid.write_str(y + 1, x + 2, label);
    grid.set(y + 1, x + width - 1, '│');

    grid.set(y + 2, x, '╲');
    for col in (x + 1)..(x + width - 1) {
        grid.set(y + 2, col, '─');
    }
    grid.set(y + 2, x + width - 1, '╱');
}

const DIR_L: u8 = 1;
const DIR_R: u8 = 2;
const DIR_U: u8 = 4;
const DIR_D: u8 = 8;

fn box_connections(ch: char) -> u8 {
    match ch {
        '─' | '╌' => DIR_L | DIR_R,
        '│' | '┊' => DIR_U | DIR_D,
        '┌' => DIR_R | DIR_D,
        '┐' => DIR_L | DIR_D,
        '└' => DIR_R | DIR_U,
        '┘' => DIR_L | DIR_U,
        '┬' => DIR_L | DIR_R | DIR_D,
        '┴' => DIR_L | DIR_R | DIR_U,
        '├' => DIR_U | DIR_D | DIR_R,
        '┤' => DIR_U | DIR_D | DIR_L,
        '┼' => DIR_L | DIR_R | DIR_U | DIR_D,
        _ => 0,
    }
}

fn connections_to_char(conn: u8) -> Option<char> {
    match conn {
        c if c == DIR_L | DIR_R => Some('─'),
        c if c == DIR_U | DIR_D => Some('│'),
        c if c == DIR_R | DIR_D => Some('┌'),
        c if c == DIR_L | DIR_D => Some('┐'),
        c if c == DIR_R | DIR_U => Some('└'),
        c if c == DIR_L | DIR_U => Some('┘'),
        c if c == DIR_L | DIR_R | DIR_D => Some('┬'),
        c if c == DIR_L | DIR_R | DIR_U => Some('┴'),
        c if c == DIR_U | DIR_D | DIR_R => Some('├'),
        c if c == DIR_U | DIR_D | DIR_L => Some('┤'),
        c if c == DIR_L | DIR_R | DIR_U | DIR_D => Some('┼'),
        _ => None,
    }
}

fn merge_box_drawing(existing: char, new_char: char) -> char {
    let ec = box_connections(existing);
    let nc = box_connections(new_char);
    if ec == 0 {
        return new_char;
    }
    connections_to_char(ec | nc).unwrap_or(new_char)
}

fn td_vertical_connector(edge: &EdgeLayout) -> char {
    if edge.dashed { '┊' } else { '│' }
}

fn draw_bus(grid: &mut Grid, row: usize, ups: &[usize], downs: &[usize]) {
    let all = || ups.iter().chain(downs.iter()).copied();
    let (Some(left), Some(right)) = (all().min(), all().max()) else {
        return;
    };
    for col in left..=right {
        let mut conn = 0;
        if col > left {
            conn |= DIR_L;
        }
        if col < right {
            conn |= DIR_R;
        }
        if ups.contains(&col) {
            conn |= DIR_U;
        }
        if downs.contains(&col) {
            conn |= DIR_D;
        }
        if let Some(ch) = connections_to_char(conn) {
            grid.set_merge(row, col, ch);
        }
    }
}

fn adjacent_centers(
    layout: &GraphLayout,
    keep: impl Fn(&EdgeLayout) -> bool,
    endpoint: impl Fn(&EdgeLayout) -> &str,
) -> Vec<usize> {
    layout
        .edges
        .iter()
        .filter(|e| e.route == EdgeRoute::Adjacent && keep(e))
        .filter_map(|e| layout.nodes.iter().find(|n| n.id == endpoint(e)))
        .map(|n| n.center_x)
        .collect()
}

/// Returns whether the edge label made it into the drawing.
fn draw_td_edge(
    grid: &mut Grid,
    from: &NodeLayout,
    to: &NodeLayout,
    edge: &EdgeLayout,
    layout: &GraphLayout,
) -> bool {
    let from_cx = from.center_x;
    let to_cx = to.center_x;
    let bottom_row = from.y + from.height - 1;
    let from_below = from.y + from.height;
    let to_above = to.y - 1;

    grid.set(bottom_row, from_cx, '┬');

    let child_centers = adjacent_centers(layout, |e| e.from_id == from.id, |e| e.to_id.as_str());
    let parent_centers = adjacent_centers(layout, |e| e.to_id == to.id, |e| e.from_id.as_str());

    let drawn_in_full = if child_centers.len() > 1 {
        draw_bus(grid, from_below, &[from_cx], &child_centers);
        edge.label.is_none()
    } else if parent_centers.len() > 1 {
        draw_bus(grid, from_below, &parent_centers, &[to_cx]);
        edge.label.is_none()
    } else if from_cx != to_cx {
        draw_bus(grid, from_below, &[from_cx], &[to_cx]);
        edge.label.is_none()
    } else {
        if let Some(ref label) = edge.label {
            let label_col = from_cx.saturating_sub(display_width(label) / 2);
            grid.write_str(from_below, label_col, label);
        } else {
            for row in from_below..to_above {
                grid.set(row, from_cx, td_vertical_connector(edge));
            }
        }
        true
    };

    grid.set(to_above, to_cx, '▼');
    drawn_in_full && edge.cardinality.is_none()
}

fn listed_edge_line(edge: &EdgeLayout, node_map: &HashMap<&str, &NodeLayout>) -> String {
    let name = |id: &str| {
        node_map
            .get(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| id.to_string())
    };
    let dash = if edge.dashed { '╌' } else { '─' };
    let shaft = match &edge.label {
        Some(label) => format!("{dash}{label}{dash}"),
        None => format!("{dash}{dash}"),
    };
    let mut line = format!("  {} {shaft}▶ {}", name(&edge.from_id), name(&edge.to_id));
    if let Some(raw) = &edge.cardinality {
        let card = Cardinality::parse(raw);
        line.push_str(&format!("  [{} {}]", card.marker(), card.describe()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs, OntologyGraph};
    use crate::layout::compute;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;

    fn boxed(g: &mut OntologyGraph, id: &str, label: &str) {
        let mut attrs = NodeAttrs::new(label);
        attrs.shape = Some("box".to_string());
        g.upsert_node(id, attrs);
    }

    fn render_graph(g: &OntologyGraph) -> String {
        render(&compute(g, &Theme::default()).unwrap())
    }

    #[test]
    fn render_single_node() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "Hello");
        let expected = "\
┌───────┐
│ Hello │
└───────┘";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn render_round_node() {
        let mut g = OntologyGraph::default();
        g.upsert_node("p", NodeAttrs::new("Person"));
        let expected = "\
╭────────╮
│ Person │
╰────────╯";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn render_linear_chain() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "Start");
        boxed(&mut g, "B", "End");
        g.upsert_edge("A", "B", EdgeAttrs::new(""));
        let expected = "\
┌───────┐
│ Start │
└───┬───┘
    │
    ▼
 ┌─────┐
 │ End │
 └─────┘";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn render_edge_label() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "A");
        boxed(&mut g, "B", "B");
        g.upsert_edge("A", "B", EdgeAttrs::new("yes"));
        let expected = "\
┌───┐
│ A │
└─┬─┘
 yes
  ▼
┌───┐
│ B │
└───┘";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn render_fan_out() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "A");
        boxed(&mut g, "B", "B");
        boxed(&mut g, "C", "C");
        g.upsert_edge("A", "B", EdgeAttrs::new(""));
        g.upsert_edge("A", "C", EdgeAttrs::new(""));
        let expected = "\
    ┌───┐
    │ A │
    └─┬─┘
  ┌───┴───┐
  ▼       ▼
┌───┐   ┌───┐
│ B │   │ C │
└───┘   └───┘";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn render_fan_in() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "A");
        boxed(&mut g, "B", "B");
        boxed(&mut g, "C", "C");
        g.upsert_edge("A", "C", EdgeAttrs::new(""));
        g.upsert_edge("B", "C", EdgeAttrs::new(""));
        let expected = "\
┌───┐   ┌───┐
│ A │   │ B │
└─┬─┘   └─┬─┘
  └───┬───┘
      ▼
    ┌───┐
    │ C │
    └───┘";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn self_loop_is_listed_with_cardinality() {
        let mut g = OntologyGraph::default();
        g.upsert_node("Person", NodeAttrs::new("Person"));
        g.upsert_edge("Person", "Person", EdgeAttrs::new("knows").with_cardinality("1:*"));
        let expected = "\
╭────────╮
│ Person │
╰────────╯

  Person ─knows─▶ Person  [|{ one-to-many]";
        assert_eq!(render_graph(&g), expected);
    }

    #[test]
    fn bus_labels_are_listed() {
        let mut g = OntologyGraph::default();
        boxed(&mut g, "A", "A");
        boxed(&mut g, "B", "B");
        boxed(&mut g, "C", "C");
        g.upsert_edge("A", "B", EdgeAttrs::new("left"));
        g.upsert_edge("A", "C", EdgeAttrs::new("").dashed());
        let out = render_graph(&g);
        assert!(out.ends_with("\n\n  A ─left─▶ B"), "got:\n{out}");
    }

    #[test]
    fn merge_joins_crossing_lines() {
        assert_eq!(merge_box_drawing('─', '│'), '┼');
        assert_eq!(merge_box_drawing('┌', '┐'), '┬');
        assert_eq!(merge_box_drawing(' ', '┘'), '┘');
    }
}
