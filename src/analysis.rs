//! Path and centrality algorithms over [`OntologyGraph`].
//!
//! Neighbors are visited in edge insertion order, so every result is
//! deterministic for a given graph.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::OntologyGraph;

/// Shortest path by edge count (BFS). `start == end` yields `[start]`.
pub fn shortest_path<'g>(graph: &'g OntologyGraph, start: &str, end: &str) -> Option<Vec<&'g str>> {
    let start = graph.id_of(graph.index_of(start)?);
    let end = graph.id_of(graph.index_of(end)?);
    if start == end {
        return Some(vec![start]);
    }

    let mut parent: HashMap<&str, &str> = HashMap::new();
    let mut seen: HashSet<&str> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in graph.successors(current) {
            if !seen.insert(next) {
                continue;
            }
            parent.insert(next, current);
            if next == end {
                let mut path = vec![end];
                let mut node = end;
                while let Some(&prev) = parent.get(node) {
                    path.push(prev);
                    node = prev;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

pub fn simple_paths<'g>(
    graph: &'g OntologyGraph,
    source: &str,
    target: &str,
    max_hops: usize,
    limit: usize,
) -> Vec<Vec<&'g str>> {
    let mut paths = Vec::new();
    let (Some(s), Some(t)) = (graph.index_of(source), graph.index_of(target)) else {
        return paths;
    };
    if s == t || limit == 0 || max_hops == 0 {
        return paths;
    }
    let (source, target) = (graph.id_of(s), graph.id_of(t));

    let mut path = vec![source];
    let mut stack = vec![graph.successors(source).into_iter()];
    while let Some(children) = stack.last_mut() {
        let Some(child) = children.next() else {
            stack.pop();
            path.pop();
            continue;
        };
        if path.contains(&child) {
            continue;
        }
        if child == target {
            let mut found = path.clone();
            found.push(child);
            paths.push(found);
            if paths.len() == limit {
                break;
            }
        } else if path.len() < max_hops {
            path.push(child);
            stack.push(graph.successors(child).into_iter());
        }
    }
    paths
}

/// Directed betweenness centrality (Brandes), normalized by
/// `1 / ((n - 1)(n - 2))` when the graph has more than two nodes.
/// Scores are returned in node insertion order.
pub fn betweenness_centrality(graph: &OntologyGraph) -> Vec<(&str, f64)> {
    let ids: Vec<&str> = graph.nodes().map(|(id, _)| id).collect();
    let n = ids.len();
    let pos: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let adjacency: Vec<Vec<usize>> = ids
        .iter()
        .map(|id| graph.successors(id).into_iter().map(|succ| pos[succ]).collect())
        .collect();

    let mut scores = vec![0.0_f64; n];
    for s in 0..n {
        let mut order = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[s] = 1.0;
        dist[s] = Some(0);

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = dist[v].unwrap_or(0);
            for &w in &adjacency[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut scores {
            *score *= scale;
        }
    }
    ids.into_iter().zip(scores).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeAttrs, NodeAttrs};
    use pretty_assertions::assert_eq;

    fn graph(edges: &[(&str, &str)]) -> OntologyGraph {
        let mut g = OntologyGraph::default();
        for (a, b) in edges {
            g.upsert_edge(a, b, EdgeAttrs::new(""));
        }
        g
    }

    #[test]
    fn shortest_path_prefers_fewer_hops() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        assert_eq!(shortest_path(&g, "a", "d"), Some(vec!["a", "d"]));
        assert_eq!(shortest_path(&g, "b", "d"), Some(vec!["b", "c", "d"]));
    }

    #[test]
    fn shortest_path_same_node_and_missing() {
        let mut g = graph(&[("a", "b")]);
        g.upsert_node("lonely", NodeAttrs::new("Lonely"));
        assert_eq!(shortest_path(&g, "a", "a"), Some(vec!["a"]));
        assert_eq!(shortest_path(&g, "b", "a"), None);
        assert_eq!(shortest_path(&g, "a", "lonely"), None);
        assert_eq!(shortest_path(&g, "a", "nowhere"), None);
    }

    #[test]
    fn simple_paths_in_dfs_order() {
        let g = graph(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("a", "d")]);
        let paths = simple_paths(&g, "a", "d", 10, 5);
        assert_eq!(
            paths,
            vec![vec!["a", "b", "d"], vec!["a", "c", "d"], vec!["a", "d"]]
        );
    }

    #[test]
    fn simple_paths_respect_hops_and_limit() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "d"), ("a", "d")]);
        assert_eq!(simple_paths(&g, "a", "d", 1, 5), vec![vec!["a", "d"]]);
        assert_eq!(simple_paths(&g, "a", "d", 10, 1).len(), 1);
        assert!(simple_paths(&g, "a", "a", 10, 5).is_empty());
    }

    #[test]
    fn simple_paths_ignore_cycles() {
        let g = graph(&[("a", "b"), ("b", "a"), ("b", "c")]);
        assert_eq!(simple_paths(&g, "a", "c", 10, 5), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn betweenness_of_a_chain() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        let scores = betweenness_centrality(&g);
        assert_eq!(scores, vec![("a", 0.0), ("b", 0.5), ("c", 0.0)]);
    }

    #[test]
    fn betweenness_splits_over_equal_paths() {
        let g = graph(&[("s", "x"), ("s", "y"), ("x", "t"), ("y", "t")]);
        let scores: HashMap<&str, f64> = betweenness_centrality(&g).into_iter().collect();
        let scale = 1.0 / 6.0;
        assert_eq!(scores["x"], 0.5 * scale);
        assert_eq!(scores["y"], 0.5 * scale);
        assert_eq!(scores["s"], 0.0);
    }
}
