//! Cheap width estimates of domain interaction graphs, used to decide which
//! domains are worth handing to the full minor-finding algorithm.
use std::collections::{BTreeMap, BTreeSet};

use crate::models::DomainGraph;

///
/// Upper bound on the treewidth of the graph (edge directions ignored),
/// computed with the minimum-degree elimination heuristic.
///
/// Ties between nodes of equal degree are broken by the lower node number,
/// so the result is deterministic.
///
pub fn treewidth_min_degree(graph: &DomainGraph) -> usize {
    let mut adjacency: BTreeMap<usize, BTreeSet<usize>> = (1..=graph.node_count())
        .map(|n| (n, BTreeSet::new()))
        .collect();

    for (u, v) in graph.edges() {
        if u == v {
            continue;
        }
        adjacency.entry(u).or_default().insert(v);
        adjacency.entry(v).or_default().insert(u);
    }

    let mut width = 0;
    loop {
        let Some(node) = adjacency
            .iter()
            .min_by_key(|(n, nbrs)| (nbrs.len(), **n))
            .map(|(&n, _)| n)
        else {
            break;
        };
        let neighbors = adjacency.remove(&node).unwrap_or_default();
        width = width.max(neighbors.len());

        for &u in &neighbors {
            if let Some(set) = adjacency.get_mut(&u) {
                set.remove(&node);
                set.extend(neighbors.iter().copied().filter(|&w| w != u));
            }
        }
    }
    width
}

///
/// Cutwidth of the linear layout `1..=N`: the largest number of edges going
/// from a prefix `1..=k` into the suffix `k+1..=N`, over every cut point.
///
pub fn cutwidth(graph: &DomainGraph) -> usize {
    let n = graph.node_count();
    if n == 0 {
        return 0;
    }

    // crossing[k] changes by +1 when an edge leaves node k forward, -1 where it lands
    let mut delta = vec![0i64; n + 2];
    for (u, v) in graph.edges() {
        if u < v {
            delta[u] += 1;
            delta[v] -= 1;
        }
    }

    let mut crossing = 0i64;
    let mut widest = 0i64;
    for d in delta.iter().take(n).skip(1) {
        crossing += d;
        widest = widest.max(crossing);
    }
    widest as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_cutwidth_triangle() {
        // NODE a / NODE b / NODE c / EDGE a c
        let graph = DomainGraph::from_reader("NODE a\nNODE b\nNODE c\nEDGE a c\n".as_bytes()).unwrap();
        // cut after 1: (1,2),(1,3); cut after 2: (2,3),(1,3)
        assert_eq!(cutwidth(&graph), 2);
    }

    #[rstest]
    fn test_cutwidth_ignores_backward_edges() {
        let graph = DomainGraph::from_edges(3, &[(3, 1)]).unwrap();
        assert_eq!(cutwidth(&graph), 1);
    }

    #[rstest]
    fn test_cutwidth_nested_chords() {
        let graph = DomainGraph::from_edges(6, &[(1, 6), (2, 5), (3, 4), (1, 3)]).unwrap();
        // cut after 3: (3,4) path, (1,6), (2,5), (3,4) chord
        assert_eq!(cutwidth(&graph), 4);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    fn test_widths_of_paths(#[case] nodes: usize, #[case] expected: usize) {
        let graph = DomainGraph::from_edges(nodes, &[]).unwrap();
        assert_eq!(cutwidth(&graph), expected);
        assert_eq!(treewidth_min_degree(&graph), expected);
    }

    #[rstest]
    fn test_treewidth_cycle_and_clique() {
        let cycle = DomainGraph::from_edges(5, &[(5, 1)]).unwrap();
        assert_eq!(treewidth_min_degree(&cycle), 2);

        let mut chords = Vec::new();
        for u in 1..=4 {
            for v in (u + 2)..=4 {
                chords.push((u, v));
            }
        }
        let clique = DomainGraph::from_edges(4, &chords).unwrap();
        assert_eq!(treewidth_min_degree(&clique), 3);
    }

    #[rstest]
    fn test_treewidth_ignores_direction_and_duplicates() {
        let graph = DomainGraph::from_edges(3, &[(2, 1), (3, 1), (1, 3)]).unwrap();
        assert_eq!(treewidth_min_degree(&graph), 2);
    }
}
