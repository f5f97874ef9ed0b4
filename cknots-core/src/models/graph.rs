use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::errors::{KnotError, Result};
use crate::utils::get_dynamic_reader;

///
/// Interaction graph of one domain, as searched by the minor finder.
///
/// Nodes are numbered `1..=N` in declaration order. Consecutive nodes are
/// joined by the implicit backbone path `1 -> 2 -> ... -> N`, and every
/// `EDGE` entry of the domain file adds one more directed edge.
///
#[derive(Debug, Clone, Default)]
pub struct DomainGraph {
    graph: DiGraph<usize, ()>,
    names: Vec<String>,
}

impl DomainGraph {
    ///
    /// Build a graph over `node_count` nodes with the backbone path plus the
    /// given extra `(from, to)` edges (1-based node numbers).
    ///
    pub fn from_edges(node_count: usize, extra_edges: &[(usize, usize)]) -> Result<Self> {
        let names = (1..=node_count).map(|n| n.to_string()).collect();
        let mut domain_graph = DomainGraph::with_nodes(names);
        for &(from, to) in extra_edges {
            domain_graph.add_edge(from, to).map_err(|message| KnotError::GraphParse {
                line: 0,
                message,
            })?;
        }
        Ok(domain_graph)
    }

    fn with_nodes(names: Vec<String>) -> Self {
        let mut graph = DiGraph::with_capacity(names.len(), names.len());
        let indices: Vec<NodeIndex> = (1..=names.len()).map(|n| graph.add_node(n)).collect();
        for pair in indices.windows(2) {
            graph.add_edge(pair[0], pair[1], ());
        }
        DomainGraph { graph, names }
    }

    fn add_edge(&mut self, from: usize, to: usize) -> std::result::Result<(), String> {
        let n = self.node_count();
        if from == 0 || to == 0 || from > n || to > n {
            return Err(format!("edge ({from}, {to}) refers to a node outside 1..={n}"));
        }
        self.graph
            .add_edge(NodeIndex::new(from - 1), NodeIndex::new(to - 1), ());
        Ok(())
    }

    ///
    /// Parse a domain file: `NODE <id>` declares a node, `EDGE <a> <b> ...`
    /// adds a directed edge between two declared nodes. Trailing fields of an
    /// `EDGE` line are ignored.
    ///
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut edges: Vec<(String, String, usize)> = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let mut parts = line.split_whitespace();

            match parts.next() {
                None => continue,
                Some("NODE") => {
                    let name = parts.next().ok_or_else(|| KnotError::GraphParse {
                        line: line_no,
                        message: "NODE without an identifier".to_string(),
                    })?;
                    names.push(name.to_string());
                }
                Some("EDGE") => match (parts.next(), parts.next()) {
                    (Some(a), Some(b)) => edges.push((a.to_string(), b.to_string(), line_no)),
                    _ => {
                        return Err(KnotError::GraphParse {
                            line: line_no,
                            message: "EDGE needs two node identifiers".to_string(),
                        });
                    }
                },
                Some(other) => {
                    return Err(KnotError::GraphParse {
                        line: line_no,
                        message: format!("unknown entry {other:?}"),
                    });
                }
            }
        }

        let lookup: HashMap<&str, usize> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i + 1))
            .collect();

        let resolved: Vec<(usize, usize, usize)> = edges
            .iter()
            .map(|(a, b, line)| match (lookup.get(a.as_str()), lookup.get(b.as_str())) {
                (Some(&from), Some(&to)) => Ok((from, to, *line)),
                _ => Err(KnotError::GraphParse {
                    line: *line,
                    message: format!("EDGE refers to an undeclared node: {a} {b}"),
                }),
            })
            .collect::<Result<_>>()?;

        let mut domain_graph = DomainGraph::with_nodes(names);
        for (from, to, line) in resolved {
            domain_graph
                .add_edge(from, to)
                .map_err(|message| KnotError::GraphParse { line, message })?;
        }
        Ok(domain_graph)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        DomainGraph::from_reader(reader)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    ///
    /// Identifier a node was declared with (1-based).
    ///
    pub fn node_name(&self, node: usize) -> Option<&str> {
        node.checked_sub(1)
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    ///
    /// All directed edges as 1-based `(from, to)` pairs, backbone included.
    ///
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_graph_from_reader() {
        let text = "NODE a\nNODE b\nNODE c\nEDGE a c\n";
        let graph = DomainGraph::from_reader(text.as_bytes()).unwrap();

        assert_eq!(graph.node_count(), 3);
        let mut edges = graph.edges();
        edges.sort();
        assert_eq!(edges, vec![(1, 2), (1, 3), (2, 3)]);
        assert_eq!(graph.node_name(3), Some("c"));
        assert_eq!(graph.node_name(0), None);
    }

    #[rstest]
    fn test_graph_ignores_trailing_edge_fields() {
        let text = "NODE chr1_0000000100\nNODE chr1_0000000200\n\nEDGE chr1_0000000100 chr1_0000000200 17 3\n";
        let graph = DomainGraph::from_reader(text.as_bytes()).unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[rstest]
    #[case("NODE a\nEDGE a b\n")]
    #[case("NODE a\nEDGE a\n")]
    #[case("NODE\n")]
    #[case("VERTEX a\n")]
    fn test_graph_rejects_malformed_input(#[case] text: &str) {
        let result = DomainGraph::from_reader(text.as_bytes());
        assert!(matches!(result, Err(KnotError::GraphParse { .. })));
    }

    #[rstest]
    fn test_from_edges() {
        let graph = DomainGraph::from_edges(4, &[(1, 4)]).unwrap();
        assert_eq!(graph.edge_count(), 4);
        assert!(DomainGraph::from_edges(2, &[(1, 3)]).is_err());
        assert!(DomainGraph::from_edges(0, &[]).unwrap().is_empty());
    }
}
