use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::warn;

use cknots_core::diagnostics::{cutwidth, treewidth_min_degree};
use cknots_core::models::DomainGraph;

pub fn run_widths(matches: &ArgMatches) -> Result<()> {
    let graphs = matches
        .get_many::<String>("graphs")
        .context("At least one graph file is required.")?;

    println!("file\tnodes\tedges\ttreewidth\tcutwidth");
    for graph_path in graphs {
        let graph = DomainGraph::from_file(Path::new(graph_path))
            .with_context(|| format!("Failed to read {graph_path}"))?;
        if graph.is_empty() {
            warn!("{graph_path} declares no nodes");
        }
        println!(
            "{graph_path}\t{}\t{}\t{}\t{}",
            graph.node_count(),
            graph.edge_count(),
            treewidth_min_degree(&graph),
            cutwidth(&graph)
        );
    }

    Ok(())
}
