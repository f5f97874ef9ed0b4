use std::collections::HashSet;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::consts::LINK_BACKBONE_LEN;
use crate::errors::{KnotError, Result};
use crate::models::locus::{Edge, Endpoint};

///
/// Link struct, a single minor ("knot") found by the minor finder.
///
/// The six endpoints form the backbone path 0 -> 1 -> ... -> 5; `edges` are
/// the chords that together with the backbone realize the searched pattern.
/// Equality and hashing only look at the endpoints, so two minors with the
/// same backbone but different recorded chords are the same link.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    endpoints: Vec<Endpoint>,
    edges: Vec<Edge>,
}

impl Link {
    pub fn new(endpoints: Vec<Endpoint>, edges: Vec<Edge>) -> Result<Self> {
        if endpoints.len() != LINK_BACKBONE_LEN {
            return Err(KnotError::LinkParse(format!(
                "a link needs exactly {} endpoints, found {}",
                LINK_BACKBONE_LEN,
                endpoints.len()
            )));
        }
        Ok(Link { endpoints, edges })
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    ///
    /// Smallest base position over all endpoint loci.
    ///
    pub fn min(&self) -> u64 {
        self.endpoints
            .iter()
            .flat_map(|e| [e.start.position, e.end.position])
            .min()
            .unwrap_or(0)
    }

    ///
    /// Largest base position over all endpoint loci.
    ///
    pub fn max(&self) -> u64 {
        self.endpoints
            .iter()
            .flat_map(|e| [e.start.position, e.end.position])
            .max()
            .unwrap_or(0)
    }

    ///
    /// Do the inclusive spans of two links intersect once both are widened by
    /// `tolerance` bases on each side?
    ///
    pub fn overlaps(&self, other: &Link, tolerance: u64) -> bool {
        self.min().saturating_sub(tolerance) <= other.max().saturating_add(tolerance)
            && other.min().saturating_sub(tolerance) <= self.max().saturating_add(tolerance)
    }

    ///
    /// Number of backbone positions whose `(start, end)` coordinates differ.
    ///
    pub fn differences(&self, other: &Link) -> usize {
        self.endpoints
            .iter()
            .zip(other.endpoints.iter())
            .filter(|(a, b)| {
                a.start.position != b.start.position || a.end.position != b.end.position
            })
            .count()
    }

    ///
    /// Sorted chord identifiers, i.e. the multiset used for deduplication.
    ///
    pub fn edge_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.edges.iter().map(|e| e.edge_id).collect();
        ids.sort_unstable();
        ids
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.endpoints == other.endpoints
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.endpoints.hash(state);
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoints = [")?;
        for endpoint in &self.endpoints {
            writeln!(f, "\t{endpoint}")?;
        }
        writeln!(f, "]")?;
        writeln!(f, "Edges = [")?;
        for edge in &self.edges {
            writeln!(f, "\t{edge}")?;
        }
        writeln!(f, "]")
    }
}

///
/// Keep the first link seen for every distinct multiset of chord identifiers.
///
pub fn remove_duplicate_links(links: &[Link]) -> Vec<Link> {
    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    links
        .iter()
        .filter(|link| seen.insert(link.edge_ids()))
        .cloned()
        .collect()
}

///
/// Greedily keep a link only if it differs from every link kept so far in at
/// least `min_differences` backbone positions.
///
pub fn remove_similar_links(links: &[Link], min_differences: usize) -> Vec<Link> {
    let mut kept: Vec<Link> = Vec::new();
    for link in links {
        if kept
            .iter()
            .all(|other| link.differences(other) >= min_differences)
        {
            kept.push(link.clone());
        }
    }
    kept
}
