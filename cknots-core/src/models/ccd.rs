use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{cutwidth, treewidth_min_degree};
use crate::errors::{KnotError, Result};
use crate::models::graph::DomainGraph;
use crate::models::link::{self, Link};
use crate::parser::parse_links_from_file;

///
/// Ccd struct, one chromatin contact domain: the unit of minor-finding work.
///
/// `number` is the 1-based position of the domain file within its
/// chromosome, the same number that is embedded in the domain file name.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ccd {
    pub start: u64,
    pub end: u64,
    pub number: usize,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(skip)]
    pub graph: Option<DomainGraph>,
}

impl Ccd {
    pub fn new(start: u64, end: u64, number: usize) -> Result<Self> {
        if start >= end {
            return Err(KnotError::InvalidDomain { start, end });
        }
        Ok(Ccd {
            start,
            end,
            number,
            links: Vec::new(),
            graph: None,
        })
    }

    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    pub fn load_links_from_file(&mut self, path: &Path) -> Result<()> {
        self.links = parse_links_from_file(path)?;
        Ok(())
    }

    pub fn load_graph_from_file(&mut self, path: &Path) -> Result<()> {
        self.graph = Some(DomainGraph::from_file(path)?);
        Ok(())
    }

    ///
    /// Keep one link per distinct multiset of chord identifiers.
    ///
    pub fn remove_duplicate_links(&mut self) {
        self.links = link::remove_duplicate_links(&self.links);
    }

    ///
    /// Drop links that differ from an already kept link in fewer than
    /// `min_differences` backbone positions.
    ///
    pub fn remove_similar_links(&mut self, min_differences: usize) {
        self.links = link::remove_similar_links(&self.links, min_differences);
    }

    ///
    /// Minimum-degree treewidth estimate, `None` until the graph is loaded.
    ///
    pub fn treewidth(&self) -> Option<usize> {
        self.graph.as_ref().map(treewidth_min_degree)
    }

    ///
    /// Cutwidth of the node order, `None` until the graph is loaded.
    ///
    pub fn cutwidth(&self) -> Option<usize> {
        self.graph.as_ref().map(cutwidth)
    }
}

impl Display for Ccd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CCD {} [{}, {}] with {} links",
            self.number,
            self.start,
            self.end,
            self.links.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::models::link::tests::make_link;

    #[rstest]
    fn test_new_requires_start_before_end() {
        assert!(Ccd::new(10, 10, 1).is_err());
        assert!(Ccd::new(11, 10, 1).is_err());
        assert_eq!(Ccd::new(10, 20, 1).unwrap().span(), 10);
    }

    #[rstest]
    fn test_each_ccd_owns_its_links() {
        let mut a = Ccd::new(0, 100, 1).unwrap();
        let b = Ccd::new(100, 200, 2).unwrap();
        a.links.push(make_link([0, 1, 2, 3, 4, 5], &[1]));
        assert_eq!(a.links.len(), 1);
        assert_eq!(b.links.len(), 0);
    }

    #[rstest]
    fn test_remove_similar_links_replaces_links() {
        let mut ccd = Ccd::new(0, 1000, 1).unwrap();
        ccd.links = vec![
            make_link([0, 100, 200, 300, 400, 500], &[1]),
            make_link([0, 100, 200, 300, 400, 505], &[2]),
        ];
        ccd.remove_similar_links(2);
        assert_eq!(ccd.links.len(), 1);
    }

    #[rstest]
    fn test_remove_duplicate_links_replaces_links() {
        let mut ccd = Ccd::new(0, 1000, 1).unwrap();
        ccd.links = vec![
            make_link([0, 100, 200, 300, 400, 500], &[1, 2]),
            make_link([5, 105, 205, 305, 405, 505], &[2, 1]),
        ];
        ccd.remove_duplicate_links();
        assert_eq!(ccd.links.len(), 1);
        assert_eq!(ccd.links[0].min(), 0);
    }

    #[rstest]
    fn test_widths_need_a_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.0001.mp");
        std::fs::write(&path, "NODE a\nNODE b\nNODE c\nEDGE a c\n").unwrap();

        let mut ccd = Ccd::new(0, 1000, 1).unwrap();
        assert_eq!(ccd.cutwidth(), None);

        ccd.load_graph_from_file(&path).unwrap();
        assert_eq!(ccd.cutwidth(), Some(2));
        assert_eq!(ccd.treewidth(), Some(2));
    }
}
