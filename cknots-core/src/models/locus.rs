use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

///
/// Locus struct, one genomic coordinate as tagged by the minor finder:
/// the internal node id plus the chromosome and base position it stands for.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Locus {
    pub id: u64,
    pub chromosome: String,
    pub position: u64,
}

impl Locus {
    pub fn new(id: u64, chromosome: impl Into<String>, position: u64) -> Self {
        Locus {
            id,
            chromosome: chromosome.into(),
            position,
        }
    }
}

impl Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}=chr{}_{:010})", self.id, self.chromosome, self.position)
    }
}

///
/// One node of the backbone path of a link.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub segment_number: u32,
    pub start: Locus,
    pub end: Locus,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start.position, self.end.position)
    }
}

///
/// A chord of a link, joining two backbone segments.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub start_segment: u32,
    pub end_segment: u32,
    pub edge_id: u64,
    pub left: Locus,
    pub right: Locus,
}

impl Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} to {}, eid={}, left={}, right={}",
            self.start_segment, self.end_segment, self.edge_id, self.left, self.right
        )
    }
}
