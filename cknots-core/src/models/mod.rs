pub mod ccd;
pub mod cell_line;
pub mod chromosome;
pub mod graph;
pub mod link;
pub mod locus;

// re-export for cleaner imports
pub use self::ccd::Ccd;
pub use self::cell_line::CellLine;
pub use self::chromosome::Chromosome;
pub use self::graph::DomainGraph;
pub use self::link::Link;
pub use self::locus::{Edge, Endpoint, Locus};
