use std::path::Path;

use anyhow::{Context, Result, bail};

use cknots_core::models::{CellLine, Chromosome};

///
/// A results directory: a single `chr_*` directory, or a directory of them.
///
pub enum Results {
    Chromosome(Chromosome),
    CellLine(CellLine),
}

impl Results {
    pub fn load(path: &Path, ledger_file: &str) -> Result<Self> {
        if path.join(ledger_file).is_file() {
            let chromosome = Chromosome::from_dir_with_ledger(path, None, ledger_file)
                .with_context(|| format!("Failed to load chromosome from {}", path.display()))?;
            Ok(Results::Chromosome(chromosome))
        } else {
            let cell_line = CellLine::load_from_path_with_ledger(path, None, ledger_file)
                .with_context(|| format!("Failed to load cell line from {}", path.display()))?;
            Ok(Results::CellLine(cell_line))
        }
    }

    pub fn remove_duplicate_links(&mut self) {
        match self {
            Results::Chromosome(chromosome) => chromosome.remove_duplicate_links(),
            Results::CellLine(cell_line) => cell_line.remove_duplicate_links(),
        }
    }

    pub fn remove_similar_links(&mut self, min_differences: usize) {
        match self {
            Results::Chromosome(chromosome) => chromosome.remove_similar_links(min_differences),
            Results::CellLine(cell_line) => cell_line.remove_similar_links(min_differences),
        }
    }

    pub fn similarity(&self, other: &Results, tolerance: u64, weighted: bool) -> Result<f64> {
        match (self, other) {
            (Results::Chromosome(a), Results::Chromosome(b)) => Ok(a.similarity(b, tolerance)),
            (Results::CellLine(a), Results::CellLine(b)) => Ok(a.similarity(b, tolerance, weighted)),
            _ => bail!("Can't compare a single chromosome with a whole cell line"),
        }
    }
}
