use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::consts::{CHROMOSOME_DIR_PREFIX, LEDGER_FILE};
use crate::errors::{KnotError, Result};
use crate::models::chromosome::{Chromosome, link_similarity};
use crate::models::link::Link;
use crate::utils::{is_valid_chromosome_token, normalize_chromosome_name};

///
/// CellLine struct, the chromosomes analysed for one cell line.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellLine {
    pub name: String,
    pub chromosomes: Vec<Chromosome>,
}

impl CellLine {
    pub fn new(name: impl Into<String>) -> Self {
        CellLine {
            name: name.into(),
            chromosomes: Vec::new(),
        }
    }

    ///
    /// Load every `chr_*` directory under `path` using the linear ledger.
    /// The cell line is named after the directory unless `name` is given.
    ///
    pub fn load_from_path(path: &Path, name: Option<&str>) -> Result<Self> {
        CellLine::load_from_path_with_ledger(path, name, LEDGER_FILE)
    }

    pub fn load_from_path_with_ledger(
        path: &Path,
        name: Option<&str>,
        ledger_file: &str,
    ) -> Result<Self> {
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let mut chromosome_dirs = Vec::new();
        for entry in fs::read_dir(path).map_err(|source| KnotError::FileRead {
            path: path.to_path_buf(),
            source,
        })? {
            let entry = entry?;
            let is_chromosome_dir = entry.file_type()?.is_dir()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(CHROMOSOME_DIR_PREFIX);
            if is_chromosome_dir {
                chromosome_dirs.push(entry.path());
            }
        }
        chromosome_dirs.sort();

        let mut cell_line = CellLine::new(name);
        for dir in chromosome_dirs {
            if !dir.join(ledger_file).exists() {
                info!("No {} in {}, skipping", ledger_file, dir.display());
                continue;
            }
            let chromosome = Chromosome::from_dir_with_ledger(&dir, None, ledger_file)?;
            cell_line.add_chromosome(chromosome)?;
        }
        Ok(cell_line)
    }

    ///
    /// Add a chromosome; a cell line holds at most one chromosome per name.
    ///
    pub fn add_chromosome(&mut self, chromosome: Chromosome) -> Result<()> {
        if self.chromosomes.iter().any(|c| c.name == chromosome.name) {
            return Err(KnotError::InvalidChromosome(format!(
                "chromosome {} already present in cell line {}",
                chromosome.name, self.name
            )));
        }
        self.chromosomes.push(chromosome);
        Ok(())
    }

    pub fn find_chromosome(&self, name: &str) -> Option<&Chromosome> {
        let name = normalize_chromosome_name(name);
        self.chromosomes.iter().find(|c| c.name == name)
    }

    ///
    /// Get the chromosome with the given name, creating an empty one if the
    /// name is a valid chromosome (`1`..`22`, `X`) that is not present yet.
    ///
    pub fn get_chromosome(&mut self, name: &str) -> Result<&mut Chromosome> {
        let name = normalize_chromosome_name(name);
        if !is_valid_chromosome_token(&name) {
            return Err(KnotError::InvalidChromosome(name));
        }

        match self.chromosomes.iter().position(|c| c.name == name) {
            Some(index) => Ok(&mut self.chromosomes[index]),
            None => {
                self.chromosomes.push(Chromosome::new(&name)?);
                let last = self.chromosomes.len() - 1;
                Ok(&mut self.chromosomes[last])
            }
        }
    }

    pub fn count_links(&self) -> usize {
        self.chromosomes.iter().map(Chromosome::count_links).sum()
    }

    pub fn remove_duplicate_links(&mut self) {
        self.chromosomes
            .iter_mut()
            .for_each(Chromosome::remove_duplicate_links);
    }

    pub fn remove_similar_links(&mut self, min_differences: usize) {
        for chromosome in self.chromosomes.iter_mut() {
            chromosome.remove_similar_links(min_differences);
        }
    }

    ///
    /// Genome-wide similarity, computed chromosome by chromosome over the
    /// chromosomes present in either cell line and averaged.
    ///
    /// With `weighted`, every chromosome counts in proportion to the bases
    /// covered by its CCDs in both cell lines; otherwise all chromosomes
    /// count the same. Two cell lines without chromosomes are identical.
    ///
    pub fn similarity(&self, other: &CellLine, tolerance: u64, weighted: bool) -> f64 {
        let names: BTreeSet<&str> = self
            .chromosomes
            .iter()
            .chain(other.chromosomes.iter())
            .map(|c| c.name.as_str())
            .collect();

        if names.is_empty() {
            return 1.0;
        }

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for name in names {
            let a = self.find_chromosome(name);
            let b = other.find_chromosome(name);

            let a_links: Vec<&Link> = a.map(|c| c.links().collect()).unwrap_or_default();
            let b_links: Vec<&Link> = b.map(|c| c.links().collect()).unwrap_or_default();
            let score = link_similarity(&a_links, &b_links, tolerance);

            let weight = match weighted {
                true => (a.map_or(0, Chromosome::extent) + b.map_or(0, Chromosome::extent)) as f64,
                false => 1.0,
            };
            weighted_sum += score * weight;
            total_weight += weight;
        }

        match total_weight > 0.0 {
            true => weighted_sum / total_weight,
            false => 1.0,
        }
    }
}

impl Display for CellLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Cell line {} of {} chromosomes:",
            self.name,
            self.chromosomes.len()
        )?;
        for chromosome in &self.chromosomes {
            writeln!(f, "{chromosome}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::ledger::{Ledger, LedgerRecord};
    use crate::models::ccd::Ccd;
    use crate::models::link::tests::make_link;

    fn chromosome(name: &str, starts: &[u64]) -> Chromosome {
        let mut chromosome = Chromosome::new(name).unwrap();
        for (i, &start) in starts.iter().enumerate() {
            let mut ccd = Ccd::new(start, start + 1_000, i + 1).unwrap();
            let p = start;
            ccd.links
                .push(make_link([p, p + 10, p + 20, p + 30, p + 40, p + 50], &[i as u64]));
            chromosome.ccds.push(ccd);
        }
        chromosome
    }

    #[rstest]
    fn test_get_chromosome_creates_valid_chromosomes() {
        let mut cell_line = CellLine::new("K562");
        cell_line.get_chromosome("X").unwrap();
        cell_line.get_chromosome("chr3").unwrap();
        cell_line.get_chromosome("3").unwrap().ccds.push(Ccd::new(0, 5, 1).unwrap());
        cell_line.get_chromosome("x").unwrap();

        assert_eq!(cell_line.chromosomes.len(), 2);
        assert_eq!(cell_line.get_chromosome("chrx").unwrap().name, "X");
        assert_eq!(cell_line.find_chromosome("3").unwrap().ccds.len(), 1);
    }

    #[rstest]
    #[case("Y")]
    #[case("23")]
    #[case("chrM")]
    fn test_get_chromosome_rejects_invalid_names(#[case] name: &str) {
        let mut cell_line = CellLine::new("K562");
        assert!(cell_line.get_chromosome(name).is_err());
        assert!(cell_line.chromosomes.is_empty());
    }

    #[rstest]
    fn test_add_chromosome_rejects_duplicates() {
        let mut cell_line = CellLine::new("K562");
        cell_line.add_chromosome(chromosome("1", &[0])).unwrap();
        assert!(cell_line.add_chromosome(chromosome("1", &[5_000])).is_err());
    }

    #[rstest]
    fn test_similarity() {
        let mut a = CellLine::new("A");
        a.add_chromosome(chromosome("1", &[0, 10_000])).unwrap();
        a.add_chromosome(chromosome("2", &[0])).unwrap();

        let mut b = CellLine::new("B");
        b.add_chromosome(chromosome("1", &[0, 10_000])).unwrap();

        // chr1 identical (1.0), chr2 only in A (0.0)
        assert_eq!(a.similarity(&b, 0, false), 0.5);
        assert_eq!(b.similarity(&a, 0, false), 0.5);

        // chr1 covers 4000 bases over both lines, chr2 covers 1000
        assert_eq!(a.similarity(&b, 0, true), 0.8);
        assert_eq!(a.similarity(&a, 0, true), 1.0);
        assert_eq!(CellLine::new("E").similarity(&CellLine::new("F"), 0, true), 1.0);
    }

    #[rstest]
    fn test_load_from_path() {
        let root = tempfile::tempdir().unwrap();
        let line_dir = root.path().join("GM12878");

        for dir_name in ["chr_01", "chr_X", "chr_02"] {
            let dir = line_dir.join(dir_name);
            std::fs::create_dir_all(&dir).unwrap();
            if dir_name == "chr_02" {
                continue;
            }
            std::fs::write(dir.join("d.0001.mp"), "NODE a\nNODE b\n").unwrap();
            let mut ledger = Ledger::new();
            ledger.push(LedgerRecord::new("d.0001.mp", 0, 100));
            ledger.save(&dir.join(LEDGER_FILE)).unwrap();
        }
        std::fs::create_dir_all(line_dir.join("logs")).unwrap();

        let cell_line = CellLine::load_from_path(&line_dir, None).unwrap();
        assert_eq!(cell_line.name, "GM12878");
        let names: Vec<&str> = cell_line.chromosomes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["1", "X"]);
        assert_eq!(cell_line.count_links(), 0);
    }
}
