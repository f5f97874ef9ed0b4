use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::consts::{LEDGER_FILE, MAX_DOMAIN_SPAN, RAW_MINORS_EXT};
use crate::errors::{KnotError, Result};
use crate::ledger::Ledger;
use crate::models::ccd::Ccd;
use crate::models::link::Link;
use crate::utils::{chromosome_name_from_path, is_valid_chromosome_token, normalize_chromosome_name};

///
/// Chromosome struct, the CCDs of one chromosome ordered by their number.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chromosome {
    pub name: String,
    pub ccds: Vec<Ccd>,
}

///
/// Fraction of links in `a` and `b` that overlap some link of the other set
/// within `tolerance` bases. Both directions are counted independently, so
/// the score is symmetric; two empty sets are identical (score 1).
///
pub fn link_similarity(a: &[&Link], b: &[&Link], tolerance: u64) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = |from: &[&Link], to: &[&Link]| {
        from.iter()
            .filter(|link| to.iter().any(|other| link.overlaps(other, tolerance)))
            .count()
    };

    (matches(a, b) + matches(b, a)) as f64 / total as f64
}

///
/// Validate a user supplied chromosome name (`7`, `chr7`, `X`, `Y`).
///
fn checked_name(name: &str) -> Result<String> {
    let name = normalize_chromosome_name(name);
    match is_valid_chromosome_token(&name) || name == "Y" {
        true => Ok(name),
        false => Err(KnotError::InvalidChromosome(name)),
    }
}

impl Chromosome {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Chromosome {
            name: checked_name(name)?,
            ccds: Vec::new(),
        })
    }

    ///
    /// Load a chromosome from its cknots output directory using the linear
    /// algorithm's ledger.
    ///
    /// # Arguments
    /// - path: the `chr_<NN|X>` directory
    /// - name: chromosome name; derived from the directory name when `None`
    pub fn from_dir(path: &Path, name: Option<&str>) -> Result<Self> {
        Chromosome::from_dir_with_ledger(path, name, LEDGER_FILE)
    }

    ///
    /// Load a chromosome from its output directory using the named ledger file.
    ///
    /// Every CCD gets its interaction graph; links are only read for CCDs
    /// whose minor search produced results. CCDs spanning more than
    /// [`MAX_DOMAIN_SPAN`] bases are left out.
    ///
    pub fn from_dir_with_ledger(path: &Path, name: Option<&str>, ledger_file: &str) -> Result<Self> {
        let name = match name {
            Some(name) => checked_name(name)?,
            None => chromosome_name_from_path(path)?,
        };

        let ledger_path = path.join(ledger_file);
        let ledger = Ledger::load(&ledger_path)?;

        let mut ccds = Vec::new();
        for record in ledger.records() {
            if record.span() > MAX_DOMAIN_SPAN {
                debug!(
                    "Skipping {}: domain spans {} bases",
                    record.input_filename,
                    record.span()
                );
                continue;
            }

            let number = record
                .sequence_number()
                .ok_or_else(|| KnotError::LedgerCorruption {
                    path: ledger_path.clone(),
                    message: format!("no domain sequence number in {:?}", record.input_filename),
                })?;

            let mut ccd = Ccd::new(record.ccd_start, record.ccd_end, number)?;
            ccd.load_graph_from_file(&path.join(&record.input_filename))?;

            if record.results_exist {
                let results_path = record.results_path(path).unwrap_or_else(|| {
                    path.join(format!("{}.{}", record.input_filename, RAW_MINORS_EXT))
                });
                ccd.load_links_from_file(&results_path)?;
            }
            ccds.push(ccd);
        }
        ccds.sort_by_key(|ccd| ccd.number);

        Ok(Chromosome { name, ccds })
    }

    pub fn get_ccd(&self, number: usize) -> Option<&Ccd> {
        self.ccds.iter().find(|ccd| ccd.number == number)
    }

    pub fn count_links(&self) -> usize {
        self.ccds.iter().map(|ccd| ccd.links.len()).sum()
    }

    ///
    /// All links of the chromosome, CCD by CCD.
    ///
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.ccds.iter().flat_map(|ccd| ccd.links.iter())
    }

    ///
    /// Total number of bases covered by the CCDs.
    ///
    pub fn extent(&self) -> u64 {
        self.ccds.iter().map(Ccd::span).sum()
    }

    pub fn remove_duplicate_links(&mut self) {
        self.ccds.iter_mut().for_each(Ccd::remove_duplicate_links);
    }

    pub fn remove_similar_links(&mut self, min_differences: usize) {
        for ccd in self.ccds.iter_mut() {
            ccd.remove_similar_links(min_differences);
        }
    }

    ///
    /// Similarity of the links found on two chromosomes, see [`link_similarity`].
    ///
    pub fn similarity(&self, other: &Chromosome, tolerance: u64) -> f64 {
        let a: Vec<&Link> = self.links().collect();
        let b: Vec<&Link> = other.links().collect();
        link_similarity(&a, &b, tolerance)
    }

    ///
    /// Save the chromosome (CCDs and their links) as JSON. Graphs are not
    /// stored; they can be reloaded from the domain files.
    ///
    pub fn save_json<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_json_file<T: AsRef<Path>>(path: T) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| KnotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chromosome {} with {} CCDs containing {} links.",
            self.name,
            self.ccds.len(),
            self.count_links()
        )
    }
}
