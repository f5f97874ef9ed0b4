use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use cknots_core::consts::DOMAIN_FILE_EXT;
use cknots_core::ledger::{Ledger, LedgerRecord};
use cknots_core::utils::chromosome_token;

use crate::boundaries::BoundaryTable;
use crate::config::SchedulerConfig;
use crate::dispatch::{file_name_of, is_non_empty_file, Dispatcher};
use crate::errors::{Result, SchedulerError};
use crate::splitter::{split_chromosome, SplitChromosome};

///
/// What happened to one chromosome during a run.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeReport {
    pub name: String,
    pub dir: PathBuf,
    pub resumed: bool,
    /// Domains handed to the minor finder in this run.
    pub dispatched: usize,
    /// Domains whose non-empty output already existed.
    pub skipped: usize,
    /// Domain files left over once the boundary rows ran out.
    pub unmatched: usize,
    pub ledger: Ledger,
}

///
/// Drives splitting and minor finding over the selected chromosomes,
/// keeping a ledger per chromosome directory so an interrupted run can be
/// resumed.
///
pub struct ComputationScheduler {
    config: SchedulerConfig,
    boundaries: BoundaryTable,
    dispatcher: Dispatcher,
}

impl ComputationScheduler {
    ///
    /// Validate the configuration and load the boundary table. Fails before
    /// anything is dispatched if a selected chromosome has no boundary rows.
    ///
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let boundaries = BoundaryTable::try_from(config.in_ccd.as_path())?;

        for chromosome in config.chromosome.chromosomes() {
            let name = chromosome_token(chromosome)?;
            if !boundaries.contains(&name) {
                return Err(SchedulerError::Configuration(format!(
                    "Boundary file {} has no domains for chromosome {name}",
                    config.in_ccd.display()
                )));
            }
        }

        let dispatcher = Dispatcher::new(&config)?;
        info!("Computation scheduler created.");

        Ok(ComputationScheduler {
            config,
            boundaries,
            dispatcher,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    ///
    /// Split every selected chromosome, then run the minor finder over each
    /// chromosome directory in turn.
    ///
    pub fn run(&self) -> Result<Vec<ChromosomeReport>> {
        info!(
            "Looking for minors in {} with CCDs defined in {} using the {} algorithm",
            self.config.in_bedpe.display(),
            self.config.in_ccd.display(),
            self.config.minor_finding_algorithm
        );

        if !self.config.out_dir.is_dir() {
            fs::create_dir_all(&self.config.out_dir)?;
            info!(
                "Directory with results created at {}",
                self.config.out_dir.display()
            );
        }

        let split = self
            .config
            .chromosome
            .chromosomes()
            .into_iter()
            .map(|chromosome| split_chromosome(&self.config, chromosome))
            .collect::<Result<Vec<_>>>()?;
        info!("Bedpe file split into CCDs and divided into folders in results directory.");

        split
            .iter()
            .map(|chromosome| self.process_chromosome(chromosome))
            .collect()
    }

    ///
    /// Run the minor finder over the domain files of one chromosome
    /// directory, in file name order, pairing each with the next boundary row
    /// of that chromosome. The ledger is written after every domain.
    ///
    pub fn process_chromosome(&self, split: &SplitChromosome) -> Result<ChromosomeReport> {
        let ledger_path = split
            .dir
            .join(self.dispatcher.algorithm().ledger_file());
        let rows = self.boundaries.rows_for(&split.name);

        let mut ledger = match (split.resuming, ledger_path.is_file()) {
            (true, true) => Ledger::load(&ledger_path)?.reindexed(rows.len(), &ledger_path)?,
            (true, false) => {
                warn!(
                    "No ledger at {}, starting chromosome {} from scratch",
                    ledger_path.display(),
                    split.name
                );
                Ledger::new()
            }
            (false, _) => Ledger::new(),
        };

        let domains = domain_files(&split.dir)?;
        let bar = ProgressBar::new(domains.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
                .map(|style| style.progress_chars("##-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("chr {}", split.name));

        let mut report = ChromosomeReport {
            name: split.name.clone(),
            dir: split.dir.clone(),
            resumed: split.resuming,
            dispatched: 0,
            skipped: 0,
            unmatched: 0,
            ledger: Ledger::new(),
        };

        let mut rows = rows.into_iter();
        for (index, file_name) in domains.iter().enumerate() {
            bar.inc(1);
            let Some(boundary) = rows.next() else {
                report.unmatched += 1;
                continue;
            };

            let domain = split.dir.join(file_name);
            let output = self.dispatcher.output_path(&domain);

            if split.resuming && is_non_empty_file(&output) {
                info!("Results for {} already exist, skipping", domain.display());
                if ledger.get(index).is_none() {
                    ledger.set(
                        index,
                        existing_result_record(file_name, boundary.start, boundary.end, &output),
                    );
                }
                report.skipped += 1;
                continue;
            }

            info!("Running minor finder on {}", domain.display());
            let outcome = self.dispatcher.dispatch(&domain);
            outcome.log(file_name);

            ledger.set(
                index,
                outcome.to_record(file_name, boundary.start, boundary.end, &output),
            );
            ledger.save(&ledger_path)?;
            report.dispatched += 1;
        }
        bar.finish_and_clear();

        ledger.save(&ledger_path)?;
        info!(
            "Chromosome {}: {} dispatched, {} skipped, {} without boundaries",
            report.name, report.dispatched, report.skipped, report.unmatched
        );

        report.ledger = ledger;
        Ok(report)
    }
}

///
/// Record for a domain whose output predates this run; the exit code is
/// unknown.
///
fn existing_result_record(
    input_filename: &str,
    ccd_start: u64,
    ccd_end: u64,
    output: &Path,
) -> LedgerRecord {
    let mut record = LedgerRecord::new(input_filename, ccd_start, ccd_end);
    record.results_exist = true;
    record.results_filename = file_name_of(output);
    record.results_not_empty = true;
    record
}

///
/// Sorted names of the domain files directly inside `dir`.
///
pub fn domain_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DOMAIN_FILE_EXT) {
            names.push(file_name_of(&path));
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_domain_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["x.0002.mp", "x.0001.mp", "x.0001.mp.raw_minors", "results.json"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        assert_eq!(domain_files(dir.path()).unwrap(), vec!["x.0001.mp", "x.0002.mp"]);
    }

    #[rstest]
    fn test_missing_chromosome_in_boundaries_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bedpe = dir.path().join("contacts.bedpe");
        let ccd = dir.path().join("domains.ccd");
        fs::write(&bedpe, "").unwrap();
        fs::write(&ccd, "chr1\t0\t1000\n").unwrap();

        let mut config = SchedulerConfig::new(&bedpe, &ccd, &dir.path().join("out"));
        config.chromosome = "2".parse().unwrap();

        assert!(matches!(
            ComputationScheduler::new(config),
            Err(SchedulerError::Configuration(_))
        ));
        assert!(!dir.path().join("out").exists());
    }

    #[rstest]
    fn test_existing_result_record() {
        let record = existing_result_record("x.0003.mp", 10, 20, Path::new("d/x.0003.mp.raw_minors"));
        assert_eq!(record.results_filename, "x.0003.mp.raw_minors");
        assert!(record.results_exist && record.results_not_empty);
        assert_eq!(record.return_code, None);
    }
}
