use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cknots_core::consts::{FULL_LEDGER_FILE, LEDGER_FILE, RAW_MINORS_EXT};

use crate::consts::{
    DEFAULT_BIN_DIR, DEFAULT_CCD_TIMEOUT, DEFAULT_MAX_MEMORY_GB, FULL_MINOR_FINDER_BIN,
    FULL_OUTPUT_TAG, LINEAR_MINOR_FINDER_BIN,
};
use crate::errors::{Result, SchedulerError};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MinorFindingAlgorithm {
    /// `find-k6-linear`: fast, no memory cap.
    #[default]
    Linear,
    /// `path-decomposition` followed by `find-knots`, under an address-space cap.
    Full,
}

impl MinorFindingAlgorithm {
    pub fn binary_name(&self) -> &'static str {
        match self {
            MinorFindingAlgorithm::Linear => LINEAR_MINOR_FINDER_BIN,
            MinorFindingAlgorithm::Full => FULL_MINOR_FINDER_BIN,
        }
    }

    ///
    /// Ledger file kept in every chromosome directory for this algorithm.
    ///
    pub fn ledger_file(&self) -> &'static str {
        match self {
            MinorFindingAlgorithm::Linear => LEDGER_FILE,
            MinorFindingAlgorithm::Full => FULL_LEDGER_FILE,
        }
    }

    ///
    /// Name of the raw minor output written for a domain file.
    ///
    pub fn output_file_name(&self, domain_file: &str) -> String {
        match self {
            MinorFindingAlgorithm::Linear => format!("{domain_file}.{RAW_MINORS_EXT}"),
            MinorFindingAlgorithm::Full => {
                format!("{domain_file}.{FULL_OUTPUT_TAG}.{RAW_MINORS_EXT}")
            }
        }
    }
}

impl FromStr for MinorFindingAlgorithm {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linear" | "find-k6-linear" => Ok(MinorFindingAlgorithm::Linear),
            "full" | "find-knots" => Ok(MinorFindingAlgorithm::Full),
            _ => Err(SchedulerError::Configuration(format!(
                "Invalid minor finding algorithm: {s}. Use `linear` or `full`."
            ))),
        }
    }
}

impl Display for MinorFindingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinorFindingAlgorithm::Linear => write!(f, "linear"),
            MinorFindingAlgorithm::Full => write!(f, "full"),
        }
    }
}

///
/// Which chromosomes a run processes: one chromosome number (`1`..`23`,
/// 23 being X) or all of them.
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(try_from = "RawSelector", into = "String")]
pub enum ChromosomeSelector {
    #[default]
    All,
    Single(u8),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Number(i64),
    Text(String),
}

impl TryFrom<RawSelector> for ChromosomeSelector {
    type Error = SchedulerError;

    fn try_from(value: RawSelector) -> Result<Self> {
        match value {
            RawSelector::Number(n) => n.to_string().parse(),
            RawSelector::Text(s) => s.parse(),
        }
    }
}

impl From<ChromosomeSelector> for String {
    fn from(value: ChromosomeSelector) -> Self {
        value.to_string()
    }
}

impl FromStr for ChromosomeSelector {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let token = trimmed.strip_prefix("chr").unwrap_or(trimmed);
        match token {
            "0" | "-1" | "all" | "ALL" => Ok(ChromosomeSelector::All),
            "X" | "x" => Ok(ChromosomeSelector::Single(23)),
            _ => match token.parse::<u8>() {
                Ok(n) if (1..=23).contains(&n) => Ok(ChromosomeSelector::Single(n)),
                _ => Err(SchedulerError::Configuration(format!(
                    "Invalid chromosome value: {s}. Use 1-23 (23 = X), X, or 0/all."
                ))),
            },
        }
    }
}

impl Display for ChromosomeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromosomeSelector::All => write!(f, "all"),
            ChromosomeSelector::Single(23) => write!(f, "X"),
            ChromosomeSelector::Single(n) => write!(f, "{n}"),
        }
    }
}

impl ChromosomeSelector {
    ///
    /// Chromosome numbers to process, in order.
    ///
    pub fn chromosomes(&self) -> Vec<u8> {
        match self {
            ChromosomeSelector::All => (1..=23).collect(),
            ChromosomeSelector::Single(n) => vec![*n],
        }
    }

    ///
    /// Label used in log file names: `all`, `01`..`22`, `x`.
    ///
    pub fn log_label(&self) -> String {
        match self {
            ChromosomeSelector::All => "all".to_string(),
            ChromosomeSelector::Single(23) => "x".to_string(),
            ChromosomeSelector::Single(n) => format!("{n:02}"),
        }
    }
}

fn default_ccd_timeout() -> u64 {
    DEFAULT_CCD_TIMEOUT
}

fn default_max_memory_gb() -> u64 {
    DEFAULT_MAX_MEMORY_GB
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BIN_DIR)
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Genome-wide contact file handed to the splitter.
    pub in_bedpe: PathBuf,
    /// Tab separated CCD boundaries: chromosome, start, end.
    pub in_ccd: PathBuf,
    /// Root output directory; one `chr_<NN|X>` directory per chromosome.
    pub out_dir: PathBuf,
    #[serde(default)]
    pub chromosome: ChromosomeSelector,
    /// Seconds before a single domain dispatch is aborted.
    #[serde(default = "default_ccd_timeout")]
    pub ccd_timeout: u64,
    #[serde(default)]
    pub minor_finding_algorithm: MinorFindingAlgorithm,
    /// Appended verbatim to every minor finder invocation.
    #[serde(default)]
    pub extra_arguments: Vec<String>,
    /// Address-space cap of the full algorithm, in GB.
    #[serde(default = "default_max_memory_gb")]
    pub max_memory_gb: u64,
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    /// Directory the splitter writes its domain files into; defaults to the
    /// current directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

impl SchedulerConfig {
    pub fn new<P: Into<PathBuf>>(in_bedpe: P, in_ccd: P, out_dir: P) -> Self {
        SchedulerConfig {
            in_bedpe: in_bedpe.into(),
            in_ccd: in_ccd.into(),
            out_dir: out_dir.into(),
            chromosome: ChromosomeSelector::default(),
            ccd_timeout: DEFAULT_CCD_TIMEOUT,
            minor_finding_algorithm: MinorFindingAlgorithm::default(),
            extra_arguments: Vec::new(),
            max_memory_gb: DEFAULT_MAX_MEMORY_GB,
            bin_dir: default_bin_dir(),
            work_dir: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_error = |message: String| SchedulerError::ConfigFile {
            path: path.to_path_buf(),
            message,
        };
        let toml_str = read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        toml::from_str(&toml_str).map_err(|e| config_error(e.to_string()))
    }

    ///
    /// Check everything that can be checked before the first process is
    /// started: input files exist and the timeout is usable.
    ///
    pub fn validate(&self) -> Result<()> {
        for (arg_name, path) in [("in_bedpe", &self.in_bedpe), ("in_ccd", &self.in_ccd)] {
            if !path.is_file() {
                return Err(SchedulerError::Configuration(format!(
                    "File {arg_name} does not exist at {}",
                    path.display()
                )));
            }
        }
        if self.ccd_timeout == 0 {
            return Err(SchedulerError::Configuration(
                "ccd_timeout must be at least one second".to_string(),
            ));
        }
        if self.max_memory_gb == 0 {
            return Err(SchedulerError::Configuration(
                "max_memory_gb must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.bin_dir.join(name)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    ///
    /// Address-space cap applied to the dispatched processes, if any.
    ///
    pub fn address_space_limit(&self) -> Option<u64> {
        match self.minor_finding_algorithm {
            MinorFindingAlgorithm::Linear => None,
            MinorFindingAlgorithm::Full => Some(self.max_memory_gb.saturating_mul(1 << 30)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("1", ChromosomeSelector::Single(1))]
    #[case("22", ChromosomeSelector::Single(22))]
    #[case("23", ChromosomeSelector::Single(23))]
    #[case("X", ChromosomeSelector::Single(23))]
    #[case("chr7", ChromosomeSelector::Single(7))]
    #[case("0", ChromosomeSelector::All)]
    #[case("all", ChromosomeSelector::All)]
    #[case("-1", ChromosomeSelector::All)]
    fn test_parse_selector(#[case] input: &str, #[case] expected: ChromosomeSelector) {
        assert_eq!(input.parse::<ChromosomeSelector>().unwrap(), expected);
    }

    #[rstest]
    #[case("24")]
    #[case("Y")]
    #[case("-2")]
    #[case("seven")]
    fn test_parse_selector_rejects(#[case] input: &str) {
        assert!(matches!(
            input.parse::<ChromosomeSelector>(),
            Err(SchedulerError::Configuration(_))
        ));
    }

    #[rstest]
    fn test_selector_chromosomes_and_labels() {
        assert_eq!(ChromosomeSelector::All.chromosomes().len(), 23);
        assert_eq!(ChromosomeSelector::Single(4).chromosomes(), vec![4]);
        assert_eq!(ChromosomeSelector::Single(4).log_label(), "04");
        assert_eq!(ChromosomeSelector::Single(23).log_label(), "x");
        assert_eq!(ChromosomeSelector::All.log_label(), "all");
    }

    #[rstest]
    fn test_algorithm_files() {
        let linear = MinorFindingAlgorithm::Linear;
        let full = MinorFindingAlgorithm::Full;
        assert_eq!(linear.ledger_file(), "results.json");
        assert_eq!(full.ledger_file(), "results_full.json");
        assert_eq!(linear.output_file_name("x.0001.mp"), "x.0001.mp.raw_minors");
        assert_eq!(full.output_file_name("x.0001.mp"), "x.0001.mp.full.raw_minors");
        assert_eq!("find-knots".parse::<MinorFindingAlgorithm>().unwrap(), full);
        assert!("quadratic".parse::<MinorFindingAlgorithm>().is_err());
    }

    #[rstest]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cknots.toml");
        std::fs::write(
            &path,
            r#"
in_bedpe = "data/GM12878.bedpe"
in_ccd = "data/GM12878.ccd"
out_dir = "results"
chromosome = 23
minor_finding_algorithm = "full"
extra_arguments = ["-N", "6"]
"#,
        )
        .unwrap();

        let config = SchedulerConfig::from_file(&path).unwrap();
        assert_eq!(config.chromosome, ChromosomeSelector::Single(23));
        assert_eq!(config.minor_finding_algorithm, MinorFindingAlgorithm::Full);
        assert_eq!(config.extra_arguments, vec!["-N", "6"]);
        assert_eq!(config.ccd_timeout, DEFAULT_CCD_TIMEOUT);
        assert_eq!(config.address_space_limit(), Some(600 * (1 << 30)));
    }

    #[rstest]
    fn test_from_file_rejects_bad_selector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cknots.toml");
        std::fs::write(
            &path,
            "in_bedpe = \"a\"\nin_ccd = \"b\"\nout_dir = \"c\"\nchromosome = \"Y\"\n",
        )
        .unwrap();
        assert!(SchedulerConfig::from_file(&path).is_err());
    }

    #[rstest]
    fn test_validate_checks_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let bedpe = dir.path().join("contacts.bedpe");
        let ccd = dir.path().join("domains.ccd");
        std::fs::write(&bedpe, "").unwrap();

        let config = SchedulerConfig::new(&bedpe, &ccd, &dir.path().join("out"));
        assert!(matches!(
            config.validate(),
            Err(SchedulerError::Configuration(_))
        ));

        std::fs::write(&ccd, "").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.address_space_limit(), None);
    }
}
