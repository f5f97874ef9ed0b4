//! Minor finder dispatch: one external process chain per domain file, bounded
//! by a wall-clock timeout and, for the full algorithm, an address-space cap.
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tokio::time::timeout;

use cknots_core::ledger::LedgerRecord;

use crate::config::{MinorFindingAlgorithm, SchedulerConfig};
use crate::consts::{
    CRASH_RETURN_CODE, PATH_DECOMPOSITION_BIN, PATH_DECOMPOSITION_EXT, TIMEOUT_RETURN_CODE,
};
use crate::errors::Result;

///
/// How a single dispatch ended.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    /// Nonzero exit, but the minor finder left an output file behind.
    SucceededWithError { return_code: i32 },
    /// Nonzero exit and no output file.
    Failed { return_code: i32 },
    TimedOut { after: Duration },
    /// The process chain could not be run at all.
    Crashed { reason: String },
}

impl DispatchOutcome {
    ///
    /// Classify a finished process by its exit code and the presence of the
    /// output file.
    ///
    pub fn from_exit(return_code: i32, output: &Path) -> Self {
        match (return_code, output.exists()) {
            (0, _) => DispatchOutcome::Succeeded,
            (code, true) => DispatchOutcome::SucceededWithError { return_code: code },
            (code, false) => DispatchOutcome::Failed { return_code: code },
        }
    }

    pub fn return_code(&self) -> i32 {
        match self {
            DispatchOutcome::Succeeded => 0,
            DispatchOutcome::SucceededWithError { return_code }
            | DispatchOutcome::Failed { return_code } => *return_code,
            DispatchOutcome::TimedOut { .. } => TIMEOUT_RETURN_CODE,
            DispatchOutcome::Crashed { .. } => CRASH_RETURN_CODE,
        }
    }

    pub fn results_exist(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::Succeeded | DispatchOutcome::SucceededWithError { .. }
        )
    }

    pub fn log(&self, file_name: &str) {
        match self {
            DispatchOutcome::Succeeded => info!("{file_name} processing finished"),
            DispatchOutcome::SucceededWithError { return_code } => warn!(
                "{file_name} processing ended with an error, but result file exists. Return code: {return_code}"
            ),
            DispatchOutcome::Failed { return_code } => error!(
                "{file_name} processing ended with an error, and result file does not exist. Return code: {return_code}"
            ),
            DispatchOutcome::TimedOut { after } => {
                error!("Timeout expired on {file_name} after {}s", after.as_secs())
            }
            DispatchOutcome::Crashed { reason } => {
                error!("Exception occurred while processing {file_name}: {reason}")
            }
        }
    }

    ///
    /// Ledger record for this outcome. `results_not_empty` is only set for
    /// outcomes whose output is kept.
    ///
    pub fn to_record(
        &self,
        input_filename: &str,
        ccd_start: u64,
        ccd_end: u64,
        output: &Path,
    ) -> LedgerRecord {
        let mut record = LedgerRecord::new(input_filename, ccd_start, ccd_end);
        record.return_code = Some(self.return_code());
        record.results_exist = self.results_exist();
        if record.results_exist {
            record.results_filename = file_name_of(output);
        }
        record.results_not_empty = record.results_exist && is_non_empty_file(output);
        record
    }

    ///
    /// Killed or never completed: whatever the finder wrote is incomplete.
    ///
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::TimedOut { .. } | DispatchOutcome::Crashed { .. }
        )
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0)
}

///
/// Remove the output of an interrupted run so a resumed run dispatches the
/// domain again.
///
fn discard_partial_output(output: &Path) {
    match fs::remove_file(output) {
        Ok(()) => warn!("Removed partial output {}", output.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Can't remove partial output {}: {e}", output.display()),
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(CRASH_RETURN_CODE)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(CRASH_RETURN_CODE)
}

///
/// Runs the minor finder on domain files, one at a time.
///
pub struct Dispatcher {
    runtime: Runtime,
    algorithm: MinorFindingAlgorithm,
    bin_dir: PathBuf,
    timeout: Duration,
    extra_arguments: Vec<String>,
    address_space_limit: Option<u64>,
}

impl Dispatcher {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Dispatcher {
            runtime,
            algorithm: config.minor_finding_algorithm,
            bin_dir: config.bin_dir.clone(),
            timeout: Duration::from_secs(config.ccd_timeout),
            extra_arguments: config.extra_arguments.clone(),
            address_space_limit: config.address_space_limit(),
        })
    }

    pub fn algorithm(&self) -> MinorFindingAlgorithm {
        self.algorithm
    }

    ///
    /// Where the raw minors of `domain` are written.
    ///
    pub fn output_path(&self, domain: &Path) -> PathBuf {
        domain.with_file_name(self.algorithm.output_file_name(&file_name_of(domain)))
    }

    ///
    /// Run the whole process chain for one domain file. Never fails: every
    /// problem is folded into the returned outcome.
    ///
    pub fn dispatch(&self, domain: &Path) -> DispatchOutcome {
        let output = self.output_path(domain);
        let finished = self
            .runtime
            .block_on(async { timeout(self.timeout, self.run_chain(domain, &output)).await });

        let outcome = match finished {
            Ok(Ok(return_code)) => DispatchOutcome::from_exit(return_code, &output),
            Ok(Err(e)) => DispatchOutcome::Crashed {
                reason: e.to_string(),
            },
            Err(_) => DispatchOutcome::TimedOut {
                after: self.timeout,
            },
        };
        if outcome.is_interrupted() {
            discard_partial_output(&output);
        }
        outcome
    }

    async fn run_chain(&self, domain: &Path, output: &Path) -> io::Result<i32> {
        let mut finder = self.command(self.algorithm.binary_name());
        match self.algorithm {
            MinorFindingAlgorithm::Linear => {
                finder.arg("-c").arg("-f").arg(domain);
            }
            MinorFindingAlgorithm::Full => {
                let decomposition = domain.with_file_name(format!(
                    "{}.{PATH_DECOMPOSITION_EXT}",
                    file_name_of(domain)
                ));
                let status = self
                    .command(PATH_DECOMPOSITION_BIN)
                    .arg("-f")
                    .arg(domain)
                    .stdout(File::create(&decomposition)?)
                    .status()
                    .await?;
                if !status.success() {
                    warn!(
                        "Path decomposition of {} exited with {status}",
                        domain.display()
                    );
                    return Ok(exit_code(status));
                }
                finder.arg("-f").arg(&decomposition);
            }
        }
        finder.arg("-o").arg(output).args(&self.extra_arguments);

        debug!("Running {finder:?}");
        let status = finder.status().await?;
        Ok(exit_code(status))
    }

    fn command(&self, binary: &str) -> Command {
        let mut command = Command::new(self.bin_dir.join(binary));
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true);

        #[cfg(unix)]
        if let Some(limit) = self.address_space_limit {
            let limit = limit as libc::rlim_t;
            // SAFETY: only async-signal-safe calls between fork and exec
            unsafe {
                command.pre_exec(move || {
                    let rlim = libc::rlimit {
                        rlim_cur: limit,
                        rlim_max: limit,
                    };
                    if libc::setrlimit(libc::RLIMIT_AS, &rlim) != 0 {
                        return Err(io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_from_exit_classification() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("x.0001.mp.raw_minors");
        let missing = dir.path().join("x.0002.mp.raw_minors");
        fs::write(&present, "MINOR {}").unwrap();

        assert_eq!(DispatchOutcome::from_exit(0, &missing), DispatchOutcome::Succeeded);
        assert_eq!(
            DispatchOutcome::from_exit(3, &present),
            DispatchOutcome::SucceededWithError { return_code: 3 }
        );
        assert_eq!(
            DispatchOutcome::from_exit(3, &missing),
            DispatchOutcome::Failed { return_code: 3 }
        );
    }

    #[rstest]
    #[case(DispatchOutcome::Succeeded, 0, true)]
    #[case(DispatchOutcome::SucceededWithError { return_code: 2 }, 2, true)]
    #[case(DispatchOutcome::Failed { return_code: 2 }, 2, false)]
    #[case(DispatchOutcome::TimedOut { after: Duration::from_secs(1) }, 124, false)]
    #[case(DispatchOutcome::Crashed { reason: "gone".to_string() }, 1, false)]
    fn test_outcome_codes(
        #[case] outcome: DispatchOutcome,
        #[case] code: i32,
        #[case] exist: bool,
    ) {
        assert_eq!(outcome.return_code(), code);
        assert_eq!(outcome.results_exist(), exist);
    }

    #[rstest]
    fn test_to_record() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("x.0001.mp.raw_minors");
        fs::write(&output, "MINOR {}").unwrap();

        let record = DispatchOutcome::Succeeded.to_record("x.0001.mp", 0, 1000, &output);
        assert_eq!(record.results_filename, "x.0001.mp.raw_minors");
        assert!(record.results_exist);
        assert!(record.results_not_empty);
        assert_eq!(record.return_code, Some(0));

        let timed_out = DispatchOutcome::TimedOut {
            after: Duration::from_secs(5),
        }
        .to_record("x.0002.mp", 1000, 2000, &dir.path().join("x.0002.mp.raw_minors"));
        assert_eq!(timed_out.results_filename, "");
        assert!(!timed_out.results_exist);
        assert!(!timed_out.results_not_empty);
        assert_eq!(timed_out.return_code, Some(124));
    }

    #[rstest]
    fn test_interrupted_record_ignores_leftover_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("x.0001.mp.raw_minors");
        fs::write(&output, "MINOR { partial").unwrap();

        let record = DispatchOutcome::Crashed {
            reason: "killed".to_string(),
        }
        .to_record("x.0001.mp", 0, 1000, &output);

        assert!(!record.results_exist);
        assert!(!record.results_not_empty);
        assert_eq!(record.return_code, Some(1));
    }

    #[rstest]
    fn test_discard_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("x.0001.mp.raw_minors");
        fs::write(&output, "MINOR { partial").unwrap();

        discard_partial_output(&output);
        assert!(!output.exists());
        // already gone
        discard_partial_output(&output);
    }

    #[rstest]
    fn test_output_paths() {
        let dir = tempfile::tempdir().unwrap();
        let bedpe = dir.path().join("a.bedpe");
        let mut config = SchedulerConfig::new(&bedpe, &bedpe, &dir.path().to_path_buf());
        let domain = Path::new("out/chr_01/x.0001.mp");

        let linear = Dispatcher::new(&config).unwrap();
        assert_eq!(
            linear.output_path(domain),
            PathBuf::from("out/chr_01/x.0001.mp.raw_minors")
        );

        config.minor_finding_algorithm = MinorFindingAlgorithm::Full;
        let full = Dispatcher::new(&config).unwrap();
        assert_eq!(
            full.output_path(domain),
            PathBuf::from("out/chr_01/x.0001.mp.full.raw_minors")
        );
    }

    #[rstest]
    fn test_missing_binary_crashes() {
        let dir = tempfile::tempdir().unwrap();
        let domain = dir.path().join("x.0001.mp");
        fs::write(&domain, "NODE a\n").unwrap();
        let mut config = SchedulerConfig::new(&domain, &domain, &dir.path().to_path_buf());
        config.bin_dir = dir.path().join("missing");

        let outcome = Dispatcher::new(&config).unwrap().dispatch(&domain);
        assert!(matches!(outcome, DispatchOutcome::Crashed { .. }));
    }
}
