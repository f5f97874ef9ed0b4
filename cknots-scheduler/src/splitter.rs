use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};

use cknots_core::consts::DOMAIN_FILE_EXT;
use cknots_core::utils::{chromosome_dir_name, chromosome_token};

use crate::config::SchedulerConfig;
use crate::consts::SPLITTER_BIN;
use crate::errors::{Result, SchedulerError};

///
/// Where a chromosome's domain files ended up after splitting.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitChromosome {
    /// `1`..`22` or `X`.
    pub name: String,
    pub dir: PathBuf,
    /// The chromosome directory existed before this run.
    pub resuming: bool,
    pub moved_files: usize,
}

///
/// Run the external splitter for one chromosome and move the domain files
/// it produced into `<out_dir>/chr_<NN|X>`.
///
/// A nonzero splitter exit status is only logged; not being able to start
/// the splitter at all is an error.
///
pub fn split_chromosome(config: &SchedulerConfig, chromosome: u8) -> Result<SplitChromosome> {
    let name = chromosome_token(chromosome)?;
    let work_dir = config.work_dir();
    let splitter = config.binary_path(SPLITTER_BIN);

    info!("Running splitter on chromosome {name}");

    let in_bedpe = fs::canonicalize(&config.in_bedpe)?;
    let in_ccd = fs::canonicalize(&config.in_ccd)?;

    let status = Command::new(&splitter)
        .arg("-c")
        .arg(chromosome.to_string())
        .arg("-s")
        .arg("-f")
        .arg(&in_bedpe)
        .arg("-d")
        .arg(&in_ccd)
        .current_dir(&work_dir)
        .stdin(Stdio::null())
        .status()
        .map_err(|source| SchedulerError::Splitter {
            chromosome: name.clone(),
            source,
        })?;

    if !status.success() {
        warn!(
            "Splitter exited with {status} on chromosome {name}, continuing with the files it produced"
        );
    }

    let dir = config.out_dir.join(chromosome_dir_name(&name));
    let resuming = match fs::create_dir(&dir) {
        Ok(()) => false,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            warn!(
                "Directory {} already exists, resuming computation.",
                dir.display()
            );
            true
        }
        Err(e) => return Err(e.into()),
    };

    let moved_files = move_domain_files(&work_dir, &dir)?;
    info!("Moved {moved_files} domain files into {}", dir.display());

    Ok(SplitChromosome {
        name,
        dir,
        resuming,
        moved_files,
    })
}

///
/// Move every `*.mp` file directly inside `from` into `to`.
///
pub fn move_domain_files(from: &Path, to: &Path) -> Result<usize> {
    let mut moved = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != DOMAIN_FILE_EXT) {
            continue;
        }
        let target = to.join(entry.file_name());
        // rename fails across filesystems
        if fs::rename(&path, &target).is_err() {
            fs::copy(&path, &target)?;
            fs::remove_file(&path)?;
        }
        moved += 1;
    }
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_move_domain_files_only_moves_mp() {
        let from = tempfile::tempdir().unwrap();
        let to = tempfile::tempdir().unwrap();
        fs::write(from.path().join("chr1.0001.mp"), "NODE a\n").unwrap();
        fs::write(from.path().join("chr1.0002.mp"), "NODE b\n").unwrap();
        fs::write(from.path().join("contacts.bedpe"), "").unwrap();

        let moved = move_domain_files(from.path(), to.path()).unwrap();

        assert_eq!(moved, 2);
        assert!(to.path().join("chr1.0001.mp").is_file());
        assert!(!from.path().join("chr1.0002.mp").exists());
        assert!(from.path().join("contacts.bedpe").is_file());
    }

    #[rstest]
    fn test_missing_splitter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bedpe = dir.path().join("contacts.bedpe");
        let ccd = dir.path().join("domains.ccd");
        fs::write(&bedpe, "").unwrap();
        fs::write(&ccd, "").unwrap();

        let mut config = SchedulerConfig::new(&bedpe, &ccd, &dir.path().join("out"));
        config.bin_dir = dir.path().join("no-such-bin");
        config.work_dir = Some(dir.path().to_path_buf());

        assert!(matches!(
            split_chromosome(&config, 1),
            Err(SchedulerError::Splitter { .. })
        ));
    }
}
