use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use cknots_scheduler::{
    ChromosomeSelector, ComputationScheduler, MinorFindingAlgorithm, SchedulerConfig,
};

use crate::logging;

///
/// Build the scheduler configuration: the `--config` file if given,
/// overridden by whatever was passed on the command line.
///
pub fn config_from_matches(matches: &ArgMatches) -> Result<SchedulerConfig> {
    let path_arg = |name: &str| matches.get_one::<String>(name).map(PathBuf::from);

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SchedulerConfig::from_file(Path::new(path))?,
        None => SchedulerConfig::new(
            path_arg("in_bedpe").context("A path to a contact file is required.")?,
            path_arg("in_ccd").context("A path to a CCD file is required.")?,
            path_arg("out_dir").context("A results directory is required.")?,
        ),
    };

    if let Some(in_bedpe) = path_arg("in_bedpe") {
        config.in_bedpe = in_bedpe;
    }
    if let Some(in_ccd) = path_arg("in_ccd") {
        config.in_ccd = in_ccd;
    }
    if let Some(out_dir) = path_arg("out_dir") {
        config.out_dir = out_dir;
    }
    if let Some(chromosome) = matches.get_one::<String>("chromosome") {
        config.chromosome = chromosome.parse::<ChromosomeSelector>()?;
    }
    if matches.get_flag("full") {
        config.minor_finding_algorithm = MinorFindingAlgorithm::Full;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.ccd_timeout = *timeout;
    }
    if let Some(mem) = matches.get_one::<u64>("mem") {
        config.max_memory_gb = *mem;
    }
    if let Some(bin_dir) = path_arg("bin-dir") {
        config.bin_dir = bin_dir;
    }
    if let Some(work_dir) = path_arg("work-dir") {
        config.work_dir = Some(work_dir);
    }
    if let Some(extra) = matches.get_many::<String>("extra") {
        config.extra_arguments = extra.cloned().collect();
    }

    Ok(config)
}

pub fn run_cknots(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches)?;
    let label = config.chromosome.log_label();

    let existed = config.out_dir.is_dir();
    fs::create_dir_all(&config.out_dir).with_context(|| {
        format!("Can't create results directory {}", config.out_dir.display())
    })?;
    logging::init_file(&config.out_dir.join(format!("cknots_{label}.log")))?;

    info!("cKNOTs started.");
    info!("Computing on {label} chromosome.");
    match existed {
        true => warn!(
            "Directory with results already exists {}",
            config.out_dir.display()
        ),
        false => info!(
            "Directory with results created at {}",
            config.out_dir.display()
        ),
    }

    let scheduler = ComputationScheduler::new(config)?;
    let reports = scheduler.run()?;

    for report in reports {
        println!(
            "chr{}\t{} dispatched\t{} skipped\t{} without boundaries\t{}",
            report.name,
            report.dispatched,
            report.skipped,
            report.unmatched,
            report.dir.display()
        );
    }
    info!("cKNOTs finished.");

    Ok(())
}
