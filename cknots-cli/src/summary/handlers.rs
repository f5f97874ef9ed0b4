use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;

use cknots_scheduler::MinorFindingAlgorithm;

use crate::results::Results;

pub fn algorithm_from_flag(matches: &ArgMatches) -> MinorFindingAlgorithm {
    match matches.get_flag("full") {
        true => MinorFindingAlgorithm::Full,
        false => MinorFindingAlgorithm::Linear,
    }
}

///
/// Load a results directory and apply the link filters requested on the
/// command line.
///
pub fn load_filtered(path: &Path, matches: &ArgMatches) -> Result<Results> {
    let mut results = Results::load(path, algorithm_from_flag(matches).ledger_file())?;
    if matches.get_flag("dedup") {
        results.remove_duplicate_links();
    }
    if let Some(min_differences) = matches.get_one::<usize>("min-differences") {
        results.remove_similar_links(*min_differences);
    }
    Ok(results)
}

pub fn run_summary(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .context("A results directory is required.")?;
    let results = load_filtered(Path::new(path), matches)?;

    match &results {
        Results::Chromosome(chromosome) => {
            println!("{chromosome}");
            for ccd in &chromosome.ccds {
                println!("{ccd}");
            }
        }
        Results::CellLine(cell_line) => {
            println!("{cell_line}");
            for chromosome in &cell_line.chromosomes {
                println!("{chromosome}");
            }
        }
    }

    if let Some(output) = matches.get_one::<String>("output") {
        match &results {
            Results::Chromosome(chromosome) => chromosome
                .save_json(output)
                .with_context(|| format!("Failed to save {output}"))?,
            Results::CellLine(_) => bail!("--output needs a single chromosome directory"),
        }
    }

    Ok(())
}
