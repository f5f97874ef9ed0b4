use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::summary::handlers::load_filtered;

pub fn run_similarity(matches: &ArgMatches) -> Result<()> {
    let first = matches
        .get_one::<String>("first")
        .context("Two results directories are required.")?;
    let second = matches
        .get_one::<String>("second")
        .context("Two results directories are required.")?;
    let tolerance = matches.get_one::<u64>("tolerance").copied().unwrap_or(0);

    let first = load_filtered(Path::new(first), matches)?;
    let second = load_filtered(Path::new(second), matches)?;

    let score = first.similarity(&second, tolerance, matches.get_flag("weighted"))?;
    println!("{score:.6}");

    Ok(())
}
