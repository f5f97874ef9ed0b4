mod logging;
mod results;
mod run;
mod similarity;
mod summary;
mod widths;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "cknots";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Find knots (graph minors) in chromatin interaction graphs, one contact domain at a time.")
        .subcommand_required(true)
        .subcommand(run::cli::create_run_cli())
        .subcommand(summary::cli::create_summary_cli())
        .subcommand(similarity::cli::create_similarity_cli())
        .subcommand(widths::cli::create_widths_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // RUN
        //
        Some((run::cli::RUN_CMD, matches)) => {
            run::handlers::run_cknots(matches)?;
        }

        //
        // SUMMARY
        //
        Some((summary::cli::SUMMARY_CMD, matches)) => {
            logging::init_stderr();
            summary::handlers::run_summary(matches)?;
        }

        //
        // SIMILARITY
        //
        Some((similarity::cli::SIMILARITY_CMD, matches)) => {
            logging::init_stderr();
            similarity::handlers::run_similarity(matches)?;
        }

        //
        // WIDTHS
        //
        Some((widths::cli::WIDTHS_CMD, matches)) => {
            logging::init_stderr();
            widths::handlers::run_widths(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
