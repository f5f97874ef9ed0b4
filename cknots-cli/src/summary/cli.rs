use clap::{Arg, ArgAction, Command, value_parser};

pub const SUMMARY_CMD: &str = "summary";

pub fn create_summary_cli() -> Command {
    Command::new(SUMMARY_CMD)
        .about("Count CCDs and links in a results directory (one chromosome or a whole cell line).")
        .arg_required_else_help(true)
        .arg(Arg::new("path").required(true).help("Results directory"))
        .arg(
            Arg::new("full")
                .long("full")
                .action(ArgAction::SetTrue)
                .help("Read the ledger of the non-linear algorithm"),
        )
        .arg(
            Arg::new("dedup")
                .long("dedup")
                .action(ArgAction::SetTrue)
                .help("Drop links that share their set of edge ids with an earlier link"),
        )
        .arg(
            Arg::new("min-differences")
                .long("min-differences")
                .value_parser(value_parser!(usize))
                .help("Drop links differing from a kept link in fewer endpoints than this"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Save a single chromosome with its links as JSON"),
        )
}
