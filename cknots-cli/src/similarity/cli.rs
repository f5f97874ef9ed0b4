use clap::{Arg, ArgAction, Command, value_parser};

pub const SIMILARITY_CMD: &str = "similarity";

pub fn create_similarity_cli() -> Command {
    Command::new(SIMILARITY_CMD)
        .about("Score how many links two results directories share (chromosome vs chromosome, or cell line vs cell line).")
        .arg_required_else_help(true)
        .arg(Arg::new("first").required(true))
        .arg(Arg::new("second").required(true))
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .short('t')
                .value_parser(value_parser!(u64))
                .default_value("0")
                .help("Links overlap if their spans, widened by this many bases, intersect"),
        )
        .arg(
            Arg::new("weighted")
                .long("weighted")
                .action(ArgAction::SetTrue)
                .help("Weight chromosomes by the summed extent of their CCDs"),
        )
        .arg(
            Arg::new("full")
                .long("full")
                .action(ArgAction::SetTrue)
                .help("Read the ledgers of the non-linear algorithm"),
        )
        .arg(Arg::new("dedup").long("dedup").action(ArgAction::SetTrue))
        .arg(
            Arg::new("min-differences")
                .long("min-differences")
                .value_parser(value_parser!(usize)),
        )
}
