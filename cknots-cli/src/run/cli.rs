use clap::{Arg, ArgAction, Command, value_parser};

pub const RUN_CMD: &str = "run";

pub fn create_run_cli() -> Command {
    Command::new(RUN_CMD)
        .about("Split a contact file into CCDs and look for minors in each of them.")
        .allow_negative_numbers(true)
        .arg(
            Arg::new("in_bedpe")
                .required_unless_present("config")
                .help("Genome-wide contact file (.bedpe)"),
        )
        .arg(
            Arg::new("in_ccd")
                .required_unless_present("config")
                .help("Tab separated CCD boundaries: chromosome, start, end"),
        )
        .arg(
            Arg::new("out_dir")
                .required_unless_present("config")
                .help("Directory with results"),
        )
        .arg(
            Arg::new("chromosome")
                .required_unless_present("config")
                .help("Chromosome to process: 1-23 (23 is X), or 0 / all for every chromosome"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file with scheduler settings. Values given on the command line take precedence"),
        )
        .arg(
            Arg::new("full")
                .long("full")
                .action(ArgAction::SetTrue)
                .help("Use the non-linear algorithm (path decomposition + find-knots)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64))
                .help("Single CCD timeout in seconds [default: 21600]"),
        )
        .arg(
            Arg::new("mem")
                .long("mem")
                .value_parser(value_parser!(u64))
                .help("Memory limit of the non-linear algorithm in GB [default: 600]"),
        )
        .arg(
            Arg::new("bin-dir")
                .long("bin-dir")
                .help("Directory with the splitter and minor finder executables [default: cknots/cpp/bin]"),
        )
        .arg(
            Arg::new("work-dir")
                .long("work-dir")
                .help("Directory the splitter writes domain files into [default: current directory]"),
        )
        .arg(
            Arg::new("extra")
                .num_args(1..)
                .last(true)
                .help("Extra arguments for the minor finder, given after `--`"),
        )
}
