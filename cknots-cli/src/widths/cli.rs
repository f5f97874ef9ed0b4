use clap::{Arg, Command};

pub const WIDTHS_CMD: &str = "widths";

pub fn create_widths_cli() -> Command {
    Command::new(WIDTHS_CMD)
        .about("Estimate treewidth and cutwidth of CCD interaction graphs (.mp files).")
        .arg_required_else_help(true)
        .arg(Arg::new("graphs").num_args(1..).required(true))
}
