use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or("info"))
}

pub fn init_stderr() {
    builder().format_target(false).init();
}

///
/// Send log lines to `path` (appending) as `<timestamp> [<LEVEL>] <message>`.
///
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Can't open log file {}", path.display()))?;

    builder()
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .init();
    Ok(())
}
