use std::path::PathBuf;

use thiserror::Error;

use cknots_core::KnotError;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Can't read configuration file {path}: {message}")]
    ConfigFile { path: PathBuf, message: String },

    #[error("Failed to run the splitter for chromosome {chromosome}: {source}")]
    Splitter {
        chromosome: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Knot(#[from] KnotError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
