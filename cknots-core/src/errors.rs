use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnotError {
    #[error("Invalid chromosome: {0}")]
    InvalidChromosome(String),

    #[error("Cannot extract chromosome name from path {0}. Please specify the chromosome explicitly.")]
    ChromosomeNameNotFound(PathBuf),

    #[error("Error parsing raw minor output: {0}")]
    LinkParse(String),

    #[error("Error parsing domain graph at line {line}: {message}")]
    GraphParse { line: usize, message: String },

    #[error("Invalid domain interval: start {start} must be smaller than end {end}")]
    InvalidDomain { start: u64, end: u64 },

    #[error("Corrupted ledger {path}: {message}")]
    LedgerCorruption { path: PathBuf, message: String },

    #[error("Can't read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KnotError>;
