use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

use flate2::read::MultiGzDecoder;
use regex::Regex;

use crate::consts::{DOMAIN_FILE_EXT, SEQUENCE_NUMBER_DIGITS};
use crate::errors::{KnotError, Result};

static CHROMOSOME_DIR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"chr_(\d+|X|Y)").expect("valid chromosome directory pattern"));

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|source| KnotError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read a whole (optionally gzip'd) text file into memory.
///
pub fn read_to_string_dynamic(path: &Path) -> Result<String> {
    let mut reader = get_dynamic_reader(path)?;
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| KnotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(text)
}

///
/// Recover the 1-based domain sequence number embedded in a domain file name,
/// i.e. the last four digits before the `.mp` suffix (`GM12878.0042.mp` -> 42).
///
/// Returns `None` when the name does not carry four trailing digits.
///
pub fn domain_sequence_number(file_name: &str) -> Option<usize> {
    let stem = file_name
        .strip_suffix(&format!(".{DOMAIN_FILE_EXT}"))
        .or_else(|| file_name.rsplit_once('.').map(|(stem, _)| stem))
        .unwrap_or(file_name);

    if stem.len() < SEQUENCE_NUMBER_DIGITS {
        return None;
    }
    let digits = &stem[stem.len() - SEQUENCE_NUMBER_DIGITS..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

///
/// Is this a chromosome token the analysis layer accepts for a cell line
/// (`1`..`22` or `X`)?
///
pub fn is_valid_chromosome_token(token: &str) -> bool {
    match token {
        "X" => true,
        _ => matches!(token.parse::<u8>(), Ok(n) if (1..=22).contains(&n) && !token.starts_with('0')),
    }
}

///
/// Chromosome token for a chromosome number, where 23 stands for X.
///
pub fn chromosome_token(number: u8) -> Result<String> {
    match number {
        1..=22 => Ok(number.to_string()),
        23 => Ok("X".to_string()),
        _ => Err(KnotError::InvalidChromosome(number.to_string())),
    }
}

///
/// Name of the output directory holding one chromosome (`chr_07`, `chr_X`).
///
pub fn chromosome_dir_name(token: &str) -> String {
    match token.parse::<u8>() {
        Ok(n) => format!("chr_{n:02}"),
        Err(_) => format!("chr_{token}"),
    }
}

///
/// Strip a `chr` prefix and leading zeros, and uppercase letters, so that
/// `chr01`, `chr1` and `1` (or `chrx` and `X`) all compare equal.
///
pub fn normalize_chromosome_name(name: &str) -> String {
    let name = name.strip_prefix("chr").unwrap_or(name);
    let name = name.strip_prefix('_').unwrap_or(name);
    match name.parse::<u32>() {
        Ok(n) => n.to_string(),
        Err(_) => name.to_uppercase(),
    }
}

///
/// Derive a chromosome name from the last `chr_<NN|X|Y>` component found in a path.
///
pub fn chromosome_name_from_path(path: &Path) -> Result<String> {
    let path_str = path.to_string_lossy();
    let token = CHROMOSOME_DIR_REGEX
        .captures_iter(&path_str)
        .last()
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| KnotError::ChromosomeNameNotFound(path.to_path_buf()))?;

    match token.as_str() {
        "X" | "Y" => Ok(token),
        _ => match token.parse::<u8>() {
            Ok(n) if (1..=22).contains(&n) => Ok(n.to_string()),
            _ => Err(KnotError::ChromosomeNameNotFound(path.to_path_buf())),
        },
    }
}
