//! The per-chromosome result ledger.
//!
//! A ledger is a JSON array with one record per domain file, in domain file
//! order. Positions that have not been processed yet are `null`. Keys are
//! written in sorted order so successive ledgers diff cleanly.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{KnotError, Result};
use crate::utils::domain_sequence_number;

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

///
/// Dispatch outcome of one domain. Field order is alphabetical on purpose:
/// it is the key order of the file on disk.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub ccd_end: u64,
    pub ccd_start: u64,
    pub input_filename: String,
    pub results_exist: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results_filename: String,
    pub results_not_empty: bool,
    pub return_code: Option<i32>,
}

impl LedgerRecord {
    pub fn new(input_filename: impl Into<String>, ccd_start: u64, ccd_end: u64) -> Self {
        LedgerRecord {
            ccd_end,
            ccd_start,
            input_filename: input_filename.into(),
            results_exist: false,
            results_filename: String::new(),
            results_not_empty: false,
            return_code: None,
        }
    }

    ///
    /// 1-based domain sequence number recovered from the input file name.
    ///
    pub fn sequence_number(&self) -> Option<usize> {
        domain_sequence_number(&self.input_filename)
    }

    ///
    /// Path of the raw minor output inside a chromosome directory, if any.
    ///
    pub fn results_path(&self, chromosome_dir: &Path) -> Option<PathBuf> {
        match self.results_filename.is_empty() {
            true => None,
            false => Some(chromosome_dir.join(&self.results_filename)),
        }
    }

    pub fn span(&self) -> u64 {
        self.ccd_end.saturating_sub(self.ccd_start)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<Option<LedgerRecord>>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    ///
    /// A ledger with `len` empty slots.
    ///
    pub fn with_slots(len: usize) -> Self {
        Ledger {
            records: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LedgerRecord> {
        self.records.get(index).and_then(Option::as_ref)
    }

    pub fn push(&mut self, record: LedgerRecord) {
        self.records.push(Some(record));
    }

    ///
    /// Write `record` at `index`, growing the ledger with empty slots if needed.
    ///
    pub fn set(&mut self, index: usize, record: LedgerRecord) {
        if index >= self.records.len() {
            self.records.resize(index + 1, None);
        }
        self.records[index] = Some(record);
    }

    ///
    /// Iterate over the filled slots, in order.
    ///
    pub fn records(&self) -> impl Iterator<Item = &LedgerRecord> {
        self.records.iter().flatten()
    }

    ///
    /// Read a ledger file. Anything that is not an array of records (or
    /// nulls) is reported as a corrupted ledger.
    ///
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| KnotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<Option<LedgerRecord>> =
            serde_json::from_str(&text).map_err(|e| KnotError::LedgerCorruption {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Ledger { records })
    }

    ///
    /// Persist the ledger. The file is written next to its destination and
    /// renamed over it, so a crash never leaves a half-written ledger behind.
    ///
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut records: &[Option<LedgerRecord>] = &self.records;
        while let [rest @ .., None] = records {
            records = rest;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
            records.serialize(&mut serializer)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    ///
    /// Re-seat every record at the position given by the sequence number in
    /// its file name, in a ledger of exactly `expected_len` slots.
    ///
    /// Fails when a record has no sequence number, points past the expected
    /// number of domains, or collides with another record: resuming against
    /// such a ledger would attribute results to the wrong domains.
    ///
    pub fn reindexed(self, expected_len: usize, path: &Path) -> Result<Self> {
        let corruption = |message: String| KnotError::LedgerCorruption {
            path: path.to_path_buf(),
            message,
        };

        let mut reindexed = Ledger::with_slots(expected_len);
        for record in self.records.into_iter().flatten() {
            let number = record.sequence_number().ok_or_else(|| {
                corruption(format!(
                    "no domain sequence number in {:?}",
                    record.input_filename
                ))
            })?;
            if number == 0 || number > expected_len {
                return Err(corruption(format!(
                    "{} is domain {} but only {} domains are defined",
                    record.input_filename, number, expected_len
                )));
            }
            let slot = &mut reindexed.records[number - 1];
            if slot.is_some() {
                return Err(corruption(format!(
                    "domain {} appears more than once",
                    number
                )));
            }
            *slot = Some(record);
        }
        Ok(reindexed)
    }
}
