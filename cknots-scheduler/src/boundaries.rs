//! CCD boundary table: a headerless, tab separated `chromosome start end` file.
use std::io::BufRead;
use std::path::Path;

use cknots_core::utils::{get_dynamic_reader, normalize_chromosome_name};

use crate::errors::{Result, SchedulerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

///
/// All boundary rows of a run, in file order.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryTable {
    rows: Vec<Boundary>,
}

impl TryFrom<&Path> for BoundaryTable {
    type Error = SchedulerError;

    fn try_from(value: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(value)?;
        let mut rows = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let malformed = |what: &str| {
                SchedulerError::Configuration(format!(
                    "{}:{}: {what}: {trimmed}",
                    value.display(),
                    index + 1
                ))
            };

            let fields: Vec<&str> = trimmed.split('\t').collect();
            if fields.len() < 3 {
                return Err(malformed("expected chromosome, start and end"));
            }
            let start = fields[1]
                .trim()
                .parse::<u64>()
                .map_err(|_| malformed("invalid start"))?;
            let end = fields[2]
                .trim()
                .parse::<u64>()
                .map_err(|_| malformed("invalid end"))?;

            rows.push(Boundary {
                chromosome: fields[0].trim().to_string(),
                start,
                end,
            });
        }

        Ok(BoundaryTable { rows })
    }
}

impl BoundaryTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    ///
    /// Rows of one chromosome, in file order. `chr7`, `7` and `chr_07` all
    /// name the same chromosome.
    ///
    pub fn rows_for(&self, chromosome: &str) -> Vec<&Boundary> {
        let wanted = normalize_chromosome_name(chromosome);
        self.rows
            .iter()
            .filter(|row| normalize_chromosome_name(&row.chromosome) == wanted)
            .collect()
    }

    pub fn contains(&self, chromosome: &str) -> bool {
        !self.rows_for(chromosome).is_empty()
    }
}
