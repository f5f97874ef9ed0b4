//! # cknots-scheduler
//!
//! Resumable driver for the external cknots executables. For every selected
//! chromosome it runs the splitter, moves the resulting domain files into
//! `<out_dir>/chr_<NN|X>`, and runs a minor finder over each domain file with
//! a timeout, recording the outcome in a per-chromosome ledger.
//!
//! ```no_run
//! use cknots_scheduler::{ComputationScheduler, SchedulerConfig};
//!
//! let mut config = SchedulerConfig::new("GM12878.bedpe", "GM12878.ccd", "results");
//! config.chromosome = "7".parse().unwrap();
//!
//! let scheduler = ComputationScheduler::new(config).unwrap();
//! for report in scheduler.run().unwrap() {
//!     println!("chr{}: {} domains dispatched", report.name, report.dispatched);
//! }
//! ```
pub mod boundaries;
pub mod config;
pub mod consts;
pub mod dispatch;
pub mod errors;
pub mod scheduler;
pub mod splitter;

pub use config::{ChromosomeSelector, MinorFindingAlgorithm, SchedulerConfig};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use errors::{Result, SchedulerError};
pub use scheduler::{ChromosomeReport, ComputationScheduler};
