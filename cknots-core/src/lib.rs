//! # cknots-core
//!
//! Data model for chromatin knots: the links ("knots", graph minors) that the
//! minor finders report inside the interaction graph of each chromatin contact
//! domain (CCD), and the domain, chromosome and cell line views built on top
//! of them.
//!
//! It also holds the pieces shared with the scheduler: the raw minor parser,
//! the per-chromosome result ledger and the chromosome naming helpers.
//!
//! ```no_run
//! use std::path::Path;
//! use cknots_core::models::CellLine;
//!
//! let mut a = CellLine::load_from_path(Path::new("results/GM12878"), None).unwrap();
//! let b = CellLine::load_from_path(Path::new("results/K562"), None).unwrap();
//! a.remove_duplicate_links();
//! println!("{}", a.similarity(&b, 10_000, true));
//! ```
pub mod consts;
pub mod diagnostics;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod parser;
pub mod utils;

pub use errors::{KnotError, Result};
