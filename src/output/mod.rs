//! Output module for reporting on the frontier
//!
//! This module handles:
//! - Collecting per-status record counts, edge and domain totals
//! - Printing them for the `--stats` command

pub mod stats;

pub use stats::{load_statistics, print_statistics, FrontierStatistics};
