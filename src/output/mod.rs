//! Output module for run reporting
//!
//! This module handles:
//! - Recording per-run counters from the coordinator and workers
//! - Printing the end-of-run summary

pub mod stats;

pub use stats::{print_statistics, ArtistOutcome, RunStatistics, StatisticsSnapshot};
