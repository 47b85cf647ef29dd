//! Construct-consistency filtering for Likert-scale survey data.
//!
//! A config file groups dataset columns into named constructs. Two filters
//! run over the validated dataset, each producing its own cleaned table:
//!
//! * mean-threshold: discard rows where a value strays from its construct
//!   mean by more than `factor * mean`
//! * overlap: discard rows where two constructs' means differ by less than
//!   a threshold

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod report;
pub mod session;
