//! Data layer for attendance-tally.
//!
//! Reads check-in exports (spreadsheet or delimited text), finds the header
//! row beneath any metadata, validates the required columns, scores each
//! status and writes the per-file and summary artifacts.

pub mod aggregator;
pub mod locator;
pub mod processor;
pub mod reader;
pub mod scorer;
pub mod validator;
pub mod writer;

pub use tally_core as core;
