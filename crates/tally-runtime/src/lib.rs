//! Runtime layer for attendance-tally.
//!
//! Holds the import list and drives a processing run: every queued file goes
//! through the data pipeline, successes feed the summary accumulator, and the
//! summary table is produced on request.

pub mod orchestrator;
pub mod session;

pub use tally_core as core;
pub use tally_data as data;
