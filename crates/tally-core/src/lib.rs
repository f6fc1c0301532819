//! Shared types for the attendance tally.
//!
//! Holds the data model, the export schema constants, error types, CLI
//! settings and the [`collaborator::Collaborator`] boundary used by the
//! presentation layer.

pub mod collaborator;
pub mod error;
pub mod models;
pub mod schema;
pub mod settings;
