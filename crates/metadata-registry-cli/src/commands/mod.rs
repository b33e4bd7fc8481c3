//! Subcommand implementations.
//!
//! Each command writes its user-facing output to the given writer and
//! returns an error for the caller to report.

pub mod entity;
pub mod registry;
