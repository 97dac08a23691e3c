//! pawl CLI - command-line interface for the pawl schema change runner.
//!
//! This crate wraps the engine with argument parsing, connection
//! construction and human-readable reporting.

pub mod cli;
pub mod error;
pub mod output;
