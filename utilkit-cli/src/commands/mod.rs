//! Command implementations for the CLI.
//!
//! Each submodule runs one subcommand on top of utilkit-core.

pub mod calendar;
/// `compress` and `analyze`, which share the probing setup.
pub mod compress;
pub mod convert;
pub mod extract;
pub mod zip;
