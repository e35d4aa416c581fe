//! Subcommand implementations.

pub mod common;
pub mod config;
pub mod monitor;
pub mod simulate;
