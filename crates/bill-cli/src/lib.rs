//! Billing ledger CLI library.
//!
//! This crate provides the command-line interface: argument parsing,
//! configuration, the per-invocation project set and the subcommands.

mod bill;
mod cli;
pub mod commands;
mod config;

pub use bill::{Bill, Project};
pub use cli::{Cli, Commands, RangeArgs, Verbosity};
pub use config::{Config, ProjectConfig, dirs_config_path, expand_path};
