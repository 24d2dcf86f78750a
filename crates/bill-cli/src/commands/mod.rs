//! CLI subcommand implementations.

pub mod balance;
pub mod mark;
pub mod pay;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
