//! Core domain logic for the billing ledger.
//!
//! This crate contains the fundamental types and logic for:
//! - Durations: parsing compact strings such as `1h30m-`
//! - Quantization: rounding instants to a fixed precision
//! - Events: shifts and payments with their values and order
//! - Ledger: start/stop/pay/mark/sort over one project's history
//! - Reports: replaying a ledger into lines, totals and balances

pub mod event;
pub mod ledger;
pub mod quantize;
pub mod report;
pub mod timedelta;
pub mod timestamp;
pub mod types;

pub use event::{Event, Payment, Shift};
pub use ledger::{Ledger, LedgerError, LedgerSnapshot};
pub use quantize::quantize;
pub use report::{RunningShift, Statement, StatementFilter, StatementLine, Summary};
pub use timedelta::{format_clock, format_compact, parse_time_delta};
pub use timestamp::{format_timestamp, parse_date, parse_timestamp};
pub use types::{DateWindow, ParseError, Precision, ProjectName, ValidationError};
