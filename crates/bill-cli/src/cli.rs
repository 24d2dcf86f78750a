//! Command-line argument definitions.

use std::path::PathBuf;

use bill_core::{DateWindow, Precision, parse_date, parse_time_delta, parse_timestamp};
use chrono::{Duration, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};

const TIME_HELP: &str = "TIMESTAMP is given as YYYY-MM-DDTHH:MM:SS[.ffffff]. \
DURATION is given as {H}h{M}m{S}s or any subset, i.e. 4h34m; a trailing '-' makes it negative, i.e. 10m-.";

const DATE_HELP: &str = "DATE is given as YYYY-MM-DD. Both bounds are exclusive.";

/// Personal time-billing ledger.
///
/// Tracks work shifts per project, rounds them to a billing precision,
/// records payments and reports hours and balances.
#[derive(Debug, Parser)]
#[command(name = "bill", version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity level.
    #[arg(short, long, global = true, value_name = "LEVEL", default_value = "info")]
    pub verbosity: Verbosity,

    /// Path to config file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project to bill [default: every configured project].
    #[arg(short, long, global = true, value_name = "ID")]
    pub project: Option<String>,

    /// Sort each ledger chronologically before acting.
    #[arg(long, global = true)]
    pub sort: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start billing.
    #[command(after_help = TIME_HELP)]
    Start {
        /// Time to start [default: now].
        #[arg(short, long, value_name = "TIMESTAMP", value_parser = timestamp_arg)]
        time: Option<NaiveDateTime>,

        /// Offset added to the start time.
        #[arg(short, long, value_name = "DURATION", default_value = "0s", value_parser = time_delta_arg)]
        offset: Duration,

        /// Round shift boundaries to the nearest multiple of this duration.
        #[arg(short, long, value_name = "DURATION", default_value = "15m", value_parser = precision_arg)]
        quantize: Precision,

        /// Comment for the shift.
        #[arg(short = 'm', long = "message", value_name = "MESSAGE")]
        comment: Option<String>,
    },

    /// Stop billing.
    #[command(after_help = TIME_HELP)]
    Stop {
        /// Time to stop [default: now].
        #[arg(short, long, value_name = "TIMESTAMP", value_parser = timestamp_arg)]
        time: Option<NaiveDateTime>,

        /// Offset added to the stop time.
        #[arg(short, long, value_name = "DURATION", default_value = "0s", value_parser = time_delta_arg)]
        offset: Duration,

        /// Comment for the shift, replacing the one given at start.
        #[arg(short = 'm', long = "message", value_name = "MESSAGE")]
        comment: Option<String>,
    },

    /// Record a payment against the balance.
    #[command(after_help = TIME_HELP)]
    Pay {
        /// Amount paid.
        #[arg(value_parser = amount_arg, allow_negative_numbers = true)]
        amount: f64,

        /// When the payment was made [default: now].
        #[arg(short, long, value_name = "TIMESTAMP", value_parser = timestamp_arg)]
        date: Option<NaiveDateTime>,
    },

    /// Mark shifts as reported so they don't show up by default on reports.
    #[command(after_help = DATE_HELP)]
    Mark {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Report hours worked.
    #[command(after_help = DATE_HELP)]
    Report {
        #[command(flatten)]
        range: RangeArgs,

        /// Show marked shifts.
        #[arg(short, long)]
        marked: bool,
    },

    /// Show labour, payments and the running balance.
    #[command(after_help = DATE_HELP)]
    Balance {
        #[command(flatten)]
        range: RangeArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show each project's running shift and balance.
    Status,
}

/// Date range filter shared by mark, report and balance.
#[derive(Debug, Clone, Copy, Args)]
pub struct RangeArgs {
    /// Only events after this date.
    #[arg(short, long, value_name = "DATE", value_parser = date_arg)]
    pub from: Option<NaiveDateTime>,

    /// Only events before this date.
    #[arg(short, long, value_name = "DATE", value_parser = date_arg)]
    pub to: Option<NaiveDateTime>,
}

impl RangeArgs {
    pub const fn window(&self) -> DateWindow {
        DateWindow::new(self.from, self.to)
    }
}

/// Log levels accepted by `--verbosity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verbosity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Verbosity {
    /// The equivalent tracing filter directive.
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

fn timestamp_arg(s: &str) -> Result<NaiveDateTime, bill_core::ParseError> {
    parse_timestamp(s)
}

fn date_arg(s: &str) -> Result<NaiveDateTime, bill_core::ParseError> {
    parse_date(s)
}

fn time_delta_arg(s: &str) -> Result<Duration, bill_core::ParseError> {
    parse_time_delta(s)
}

fn precision_arg(s: &str) -> Result<Precision, String> {
    let duration = parse_time_delta(s).map_err(|e| e.to_string())?;
    Precision::from_duration(duration).map_err(|e| e.to_string())
}

fn amount_arg(s: &str) -> Result<f64, String> {
    let amount: f64 = s
        .parse()
        .map_err(|_| format!("invalid amount '{s}': expected a number"))?;
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(format!("invalid amount '{s}': must be finite"))
    }
}
