use std::io::{self, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bill_core::StatementFilter;
use chrono::{Local, NaiveDateTime, SubsecRound};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bill_cli::commands::{balance, mark, pay, report, start, status, stop};
use bill_cli::{Bill, Cli, Commands, Config, Verbosity};

/// Initializes logging to stderr; `RUST_LOG` overrides `--verbosity`.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.as_filter()));
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

/// Loads configuration, falling back to no projects when it is unusable.
fn load_config(config_path: Option<&Path>) -> Config {
    if let Some(path) = config_path {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "configuration file not found");
        }
    }

    match Config::load_from(config_path) {
        Ok(config) => {
            tracing::debug!(?config, "loaded configuration");
            if config.projects.is_empty() {
                tracing::warn!("no projects configured");
            }
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load configuration; nothing to do");
            Config::default()
        }
    }
}

fn dispatch<W: Write>(
    writer: &mut W,
    command: &Commands,
    bill: &mut Bill,
    now: NaiveDateTime,
) -> Result<()> {
    match command {
        Commands::Start {
            time,
            offset,
            quantize,
            comment,
        } => start::run(
            bill,
            time.unwrap_or(now),
            *offset,
            *quantize,
            comment.as_deref(),
        ),
        Commands::Stop {
            time,
            offset,
            comment,
        } => stop::run(bill, time.unwrap_or(now), *offset, comment.as_deref()),
        Commands::Pay { amount, date } => pay::run(bill, *amount, date.unwrap_or(now)),
        Commands::Mark { range } => mark::run(bill, &range.window()),
        Commands::Report { range, marked } => {
            let filter = StatementFilter {
                window: range.window(),
                include_marked: *marked,
            };
            report::run(writer, bill, &filter, now)?;
        }
        Commands::Balance { range, json } => {
            balance::run(writer, bill, &range.window(), *json, now)?;
        }
        Commands::Status => status::run(writer, bill, now)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    // Sampled once so every event and report in this run agrees on "now".
    let now = Local::now().naive_local().trunc_subsecs(6);

    let config = load_config(cli.config.as_deref());
    let mut bill = Bill::load(&config, cli.project.as_deref());
    if cli.sort {
        bill.sort();
    }

    let mut stdout = io::stdout().lock();
    let result = dispatch(&mut stdout, command, &mut bill, now).context("failed to write output");
    let saved = bill.flush();
    tracing::debug!(saved, "done");
    result
}
