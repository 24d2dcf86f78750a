//! Report command for listing worked shifts.
//!
//! Shifts already marked as reported are left out unless asked for.
//! Payments never appear here; see `balance`.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use bill_core::timestamp::DISPLAY_FORMAT;
use bill_core::{Event, RunningShift, Statement, StatementFilter, format_clock};
use chrono::NaiveDateTime;

use crate::bill::Bill;

fn display(instant: NaiveDateTime) -> String {
    instant.format(DISPLAY_FORMAT).to_string()
}

/// Appends the running-shift lines shared by `report` and `balance`.
pub(crate) fn format_running(output: &mut String, running: &RunningShift<'_>) {
    writeln!(output).unwrap();
    writeln!(
        output,
        "Current shift started at {:<16} and has been running for {} ({:.2} so far)",
        display(running.shift.start),
        format_clock(running.duration),
        running.value
    )
    .unwrap();
    if let Some(comment) = &running.shift.comment {
        writeln!(output, "  {comment}").unwrap();
    }
}

/// Formats one project's shifts as comma-separated lines followed by totals.
pub fn format_report(statement: &Statement<'_>, now: NaiveDateTime) -> String {
    let mut output = String::new();

    writeln!(output, "{:<16}, {:<16}, {:<8}, comment", "start", "end", "duration").unwrap();
    for line in &statement.lines {
        let Event::Shift(shift) = line.event else {
            continue;
        };
        let row = format!(
            "{:<16}, {:<16}, {:<8}, {}",
            display(shift.round_start()),
            shift.round_end().map(display).unwrap_or_default(),
            format_clock(shift.round_duration(now)),
            shift.comment.as_deref().unwrap_or_default()
        );
        writeln!(output, "{}", row.trim_end()).unwrap();
    }

    let summary = &statement.summary;
    writeln!(output).unwrap();
    match summary.span() {
        Some((first, last)) => writeln!(
            output,
            "Total {:.2} hours in {} shifts from {} to {}",
            summary.hours(),
            summary.shifts,
            display(first),
            display(last)
        )
        .unwrap(),
        None => writeln!(output, "Total 0.00 hours in 0 shifts").unwrap(),
    }

    if let Some(running) = &statement.running {
        format_running(&mut output, running);
    }

    output
}

/// Runs the report command.
pub fn run<W: Write>(
    writer: &mut W,
    bill: &Bill,
    filter: &StatementFilter,
    now: NaiveDateTime,
) -> Result<()> {
    let titled = bill.len() > 1;
    for (index, project) in bill.projects().enumerate() {
        if titled {
            if index > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "== {} ==", project.ledger.name())?;
        }
        let statement = project.ledger.statement(filter, now);
        write!(writer, "{}", format_report(&statement, now))?;
    }
    Ok(())
}
