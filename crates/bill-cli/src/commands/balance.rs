//! Balance command for replaying labour and payments.
//!
//! Every event in the window counts, marked or not, and lines keep the
//! ledger's stored order so each running balance reads as of that event.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use bill_core::timestamp::DISPLAY_FORMAT;
use bill_core::{DateWindow, Event, Statement, StatementFilter, format_clock, format_timestamp};
use chrono::NaiveDateTime;
use serde::Serialize;

use super::report::format_running;
use crate::bill::Bill;

/// Formats one project's statement as comma-separated lines followed by
/// totals.
pub fn format_balance(statement: &Statement<'_>, now: NaiveDateTime) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "{:<16}, {:<7}, {:<8}, {:>10}, {:>10}, comment",
        "date", "kind", "duration", "value", "balance"
    )
    .unwrap();
    for line in &statement.lines {
        let (duration, comment) = match line.event {
            Event::Shift(shift) => (
                format_clock(shift.round_duration(now)),
                shift.comment.as_deref().unwrap_or_default(),
            ),
            Event::Payment(_) => (String::new(), ""),
        };
        let row = format!(
            "{:<16}, {:<7}, {:<8}, {:>10.2}, {:>10.2}, {}",
            line.event.instant().format(DISPLAY_FORMAT).to_string(),
            line.event.kind(),
            duration,
            line.value,
            line.balance,
            comment
        );
        writeln!(output, "{}", row.trim_end()).unwrap();
    }

    let summary = &statement.summary;
    writeln!(output).unwrap();
    writeln!(
        output,
        "Worked {:.2} hours in {} shifts, received {} payments",
        summary.hours(),
        summary.shifts,
        summary.payments
    )
    .unwrap();
    writeln!(
        output,
        "Labour {:.2}, deposits {:.2}, balance {:.2}",
        summary.labour, summary.deposits, summary.balance
    )
    .unwrap();

    if let Some(running) = &statement.running {
        format_running(&mut output, running);
    }

    output
}

/// JSON balance structure, one per project.
#[derive(Debug, Serialize)]
pub struct JsonBalance {
    pub project: String,
    pub rate: f64,
    pub generated_at: String,
    pub window: JsonWindow,
    pub events: Vec<JsonLine>,
    pub totals: JsonTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<JsonRunning>,
}

#[derive(Debug, Serialize)]
pub struct JsonWindow {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonLine {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub value: f64,
    pub balance: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub hours: f64,
    pub shifts: usize,
    pub payments: usize,
    pub labour: f64,
    pub deposits: f64,
    pub balance: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonRunning {
    pub start: String,
    pub duration_seconds: i64,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

fn json_balance(
    project: &str,
    rate: f64,
    window: &DateWindow,
    statement: &Statement<'_>,
    now: NaiveDateTime,
) -> JsonBalance {
    let events = statement
        .lines
        .iter()
        .map(|line| {
            let (duration_seconds, comment) = match line.event {
                Event::Shift(shift) => (
                    Some(shift.round_duration(now).num_seconds()),
                    shift.comment.clone(),
                ),
                Event::Payment(_) => (None, None),
            };
            JsonLine {
                kind: line.event.kind(),
                date: format_timestamp(line.event.instant()),
                duration_seconds,
                comment,
                value: line.value,
                balance: line.balance,
            }
        })
        .collect();

    let summary = &statement.summary;
    JsonBalance {
        project: project.to_string(),
        rate,
        generated_at: format_timestamp(now),
        window: JsonWindow {
            from: window.start.map(format_timestamp),
            to: window.end.map(format_timestamp),
        },
        events,
        totals: JsonTotals {
            hours: summary.hours(),
            shifts: summary.shifts,
            payments: summary.payments,
            labour: summary.labour,
            deposits: summary.deposits,
            balance: summary.balance,
        },
        running: statement.running.as_ref().map(|running| JsonRunning {
            start: format_timestamp(running.shift.start),
            duration_seconds: running.duration.num_seconds(),
            value: running.value,
            comment: running.shift.comment.clone(),
        }),
    }
}

/// Runs the balance command.
pub fn run<W: Write>(
    writer: &mut W,
    bill: &Bill,
    window: &DateWindow,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let filter = StatementFilter::all(*window);

    if json {
        let balances: Vec<JsonBalance> = bill
            .projects()
            .map(|project| {
                let statement = project.ledger.statement(&filter, now);
                json_balance(
                    project.ledger.name().as_str(),
                    project.ledger.rate(),
                    window,
                    &statement,
                    now,
                )
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&balances)?)?;
        return Ok(());
    }

    let titled = bill.len() > 1;
    for (index, project) in bill.projects().enumerate() {
        if titled {
            if index > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "== {} ==", project.ledger.name())?;
        }
        let statement = project.ledger.statement(&filter, now);
        write!(writer, "{}", format_balance(&statement, now))?;
    }
    Ok(())
}
