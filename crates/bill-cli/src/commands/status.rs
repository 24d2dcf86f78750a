//! Status command for showing each project's running shift and balance.

use std::io::Write;

use anyhow::Result;
use bill_core::timestamp::DISPLAY_FORMAT;
use bill_core::{DateWindow, StatementFilter, format_clock};
use chrono::NaiveDateTime;

use crate::bill::Bill;

pub fn run<W: Write>(writer: &mut W, bill: &Bill, now: NaiveDateTime) -> Result<()> {
    if bill.is_empty() {
        writeln!(writer, "No projects configured.")?;
        return Ok(());
    }

    let filter = StatementFilter::all(DateWindow::unbounded());
    for project in bill.projects() {
        let statement = project.ledger.statement(&filter, now);
        writeln!(
            writer,
            "{} (rate {:.2}/h)",
            project.ledger.name(),
            project.ledger.rate()
        )?;
        match &statement.running {
            Some(running) => writeln!(
                writer,
                "  running since {} ({})",
                running.shift.start.format(DISPLAY_FORMAT),
                format_clock(running.duration)
            )?,
            None => writeln!(writer, "  idle")?,
        }
        writeln!(writer, "  balance {:.2}", statement.summary.balance)?;
    }

    Ok(())
}
