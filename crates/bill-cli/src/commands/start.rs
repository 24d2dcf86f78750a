//! Start command for opening a shift.

use bill_core::{Precision, format_timestamp};
use chrono::{Duration, NaiveDateTime};

use crate::bill::Bill;

/// Starts a shift at `time + offset` on every selected project.
///
/// Projects that already have a running shift are left untouched and the
/// conflict is logged.
pub fn run(
    bill: &mut Bill,
    time: NaiveDateTime,
    offset: Duration,
    precision: Precision,
    comment: Option<&str>,
) {
    for project in bill.projects_mut() {
        match project
            .ledger
            .start(time, offset, precision, comment.map(str::to_string))
        {
            Ok(shift) => tracing::info!(
                project = %project.id,
                start = %format_timestamp(shift.start),
                precision = %shift.precision,
                "started a shift"
            ),
            Err(e) => tracing::error!("{e}"),
        }
    }
}
