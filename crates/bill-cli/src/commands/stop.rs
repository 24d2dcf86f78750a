//! Stop command for closing the running shift.

use bill_core::{format_clock, format_timestamp};
use chrono::{Duration, NaiveDateTime};

use crate::bill::Bill;

/// Stops the running shift at `time + offset` on every selected project.
///
/// A `comment` replaces the one given at start. Projects with nothing
/// running are left untouched and the problem is logged.
pub fn run(bill: &mut Bill, time: NaiveDateTime, offset: Duration, comment: Option<&str>) {
    for project in bill.projects_mut() {
        let rate = project.ledger.rate();
        match project.ledger.stop(time, offset, comment.map(str::to_string)) {
            Ok(shift) => {
                let end = shift.end.unwrap_or(time);
                tracing::info!(
                    project = %project.id,
                    start = %format_timestamp(shift.start),
                    end = %format_timestamp(end),
                    duration = %format_clock(shift.round_duration(end)),
                    value = format_args!("{:.2}", shift.value(rate, end)),
                    "stopped the shift"
                );
            }
            Err(e) => tracing::error!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bill_core::{Event, Precision};

    use crate::commands::testing::{bill_in, ts};

    #[test]
    fn stop_moves_shift_into_history() {
        let temp = tempfile::tempdir().unwrap();
        let mut bill = bill_in(temp.path(), &["wrd"]);
        for project in bill.projects_mut() {
            project
                .ledger
                .start(
                    ts("2024-01-01T09:00:00"),
                    Duration::zero(),
                    Precision::default(),
                    Some("draft".to_string()),
                )
                .unwrap();
        }

        run(&mut bill, ts("2024-01-01T17:07:00"), Duration::zero(), Some("review"));

        let project = bill.projects().next().unwrap();
        assert!(project.ledger.current().is_none());
        let [Event::Shift(shift)] = project.ledger.history() else {
            panic!("expected a single shift");
        };
        assert_eq!(shift.end, Some(ts("2024-01-01T17:07:00")));
        assert_eq!(shift.comment.as_deref(), Some("review"));
        assert!((shift.value(20.0, ts("2024-02-01T00:00:00")) - 165.0).abs() < 1e-9);
    }

    #[test]
    fn stop_without_running_shift_changes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let mut bill = bill_in(temp.path(), &["wrd"]);

        run(&mut bill, ts("2024-01-01T17:00:00"), Duration::zero(), None);

        let project = bill.projects().next().unwrap();
        assert!(project.ledger.history().is_empty());
        assert!(!project.ledger.is_volatile());
    }
}
