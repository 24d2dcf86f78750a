//! Mark command for flagging shifts as already reported.

use bill_core::DateWindow;

use crate::bill::Bill;

/// Marks every shift whose rounded start lies inside `window`.
pub fn run(bill: &mut Bill, window: &DateWindow) {
    for project in bill.projects_mut() {
        let marked = project.ledger.mark(window);
        tracing::info!(project = %project.id, marked, "marked shifts as reported");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bill_core::{Event, Precision};
    use chrono::Duration;

    use crate::commands::testing::{bill_in, ts};

    #[test]
    fn marks_only_shifts_inside_window() {
        let temp = tempfile::tempdir().unwrap();
        let mut bill = bill_in(temp.path(), &["wrd"]);
        for project in bill.projects_mut() {
            for day in ["2024-01-01", "2024-01-05"] {
                project
                    .ledger
                    .start(ts(&format!("{day}T09:00:00")), Duration::zero(), Precision::default(), None)
                    .unwrap();
                project
                    .ledger
                    .stop(ts(&format!("{day}T10:00:00")), Duration::zero(), None)
                    .unwrap();
            }
        }

        run(
            &mut bill,
            &DateWindow::new(None, Some(ts("2024-01-03T00:00:00"))),
        );

        let project = bill.projects().next().unwrap();
        let marks: Vec<bool> = project
            .ledger
            .history()
            .iter()
            .map(|event| matches!(event, Event::Shift(shift) if shift.marked))
            .collect();
        assert_eq!(marks, vec![true, false]);
    }
}
