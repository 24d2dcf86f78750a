//! Pay command for recording a payment.

use bill_core::format_timestamp;
use chrono::NaiveDateTime;

use crate::bill::Bill;

/// Records a payment of `amount` on `date`.
///
/// A payment belongs to exactly one project, so nothing is recorded when
/// more than one project is selected.
pub fn run(bill: &mut Bill, amount: f64, date: NaiveDateTime) {
    if bill.len() > 1 {
        tracing::warn!(
            projects = bill.len(),
            "several projects are configured; choose one with --project to record a payment"
        );
        return;
    }

    for project in bill.projects_mut() {
        let payment = project.ledger.pay(amount, date);
        tracing::info!(
            project = %project.id,
            amount = format_args!("{:.2}", payment.amount),
            date = %format_timestamp(payment.date),
            "recorded a payment"
        );
    }
}
