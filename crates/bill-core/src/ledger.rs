//! The per-project ledger of shifts and payments.
//!
//! A [`Ledger`] owns the ordered history of events and at most one running
//! shift. Every mutation marks it volatile so the caller knows it has to be
//! written back to storage.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Event, Payment, Shift};
use crate::timedelta::format_compact;
use crate::timestamp::format_timestamp;
use crate::types::{DateWindow, Precision, ProjectName};

/// Invalid state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A shift is already running for the project.
    #[error("project {project} already has a shift running since {since}; stop it first")]
    AlreadyRunning { project: ProjectName, since: String },

    /// There is no running shift to stop.
    #[error("project {project} has no running shift; start one first")]
    NotRunning { project: ProjectName },

    /// Applying the offset leaves the representable calendar.
    #[error("offset {offset} moves the time out of range for project {project}")]
    OutOfRange { project: ProjectName, offset: String },
}

/// `time + offset`, or an error naming the project when that leaves the
/// calendar.
fn offset_time(
    project: &ProjectName,
    time: NaiveDateTime,
    offset: Duration,
) -> Result<NaiveDateTime, LedgerError> {
    time.checked_add_signed(offset).ok_or_else(|| LedgerError::OutOfRange {
        project: project.clone(),
        offset: format_compact(offset),
    })
}

/// The persisted form of a ledger.
///
/// `history` holds tagged event records in replay order; `current` is the
/// running shift, stored without a tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Shift>,

    #[serde(default)]
    pub history: Vec<Event>,
}

/// One project's billing history.
#[derive(Debug, Clone)]
pub struct Ledger {
    name: ProjectName,
    rate: f64,
    history: Vec<Event>,
    current: Option<Shift>,
    volatile: bool,
}

impl Ledger {
    /// Creates an empty ledger.
    pub const fn new(name: ProjectName, rate: f64) -> Self {
        Self {
            name,
            rate,
            history: Vec::new(),
            current: None,
            volatile: false,
        }
    }

    /// Rebuilds a ledger from its persisted form.
    ///
    /// A stored `current` shift that already has an end is moved into
    /// history, since only running shifts may occupy that slot.
    pub fn from_snapshot(name: ProjectName, rate: f64, snapshot: LedgerSnapshot) -> Self {
        let LedgerSnapshot {
            mut history,
            mut current,
        } = snapshot;

        let mut volatile = false;
        if let Some(shift) = current.take_if(|shift| !shift.is_running()) {
            tracing::warn!(project = %name, "current shift was already closed, moving it to history");
            history.push(Event::Shift(shift));
            volatile = true;
        }

        Self {
            name,
            rate,
            history,
            current,
            volatile,
        }
    }

    /// Captures the ledger in its persisted form.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            current: self.current.clone(),
            history: self.history.clone(),
        }
    }

    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Hourly rate applied to shifts.
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    pub fn history(&self) -> &[Event] {
        &self.history
    }

    /// The running shift, if any.
    pub const fn current(&self) -> Option<&Shift> {
        self.current.as_ref()
    }

    /// Returns true when the ledger differs from what was last persisted.
    pub const fn is_volatile(&self) -> bool {
        self.volatile
    }

    /// Records that the ledger has been persisted.
    pub fn mark_clean(&mut self) {
        self.volatile = false;
    }

    /// Starts a shift at `time + offset`.
    ///
    /// Fails without touching the ledger if a shift is already running or
    /// the offset time is out of range.
    pub fn start(
        &mut self,
        time: NaiveDateTime,
        offset: Duration,
        precision: Precision,
        comment: Option<String>,
    ) -> Result<&Shift, LedgerError> {
        if let Some(running) = &self.current {
            return Err(LedgerError::AlreadyRunning {
                project: self.name.clone(),
                since: format_timestamp(running.start),
            });
        }

        let start = offset_time(&self.name, time, offset)?;
        self.volatile = true;
        Ok(&*self
            .current
            .insert(Shift::started(start, precision, comment)))
    }

    /// Stops the running shift at `time + offset` and moves it into history.
    ///
    /// A given `comment` replaces the one set at start. Fails without
    /// touching the ledger if no shift is running or the offset time is out
    /// of range.
    pub fn stop(
        &mut self,
        time: NaiveDateTime,
        offset: Duration,
        comment: Option<String>,
    ) -> Result<Shift, LedgerError> {
        let Some(running) = self.current.as_mut() else {
            return Err(LedgerError::NotRunning {
                project: self.name.clone(),
            });
        };

        running.end = Some(offset_time(&self.name, time, offset)?);
        if comment.is_some() {
            running.comment = comment;
        }
        let shift = running.clone();
        self.current = None;

        self.history.push(Event::Shift(shift.clone()));
        self.volatile = true;
        Ok(shift)
    }

    /// Records a payment.
    pub fn pay(&mut self, amount: f64, date: NaiveDateTime) -> Payment {
        let payment = Payment::new(amount, date);
        self.history.push(Event::Payment(payment));
        self.volatile = true;
        payment
    }

    /// Marks every closed shift whose rounded start lies inside `window` as
    /// reported.
    ///
    /// Returns how many shifts were not marked before.
    pub fn mark(&mut self, window: &DateWindow) -> usize {
        let mut newly_marked = 0;
        for event in &mut self.history {
            if let Event::Shift(shift) = event {
                if window.contains(shift.round_start()) {
                    if !shift.marked {
                        newly_marked += 1;
                    }
                    shift.marked = true;
                }
            }
        }
        self.volatile = true;
        newly_marked
    }

    /// Sorts history chronologically, keeping the relative order of events
    /// with the same key.
    pub fn sort(&mut self) {
        self.history.sort_by_key(Event::order);
        self.volatile = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::timedelta::parse_time_delta;
    use crate::timestamp::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::new(ProjectName::new("wrd").unwrap(), 20.0)
    }

    fn quarter_hour() -> Precision {
        Precision::from_seconds(900).unwrap()
    }

    #[test]
    fn new_ledger_is_clean_and_empty() {
        let ledger = ledger();
        assert!(!ledger.is_volatile());
        assert!(ledger.history().is_empty());
        assert!(ledger.current().is_none());
    }

    #[test]
    fn start_applies_offset_and_marks_volatile() {
        let mut ledger = ledger();
        let shift = ledger
            .start(
                ts("2024-01-01T09:00:00"),
                Duration::minutes(-10),
                quarter_hour(),
                Some("standup".to_string()),
            )
            .unwrap();

        assert_eq!(shift.start, ts("2024-01-01T08:50:00"));
        assert_eq!(shift.comment.as_deref(), Some("standup"));
        assert!(shift.is_running());
        assert!(ledger.is_volatile());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let mut ledger = ledger();
        ledger
            .start(ts("2024-01-01T09:00:00"), Duration::zero(), quarter_hour(), None)
            .unwrap();
        let before = ledger.snapshot();

        let result = ledger.start(
            ts("2024-01-01T10:00:00"),
            Duration::zero(),
            quarter_hour(),
            Some("second".to_string()),
        );

        assert_eq!(
            result.unwrap_err(),
            LedgerError::AlreadyRunning {
                project: ProjectName::new("wrd").unwrap(),
                since: "2024-01-01T09:00:00.000000".to_string(),
            }
        );
        assert_eq!(ledger.snapshot(), before);
        assert_eq!(ledger.history().len(), 0);
    }

    #[test]
    fn stop_without_running_shift_is_rejected() {
        let mut ledger = ledger();
        let result = ledger.stop(ts("2024-01-01T17:00:00"), Duration::zero(), None);

        assert!(matches!(result, Err(LedgerError::NotRunning { .. })));
        assert!(ledger.history().is_empty());
        assert!(!ledger.is_volatile());
    }

    #[test]
    fn stop_moves_shift_into_history() {
        let mut ledger = ledger();
        ledger
            .start(
                ts("2024-01-01T09:00:00"),
                Duration::zero(),
                quarter_hour(),
                Some("planning".to_string()),
            )
            .unwrap();
        let shift = ledger
            .stop(ts("2024-01-01T17:07:00"), Duration::zero(), None)
            .unwrap();

        assert_eq!(shift.end, Some(ts("2024-01-01T17:07:00")));
        assert_eq!(shift.comment.as_deref(), Some("planning"));
        assert!(ledger.current().is_none());
        assert_eq!(ledger.history(), &[Event::Shift(shift)]);
    }

    #[test]
    fn stop_comment_replaces_start_comment() {
        let mut ledger = ledger();
        ledger
            .start(
                ts("2024-01-01T09:00:00"),
                Duration::zero(),
                quarter_hour(),
                Some("planning".to_string()),
            )
            .unwrap();
        let shift = ledger
            .stop(
                ts("2024-01-01T10:00:00"),
                Duration::minutes(5),
                Some("wrote the parser".to_string()),
            )
            .unwrap();

        assert_eq!(shift.end, Some(ts("2024-01-01T10:05:00")));
        assert_eq!(shift.comment.as_deref(), Some("wrote the parser"));
    }

    #[test]
    fn start_with_out_of_range_offset_is_rejected() {
        let mut ledger = ledger();
        let offset = parse_time_delta("3000000000h").unwrap();

        let result = ledger.start(ts("2024-01-01T09:00:00"), offset, quarter_hour(), None);

        assert_eq!(
            result.unwrap_err(),
            LedgerError::OutOfRange {
                project: ProjectName::new("wrd").unwrap(),
                offset: format_compact(offset),
            }
        );
        assert!(ledger.current().is_none());
        assert!(!ledger.is_volatile());
    }

    #[test]
    fn stop_with_out_of_range_offset_keeps_shift_running() {
        let mut ledger = ledger();
        ledger
            .start(ts("2024-01-01T09:00:00"), Duration::zero(), quarter_hour(), None)
            .unwrap();
        ledger.mark_clean();
        let before = ledger.snapshot();

        let result = ledger.stop(
            ts("2024-01-01T17:00:00"),
            parse_time_delta("3000000000h-").unwrap(),
            Some("late".to_string()),
        );

        assert!(matches!(result, Err(LedgerError::OutOfRange { .. })));
        assert_eq!(ledger.snapshot(), before);
        assert!(ledger.current().is_some_and(Shift::is_running));
        assert!(!ledger.is_volatile());
    }

    #[test]
    fn pay_appends_payment() {
        let mut ledger = ledger();
        let payment = ledger.pay(250.0, ts("2024-01-10T12:00:00"));

        assert_eq!(ledger.history(), &[Event::Payment(payment)]);
        assert!(ledger.is_volatile());
    }

    #[test]
    fn mark_only_touches_shifts_inside_window() {
        let mut ledger = ledger();
        for (start, end) in [
            ("2024-01-01T09:00:00", "2024-01-01T12:00:00"),
            ("2024-01-02T09:00:00", "2024-01-02T12:00:00"),
            ("2024-01-03T09:00:00", "2024-01-03T12:00:00"),
        ] {
            ledger
                .start(ts(start), Duration::zero(), quarter_hour(), None)
                .unwrap();
            ledger.stop(ts(end), Duration::zero(), None).unwrap();
        }
        ledger.pay(10.0, ts("2024-01-02T13:00:00"));
        ledger.mark_clean();

        let window = DateWindow::new(Some(ts("2024-01-02T00:00:00")), None);
        assert_eq!(ledger.mark(&window), 2);
        assert!(ledger.is_volatile());

        let marked: Vec<bool> = ledger
            .history()
            .iter()
            .filter_map(|event| match event {
                Event::Shift(shift) => Some(shift.marked),
                Event::Payment(_) => None,
            })
            .collect();
        assert_eq!(marked, vec![false, true, true]);

        // Marking again finds nothing new.
        assert_eq!(ledger.mark(&window), 0);
    }

    #[test]
    fn sort_orders_by_event_key_and_is_stable() {
        let snapshot = LedgerSnapshot {
            current: None,
            history: vec![
                Event::Payment(Payment::new(1.0, ts("2024-01-05T00:00:00"))),
                Event::Shift(Shift {
                    end: Some(ts("2024-01-02T10:00:00")),
                    ..Shift::started(ts("2024-01-02T09:00:00"), quarter_hour(), None)
                }),
                Event::Payment(Payment::new(2.0, ts("2024-01-05T00:00:00"))),
            ],
        };
        let mut ledger = Ledger::from_snapshot(ProjectName::new("wrd").unwrap(), 20.0, snapshot);
        assert!(!ledger.is_volatile());

        ledger.sort();

        let amounts: Vec<String> = ledger
            .history()
            .iter()
            .map(|event| match event {
                Event::Shift(_) => "shift".to_string(),
                Event::Payment(payment) => payment.amount.to_string(),
            })
            .collect();
        assert_eq!(amounts, vec!["shift", "1", "2"]);
        assert!(ledger.is_volatile());
    }

    #[test]
    fn snapshot_roundtrip_preserves_values_and_order() {
        let mut ledger = ledger();
        ledger
            .start(ts("2024-01-01T09:00:00"), Duration::zero(), quarter_hour(), None)
            .unwrap();
        ledger
            .stop(ts("2024-01-01T17:07:00"), Duration::zero(), None)
            .unwrap();
        ledger.pay(100.0, ts("2024-01-02T09:00:00"));

        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        let restored = Ledger::from_snapshot(
            ledger.name().clone(),
            ledger.rate(),
            serde_json::from_str(&json).unwrap(),
        );

        let now = ts("2024-02-01T00:00:00");
        for (original, reloaded) in ledger.history().iter().zip(restored.history()) {
            assert!((original.value(20.0, now) - reloaded.value(20.0, now)).abs() < f64::EPSILON);
            assert_eq!(original.order(), reloaded.order());
        }
        assert_eq!(restored.history().len(), 2);
    }

    #[test]
    fn snapshot_keeps_running_shift_untagged() {
        let mut ledger = ledger();
        ledger
            .start(ts("2024-01-01T09:00:00"), Duration::zero(), quarter_hour(), None)
            .unwrap();

        let json = serde_json::to_string(&ledger.snapshot()).unwrap();
        insta::assert_snapshot!(json, @r#"{"current":{"start":"2024-01-01T09:00:00.000000","precision":900},"history":[]}"#);

        let restored = Ledger::from_snapshot(
            ledger.name().clone(),
            ledger.rate(),
            serde_json::from_str(&json).unwrap(),
        );
        assert_eq!(restored.current(), ledger.current());
    }

    #[test]
    fn closed_current_shift_is_moved_to_history() {
        let snapshot = LedgerSnapshot {
            current: Some(Shift {
                end: Some(ts("2024-01-01T10:00:00")),
                ..Shift::started(ts("2024-01-01T09:00:00"), quarter_hour(), None)
            }),
            history: Vec::new(),
        };
        let ledger = Ledger::from_snapshot(ProjectName::new("wrd").unwrap(), 20.0, snapshot);

        assert!(ledger.current().is_none());
        assert_eq!(ledger.history().len(), 1);
        assert!(ledger.is_volatile());
    }

    #[test]
    fn empty_document_gives_empty_snapshot() {
        let snapshot: LedgerSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, LedgerSnapshot::default());
    }
}
