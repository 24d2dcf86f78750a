//! Replaying a ledger into a statement of lines, totals and balances.
//!
//! # Algorithm
//!
//! 1. Walk history once, in its current order
//! 2. Keep events whose window instant (rounded start for shifts, date for
//!    payments) lies strictly inside the requested window
//! 3. Shifts add their value to labour and the running balance, payments add
//!    to deposits and subtract from it; every line records the balance as of
//!    that event
//!
//! A running shift never enters the totals. It is reported separately,
//! measured up to the `now` the caller passes in.

use chrono::{Duration, NaiveDateTime};

use crate::event::{Event, Shift};
use crate::ledger::Ledger;
use crate::types::DateWindow;

/// Which events a statement covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementFilter {
    pub window: DateWindow,
    /// Keep shifts already marked as reported.
    pub include_marked: bool,
}

impl StatementFilter {
    /// Every event in `window`, marked or not.
    pub const fn all(window: DateWindow) -> Self {
        Self {
            window,
            include_marked: true,
        }
    }

    fn admits(&self, event: &Event) -> bool {
        if let Event::Shift(shift) = event {
            if shift.marked && !self.include_marked {
                return false;
            }
        }
        self.window.contains(event.instant())
    }
}

/// One retained event with its value and the balance after it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLine<'a> {
    pub event: &'a Event,
    pub value: f64,
    pub balance: f64,
}

/// Totals over the retained events.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Earliest rounded shift start. Payments do not widen the span.
    pub earliest: Option<NaiveDateTime>,
    /// Latest rounded shift end.
    pub latest: Option<NaiveDateTime>,
    /// Sum of rounded shift durations.
    pub worked: Duration,
    pub shifts: usize,
    pub payments: usize,
    /// Sum of shift values.
    pub labour: f64,
    /// Sum of payment values.
    pub deposits: f64,
    /// Labour minus deposits.
    pub balance: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            earliest: None,
            latest: None,
            worked: Duration::zero(),
            shifts: 0,
            payments: 0,
            labour: 0.0,
            deposits: 0.0,
            balance: 0.0,
        }
    }
}

impl Summary {
    /// Total worked time in fractional hours.
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        self.worked.num_seconds() as f64 / 3600.0
    }

    /// The first and last rounded shift boundaries, if any shift was kept.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.earliest.zip(self.latest)
    }

    fn extend_span(&mut self, first: NaiveDateTime, last: NaiveDateTime) {
        self.earliest = Some(self.earliest.map_or(first, |earliest| earliest.min(first)));
        self.latest = Some(self.latest.map_or(last, |latest| latest.max(last)));
    }
}

/// The in-progress shift, measured up to `now`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningShift<'a> {
    pub shift: &'a Shift,
    pub duration: Duration,
    pub round_duration: Duration,
    pub value: f64,
}

/// Result of replaying a ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement<'a> {
    pub lines: Vec<StatementLine<'a>>,
    pub summary: Summary,
    pub running: Option<RunningShift<'a>>,
}

impl Ledger {
    /// Replays history through `filter`, accumulating totals and running
    /// balances.
    pub fn statement(&self, filter: &StatementFilter, now: NaiveDateTime) -> Statement<'_> {
        let mut summary = Summary::default();
        let mut lines = Vec::new();

        for event in self.history().iter().filter(|event| filter.admits(event)) {
            let value = event.value(self.rate(), now);
            match event {
                Event::Shift(shift) => {
                    let start = shift.round_start();
                    summary.extend_span(start, shift.round_end().unwrap_or(start));
                    summary.worked = summary.worked + shift.round_duration(now);
                    summary.shifts += 1;
                    summary.labour += value;
                    summary.balance += value;
                }
                Event::Payment(_) => {
                    summary.payments += 1;
                    summary.deposits += value;
                    summary.balance -= value;
                }
            }
            lines.push(StatementLine {
                event,
                value,
                balance: summary.balance,
            });
        }

        let running = self.current().map(|shift| RunningShift {
            shift,
            duration: shift.duration(now),
            round_duration: shift.round_duration(now),
            value: shift.value(self.rate(), now),
        });

        Statement {
            lines,
            summary,
            running,
        }
    }
}
