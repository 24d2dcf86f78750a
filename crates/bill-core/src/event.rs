//! Shifts and payments, the two kinds of ledger events.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::quantize::quantize;
use crate::timestamp;
use crate::types::Precision;

#[allow(clippy::cast_precision_loss)]
fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

/// A span of billable work.
///
/// A shift without an `end` is running. Its boundaries are rounded to
/// `precision` independently before any duration or value is computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(with = "timestamp::required")]
    pub start: NaiveDateTime,

    #[serde(
        default,
        with = "timestamp::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub end: Option<NaiveDateTime>,

    pub precision: Precision,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Already reported; hidden from `report` unless asked for.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub marked: bool,
}

impl Shift {
    /// Creates a running shift.
    pub const fn started(start: NaiveDateTime, precision: Precision, comment: Option<String>) -> Self {
        Self {
            start,
            end: None,
            precision,
            comment,
            marked: false,
        }
    }

    /// Returns true until the shift is stopped.
    pub const fn is_running(&self) -> bool {
        self.end.is_none()
    }

    /// Unrounded length of the shift, measured up to `now` while running.
    pub fn duration(&self, now: NaiveDateTime) -> Duration {
        self.end.unwrap_or(now) - self.start
    }

    pub fn round_start(&self) -> NaiveDateTime {
        quantize(self.start, self.precision)
    }

    /// Rounded end, or `None` while running.
    pub fn round_end(&self) -> Option<NaiveDateTime> {
        self.end.map(|end| quantize(end, self.precision))
    }

    /// Rounded length of the shift, measured up to `now` while running.
    pub fn round_duration(&self, now: NaiveDateTime) -> Duration {
        quantize(self.end.unwrap_or(now), self.precision) - self.round_start()
    }

    /// Billable amount at `rate` per hour.
    pub fn value(&self, rate: f64, now: NaiveDateTime) -> f64 {
        hours(self.round_duration(now)) * rate
    }
}

/// A deposit against the accumulated balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: f64,

    #[serde(with = "timestamp::required")]
    pub date: NaiveDateTime,
}

impl Payment {
    pub const fn new(amount: f64, date: NaiveDateTime) -> Self {
        Self { amount, date }
    }

    pub const fn value(&self) -> f64 {
        self.amount
    }
}

/// An entry in a project's history.
///
/// Serialized with a `type` discriminant. Records without one predate
/// payments and are read as shifts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Shift(Shift),
    Payment(Payment),
}

impl Event {
    /// Key used when history is sorted chronologically.
    pub const fn order(&self) -> NaiveDateTime {
        match self {
            Self::Shift(shift) => shift.start,
            Self::Payment(payment) => payment.date,
        }
    }

    /// The instant report windows are matched against.
    pub fn instant(&self) -> NaiveDateTime {
        match self {
            Self::Shift(shift) => shift.round_start(),
            Self::Payment(payment) => payment.date,
        }
    }

    /// Monetary value of the event; `rate` only applies to shifts.
    pub fn value(&self, rate: f64, now: NaiveDateTime) -> f64 {
        match self {
            Self::Shift(shift) => shift.value(rate, now),
            Self::Payment(payment) => payment.value(),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Shift(_) => "shift",
            Self::Payment(_) => "payment",
        }
    }
}

impl From<Shift> for Event {
    fn from(shift: Shift) -> Self {
        Self::Shift(shift)
    }
}

impl From<Payment> for Event {
    fn from(payment: Payment) -> Self {
        Self::Payment(payment)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedRecord {
    Shift(Shift),
    Payment(Payment),
}

/// Records carrying a `type` tag must name a known event kind. Records
/// without one are legacy shifts.
impl<'de> Deserialize<'de> for Event {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let record = serde_json::Value::deserialize(deserializer)?;
        if record.get("type").is_none() {
            return Shift::deserialize(record)
                .map(Self::Shift)
                .map_err(de::Error::custom);
        }
        Ok(match TaggedRecord::deserialize(record).map_err(de::Error::custom)? {
            TaggedRecord::Shift(shift) => Self::Shift(shift),
            TaggedRecord::Payment(payment) => Self::Payment(payment),
        })
    }
}
