//! Rounding instants to a fixed granularity.
//!
//! Buckets are counted from the Unix epoch on the naive local clock, so a
//! 15 minute precision snaps to :00, :15, :30 and :45 of every hour.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::types::Precision;

/// Reference instant all buckets are counted from.
pub fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

const MICROS_PER_SECOND: i128 = 1_000_000;

/// Rounds `instant` to the nearest multiple of `precision` since [`epoch`].
///
/// An instant exactly half a unit past a boundary rounds up. When the
/// rounded instant lies past the end of the calendar, `instant` is returned
/// unchanged.
pub fn quantize(instant: NaiveDateTime, precision: Precision) -> NaiveDateTime {
    let quant = i128::from(precision.seconds()) * MICROS_PER_SECOND;
    let stamp = micros_since_epoch(instant);

    let mut bucket = stamp.div_euclid(quant);
    let remain = stamp.rem_euclid(quant);
    if remain * 2 >= quant {
        bucket += 1;
    }

    from_micros_since_epoch(bucket * quant).unwrap_or(instant)
}

/// Microseconds between [`epoch`] and `instant`.
fn micros_since_epoch(instant: NaiveDateTime) -> i128 {
    let delta = instant - epoch();
    i128::from(delta.num_seconds()) * MICROS_PER_SECOND + i128::from(delta.subsec_nanos() / 1_000)
}

fn from_micros_since_epoch(micros: i128) -> Option<NaiveDateTime> {
    let seconds = i64::try_from(micros.div_euclid(MICROS_PER_SECOND)).ok()?;
    let fraction = i64::try_from(micros.rem_euclid(MICROS_PER_SECOND)).ok()?;
    let delta = Duration::try_seconds(seconds)?.checked_add(&Duration::microseconds(fraction))?;
    epoch().checked_add_signed(delta)
}
