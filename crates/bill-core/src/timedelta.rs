//! Compact duration strings such as `4h34m` or `15m-`.

use std::fmt::Write;
use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::types::ParseError;

/// Hours, minutes and seconds in that order, each optional, then an optional
/// trailing `-` that negates the whole value.
static TIME_DELTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<hours>\d+)h)?(?:(?P<minutes>\d+)m)?(?:(?P<seconds>\d+)s)?(?P<sign>-)?$")
        .unwrap()
});

/// Parses a compact duration string into a signed duration.
///
/// Absent components count as zero, so `""` and `"-"` both parse to zero.
/// Anything not matching the grammar, or a component too large to
/// represent, is rejected.
pub fn parse_time_delta(input: &str) -> Result<Duration, ParseError> {
    let invalid = || ParseError::TimeDelta {
        input: input.to_string(),
    };

    let caps = TIME_DELTA_RE.captures(input.trim()).ok_or_else(invalid)?;

    let component = |name: &str, to_delta: fn(i64) -> Option<Duration>| {
        caps.name(name).map_or(Ok(Duration::zero()), |m| {
            m.as_str()
                .parse::<i64>()
                .ok()
                .and_then(to_delta)
                .ok_or_else(invalid)
        })
    };

    let hours = component("hours", Duration::try_hours)?;
    let minutes = component("minutes", Duration::try_minutes)?;
    let seconds = component("seconds", Duration::try_seconds)?;

    let total = hours
        .checked_add(&minutes)
        .and_then(|d| d.checked_add(&seconds))
        .ok_or_else(invalid)?;

    if caps.name("sign").is_some() {
        Ok(-total)
    } else {
        Ok(total)
    }
}

/// Formats a duration in the compact form accepted by [`parse_time_delta`].
///
/// Sub-second parts are dropped.
pub fn format_compact(duration: Duration) -> String {
    let negative = duration < Duration::zero();
    let total = duration.num_seconds().abs();

    let mut output = String::new();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        write!(output, "{hours}h").unwrap();
    }
    if minutes > 0 {
        write!(output, "{minutes}m").unwrap();
    }
    if seconds > 0 || output.is_empty() {
        write!(output, "{seconds}s").unwrap();
    }
    if negative && total > 0 {
        output.push('-');
    }
    output
}

/// Formats a duration as `H:MM:SS`, prefixed with `-` when negative.
///
/// Hours are not wrapped into days. Sub-second parts are dropped.
pub fn format_clock(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        total % 3600 / 60,
        total % 60
    )
}
