//! Core type definitions with validation.

use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A rounding precision must be a positive number of whole seconds.
    #[error("precision must be a positive number of whole seconds, got {seconds}s")]
    NonPositivePrecision { seconds: i64 },

    /// A rounding precision had a sub-second component.
    #[error("precision must be a whole number of seconds")]
    FractionalPrecision,

    /// A rounding precision too coarse to count in microseconds.
    #[error("precision of {seconds}s is too large, the maximum is {max}s", max = Precision::MAX_SECONDS)]
    PrecisionTooLarge { seconds: i64 },
}

/// Errors from parsing user-supplied durations, timestamps and dates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The string is not of the form `<N>h<N>m<N>s[-]`.
    #[error("invalid duration '{input}': expected {{H}}h{{M}}m{{S}}s or any subset, e.g. 4h34m or 15m-")]
    TimeDelta { input: String },

    /// The string is not a `YYYY-MM-DDTHH:MM:SS[.ffffff]` timestamp.
    #[error("invalid timestamp '{input}': expected YYYY-MM-DDTHH:MM:SS.ffffff")]
    Timestamp { input: String },

    /// The string is not a `YYYY-MM-DD` date.
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    Date { input: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated project name.
    ///
    /// Project names must be non-empty. They label a ledger in logs and output.
    ProjectName, "project name"
);

/// The granularity shift boundaries are rounded to.
///
/// Always a positive whole number of seconds, so quantizing with it can never
/// divide by zero. Serialized as an integer number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Precision(i64);

impl Precision {
    /// Largest precision whose length in microseconds fits an `i64`.
    pub const MAX_SECONDS: i64 = i64::MAX / 1_000_000;

    /// Creates a precision from a number of seconds.
    pub const fn from_seconds(seconds: i64) -> Result<Self, ValidationError> {
        if seconds <= 0 {
            return Err(ValidationError::NonPositivePrecision { seconds });
        }
        if seconds > Self::MAX_SECONDS {
            return Err(ValidationError::PrecisionTooLarge { seconds });
        }
        Ok(Self(seconds))
    }

    /// Creates a precision from a duration.
    ///
    /// The duration must be positive and carry no sub-second part.
    pub fn from_duration(duration: Duration) -> Result<Self, ValidationError> {
        if duration.subsec_nanos() != 0 {
            return Err(ValidationError::FractionalPrecision);
        }
        Self::from_seconds(duration.num_seconds())
    }

    /// Returns the precision in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.0
    }

    /// Returns the precision as a duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::seconds(self.0)
    }
}

impl Default for Precision {
    /// Quarter-hour rounding.
    fn default() -> Self {
        Self(15 * 60)
    }
}

impl TryFrom<i64> for Precision {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_seconds(value)
    }
}

impl From<Precision> for i64 {
    fn from(p: Precision) -> Self {
        p.0
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::timedelta::format_compact(self.as_duration()))
    }
}

/// An open interval of instants used to filter events.
///
/// Both bounds are exclusive and either may be absent (unbounded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateWindow {
    /// Creates a window from optional bounds.
    pub const fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// A window that admits every instant.
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Returns true when `instant` lies strictly between the bounds.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| instant > start) && self.end.is_none_or(|end| instant < end)
    }
}
