use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// What went wrong while parsing one schedule attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Unrecognised token, name, or trailing text.
    InvalidValue,
    /// A number outside the attribute's domain.
    ValueOutOfRange,
    /// A wildcard or increment used as a range bound.
    InvalidRangeBound,
    /// The step of `base/step` is missing, negative, or too large.
    InvalidIncrementInterval,
    /// A wildcard or increment combined with other list terms.
    InvalidListValue,
    /// `base/step` on an attribute other than second, minute or hour.
    IncrementNotAllowed,
    /// `1st`..`5th` without the weekday that must follow it.
    MissingDayOfWeek,
    /// The attribute string itself was absent.
    MissingAttribute,
    /// The time zone id does not name a known zone.
    InvalidTimeZone,
}

impl ParseErrorKind {
    /// Short, stable error code for logs and machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorKind::InvalidValue => "INVALID_VALUE",
            ParseErrorKind::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            ParseErrorKind::InvalidRangeBound => "INVALID_RANGE_BOUND",
            ParseErrorKind::InvalidIncrementInterval => "INVALID_INCREMENT_INTERVAL",
            ParseErrorKind::InvalidListValue => "INVALID_LIST_VALUE",
            ParseErrorKind::IncrementNotAllowed => "INCREMENT_NOT_ALLOWED",
            ParseErrorKind::MissingDayOfWeek => "MISSING_DAY_OF_WEEK",
            ParseErrorKind::MissingAttribute => "MISSING_ATTRIBUTE",
            ParseErrorKind::InvalidTimeZone => "INVALID_TIME_ZONE",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::InvalidValue => "invalid value",
            ParseErrorKind::ValueOutOfRange => "value out of range",
            ParseErrorKind::InvalidRangeBound => "invalid range bound",
            ParseErrorKind::InvalidIncrementInterval => "invalid increment interval",
            ParseErrorKind::InvalidListValue => "invalid list value",
            ParseErrorKind::IncrementNotAllowed => "increment not allowed",
            ParseErrorKind::MissingDayOfWeek => "missing day of week",
            ParseErrorKind::MissingAttribute => "missing attribute",
            ParseErrorKind::InvalidTimeZone => "invalid time zone",
        };
        f.write_str(s)
    }
}

/// A schedule expression was rejected.
///
/// Always names the attribute (`"second"`, `"dayOfMonth"`, `"timezone"`, ...)
/// and carries the offending substring verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} in {attribute}: {text:?}")]
pub struct ScheduleParseError {
    pub kind: ParseErrorKind,
    pub attribute: &'static str,
    pub text: String,
}

impl ScheduleParseError {
    pub(crate) fn new(kind: ParseErrorKind, attribute: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            attribute,
            text: text.into(),
        }
    }
}

/// Caller misuse of [`ParsedSchedule::next_timeout`](crate::ParsedSchedule::next_timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTimeoutQuery {
    /// The previous timeout lies before the schedule start or after its end.
    #[error("last timeout {last} is outside the schedule bounds [{start}, {end}]")]
    OutOfBounds {
        last: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The previous timeout carries a sub-second component.
    #[error("last timeout {last} is not aligned to a whole second")]
    NotSecondAligned { last: DateTime<Utc> },
}
