use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleParseError;
use crate::parsed::ParsedSchedule;
use crate::zone::ScheduleZone;

/// The textual form of a calendar schedule.
///
/// This is the only representation meant to be stored; the encoded
/// [`ParsedSchedule`] is always rebuilt by parsing. A `None` attribute is
/// rejected at parse time rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScheduleExpression {
    pub second: Option<String>,
    pub minute: Option<String>,
    pub hour: Option<String>,
    pub day_of_month: Option<String>,
    pub month: Option<String>,
    pub day_of_week: Option<String>,
    pub year: Option<String>,
    /// IANA id or `GMT±HH:MM`; the default zone applies when absent.
    pub timezone: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Default for ScheduleExpression {
    /// Midnight every day: `second`, `minute` and `hour` are `"0"`, the rest `"*"`.
    fn default() -> Self {
        Self {
            second: Some("0".into()),
            minute: Some("0".into()),
            hour: Some("0".into()),
            day_of_month: Some("*".into()),
            month: Some("*".into()),
            day_of_week: Some("*".into()),
            year: Some("*".into()),
            timezone: None,
            start: None,
            end: None,
        }
    }
}

impl ScheduleExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn second(mut self, value: impl ToString) -> Self {
        self.second = Some(value.to_string());
        self
    }

    pub fn minute(mut self, value: impl ToString) -> Self {
        self.minute = Some(value.to_string());
        self
    }

    pub fn hour(mut self, value: impl ToString) -> Self {
        self.hour = Some(value.to_string());
        self
    }

    pub fn day_of_month(mut self, value: impl ToString) -> Self {
        self.day_of_month = Some(value.to_string());
        self
    }

    pub fn month(mut self, value: impl ToString) -> Self {
        self.month = Some(value.to_string());
        self
    }

    pub fn day_of_week(mut self, value: impl ToString) -> Self {
        self.day_of_week = Some(value.to_string());
        self
    }

    pub fn year(mut self, value: impl ToString) -> Self {
        self.year = Some(value.to_string());
        self
    }

    pub fn timezone(mut self, id: impl ToString) -> Self {
        self.timezone = Some(id.to_string());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Parse with the default [`ParseOptions`].
    pub fn parse(&self) -> Result<ParsedSchedule, ScheduleParseError> {
        crate::parser::parse(self)
    }

    pub fn parse_with(&self, options: &ParseOptions) -> Result<ParsedSchedule, ScheduleParseError> {
        crate::parser::parse_with(self, options)
    }
}

/// Knobs that do not belong to the expression itself.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Zone for expressions without a `timezone`. When unset the `TZ`
    /// environment variable is consulted, then the host zone, then UTC.
    pub default_zone: Option<ScheduleZone>,
}
