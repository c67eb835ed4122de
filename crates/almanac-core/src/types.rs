use almanac_schedule::{ParseOptions, ParsedSchedule, ScheduleExpression};
use serde::{Deserialize, Serialize};

use crate::error::{AlmanacError, Result};

/// A schedule expression stored under a name, as in `[[schedules]]`.
///
/// Only the source strings are kept; the encoded form is rebuilt on every parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSchedule {
    pub name: String,
    #[serde(flatten)]
    pub expression: ScheduleExpression,
}

impl NamedSchedule {
    pub fn new(name: impl Into<String>, expression: ScheduleExpression) -> Self {
        Self {
            name: name.into(),
            expression,
        }
    }

    pub fn parse(&self, options: &ParseOptions) -> Result<ParsedSchedule> {
        self.expression
            .parse_with(options)
            .map_err(|source| AlmanacError::Schedule {
                name: self.name.clone(),
                source,
            })
    }
}
