//! `almanac-schedule`: calendar schedule expressions and their timeouts.
//!
//! # Overview
//!
//! A [`ScheduleExpression`] holds seven textual attributes plus an optional
//! time zone and `[start, end]` bounds. [`parse`] validates it into a
//! [`ParsedSchedule`], whose bitmask encoding answers
//! [`first_timeout`](ParsedSchedule::first_timeout) and
//! [`next_timeout`](ParsedSchedule::next_timeout) on the schedule's wall clock.
//!
//! # Attributes
//!
//! | Attribute    | Domain     | Extras                                        |
//! |--------------|------------|-----------------------------------------------|
//! | `second`     | 0..59      | `base/step`                                   |
//! | `minute`     | 0..59      | `base/step`                                   |
//! | `hour`       | 0..23      | `base/step`                                   |
//! | `dayOfMonth` | 1..31      | `Last`, `-1`..`-7`, `2nd Tue`, `Last Fri`     |
//! | `month`      | 1..12      | `Jan`..`Dec`                                  |
//! | `dayOfWeek`  | 0..7       | `Sun`..`Sat`, `7` is Sunday                   |
//! | `year`       | 1000..9999 |                                               |
//!
//! ```
//! use almanac_schedule::ScheduleExpression;
//! use chrono::{TimeZone, Utc};
//!
//! let schedule = ScheduleExpression::new()
//!     .hour(9)
//!     .day_of_week("Mon-Fri")
//!     .timezone("UTC")
//!     .parse()
//!     .unwrap();
//!
//! let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! assert_eq!(
//!     schedule.first_timeout_at(monday),
//!     Some(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
//! );
//! ```

pub mod attribute;
pub mod bits;
pub mod error;
pub mod parsed;
pub mod parser;
pub mod timeout;
pub mod types;
pub mod zone;

pub use attribute::Attribute;
pub use bits::{YearSet, MAX_YEAR, MIN_YEAR};
pub use error::{InvalidTimeoutQuery, ParseErrorKind, ScheduleParseError};
pub use parsed::{ParsedSchedule, Value, VariableDayOfMonthRange};
pub use parser::{parse, parse_with};
pub use timeout::Timeouts;
pub use types::{ParseOptions, ScheduleExpression};
pub use zone::ScheduleZone;
