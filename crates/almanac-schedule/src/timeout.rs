//! Timeout calculator.
//!
//! The search runs on the schedule's wall clock. Fields are checked from the
//! second up to the year; the first field that does not match is moved to its
//! next allowed value (or wrapped, carrying into the next coarser field),
//! every finer field is reset to its lowest allowed value, and the checks
//! start over. The loop ends on a full match or once the year passes the
//! search ceiling.

use std::iter::FusedIterator;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use tracing::{debug, trace};

use crate::bits::{first, higher_within, MAX_YEAR};
use crate::error::InvalidTimeoutQuery;
use crate::parsed::{MonthLayout, ParsedSchedule};
use crate::parser::ceil_to_second;

/// Wall-clock position of the search.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl Cursor {
    fn new(local: NaiveDateTime) -> Self {
        Self {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
        }
    }

    fn local(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(
            self.hour,
            self.minute,
            self.second,
        )
    }

    fn reset_time(&mut self, schedule: &ParsedSchedule) {
        self.hour = first(u64::from(schedule.hours));
        self.minute = first(schedule.minutes);
        self.second = first(schedule.seconds);
    }
}

enum Check {
    Matched,
    /// Next allowed value within the current coarser unit.
    Advanced(u32),
    /// No allowed value left; restart from the lowest one and carry.
    Wrapped(u32),
}

fn check(mask: u64, value: u32, max: u32) -> Check {
    match higher_within(mask, value, max) {
        Some(found) if found == value => Check::Matched,
        Some(found) => Check::Advanced(found),
        None => Check::Wrapped(first(mask)),
    }
}

impl ParsedSchedule {
    /// The first timeout at or after the current time.
    pub fn first_timeout(&self) -> Option<DateTime<Utc>> {
        self.first_timeout_at(Utc::now())
    }

    /// The earliest matching instant in `[max(now, start), end]`.
    ///
    /// A sub-second `now` is rounded up; the search from there is inclusive,
    /// so no whole-second match at or after `now` is skipped.
    pub fn first_timeout_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if now > self.end {
            return None;
        }
        self.search(ceil_to_second(now.max(self.start)))
    }

    /// The earliest matching instant strictly after `last`.
    ///
    /// `last` must be a whole second within the schedule bounds.
    pub fn next_timeout(
        &self,
        last: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, InvalidTimeoutQuery> {
        if last < self.start || last > self.end {
            return Err(InvalidTimeoutQuery::OutOfBounds {
                last,
                start: self.start,
                end: self.end,
            });
        }
        if last.nanosecond() != 0 {
            return Err(InvalidTimeoutQuery::NotSecondAligned { last });
        }
        Ok(last
            .checked_add_signed(Duration::seconds(1))
            .and_then(|from| self.search(from)))
    }

    /// Successive timeouts strictly after `instant`.
    pub fn timeouts_after(&self, instant: DateTime<Utc>) -> Timeouts<'_> {
        let from = instant
            .with_nanosecond(0)
            .and_then(|second| second.checked_add_signed(Duration::seconds(1)))
            .map(|from| from.max(self.start));
        Timeouts {
            schedule: self,
            from,
        }
    }

    /// Whether `instant` is one of this schedule's timeouts.
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        instant.nanosecond() == 0
            && instant >= self.start
            && self.search(instant) == Some(instant)
    }

    /// Earliest timeout at or after the whole second `lower`.
    fn search(&self, lower: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if lower > self.end {
            return None;
        }
        // A year past the end bound absorbs any zone offset.
        let ceiling = MAX_YEAR.min(self.end.year().saturating_add(1));
        let mut local = self.zone.to_local(lower)?;

        loop {
            let candidate = self.next_local(local, ceiling)?;
            match self.zone.resolve_local(candidate, lower) {
                Some(instant) => return (instant <= self.end).then_some(instant),
                None => local = candidate.checked_add_signed(Duration::seconds(1))?,
            }
        }
    }

    /// Earliest matching wall-clock time at or after `from`.
    fn next_local(&self, from: NaiveDateTime, ceiling: i32) -> Option<NaiveDateTime> {
        let mut c = Cursor::new(from);

        loop {
            if c.year > ceiling {
                debug!(year = c.year, ceiling, "no timeout before the search ceiling");
                return None;
            }

            match check(self.seconds, c.second, 59) {
                Check::Matched => {}
                Check::Advanced(second) => {
                    c.second = second;
                    continue;
                }
                Check::Wrapped(second) => {
                    c.second = second;
                    c.minute += 1;
                    continue;
                }
            }

            match check(self.minutes, c.minute, 59) {
                Check::Matched => {}
                Check::Advanced(minute) => {
                    c.minute = minute;
                    c.second = first(self.seconds);
                    continue;
                }
                Check::Wrapped(minute) => {
                    c.minute = minute;
                    c.second = first(self.seconds);
                    c.hour += 1;
                    continue;
                }
            }

            match check(u64::from(self.hours), c.hour, 23) {
                Check::Matched => {}
                Check::Advanced(hour) => {
                    c.reset_time(self);
                    c.hour = hour;
                    continue;
                }
                Check::Wrapped(_) => {
                    c.reset_time(self);
                    c.day += 1;
                    trace!(?c, "hour wrapped");
                    continue;
                }
            }

            let layout = MonthLayout::of(c.year, c.month)?;
            let days = u64::from(self.matching_days(layout));
            match check(days, c.day - 1, layout.last_day - 1) {
                Check::Matched => {}
                Check::Advanced(bit) => {
                    c.day = bit + 1;
                    c.reset_time(self);
                    trace!(?c, "day advanced");
                    continue;
                }
                Check::Wrapped(_) => {
                    c.day = 1;
                    c.month += 1;
                    if c.month > 12 {
                        c.month = 1;
                        c.year += 1;
                    }
                    c.reset_time(self);
                    trace!(?c, "no matching day left in month");
                    continue;
                }
            }

            match check(u64::from(self.months), c.month - 1, 11) {
                Check::Matched => {}
                Check::Advanced(bit) => {
                    c.month = bit + 1;
                    c.day = 1;
                    c.reset_time(self);
                    trace!(?c, "month advanced");
                    continue;
                }
                Check::Wrapped(bit) => {
                    c.month = bit + 1;
                    c.day = 1;
                    c.year += 1;
                    c.reset_time(self);
                    trace!(?c, "month wrapped");
                    continue;
                }
            }

            if let Some(years) = &self.years {
                if !years.contains(c.year) {
                    let Some(year) = years.next_after(c.year) else {
                        debug!(year = c.year, "no included year left");
                        return None;
                    };
                    c.year = year;
                    c.month = first(u64::from(self.months)) + 1;
                    c.day = 1;
                    c.reset_time(self);
                    trace!(?c, "year advanced");
                    continue;
                }
            }

            return c.local();
        }
    }
}

/// Iterator over successive timeouts; see [`ParsedSchedule::timeouts_after`].
#[derive(Debug, Clone)]
pub struct Timeouts<'a> {
    schedule: &'a ParsedSchedule,
    from: Option<DateTime<Utc>>,
}

impl Iterator for Timeouts<'_> {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.from.take()?;
        let found = self.schedule.search(from)?;
        self.from = found.checked_add_signed(Duration::seconds(1));
        Some(found)
    }
}

impl FusedIterator for Timeouts<'_> {}
