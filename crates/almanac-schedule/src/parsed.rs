//! The encoded form of a schedule expression.
//!
//! [`ScheduleBuilder`] is filled in attribute by attribute while parsing and
//! then frozen into a [`ParsedSchedule`], which is never observed half built.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::attribute::{DAY_OF_WEEK_NAMES, ORDINAL_NAMES};
use crate::bits::{add_bit, add_bits, ones, YearSet, MAX_YEAR, MIN_YEAR};
use crate::zone::ScheduleZone;

/// One parsed value of an attribute.
///
/// Only `dayOfMonth` produces anything other than [`Value::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Number(i32),
    /// `Last` is offset 0; `-3` is offset 3.
    LastDay(u8),
    /// `2nd Tue` is `{ nth: 2, weekday: 2 }`; weekdays count from Sunday.
    NthWeekday { nth: u8, weekday: u8 },
    LastWeekday(u8),
}

impl Value {
    /// Absolute day in the month described by `layout`.
    ///
    /// Nth weekdays may land past the end of the month; callers clamp.
    fn resolve(self, layout: MonthLayout) -> u32 {
        match self {
            Value::Number(day) => day.max(0) as u32,
            Value::LastDay(offset) => layout.last_day - u32::from(offset),
            Value::NthWeekday { nth, weekday } => {
                layout.first(u32::from(weekday)) + 7 * (u32::from(nth) - 1)
            }
            Value::LastWeekday(weekday) => layout.last(u32::from(weekday)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Number(n) => write!(f, "{n}"),
            Value::LastDay(0) => f.write_str("Last"),
            Value::LastDay(offset) => write!(f, "-{offset}"),
            Value::NthWeekday { nth, weekday } => write!(
                f,
                "{} {}",
                ORDINAL_NAMES[usize::from(nth) - 1],
                DAY_OF_WEEK_NAMES[usize::from(weekday)]
            ),
            Value::LastWeekday(weekday) => {
                write!(f, "Last {}", DAY_OF_WEEK_NAMES[usize::from(weekday)])
            }
        }
    }
}

/// A `dayOfMonth` range with at least one relative bound, resolved per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDayOfMonthRange {
    pub low: Value,
    pub high: Value,
}

impl VariableDayOfMonthRange {
    /// Inclusive days covered in the month, or `None` when the resolved bounds
    /// are inverted. Inverted ranges do not wrap.
    pub(crate) fn days(&self, layout: MonthLayout) -> Option<(u32, u32)> {
        let low = self.low.resolve(layout);
        let high = self.high.resolve(layout).min(layout.last_day);
        (low >= 1 && low <= high).then_some((low, high))
    }
}

impl fmt::Display for VariableDayOfMonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// The shape of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthLayout {
    /// 28..=31.
    pub last_day: u32,
    /// Weekday of the 1st, 0 = Sunday.
    pub first_weekday: u32,
}

impl MonthLayout {
    pub(crate) fn of(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self {
            last_day: (next - first).num_days() as u32,
            first_weekday: first.weekday().num_days_from_sunday(),
        })
    }

    pub(crate) fn weekday(&self, day: u32) -> u32 {
        (self.first_weekday + day - 1) % 7
    }

    /// Day of the first `weekday` in the month.
    fn first(&self, weekday: u32) -> u32 {
        1 + (weekday + 7 - self.first_weekday) % 7
    }

    /// Day of the last `weekday` in the month.
    fn last(&self, weekday: u32) -> u32 {
        self.last_day - (self.weekday(self.last_day) + 7 - weekday) % 7
    }

    /// Mask with bit `day - 1` set for every day of the month.
    pub(crate) fn all_days(&self) -> u32 {
        days_mask(1, self.last_day)
    }
}

fn days_mask(low: u32, high: u32) -> u32 {
    add_bits(0, low - 1, high - 1) as u32
}

/// Mutable accumulator used by the parser. Every mask starts empty; the
/// `any_*` operations replace a mask with its wildcard sentinel.
#[derive(Debug, Default)]
pub(crate) struct ScheduleBuilder {
    seconds: u64,
    minutes: u64,
    hours: u32,
    days_of_month: u32,
    last_days_of_month: u8,
    days_of_week_in_month: u64,
    last_days_of_week_in_month: u8,
    variable_day_of_month_ranges: Vec<VariableDayOfMonthRange>,
    months: u16,
    days_of_week: u8,
    years: Option<YearSet>,
}

/// Bits for `low..=high` of a field numbered from `base`, wrapping past `max`
/// when the range is inverted.
fn range_bits(low: i32, high: i32, base: i32, max: i32) -> u64 {
    let (low, high, max) = ((low - base) as u32, (high - base) as u32, (max - base) as u32);
    if low <= high {
        add_bits(0, low, high)
    } else {
        add_bits(add_bits(0, low, max), 0, high)
    }
}

fn number(value: Value) -> Option<i32> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

impl ScheduleBuilder {
    pub(crate) fn add_second(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.seconds = add_bit(self.seconds, n as u32);
        }
    }

    pub(crate) fn add_second_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            self.seconds |= range_bits(low, high, 0, 59);
        }
    }

    pub(crate) fn any_second(&mut self) {
        self.seconds = u64::MAX;
    }

    pub(crate) fn add_minute(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.minutes = add_bit(self.minutes, n as u32);
        }
    }

    pub(crate) fn add_minute_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            self.minutes |= range_bits(low, high, 0, 59);
        }
    }

    pub(crate) fn any_minute(&mut self) {
        self.minutes = u64::MAX;
    }

    pub(crate) fn add_hour(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.hours = add_bit(u64::from(self.hours), n as u32) as u32;
        }
    }

    pub(crate) fn add_hour_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            self.hours |= range_bits(low, high, 0, 23) as u32;
        }
    }

    pub(crate) fn any_hour(&mut self) {
        self.hours = u32::MAX;
    }

    pub(crate) fn add_day_of_month(&mut self, value: Value) {
        match value {
            Value::Number(day) => self.days_of_month |= days_mask(day as u32, day as u32),
            Value::LastDay(offset) => self.last_days_of_month |= 1 << offset,
            Value::NthWeekday { nth, weekday } => {
                let bit = u32::from(nth - 1) * 7 + u32::from(weekday);
                self.days_of_week_in_month = add_bit(self.days_of_week_in_month, bit);
            }
            Value::LastWeekday(weekday) => self.last_days_of_week_in_month |= 1 << weekday,
        }
    }

    pub(crate) fn add_day_of_month_range(&mut self, low: Value, high: Value) {
        match (low, high) {
            (Value::Number(low), Value::Number(high)) => {
                self.days_of_month |= range_bits(low, high, 1, 31) as u32;
            }
            _ => self
                .variable_day_of_month_ranges
                .push(VariableDayOfMonthRange { low, high }),
        }
    }

    pub(crate) fn any_day_of_month(&mut self) {
        self.days_of_month = u32::MAX;
    }

    pub(crate) fn add_month(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.months |= 1 << (n - 1);
        }
    }

    pub(crate) fn add_month_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            self.months |= range_bits(low, high, 1, 12) as u16;
        }
    }

    pub(crate) fn any_month(&mut self) {
        self.months = u16::MAX;
    }

    pub(crate) fn add_day_of_week(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.days_of_week |= 1 << (n % 7);
        }
    }

    /// `7` is Sunday at either end; `0-7` covers the whole week and is treated
    /// exactly like `*`.
    pub(crate) fn add_day_of_week_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            if low == 0 && high == 7 {
                self.any_day_of_week();
            } else {
                self.days_of_week |= range_bits(low % 7, high % 7, 0, 6) as u8;
            }
        }
    }

    pub(crate) fn any_day_of_week(&mut self) {
        self.days_of_week = u8::MAX;
    }

    pub(crate) fn add_year(&mut self, value: Value) {
        if let Some(n) = number(value) {
            self.years.get_or_insert_with(YearSet::new).insert(n);
        }
    }

    pub(crate) fn add_year_range(&mut self, low: Value, high: Value) {
        if let (Some(low), Some(high)) = (number(low), number(high)) {
            let years = self.years.get_or_insert_with(YearSet::new);
            if low <= high {
                years.insert_range(low, high);
            } else {
                years.insert_range(low, MAX_YEAR);
                years.insert_range(MIN_YEAR, high);
            }
        }
    }

    pub(crate) fn any_year(&mut self) {
        self.years = None;
    }

    pub(crate) fn build(
        self,
        zone: ScheduleZone,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ParsedSchedule {
        ParsedSchedule {
            start,
            end,
            seconds: self.seconds,
            minutes: self.minutes,
            hours: self.hours,
            days_of_month: self.days_of_month,
            last_days_of_month: self.last_days_of_month,
            days_of_week_in_month: self.days_of_week_in_month,
            last_days_of_week_in_month: self.last_days_of_week_in_month,
            variable_day_of_month_ranges: self.variable_day_of_month_ranges,
            months: self.months,
            days_of_week: self.days_of_week,
            years: self.years,
            zone,
        }
    }
}

/// A validated, immutable schedule.
///
/// Masks use all-ones as the wildcard sentinel. Produced by
/// [`parse`](crate::parse); query it with
/// [`first_timeout`](ParsedSchedule::first_timeout) and
/// [`next_timeout`](ParsedSchedule::next_timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchedule {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
    pub(crate) seconds: u64,
    pub(crate) minutes: u64,
    pub(crate) hours: u32,
    pub(crate) days_of_month: u32,
    pub(crate) last_days_of_month: u8,
    pub(crate) days_of_week_in_month: u64,
    pub(crate) last_days_of_week_in_month: u8,
    pub(crate) variable_day_of_month_ranges: Vec<VariableDayOfMonthRange>,
    pub(crate) months: u16,
    pub(crate) days_of_week: u8,
    pub(crate) years: Option<YearSet>,
    pub(crate) zone: ScheduleZone,
}

impl ParsedSchedule {
    /// Inclusive lower bound, whole seconds.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive upper bound, whole seconds unless unbounded.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn zone(&self) -> ScheduleZone {
        self.zone
    }

    pub fn years(&self) -> Option<&YearSet> {
        self.years.as_ref()
    }

    pub fn variable_day_of_month_ranges(&self) -> &[VariableDayOfMonthRange] {
        &self.variable_day_of_month_ranges
    }

    fn day_of_month_is_wildcard(&self) -> bool {
        self.days_of_month == u32::MAX
    }

    fn day_of_week_is_wildcard(&self) -> bool {
        self.days_of_week == u8::MAX
    }

    /// Mask of matching days (bit `day - 1`) for one month.
    ///
    /// When both `dayOfMonth` and `dayOfWeek` are constrained a day matches
    /// either one; a wildcard on one side leaves the other in charge.
    pub(crate) fn matching_days(&self, layout: MonthLayout) -> u32 {
        match (self.day_of_month_is_wildcard(), self.day_of_week_is_wildcard()) {
            (true, true) => layout.all_days(),
            (true, false) => self.weekday_days(layout),
            (false, true) => self.month_days(layout),
            (false, false) => self.month_days(layout) | self.weekday_days(layout),
        }
    }

    fn month_days(&self, layout: MonthLayout) -> u32 {
        let last = layout.last_day;
        let mut days = self.days_of_month & layout.all_days();

        // Offset k from the end sits at bit k; reversing moves it to the top
        // of the word, then the shift lines it up with day `last - k`.
        days |= u32::from(self.last_days_of_month).reverse_bits() >> (32 - last);

        for bit in ones(self.days_of_week_in_month) {
            let nth = bit / 7;
            let day = layout.first(bit % 7) + 7 * nth;
            if day <= last {
                days |= days_mask(day, day);
            }
        }

        for weekday in ones(u64::from(self.last_days_of_week_in_month)) {
            let day = layout.last(weekday);
            days |= days_mask(day, day);
        }

        for range in &self.variable_day_of_month_ranges {
            if let Some((low, high)) = range.days(layout) {
                days |= days_mask(low, high);
            }
        }

        days
    }

    fn weekday_days(&self, layout: MonthLayout) -> u32 {
        let mut days = 0;
        for weekday in ones(u64::from(self.days_of_week & 0x7f)) {
            let mut day = layout.first(weekday);
            while day <= layout.last_day {
                days |= days_mask(day, day);
                day += 7;
            }
        }
        days
    }
}

/// Compact list of ascending values: `0,15,30-45`.
fn format_runs(values: impl Iterator<Item = i32>) -> String {
    let mut runs: Vec<(i32, i32)> = Vec::new();
    for value in values {
        match runs.last_mut() {
            Some((_, high)) if value == *high + 1 => *high = value,
            _ => runs.push((value, value)),
        }
    }
    runs.iter()
        .map(|&(low, high)| {
            if low == high {
                low.to_string()
            } else {
                format!("{low}-{high}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn format_mask(mask: u64, wildcard: bool, base: i32) -> String {
    if wildcard {
        return "*".to_string();
    }
    format_runs(ones(mask).map(|bit| bit as i32 + base))
}

impl ParsedSchedule {
    fn format_days_of_month(&self) -> String {
        if self.day_of_month_is_wildcard() {
            return "*".to_string();
        }
        let mut parts: Vec<String> = Vec::new();
        if self.days_of_month != 0 {
            parts.push(format_mask(u64::from(self.days_of_month), false, 1));
        }
        parts.extend(
            ones(u64::from(self.last_days_of_month))
                .map(|offset| Value::LastDay(offset as u8).to_string()),
        );
        parts.extend(ones(self.days_of_week_in_month).map(|bit| {
            Value::NthWeekday {
                nth: (bit / 7 + 1) as u8,
                weekday: (bit % 7) as u8,
            }
            .to_string()
        }));
        parts.extend(
            ones(u64::from(self.last_days_of_week_in_month))
                .map(|weekday| Value::LastWeekday(weekday as u8).to_string()),
        );
        parts.extend(
            self.variable_day_of_month_ranges
                .iter()
                .map(|range| range.to_string()),
        );
        parts.join(",")
    }
}

impl fmt::Display for ParsedSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years = match &self.years {
            Some(years) => format_runs(years.iter()),
            None => "*".to_string(),
        };
        let end = if self.end == DateTime::<Utc>::MAX_UTC {
            "none".to_string()
        } else {
            self.end.to_rfc3339()
        };

        writeln!(f, "second:     {}", format_mask(self.seconds, self.seconds == u64::MAX, 0))?;
        writeln!(f, "minute:     {}", format_mask(self.minutes, self.minutes == u64::MAX, 0))?;
        writeln!(
            f,
            "hour:       {}",
            format_mask(u64::from(self.hours), self.hours == u32::MAX, 0)
        )?;
        writeln!(f, "dayOfMonth: {}", self.format_days_of_month())?;
        writeln!(
            f,
            "month:      {}",
            format_mask(u64::from(self.months), self.months == u16::MAX, 1)
        )?;
        writeln!(
            f,
            "dayOfWeek:  {}",
            format_mask(
                u64::from(self.days_of_week),
                self.day_of_week_is_wildcard(),
                0
            )
        )?;
        writeln!(f, "year:       {years}")?;
        writeln!(f, "timezone:   {}", self.zone)?;
        writeln!(f, "start:      {}", self.start.to_rfc3339())?;
        write!(f, "end:        {end}")
    }
}
