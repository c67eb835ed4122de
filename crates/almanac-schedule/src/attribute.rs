//! Per-attribute metadata: domain, named aliases, and how parsed values are
//! folded into a [`ScheduleBuilder`].

use crate::bits::{MAX_YEAR, MIN_YEAR};
use crate::parsed::{ScheduleBuilder, Value};

/// One field of a calendar schedule expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

pub(crate) const MONTH_NAMES: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub(crate) const DAY_OF_WEEK_NAMES: &[&str] = &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Ordinals accepted in front of a weekday in `dayOfMonth`; the last entry also
/// stands alone for the last day of the month.
pub(crate) const ORDINAL_NAMES: &[&str] = &["1st", "2nd", "3rd", "4th", "5th", "Last"];

impl Attribute {
    pub const ALL: [Attribute; 7] = [
        Attribute::Second,
        Attribute::Minute,
        Attribute::Hour,
        Attribute::DayOfMonth,
        Attribute::Month,
        Attribute::DayOfWeek,
        Attribute::Year,
    ];

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn min(self) -> i32 {
        self.info().min
    }

    pub fn max(self) -> i32 {
        self.info().max
    }

    /// Whether `base/step` syntax is legal.
    pub fn allows_increment(self) -> bool {
        self.info().increment
    }

    /// Resolve a case-insensitive alias to its numeric value.
    pub(crate) fn named_value(self, word: &str) -> Option<i32> {
        let info = self.info();
        info.names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(word))
            .map(|index| info.min + index as i32)
    }

    pub(crate) fn info(self) -> &'static AttributeInfo {
        &ATTRIBUTES[self as usize]
    }
}

/// Domain metadata plus the three builder operations for one attribute.
pub(crate) struct AttributeInfo {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub names: &'static [&'static str],
    pub increment: bool,
    pub add_value: fn(&mut ScheduleBuilder, Value),
    pub add_range: fn(&mut ScheduleBuilder, Value, Value),
    pub set_wildcard: fn(&mut ScheduleBuilder),
}

// Indexed by `Attribute as usize`.
static ATTRIBUTES: [AttributeInfo; 7] = [
    AttributeInfo {
        name: "second",
        min: 0,
        max: 59,
        names: &[],
        increment: true,
        add_value: ScheduleBuilder::add_second,
        add_range: ScheduleBuilder::add_second_range,
        set_wildcard: ScheduleBuilder::any_second,
    },
    AttributeInfo {
        name: "minute",
        min: 0,
        max: 59,
        names: &[],
        increment: true,
        add_value: ScheduleBuilder::add_minute,
        add_range: ScheduleBuilder::add_minute_range,
        set_wildcard: ScheduleBuilder::any_minute,
    },
    AttributeInfo {
        name: "hour",
        min: 0,
        max: 23,
        names: &[],
        increment: true,
        add_value: ScheduleBuilder::add_hour,
        add_range: ScheduleBuilder::add_hour_range,
        set_wildcard: ScheduleBuilder::any_hour,
    },
    AttributeInfo {
        name: "dayOfMonth",
        min: 1,
        max: 31,
        names: ORDINAL_NAMES,
        increment: false,
        add_value: ScheduleBuilder::add_day_of_month,
        add_range: ScheduleBuilder::add_day_of_month_range,
        set_wildcard: ScheduleBuilder::any_day_of_month,
    },
    AttributeInfo {
        name: "month",
        min: 1,
        max: 12,
        names: MONTH_NAMES,
        increment: false,
        add_value: ScheduleBuilder::add_month,
        add_range: ScheduleBuilder::add_month_range,
        set_wildcard: ScheduleBuilder::any_month,
    },
    AttributeInfo {
        // 7 is accepted as a second spelling of Sunday.
        name: "dayOfWeek",
        min: 0,
        max: 7,
        names: DAY_OF_WEEK_NAMES,
        increment: false,
        add_value: ScheduleBuilder::add_day_of_week,
        add_range: ScheduleBuilder::add_day_of_week_range,
        set_wildcard: ScheduleBuilder::any_day_of_week,
    },
    AttributeInfo {
        name: "year",
        min: MIN_YEAR,
        max: MAX_YEAR,
        names: &[],
        increment: false,
        add_value: ScheduleBuilder::add_year,
        add_range: ScheduleBuilder::add_year_range,
        set_wildcard: ScheduleBuilder::any_year,
    },
];
