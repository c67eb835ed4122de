//! Expression parser.
//!
//! Each attribute string is scanned once, left to right, into a list of
//! terms; the terms are validated as a whole and then folded into a
//! [`ScheduleBuilder`] through the attribute's dispatch table entry.
//!
//! ```text
//! list  := term ( ',' term )*
//! term  := '*' | '*/' step | value | value '-' value | number '/' step
//! value := number | '-' number | name | ordinal weekday | 'Last' [weekday]
//! ```
//!
//! Whitespace is allowed around terms and between an ordinal and its
//! weekday, but not around `-` or `/`.

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::debug;

use crate::attribute::Attribute;
use crate::error::{ParseErrorKind, ScheduleParseError};
use crate::parsed::{ParsedSchedule, ScheduleBuilder, Value};
use crate::types::{ParseOptions, ScheduleExpression};
use crate::zone::ScheduleZone;

/// `named_value` of `Last` in the `dayOfMonth` alias table.
const LAST_ORDINAL: i32 = 6;

/// Parse with the default [`ParseOptions`].
pub fn parse(expr: &ScheduleExpression) -> Result<ParsedSchedule, ScheduleParseError> {
    parse_with(expr, &ParseOptions::default())
}

pub fn parse_with(
    expr: &ScheduleExpression,
    options: &ParseOptions,
) -> Result<ParsedSchedule, ScheduleParseError> {
    let attributes = [
        (Attribute::Second, &expr.second),
        (Attribute::Minute, &expr.minute),
        (Attribute::Hour, &expr.hour),
        (Attribute::DayOfMonth, &expr.day_of_month),
        (Attribute::Month, &expr.month),
        (Attribute::DayOfWeek, &expr.day_of_week),
        (Attribute::Year, &expr.year),
    ];

    let mut builder = ScheduleBuilder::default();
    for (attribute, text) in attributes {
        let text = text.as_deref().ok_or_else(|| {
            ScheduleParseError::new(ParseErrorKind::MissingAttribute, attribute.name(), "")
        })?;
        parse_attribute(&mut builder, attribute, text)?;
    }

    let zone = match expr.timezone.as_deref() {
        Some(id) => ScheduleZone::parse(id).ok_or_else(|| {
            ScheduleParseError::new(ParseErrorKind::InvalidTimeZone, "timezone", id)
        })?,
        None => options
            .default_zone
            .unwrap_or_else(ScheduleZone::process_default),
    };

    let start = expr
        .start
        .map(ceil_to_second)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let end = expr
        .end
        .map(ceil_to_second)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    debug!(%zone, %start, %end, "parsed schedule expression");
    Ok(builder.build(zone, start, end))
}

/// Round up to a whole second, saturating at the largest representable instant.
pub(crate) fn ceil_to_second(instant: DateTime<Utc>) -> DateTime<Utc> {
    if instant.nanosecond() == 0 {
        return instant;
    }
    instant
        .with_nanosecond(0)
        .and_then(|floor| floor.checked_add_signed(Duration::seconds(1)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

enum Term {
    Wildcard,
    Single(Value),
    Range(Value, Value),
    Increment { base: i32, step: i32 },
}

impl Term {
    /// Wildcards and increments must be the whole list.
    fn stands_alone(&self) -> bool {
        matches!(self, Term::Wildcard | Term::Increment { .. })
    }
}

fn parse_attribute(
    builder: &mut ScheduleBuilder,
    attribute: Attribute,
    text: &str,
) -> Result<(), ScheduleParseError> {
    let mut scanner = Scanner {
        attribute,
        text,
        pos: 0,
    };

    let mut terms = Vec::new();
    loop {
        scanner.skip_whitespace();
        let start = scanner.pos;
        let term = scanner.term()?;
        terms.push((term, &text[start..scanner.pos]));

        scanner.skip_whitespace();
        match scanner.peek() {
            None => break,
            Some(b',') => scanner.pos += 1,
            Some(_) => {
                return Err(ScheduleParseError::new(
                    ParseErrorKind::InvalidValue,
                    attribute.name(),
                    &text[scanner.pos..],
                ))
            }
        }
    }

    if terms.len() > 1 {
        if let Some((_, source)) = terms.iter().find(|(term, _)| term.stands_alone()) {
            return Err(ScheduleParseError::new(
                ParseErrorKind::InvalidListValue,
                attribute.name(),
                *source,
            ));
        }
    }

    let info = attribute.info();
    for (term, _) in terms {
        match term {
            Term::Wildcard => (info.set_wildcard)(builder),
            Term::Single(value) => (info.add_value)(builder, value),
            Term::Range(low, high) => (info.add_range)(builder, low, high),
            Term::Increment { base, step: 0 } => (info.add_value)(builder, Value::Number(base)),
            Term::Increment { base, step } => {
                for value in (base..=info.max).step_by(step as usize) {
                    (info.add_value)(builder, Value::Number(value));
                }
            }
        }
    }
    Ok(())
}

struct Scanner<'a> {
    attribute: Attribute,
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes a run of ASCII letters and digits.
    fn word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Error covering `start` up to the current position.
    fn error(&self, kind: ParseErrorKind, start: usize) -> ScheduleParseError {
        ScheduleParseError::new(kind, self.attribute.name(), &self.text[start..self.pos])
    }

    /// Consumes the next character so it shows up in the error text.
    fn error_including_next(&mut self, kind: ParseErrorKind, start: usize) -> ScheduleParseError {
        if let Some(c) = self.text[self.pos..].chars().next() {
            self.pos += c.len_utf8();
        }
        self.error(kind, start)
    }

    fn term(&mut self) -> Result<Term, ScheduleParseError> {
        let start = self.pos;

        if self.peek() == Some(b'*') {
            self.pos += 1;
            return match self.peek() {
                Some(b'/') => self.increment(start, self.attribute.min()),
                Some(b'-') => Err(self.error_including_next(ParseErrorKind::InvalidRangeBound, start)),
                _ => Ok(Term::Wildcard),
            };
        }

        let low = self.value()?;
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                if self.peek() == Some(b'*') {
                    return Err(self.error_including_next(ParseErrorKind::InvalidRangeBound, start));
                }
                let high = self.value()?;
                if matches!(self.peek(), Some(b'-' | b'/')) {
                    return Err(self.error_including_next(ParseErrorKind::InvalidRangeBound, start));
                }
                Ok(Term::Range(low, high))
            }
            Some(b'/') => match low {
                Value::Number(base) => self.increment(start, base),
                _ => Err(self.error_including_next(ParseErrorKind::IncrementNotAllowed, start)),
            },
            _ => Ok(Term::Single(low)),
        }
    }

    /// Parses `/step`; the base has already been read.
    fn increment(&mut self, start: usize, base: i32) -> Result<Term, ScheduleParseError> {
        self.pos += 1;
        if !self.attribute.allows_increment() {
            self.word();
            return Err(self.error(ParseErrorKind::IncrementNotAllowed, start));
        }

        let digits = self.word();
        let step = match digits.parse::<i32>() {
            Ok(step) if step <= self.attribute.max() => step,
            _ => {
                return Err(self.error_including_next(ParseErrorKind::InvalidIncrementInterval, start))
            }
        };

        if matches!(self.peek(), Some(b'-' | b'/')) {
            return Err(self.error_including_next(ParseErrorKind::InvalidRangeBound, start));
        }
        Ok(Term::Increment { base, step })
    }

    fn value(&mut self) -> Result<Value, ScheduleParseError> {
        let start = self.pos;
        let negative = self.peek() == Some(b'-');
        if negative {
            self.pos += 1;
        }

        let word = self.word();
        if word.is_empty() {
            return Err(self.error_including_next(ParseErrorKind::InvalidValue, start));
        }

        if word.bytes().all(|b| b.is_ascii_digit()) {
            let out_of_range = || self.error(ParseErrorKind::ValueOutOfRange, start);
            let n: i32 = word.parse().map_err(|_| out_of_range())?;
            if negative {
                // Only dayOfMonth accepts `-1`..`-7`, counted back from the last day.
                return match self.attribute {
                    Attribute::DayOfMonth if (1..=7).contains(&n) => Ok(Value::LastDay(n as u8)),
                    _ => Err(out_of_range()),
                };
            }
            if !(self.attribute.min()..=self.attribute.max()).contains(&n) {
                return Err(out_of_range());
            }
            return Ok(Value::Number(n));
        }

        if negative {
            return Err(self.error(ParseErrorKind::InvalidValue, start));
        }
        if self.attribute == Attribute::DayOfMonth {
            return self.relative_day(start, word);
        }
        self.attribute
            .named_value(word)
            .map(Value::Number)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidValue, start))
    }

    /// `1st`..`5th` followed by a weekday, or `Last` with an optional weekday.
    fn relative_day(&mut self, start: usize, ordinal: &str) -> Result<Value, ScheduleParseError> {
        let ordinal = Attribute::DayOfMonth
            .named_value(ordinal)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidValue, start))?;

        let after_ordinal = self.pos;
        self.skip_whitespace();
        let weekday = self.word();
        if weekday.is_empty() {
            self.pos = after_ordinal;
            return match ordinal {
                LAST_ORDINAL => Ok(Value::LastDay(0)),
                _ => Err(self.error(ParseErrorKind::MissingDayOfWeek, start)),
            };
        }

        let weekday = Attribute::DayOfWeek
            .named_value(weekday)
            .ok_or_else(|| self.error(ParseErrorKind::InvalidValue, start))? as u8;
        Ok(match ordinal {
            LAST_ORDINAL => Value::LastWeekday(weekday),
            nth => Value::NthWeekday {
                nth: nth as u8,
                weekday,
            },
        })
    }
}
