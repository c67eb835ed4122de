//! Time zone resolution for schedule expressions.
//!
//! A schedule is evaluated on the wall clock of one zone: either an IANA zone
//! from `chrono-tz` or a fixed `GMT+HH:MM` style offset.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ScheduleZone {
    pub const UTC: ScheduleZone = ScheduleZone::Named(Tz::UTC);

    /// Resolve a zone id. Accepts IANA names and custom `GMT±H[H][[:]MM]` offsets.
    ///
    /// Returns `None` for anything unrecognised; there is no silent fallback.
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim();
        if let Some(offset) = parse_custom_offset(id) {
            return Some(ScheduleZone::Fixed(offset));
        }
        id.parse::<Tz>().ok().map(ScheduleZone::Named)
    }

    /// The zone used when an expression names none: `TZ` if it is a known
    /// zone, then the host zone, otherwise UTC.
    pub fn process_default() -> Self {
        let tz = std::env::var("TZ").ok();
        let host = match iana_time_zone::get_timezone() {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(error = %e, "cannot determine host time zone");
                None
            }
        };
        Self::default_from(tz.as_deref(), host.as_deref())
    }

    fn default_from(tz: Option<&str>, host: Option<&str>) -> Self {
        if let Some(tz) = tz {
            let id = tz.trim_start_matches(':');
            match Self::parse(id) {
                Some(zone) => return zone,
                None => debug!(tz = %id, "TZ is not a known zone"),
            }
        }
        if let Some(id) = host {
            match id.parse::<Tz>() {
                Ok(tz) => return ScheduleZone::Named(tz),
                Err(_) => debug!(zone = %id, "host time zone is not a known IANA id"),
            }
        }
        debug!("defaulting to UTC");
        Self::UTC
    }

    /// UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self {
            ScheduleZone::Named(tz) => tz.offset_from_utc_datetime(&instant.naive_utc()).fix(),
            ScheduleZone::Fixed(offset) => *offset,
        }
    }

    /// Wall-clock time at `instant`, or `None` past chrono's representable range.
    pub fn to_local(&self, instant: DateTime<Utc>) -> Option<NaiveDateTime> {
        let offset = self.offset_at(instant).local_minus_utc();
        instant
            .naive_utc()
            .checked_add_signed(Duration::seconds(i64::from(offset)))
    }

    /// Map a wall-clock time back to an instant that is not before `not_before`.
    ///
    /// Times skipped by a forward transition map through the offset in effect
    /// before the gap, so 02:30 in a 02:00→03:00 gap becomes 03:30. Repeated
    /// times resolve to the earliest mapping that is still `>= not_before`.
    pub(crate) fn resolve_local(
        &self,
        local: NaiveDateTime,
        not_before: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let tz = match self {
            ScheduleZone::Named(tz) => tz,
            ScheduleZone::Fixed(offset) => {
                return offset
                    .from_local_datetime(&local)
                    .single()
                    .map(|t| t.with_timezone(&Utc))
                    .filter(|t| *t >= not_before);
            }
        };

        match tz.from_local_datetime(&local) {
            LocalResult::Single(t) => Some(t.with_timezone(&Utc)).filter(|t| *t >= not_before),
            LocalResult::Ambiguous(earliest, latest) => [earliest, latest]
                .into_iter()
                .map(|t| t.with_timezone(&Utc))
                .find(|t| *t >= not_before),
            LocalResult::None => {
                let probe = local.checked_sub_signed(Duration::days(1))?;
                let before = tz.offset_from_utc_datetime(&probe).fix();
                let utc = local
                    .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))?
                    .and_utc();
                Some(utc).filter(|t| *t >= not_before)
            }
        }
    }
}

impl fmt::Display for ScheduleZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleZone::Named(tz) => f.write_str(tz.name()),
            ScheduleZone::Fixed(offset) => {
                let secs = offset.local_minus_utc();
                let sign = if secs < 0 { '-' } else { '+' };
                let secs = secs.unsigned_abs();
                write!(f, "GMT{sign}{:02}:{:02}", secs / 3600, secs % 3600 / 60)
            }
        }
    }
}

/// `GMT+8`, `GMT-08`, `GMT+12:34`, `GMT+1234`.
fn parse_custom_offset(id: &str) -> Option<FixedOffset> {
    let rest = id.strip_prefix("GMT")?;
    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) if (1..=2).contains(&h.len()) && m.len() == 2 => (h, m),
        Some(_) => return None,
        None => match digits.len() {
            1 | 2 => (digits, "0"),
            3 | 4 => digits.split_at(digits.len() - 2),
            _ => return None,
        },
    };
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
