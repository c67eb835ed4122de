use almanac_schedule::{ParsedSchedule, ScheduleExpression};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Up to `count` timeouts at or after `after`.
pub fn upcoming(schedule: &ParsedSchedule, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    if count == 0 {
        return Vec::new();
    }
    let Some(first) = schedule.first_timeout_at(after) else {
        return Vec::new();
    };
    std::iter::once(first)
        .chain(schedule.timeouts_after(first))
        .take(count)
        .collect()
}

/// RFC 3339 in the schedule's own zone.
pub fn local_rfc3339(schedule: &ParsedSchedule, instant: DateTime<Utc>) -> String {
    let offset = schedule.zone().offset_at(instant);
    instant
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

#[derive(Debug, Serialize)]
pub struct TimeoutReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub timezone: String,
    pub timeouts: Vec<String>,
}

impl TimeoutReport {
    pub fn new(name: Option<String>, schedule: &ParsedSchedule, timeouts: &[DateTime<Utc>]) -> Self {
        Self {
            name,
            timezone: schedule.zone().to_string(),
            timeouts: timeouts
                .iter()
                .map(|t| local_rfc3339(schedule, *t))
                .collect(),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(&format!("{name} ({})\n", self.timezone));
        }
        if self.timeouts.is_empty() {
            out.push_str("  no upcoming timeouts\n");
        }
        for timeout in &self.timeouts {
            out.push_str(&format!("  {timeout}\n"));
        }
        out
    }
}

#[derive(Debug, Serialize)]
pub struct DumpReport<'a> {
    pub expression: &'a ScheduleExpression,
    pub decoded: String,
}
