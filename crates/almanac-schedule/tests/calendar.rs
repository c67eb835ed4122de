use almanac_schedule::{InvalidTimeoutQuery, ParsedSchedule, ScheduleExpression};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn in_utc(expr: ScheduleExpression) -> ParsedSchedule {
    expr.timezone("UTC").parse().unwrap()
}

fn take(schedule: &ParsedSchedule, after: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
    schedule.timeouts_after(after).take(n).collect()
}

#[test]
fn midnight_on_the_first_of_every_month() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month(1));
    assert_eq!(
        take(&schedule, utc(2024, 1, 15, 8, 0, 0), 3),
        vec![utc(2024, 2, 1, 0, 0, 0), utc(2024, 3, 1, 0, 0, 0), utc(2024, 4, 1, 0, 0, 0)]
    );
}

#[test]
fn last_day_follows_month_length() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("Last"));
    assert_eq!(
        take(&schedule, utc(2025, 1, 31, 0, 0, 0), 3),
        vec![utc(2025, 2, 28, 0, 0, 0), utc(2025, 3, 31, 0, 0, 0), utc(2025, 4, 30, 0, 0, 0)]
    );
    assert_eq!(
        schedule.first_timeout_at(utc(2024, 2, 1, 0, 0, 1)),
        Some(utc(2024, 2, 29, 0, 0, 0))
    );
}

#[test]
fn days_before_last_shift_with_month_length() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("-2"));
    assert_eq!(
        take(&schedule, utc(2023, 1, 1, 0, 0, 0), 2),
        vec![utc(2023, 1, 29, 0, 0, 0), utc(2023, 2, 26, 0, 0, 0)]
    );
}

#[test]
fn first_monday_in_month_starting_on_tuesday() {
    // October 2024 starts on a Tuesday.
    let schedule = in_utc(ScheduleExpression::new().day_of_month("1st Mon"));
    assert_eq!(
        schedule.first_timeout_at(utc(2024, 9, 3, 0, 0, 0)),
        Some(utc(2024, 10, 7, 0, 0, 0))
    );
}

#[test]
fn last_friday_of_month() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("Last Fri"));
    assert_eq!(
        take(&schedule, utc(2024, 1, 1, 0, 0, 0), 3),
        vec![utc(2024, 1, 26, 0, 0, 0), utc(2024, 2, 23, 0, 0, 0), utc(2024, 3, 29, 0, 0, 0)]
    );
}

#[test]
fn variable_range_skips_months_where_it_is_empty() {
    // February and March 2024 have no fifth Monday.
    let schedule = in_utc(ScheduleExpression::new().day_of_month("5th Mon-Last"));
    assert_eq!(
        take(&schedule, utc(2024, 1, 31, 0, 0, 0), 2),
        vec![utc(2024, 4, 29, 0, 0, 0), utc(2024, 4, 30, 0, 0, 0)]
    );
}

#[test]
fn variable_range_that_is_always_inverted_never_fires() {
    let schedule = in_utc(
        ScheduleExpression::new()
            .day_of_month("Last Sun-1st Mon")
            .end(utc(2030, 1, 1, 0, 0, 0)),
    );
    assert_eq!(schedule.first_timeout_at(utc(2024, 1, 1, 0, 0, 0)), None);
}

#[test]
fn impossible_date_returns_none() {
    let schedule = in_utc(ScheduleExpression::new().year(2030).month(2).day_of_month(30));
    assert_eq!(schedule.first_timeout_at(utc(2024, 1, 1, 0, 0, 0)), None);
}

#[test]
fn misaligned_last_timeout_is_rejected() {
    let schedule = in_utc(ScheduleExpression::new());
    let last = utc(2024, 1, 1, 0, 0, 0) + Duration::nanoseconds(1);
    assert_eq!(
        schedule.next_timeout(last),
        Err(InvalidTimeoutQuery::NotSecondAligned { last })
    );
}

#[test]
fn end_of_day_fires_once_per_day() {
    let schedule = in_utc(ScheduleExpression::new().hour(23).minute(59).second(59));
    let got = take(&schedule, utc(2024, 2, 27, 12, 0, 0), 3);
    assert_eq!(
        got,
        vec![utc(2024, 2, 27, 23, 59, 59), utc(2024, 2, 28, 23, 59, 59), utc(2024, 2, 29, 23, 59, 59)]
    );
}

#[test]
fn inverted_weekday_range_wraps_through_sunday() {
    let schedule = in_utc(ScheduleExpression::new().day_of_week("5-1"));
    let weekdays: Vec<Weekday> = take(&schedule, utc(2024, 1, 1, 0, 0, 0), 8)
        .into_iter()
        .map(|t| t.weekday())
        .collect();
    assert_eq!(
        weekdays,
        vec![
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
            Weekday::Mon,
        ]
    );
}

#[test]
fn day_of_month_and_week_fire_on_either() {
    // Jan 2024: Fridays are 5, 12, 19, 26.
    let schedule = in_utc(ScheduleExpression::new().day_of_month(15).day_of_week("Fri"));
    let days: Vec<u32> = take(&schedule, utc(2024, 1, 1, 0, 0, 0), 5)
        .into_iter()
        .map(|t| t.day())
        .collect();
    assert_eq!(days, vec![5, 12, 15, 19, 26]);
}

#[test]
fn timeouts_increase_strictly() {
    let schedule = in_utc(
        ScheduleExpression::new()
            .second("*/7")
            .minute("0-2,58-59")
            .hour("*/5"),
    );
    let got = take(&schedule, utc(2024, 12, 31, 19, 58, 50), 50);
    assert_eq!(got.len(), 50);
    assert!(got.windows(2).all(|w| w[0] < w[1]));
    let mut last = utc(2024, 12, 31, 19, 58, 50);
    for t in got {
        assert_eq!(schedule.next_timeout(last).unwrap(), Some(t));
        last = t;
    }
}

#[test]
fn reparsing_gives_the_same_schedule() {
    let expr = ScheduleExpression::new()
        .day_of_month("2nd Tue, Last, 10-12")
        .month("Jan-Mar, Oct")
        .timezone("Europe/Berlin");
    assert_eq!(expr.parse().unwrap(), expr.parse().unwrap());
}

#[test]
fn year_jumps_to_next_included_year() {
    let schedule = in_utc(ScheduleExpression::new().year("2031, 2040").month(6).day_of_month(15));
    assert_eq!(
        take(&schedule, utc(2024, 1, 1, 0, 0, 0), 3),
        vec![utc(2031, 6, 15, 0, 0, 0), utc(2040, 6, 15, 0, 0, 0)]
    );
}

#[test]
fn respects_end_bound_near_year_ceiling() {
    let schedule = in_utc(ScheduleExpression::new().end(utc(9996, 1, 2, 0, 0, 0)));
    let now = utc(9996, 1, 1, 12, 34, 56);
    assert_eq!(schedule.first_timeout_at(now), Some(utc(9996, 1, 2, 0, 0, 0)));
    assert_eq!(schedule.next_timeout(utc(9996, 1, 2, 0, 0, 0)), Ok(None));
}

#[test]
fn last_supported_year_ends_the_search() {
    let schedule = in_utc(ScheduleExpression::new().month(12).day_of_month(31));
    assert_eq!(
        schedule.first_timeout_at(utc(9998, 6, 1, 0, 0, 0)),
        Some(utc(9998, 12, 31, 0, 0, 0))
    );
    assert_eq!(
        schedule.first_timeout_at(utc(9999, 1, 1, 0, 0, 0)),
        Some(utc(9999, 12, 31, 0, 0, 0))
    );
    assert_eq!(schedule.next_timeout(utc(9999, 12, 31, 0, 0, 0)), Ok(None));
}

#[test]
fn start_after_end_never_fires() {
    let schedule = in_utc(
        ScheduleExpression::new()
            .start(utc(2025, 1, 1, 0, 0, 0))
            .end(utc(2024, 1, 1, 0, 0, 0)),
    );
    assert_eq!(schedule.first_timeout_at(utc(2023, 1, 1, 0, 0, 0)), None);
}

#[test]
fn first_timeout_waits_for_start() {
    let schedule = in_utc(ScheduleExpression::new().start(utc(2024, 5, 10, 12, 0, 0)));
    assert_eq!(
        schedule.first_timeout_at(utc(2024, 1, 1, 0, 0, 0)),
        Some(utc(2024, 5, 11, 0, 0, 0))
    );
}

#[test]
fn sub_second_start_is_rounded_up() {
    let start = utc(2024, 5, 10, 0, 0, 0) + Duration::milliseconds(250);
    let schedule = in_utc(ScheduleExpression::new().second("*").minute("*").hour("*").start(start));
    assert_eq!(schedule.start(), utc(2024, 5, 10, 0, 0, 1));
    assert_eq!(schedule.first_timeout_at(start), Some(utc(2024, 5, 10, 0, 0, 1)));
}

#[test]
fn fixed_offset_zone_shifts_wall_clock() {
    let schedule = ScheduleExpression::new()
        .hour(9)
        .timezone("GMT+05:30")
        .parse()
        .unwrap();
    assert_eq!(
        schedule.first_timeout_at(utc(2024, 1, 1, 0, 0, 0)),
        Some(utc(2024, 1, 1, 3, 30, 0))
    );
}

fn chicago(expr: ScheduleExpression) -> ParsedSchedule {
    expr.timezone("America/Chicago").parse().unwrap()
}

#[test]
fn time_in_spring_gap_fires_after_the_jump() {
    // 2009-03-08 02:00 CST jumps to 03:00 CDT.
    let schedule = chicago(ScheduleExpression::new().hour(2).minute(30));
    assert_eq!(
        take(&schedule, utc(2009, 3, 7, 9, 0, 0), 2),
        vec![utc(2009, 3, 8, 8, 30, 0), utc(2009, 3, 9, 7, 30, 0)]
    );
}

#[test]
fn repeated_fall_hour_fires_once() {
    // 2009-11-01 02:00 CDT falls back to 01:00 CST.
    let schedule = chicago(ScheduleExpression::new().hour(1).minute(30));
    assert_eq!(
        take(&schedule, utc(2009, 10, 31, 12, 0, 0), 2),
        vec![utc(2009, 11, 1, 6, 30, 0), utc(2009, 11, 2, 7, 30, 0)]
    );
}

#[test]
fn search_inside_repeated_hour_takes_the_later_mapping() {
    let schedule = chicago(ScheduleExpression::new().hour(1).minute(30));
    // 07:00Z is the second 01:00, in CST.
    assert_eq!(
        schedule.first_timeout_at(utc(2009, 11, 1, 7, 0, 0)),
        Some(utc(2009, 11, 1, 7, 30, 0))
    );
}

#[test]
fn hourly_schedule_across_spring_gap() {
    let schedule = chicago(ScheduleExpression::new().hour("*"));
    assert_eq!(
        take(&schedule, utc(2009, 3, 8, 6, 30, 0), 3),
        vec![utc(2009, 3, 8, 7, 0, 0), utc(2009, 3, 8, 8, 0, 0), utc(2009, 3, 8, 9, 0, 0)]
    );
}

fn month_days(schedule: &ParsedSchedule, after: DateTime<Utc>, n: usize) -> Vec<(u32, u32)> {
    take(schedule, after, n)
        .into_iter()
        .map(|t| (t.month(), t.day()))
        .collect()
}

// 2024 months start on: Jan Mon, Feb Thu, Mar Fri, Apr Mon, May Wed, Jun Sat, Jul Mon.
fn start_of_2024() -> DateTime<Utc> {
    utc(2023, 12, 31, 23, 0, 0)
}

#[test]
fn relative_high_bound_is_clamped_to_month_end() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("31-5th Fri").year(2024));
    assert_eq!(month_days(&schedule, start_of_2024(), 2), vec![(1, 31), (5, 31)]);

    let schedule = in_utc(ScheduleExpression::new().day_of_month("30-5th Sat").year(2024));
    assert_eq!(
        month_days(&schedule, start_of_2024(), 4),
        vec![(1, 30), (1, 31), (3, 30), (4, 30)]
    );
}

#[test]
fn relative_low_bound_past_month_end_skips_month() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("5th Mon--1").year(2024));
    assert_eq!(
        month_days(&schedule, start_of_2024(), 3),
        vec![(1, 29), (1, 30), (4, 29)]
    );

    let schedule = in_utc(ScheduleExpression::new().day_of_month("1st Mon-1").year(2024));
    assert_eq!(
        month_days(&schedule, start_of_2024(), 3),
        vec![(1, 1), (4, 1), (7, 1)]
    );
}

#[test]
fn last_day_to_literal_range() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("Last-30").year(2024));
    assert_eq!(
        month_days(&schedule, start_of_2024(), 3),
        vec![(2, 29), (4, 30), (6, 30)]
    );
}

#[test]
fn days_before_last_to_nth_weekday_range() {
    let schedule = in_utc(ScheduleExpression::new().day_of_month("-7-4th Fri").year(2024));
    assert_eq!(
        month_days(&schedule, start_of_2024(), 7),
        vec![(1, 24), (1, 25), (1, 26), (2, 22), (2, 23), (4, 23), (4, 24)]
    );
}
