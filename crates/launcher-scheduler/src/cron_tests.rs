use super::*;
use chrono::{Datelike, TimeZone, Timelike, Weekday};

fn next_weekdays(expression: &str, count: usize) -> Vec<Weekday> {
    let schedule = CronSchedule::parse(expression).unwrap();
    let mut at = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let mut out = Vec::new();
    for _ in 0..count {
        at = schedule.next_after(&at).unwrap();
        out.push(at.weekday());
    }
    out
}

#[test]
fn test_validate_accepts_common_expressions() {
    assert!(validate("*/5 * * * *"));
    assert!(validate("0 9 * * 1-5"));
    assert!(validate("30 4 1 * *"));
    assert!(validate("0 0 * * MON"));
    assert!(validate("  15 10 * * *  "));
}

#[test]
fn test_validate_rejects_bad_expressions() {
    assert!(!validate(""));
    assert!(!validate("not a cron"));
    assert!(!validate("* * * *"));
    assert!(!validate("0 * * * * *"));
    assert!(!validate("61 * * * *"));
    assert!(!validate("0 25 * * *"));
    assert!(!validate("0 0 * * 8"));
    assert!(!validate("0 0 * * 5-2"));
    assert!(!validate("0 0 * * */0"));
}

#[test]
fn test_field_count_error() {
    assert_eq!(
        CronSchedule::parse("* * *").unwrap_err(),
        CronError::FieldCount(3)
    );
}

#[test]
fn test_translate_day_of_week() {
    assert_eq!(translate_day_of_week("*").unwrap(), "*");
    assert_eq!(translate_day_of_week("0").unwrap(), "1");
    assert_eq!(translate_day_of_week("7").unwrap(), "1");
    assert_eq!(translate_day_of_week("1-5").unwrap(), "2,3,4,5,6");
    assert_eq!(translate_day_of_week("0,6").unwrap(), "1,7");
    assert_eq!(translate_day_of_week("*/2").unwrap(), "1,3,5,7");
    assert_eq!(translate_day_of_week("5-7").unwrap(), "1,6,7");
    assert_eq!(translate_day_of_week("3/2").unwrap(), "4,6");
    assert_eq!(translate_day_of_week("mon").unwrap(), "MON");
    assert!(translate_day_of_week("1,,2").is_err());
}

#[test]
fn test_sunday_numbering() {
    assert!(next_weekdays("0 12 * * 0", 3).iter().all(|d| *d == Weekday::Sun));
    assert!(next_weekdays("0 12 * * 7", 3).iter().all(|d| *d == Weekday::Sun));
    assert!(next_weekdays("0 12 * * 1", 3).iter().all(|d| *d == Weekday::Mon));
}

#[test]
fn test_weekday_range_skips_weekend() {
    let days = next_weekdays("0 9 * * 1-5", 10);
    assert!(
        days.iter()
            .all(|d| !matches!(d, Weekday::Sat | Weekday::Sun))
    );
}

#[test]
fn test_next_after_minute_step() {
    let schedule = CronSchedule::parse("*/15 * * * *").unwrap();
    let start = Local.with_ymd_and_hms(2026, 3, 10, 8, 7, 30).unwrap();
    let next = schedule.next_after(&start).unwrap();
    assert_eq!(next.minute(), 15);
    assert_eq!(next.second(), 0);
}

#[test]
fn test_upcoming_is_ordered() {
    let schedule = CronSchedule::parse("* * * * *").unwrap();
    let times = schedule.upcoming(3);
    assert_eq!(times.len(), 3);
    assert!(times[0] < times[1] && times[1] < times[2]);
    assert_eq!(schedule.expression(), "* * * * *");
}
