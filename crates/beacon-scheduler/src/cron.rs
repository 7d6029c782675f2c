//! 5-field cron matching — minute, hour, day-of-month, month, day-of-week.
//!
//! Matching is a pure function of the expression and a point in time, safe
//! to call on every tick. Malformed expressions never panic; they log a
//! warning and simply do not match.

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::warn;

/// True when `now` matches every field of the 5-field cron expression.
///
/// Supported per field: `*`, comma lists (`1,3,5`), ranges (`1-5`), step
/// values (`*/5`, matching when `value % 5 == 0`) and bare integers.
///
/// Day-of-week uses standard cron numbering with Sunday = 0; a literal `7`
/// is accepted as an alias for Sunday, so `0 9 * * 0` and `0 9 * * 7` are
/// equivalent.
pub fn is_time_matching(expr: &str, now: DateTime<Utc>) -> bool {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        warn!(expr, count = fields.len(), "cron expression must have exactly 5 fields");
        return false;
    }

    let dow = now.weekday().num_days_from_sunday();

    field_matches(fields[0], now.minute())
        && field_matches(fields[1], now.hour())
        && field_matches(fields[2], now.day())
        && field_matches(fields[3], now.month())
        && dow_matches(fields[4], dow)
}

/// True when the expression has the expected field count. Used to reject
/// bad config values before they are persisted.
pub fn is_valid_expression(expr: &str) -> bool {
    expr.split_whitespace().count() == 5
}

fn field_matches(field: &str, value: u32) -> bool {
    if field == "*" {
        return true;
    }

    if let Some(step) = field.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(n) if n > 0 => value % n == 0,
            _ => {
                warn!(field, "invalid cron step value");
                false
            }
        };
    }

    field.split(',').any(|part| part_matches(part, value))
}

fn part_matches(part: &str, value: u32) -> bool {
    if let Some((lo, hi)) = part.split_once('-') {
        return match (lo.parse::<u32>(), hi.parse::<u32>()) {
            (Ok(lo), Ok(hi)) => lo <= value && value <= hi,
            _ => {
                warn!(part, "invalid cron range");
                false
            }
        };
    }
    match part.parse::<u32>() {
        Ok(n) => n == value,
        Err(_) => {
            warn!(part, "invalid cron field value");
            false
        }
    }
}

/// Day-of-week with the Sunday alias: `dow` is 0-6 (Sunday = 0), and a
/// `7` written in the expression also means Sunday.
fn dow_matches(field: &str, dow: u32) -> bool {
    field_matches(field, dow) || (dow == 0 && field_matches(field, 7))
}

/// Human-readable label for a handful of well-known expressions, with a
/// literal field dump as fallback. Cosmetic only — never used for matching.
pub fn describe_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return format!("invalid expression: {expr}");
    }

    match (fields[0], fields[1], fields[2], fields[3], fields[4]) {
        ("*", "*", "*", "*", "*") => "every minute".to_string(),
        ("0", "*", "*", "*", "*") => "every hour".to_string(),
        ("0", "0", "*", "*", "*") => "daily at midnight".to_string(),
        (min, "*", "*", "*", "*") if min.starts_with("*/") => {
            format!("every {} minutes", &min[2..])
        }
        (min, hour, "*", "*", "*")
            if min.parse::<u32>().is_ok() && hour.parse::<u32>().is_ok() =>
        {
            format!(
                "daily at {:02}:{:02}",
                hour.parse::<u32>().unwrap_or(0),
                min.parse::<u32>().unwrap_or(0)
            )
        }
        (min, hour, dom, month, dow) => format!(
            "at minute {min}, hour {hour}, day {dom}, month {month}, weekday {dow}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        // 2026-03-04 is a Wednesday.
        Utc.with_ymd_and_hms(2026, 3, 4, hour, minute, 0).unwrap()
    }

    #[test]
    fn wildcard_matches_any_time() {
        assert!(is_time_matching("* * * * *", at(13, 37)));
    }

    #[test]
    fn matching_is_deterministic() {
        let now = at(9, 15);
        let first = is_time_matching("*/5 * * * *", now);
        assert_eq!(first, is_time_matching("*/5 * * * *", now));
        assert!(first);
    }

    #[test]
    fn step_matches_multiples_only() {
        for minute in 0..60 {
            let expected = minute % 5 == 0;
            assert_eq!(
                is_time_matching("*/5 * * * *", at(10, minute)),
                expected,
                "minute {minute}"
            );
        }
    }

    #[test]
    fn daily_nine_am() {
        assert!(is_time_matching("0 9 * * *", at(9, 0)));
        assert!(!is_time_matching("0 9 * * *", at(9, 1)));
        assert!(!is_time_matching("0 9 * * *", at(10, 0)));
    }

    #[test]
    fn comma_list_and_range() {
        assert!(is_time_matching("1,3,5 * * * *", at(8, 3)));
        assert!(!is_time_matching("1,3,5 * * * *", at(8, 4)));
        assert!(is_time_matching("10-20 * * * *", at(8, 15)));
        assert!(!is_time_matching("10-20 * * * *", at(8, 21)));
    }

    #[test]
    fn wrong_field_count_never_matches() {
        assert!(!is_time_matching("* * * *", at(0, 0)));
        assert!(!is_time_matching("* * * * * *", at(0, 0)));
        assert!(!is_time_matching("", at(0, 0)));
    }

    #[test]
    fn garbage_field_never_matches() {
        assert!(!is_time_matching("x * * * *", at(0, 0)));
        assert!(!is_time_matching("*/0 * * * *", at(0, 0)));
    }

    #[test]
    fn sunday_matches_both_zero_and_seven() {
        // 2026-03-08 is a Sunday.
        let sunday = Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap();
        assert!(is_time_matching("0 9 * * 0", sunday));
        assert!(is_time_matching("0 9 * * 7", sunday));
        assert!(is_time_matching("0 9 * * 5-7", sunday));
        // Wednesday (dow 3) matches neither Sunday spelling.
        assert!(!is_time_matching("0 9 * * 0", at(9, 0)));
        assert!(!is_time_matching("0 9 * * 7", at(9, 0)));
    }

    #[test]
    fn weekday_field_matches_named_day() {
        // 2026-03-04 is a Wednesday (dow 3).
        assert!(is_time_matching("* * * * 3", at(12, 0)));
        assert!(!is_time_matching("* * * * 4", at(12, 0)));
    }

    #[test]
    fn describe_well_known_expressions() {
        assert_eq!(describe_cron("* * * * *"), "every minute");
        assert_eq!(describe_cron("0 * * * *"), "every hour");
        assert_eq!(describe_cron("*/15 * * * *"), "every 15 minutes");
        assert_eq!(describe_cron("30 8 * * *"), "daily at 08:30");
        assert_eq!(
            describe_cron("5 4 1 * 2"),
            "at minute 5, hour 4, day 1, month *, weekday 2"
        );
    }

    #[test]
    fn validity_check_is_field_count_only() {
        assert!(is_valid_expression("0 9 * * *"));
        assert!(!is_valid_expression("0 9 * *"));
    }
}
