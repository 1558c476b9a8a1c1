use chrono::{DateTime, Datelike, NaiveDate, Utc};
use thiserror::Error;

use super::options::DateRange;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error(
        "invalid date '{0}': expected a month number (1-12), mm.yyyy, dd.mm.yyyy, yyyy-mm-dd or 'last-month'"
    )]
    Invalid(String),
}

/// What a date bound string refers to before it is pinned to a start or end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateForm {
    Month { year: i32, month: u32 },
    Day(NaiveDate),
    LastMonth,
}

fn parse_form(input: &str, today: NaiveDate) -> Result<DateForm, DateParseError> {
    let trimmed = input.trim().to_lowercase();
    let invalid = || DateParseError::Invalid(input.trim().to_string());

    if trimmed == "last-month" {
        return Ok(DateForm::LastMonth);
    }

    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let month: u32 = trimmed.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(DateParseError::MonthOutOfRange(month));
        }
        return Ok(DateForm::Month {
            year: today.year(),
            month,
        });
    }

    if let Ok(day) = NaiveDate::parse_from_str(&trimmed, "%d.%m.%Y") {
        return Ok(DateForm::Day(day));
    }
    if let Ok(day) = NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d") {
        return Ok(DateForm::Day(day));
    }

    // mm.yyyy
    if let Some((month, year)) = trimmed.split_once('.') {
        if let (Ok(month), Ok(year)) = (month.parse::<u32>(), year.parse::<i32>()) {
            if year.to_string().len() == 4 {
                if !(1..=12).contains(&month) {
                    return Err(DateParseError::MonthOutOfRange(month));
                }
                return Ok(DateForm::Month { year, month });
            }
        }
    }

    Err(invalid())
}

fn first_day_of_month(year: i32, month: u32) -> Result<NaiveDate, DateParseError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(DateParseError::MonthOutOfRange(month))
}

/// Last calendar day of a month, leap years included
fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate, DateParseError> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    first_day_of_month(next_year, next_month)?
        .pred_opt()
        .ok_or(DateParseError::MonthOutOfRange(month))
}

fn start_of_day(day: NaiveDate) -> Result<DateTime<Utc>, DateParseError> {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DateParseError::Invalid(day.to_string()))
}

fn end_of_day(day: NaiveDate) -> Result<DateTime<Utc>, DateParseError> {
    day.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| DateParseError::Invalid(day.to_string()))
}

/// Year and month of the calendar month preceding `today`
fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}

/// Resolve a start bound: the first instant of the day or month it names.
pub fn parse_start(input: &str, today: NaiveDate) -> Result<DateTime<Utc>, DateParseError> {
    match parse_form(input, today)? {
        DateForm::Month { year, month } => start_of_day(first_day_of_month(year, month)?),
        DateForm::Day(day) => start_of_day(day),
        DateForm::LastMonth => {
            let (year, month) = previous_month(today);
            start_of_day(first_day_of_month(year, month)?)
        }
    }
}

/// Resolve an end bound: 23:59:59 on the day it names, or on the last day of
/// the month it names.
pub fn parse_end(input: &str, today: NaiveDate) -> Result<DateTime<Utc>, DateParseError> {
    match parse_form(input, today)? {
        DateForm::Month { year, month } => end_of_day(last_day_of_month(year, month)?),
        DateForm::Day(day) => end_of_day(day),
        DateForm::LastMonth => {
            let (year, month) = previous_month(today);
            end_of_day(last_day_of_month(year, month)?)
        }
    }
}

/// The whole calendar month before `today`.
pub fn last_full_month(today: NaiveDate) -> Result<DateRange, DateParseError> {
    let (year, month) = previous_month(today);
    Ok(DateRange {
        start: Some(start_of_day(first_day_of_month(year, month)?)?),
        end: Some(end_of_day(last_day_of_month(year, month)?)?),
    })
}

/// Build a range from optional start/end strings.
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, DateParseError> {
    Ok(DateRange {
        start: start.map(|s| parse_start(s, today)).transpose()?,
        end: end.map(|s| parse_end(s, today)).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_number_start_is_first_day_of_current_year() {
        let start = parse_start("12", day(2024, 6, 15)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_number_end_handles_leap_february() {
        let end = parse_end("2", day(2024, 6, 15)).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());

        let end = parse_end("2", day(2023, 6, 15)).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2023, 2, 28, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_month_number_end_december() {
        let end = parse_end("12", day(2024, 3, 1)).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_month_out_of_range() {
        assert_eq!(
            parse_start("13", day(2024, 1, 1)),
            Err(DateParseError::MonthOutOfRange(13))
        );
        assert_eq!(
            parse_end("0", day(2024, 1, 1)),
            Err(DateParseError::MonthOutOfRange(0))
        );
    }

    #[test]
    fn test_day_formats() {
        let today = day(2025, 1, 1);
        assert_eq!(
            parse_start("01.12.2024", today).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_end("2024-12-31", today).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_month_with_year() {
        let today = day(2025, 5, 1);
        assert_eq!(
            parse_start("02.2024", today).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_end("02.2024", today).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_last_month_keyword_and_shortcut_agree() {
        let today = day(2024, 3, 10);
        let range = last_full_month(today).unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.end, Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert_eq!(parse_start("last-month", today).ok(), range.start);
        assert_eq!(parse_end("Last-Month", today).ok(), range.end);
    }

    #[test]
    fn test_last_month_in_january_wraps_year() {
        let range = last_full_month(day(2025, 1, 20)).unwrap();
        assert_eq!(range.start, Some(Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.end, Some(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn test_invalid_inputs() {
        let today = day(2024, 1, 1);
        assert!(matches!(parse_start("yesterday", today), Err(DateParseError::Invalid(_))));
        assert!(matches!(parse_start("", today), Err(DateParseError::Invalid(_))));
        assert!(matches!(parse_end("31.02.2024", today), Err(DateParseError::Invalid(_))));
    }

    #[test]
    fn test_resolve_range_open_ended() {
        let range = resolve_range(Some("11"), None, day(2024, 12, 5)).unwrap();
        assert!(range.start.is_some());
        assert!(range.end.is_none());
    }
}
