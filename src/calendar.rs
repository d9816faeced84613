//! Calendar math for the date picker: strict ISO parsing, the fixed 6x7 day
//! grid, and label formatting with a numeric fallback.

use std::fmt::Write as _;

use chrono::{Datelike, Days, Locale, Months, NaiveDate, TimeZone, Utc};

const GRID_CELLS: u64 = 42;
const FALLBACK_WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub outside_month: bool,
    pub today: bool,
    pub selected: bool,
    pub disabled: bool,
}

/// Parses `YYYY-MM-DD`.
///
/// Only strings that denote a real calendar date and format back to exactly
/// the same text are accepted; `2023-02-30`, `2023-2-3` and `+2023-01-01`
/// all yield `None`.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    if bytes
        .iter()
        .enumerate()
        .any(|(idx, b)| idx != 4 && idx != 7 && !b.is_ascii_digit())
    {
        return None;
    }

    let year = value[0..4].parse::<i32>().ok()?;
    let month = value[5..7].parse::<u32>().ok()?;
    let day = value[8..10].parse::<u32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    (format_iso_date(date) == value).then_some(date)
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

pub(crate) fn shift_month(view_month: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(view_month);
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(first)
}

/// Inclusive bound check; a missing side is unbounded.
pub(crate) fn within_bounds(date: NaiveDate, min: Option<NaiveDate>, max: Option<NaiveDate>) -> bool {
    min.is_none_or(|min| date >= min) && max.is_none_or(|max| date <= max)
}

/// Lays out 42 consecutive days starting from the Sunday on or before the
/// first of `view_month`.
pub fn month_grid(
    view_month: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
) -> Vec<DayCell> {
    let first = first_of_month(view_month);
    let offset = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(offset)).unwrap_or(first);

    (0..GRID_CELLS)
        .map_while(|index| start.checked_add_days(Days::new(index)))
        .map(|date| DayCell {
            date,
            outside_month: date.month() != first.month() || date.year() != first.year(),
            today: date == today,
            selected: Some(date) == selected,
            disabled: !within_bounds(date, min, max),
        })
        .collect()
}

pub(crate) fn resolve_locale(name: Option<&str>) -> Option<Locale> {
    let name = name?.trim().replace('-', "_");
    Locale::try_from(name.as_str()).ok()
}

fn format_localized(date: NaiveDate, pattern: &str, locale: Locale) -> Option<String> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let stamp = Utc.from_utc_datetime(&midnight);
    let mut out = String::new();
    write!(out, "{}", stamp.format_localized(pattern, locale)).ok()?;
    Some(out)
}

/// Short date for the trigger button, e.g. `Jan 5, 2024`; `01/05/2024` when
/// the locale is unknown or formatting fails.
pub fn trigger_label(date: NaiveDate, locale: Option<&str>) -> String {
    resolve_locale(locale)
        .and_then(|locale| format_localized(date, "%b %-d, %Y", locale))
        .unwrap_or_else(|| date.format("%m/%d/%Y").to_string())
}

pub fn month_title(view_month: NaiveDate, locale: Option<&str>) -> String {
    resolve_locale(locale)
        .and_then(|locale| format_localized(view_month, "%B %Y", locale))
        .unwrap_or_else(|| view_month.format("%B %Y").to_string())
}

/// Two-letter weekday headings, Sunday first.
pub fn weekday_labels(locale: Option<&str>) -> Vec<String> {
    let locale = resolve_locale(locale);
    // 2023-01-01 was a Sunday.
    let sunday = NaiveDate::from_ymd_opt(2023, 1, 1);
    FALLBACK_WEEKDAYS
        .iter()
        .enumerate()
        .map(|(offset, fallback)| {
            locale
                .zip(sunday)
                .and_then(|(locale, sunday)| {
                    let day = sunday.checked_add_days(Days::new(offset as u64))?;
                    format_localized(day, "%a", locale)
                })
                .map(|name| name.chars().take(2).collect::<String>())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| (*fallback).to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
    }

    #[test]
    fn parse_iso_date_accepts_only_canonical_real_dates() {
        assert_eq!(parse_iso_date("2024-02-29"), Some(ymd(2024, 2, 29)));
        assert_eq!(parse_iso_date("0001-01-01"), Some(ymd(1, 1, 1)));
        for bad in [
            "2023-02-29",
            "2024-13-01",
            "2024-00-10",
            "2024-1-05",
            " 2024-01-05",
            "2024-01-05 ",
            "2024/01/05",
            "+202-01-05",
            "",
        ] {
            assert_eq!(parse_iso_date(bad), None, "{bad:?} should be rejected");
        }
    }

    #[test]
    fn formatted_dates_parse_back() {
        let date = ymd(1999, 12, 31);
        assert_eq!(format_iso_date(date), "1999-12-31");
        assert_eq!(parse_iso_date(&format_iso_date(date)), Some(date));
    }

    #[test]
    fn month_grid_starts_on_the_sunday_before_the_first() {
        let today = ymd(2024, 5, 9);
        let grid = month_grid(ymd(2024, 5, 20), today, Some(ymd(2024, 5, 20)), None, None);
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0].date, ymd(2024, 4, 28));
        assert!(grid[0].outside_month);
        assert_eq!(grid[3].date, ymd(2024, 5, 1));
        assert!(!grid[3].outside_month);
        assert_eq!(grid[41].date, ymd(2024, 6, 8));
        assert_eq!(grid.iter().filter(|cell| cell.today).count(), 1);
        assert_eq!(
            grid.iter().find(|cell| cell.selected).map(|cell| cell.date),
            Some(ymd(2024, 5, 20))
        );
    }

    #[test]
    fn month_starting_on_sunday_has_no_leading_days() {
        let grid = month_grid(ymd(2023, 10, 1), ymd(2023, 10, 1), None, None, None);
        assert_eq!(grid[0].date, ymd(2023, 10, 1));
        assert!(!grid[0].outside_month);
    }

    #[test]
    fn bounds_are_inclusive_and_apply_to_outside_days() {
        let min = Some(ymd(2024, 4, 30));
        let max = Some(ymd(2024, 5, 2));
        let grid = month_grid(ymd(2024, 5, 1), ymd(2024, 5, 1), None, min, max);
        let enabled = grid
            .iter()
            .filter(|cell| !cell.disabled)
            .map(|cell| cell.date)
            .collect::<Vec<_>>();
        assert_eq!(enabled, vec![ymd(2024, 4, 30), ymd(2024, 5, 1), ymd(2024, 5, 2)]);
    }

    #[test]
    fn shift_month_clamps_to_the_first() {
        assert_eq!(shift_month(ymd(2024, 1, 31), 1), ymd(2024, 2, 1));
        assert_eq!(shift_month(ymd(2024, 1, 15), -1), ymd(2023, 12, 1));
        assert_eq!(shift_month(ymd(2024, 1, 15), 0), ymd(2024, 1, 1));
    }

    #[test]
    fn labels_use_the_locale_and_fall_back_to_numbers() {
        let date = ymd(2024, 1, 5);
        assert_eq!(trigger_label(date, Some("en_US")), "Jan 5, 2024");
        assert_eq!(trigger_label(date, Some("en-US")), "Jan 5, 2024");
        assert_eq!(trigger_label(date, Some("not a locale")), "01/05/2024");
        assert_eq!(trigger_label(date, None), "01/05/2024");
        assert_eq!(month_title(date, Some("en_US")), "January 2024");
        assert_eq!(month_title(date, None), "January 2024");
        assert_eq!(weekday_labels(None), FALLBACK_WEEKDAYS.to_vec());
        assert_eq!(weekday_labels(Some("en_US")), FALLBACK_WEEKDAYS.to_vec());
    }
}
