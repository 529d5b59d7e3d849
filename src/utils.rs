use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::schema::DateRange;

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// January 1st of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Resolves the report window from an optional filter range.
///
/// A supplied range carries an exclusive end, so the inclusive report end is
/// one day earlier. Without a range the report covers the current calendar
/// year up to `today`.
pub fn resolve_report_range(range: Option<&DateRange>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match range {
        Some(range) => (
            range.begin,
            range.end.checked_sub_days(Days::new(1)).unwrap_or(range.end),
        ),
        None => (year_start(today), today),
    }
}

/// Percentage of the selected year that has already elapsed.
///
/// Only defined when the filter range covers exactly one calendar year:
/// 100 for past years, 0 for future years, and the day ratio for the
/// current one. Any other range yields `None`.
pub fn year_progress(range: Option<&DateRange>, today: NaiveDate) -> Option<Decimal> {
    let range = range?;
    let is_full_year = range.begin.month() == 1
        && range.begin.day() == 1
        && range.end.month() == 1
        && range.end.day() == 1
        && range.end.year() == range.begin.year() + 1;
    if !is_full_year {
        return None;
    }

    let report_year = range.begin.year();
    if today.year() > report_year {
        return Some(Decimal::ONE_HUNDRED);
    }
    if today.year() < report_year {
        return Some(Decimal::ZERO);
    }

    let start = year_start(today);
    let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
    let total_days = (end - start).num_days() + 1;
    let passed_days = (today - start).num_days() + 1;
    Some(Decimal::from(passed_days) / Decimal::from(total_days) * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(month_start(date(2026, 3, 17)), date(2026, 3, 1));
        assert_eq!(next_month_start(date(2026, 3, 17)), date(2026, 4, 1));
        assert_eq!(next_month_start(date(2026, 12, 31)), date(2027, 1, 1));
        assert_eq!(year_start(date(2026, 8, 7)), date(2026, 1, 1));
    }

    #[test]
    fn test_resolve_report_range_with_filter() {
        let range = DateRange::new(date(2026, 2, 1), date(2026, 3, 1)).unwrap();
        let (start, end) = resolve_report_range(Some(&range), date(2026, 8, 7));
        assert_eq!(start, date(2026, 2, 1));
        assert_eq!(end, date(2026, 2, 28));
    }

    #[test]
    fn test_resolve_report_range_defaults_to_current_year() {
        let today = date(2026, 8, 7);
        let (start, end) = resolve_report_range(None, today);
        assert_eq!(start, date(2026, 1, 1));
        assert_eq!(end, today);
    }

    #[test]
    fn test_year_progress_requires_full_year_range() {
        let today = date(2026, 8, 7);
        assert_eq!(year_progress(None, today), None);

        let partial = DateRange::new(date(2026, 1, 1), date(2026, 7, 1)).unwrap();
        assert_eq!(year_progress(Some(&partial), today), None);

        let past = DateRange::new(date(2024, 1, 1), date(2025, 1, 1)).unwrap();
        assert_eq!(year_progress(Some(&past), today), Some(Decimal::ONE_HUNDRED));

        let future = DateRange::new(date(2027, 1, 1), date(2028, 1, 1)).unwrap();
        assert_eq!(year_progress(Some(&future), today), Some(Decimal::ZERO));
    }

    #[test]
    fn test_year_progress_day_ratio_for_current_year() {
        let range = DateRange::new(date(2026, 1, 1), date(2027, 1, 1)).unwrap();
        // Jan 1 counts as one elapsed day out of 365.
        let progress = year_progress(Some(&range), date(2026, 1, 1)).unwrap();
        assert_eq!(
            progress,
            Decimal::from(1) / Decimal::from(365) * Decimal::ONE_HUNDRED
        );

        let complete = year_progress(Some(&range), date(2026, 12, 31)).unwrap();
        assert_eq!(complete, Decimal::ONE_HUNDRED);
    }
}
