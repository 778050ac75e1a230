//! Pure calendar-date arithmetic shared by the schedule and interest
//! engines. Everything works on calendar fields of `NaiveDate`, so there are
//! no daylight-saving artifacts to worry about.

use chrono::{Datelike, Duration, NaiveDate};

/// Shifts a date by `n` calendar days (`n` may be negative).
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    const MDAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        MDAYS[(month - 1) as usize]
    }
}

/// Shifts a date by `n` whole months, clamping the day-of-month to the
/// target month's length: Jan 31 + 1 month is Feb 28 (or 29 in a leap
/// year), never Mar 2.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    let day = date.day().min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap_or(date)
}

/// Next occurrence of `day`-of-month strictly after `date`.
///
/// Lands in the current month when that still lies ahead of `date`,
/// otherwise rolls into the following month, clamping to its length either
/// way. The result is always at least one day past `date`: a rule for the
/// 31st seen on Feb 29 yields Mar 31, and seen on Mar 31 yields Apr 30,
/// never the same date twice.
pub fn next_day_of_month_on_or_after(date: NaiveDate, day: u32) -> NaiveDate {
    if date.day() < day {
        let clamped = day.min(days_in_month(date.year(), date.month()));
        if clamped > date.day() {
            return NaiveDate::from_ymd_opt(date.year(), date.month(), clamped).unwrap_or(date);
        }
    }
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let clamped = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, clamped).unwrap_or(date)
}

/// Counts monthly apply points from `start` (inclusive) by stepping with
/// `add_months(_, 1)` until past `end`. Returns 0 when `end < start`.
///
/// Stepping keeps the count consistent with the clamped month arithmetic
/// near end-of-month dates, where a closed-form field difference drifts.
pub fn months_between_inclusive(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let mut count = 0u32;
    let mut cur = start;
    while cur <= end {
        count += 1;
        let next = add_months(cur, 1);
        if next <= cur {
            break;
        }
        cur = next;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 10, 31), 2), date(2024, 12, 31));
        assert_eq!(add_months(date(2024, 11, 30), 3), date(2025, 2, 28));
    }

    #[test]
    fn add_months_handles_negative_shifts() {
        assert_eq!(add_months(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 1, 15), -2), date(2023, 11, 15));
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2023));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn next_day_of_month_lands_in_current_month_when_ahead() {
        assert_eq!(
            next_day_of_month_on_or_after(date(2024, 1, 15), 20),
            date(2024, 1, 20)
        );
    }

    #[test]
    fn next_day_of_month_rolls_over_when_due_or_past() {
        assert_eq!(
            next_day_of_month_on_or_after(date(2024, 3, 31), 31),
            date(2024, 4, 30)
        );
        assert_eq!(
            next_day_of_month_on_or_after(date(2024, 1, 20), 20),
            date(2024, 2, 20)
        );
        assert_eq!(
            next_day_of_month_on_or_after(date(2024, 12, 31), 15),
            date(2025, 1, 15)
        );
    }

    #[test]
    fn next_day_of_month_never_returns_the_same_date_in_short_months() {
        // Feb 29 is the clamped stand-in for "the 31st" in February, so the
        // next occurrence must be March 31, not Feb 29 again.
        assert_eq!(
            next_day_of_month_on_or_after(date(2024, 2, 29), 31),
            date(2024, 3, 31)
        );
    }

    #[test]
    fn months_between_counts_apply_points() {
        assert_eq!(
            months_between_inclusive(date(2024, 1, 1), date(2024, 3, 1)),
            3
        );
        assert_eq!(
            months_between_inclusive(date(2024, 1, 15), date(2024, 3, 20)),
            3
        );
        assert_eq!(
            months_between_inclusive(date(2024, 1, 15), date(2024, 1, 14)),
            0
        );
        assert_eq!(
            months_between_inclusive(date(2024, 1, 15), date(2024, 1, 15)),
            1
        );
        // Jan 31 steps through the clamped Feb 29 and Mar 29.
        assert_eq!(
            months_between_inclusive(date(2024, 1, 31), date(2024, 3, 30)),
            3
        );
    }
}
