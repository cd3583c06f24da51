//! # Calendar Helpers
//!
//! Date arithmetic shared by reports, prescriptions, warranties and the
//! appointment book. Every function takes "today" explicitly so results
//! are deterministic.

use chrono::{Datelike, Months, NaiveDate, TimeDelta};

/// First day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    add_months(first_day_of_month(date), 1)
        .pred_opt()
        .unwrap_or(date)
}

/// Adds (or subtracts, when negative) whole months, clamping to the end of
/// the target month: 31/01 + 1 month = 28/02 (29/02 in leap years).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Adds (or subtracts) days.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days)).unwrap_or(date)
}

/// Days from `today` until `date`; negative when `date` is in the past.
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Age in full years on `today`.
///
/// Birthdays not yet reached this year do not count; a birth date in the
/// future yields 0.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Formats as `dd/mm/aaaa`.
pub fn format_br_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_day_of_month(d(2025, 3, 17)), d(2025, 3, 1));
        assert_eq!(last_day_of_month(d(2025, 3, 17)), d(2025, 3, 31));
        assert_eq!(last_day_of_month(d(2024, 2, 10)), d(2024, 2, 29));
        assert_eq!(last_day_of_month(d(2025, 2, 10)), d(2025, 2, 28));
        assert_eq!(last_day_of_month(d(2025, 12, 31)), d(2025, 12, 31));
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(add_months(d(2024, 1, 31), 1), d(2024, 2, 29));
        assert_eq!(add_months(d(2025, 6, 15), 12), d(2026, 6, 15));
        assert_eq!(add_months(d(2025, 3, 31), -1), d(2025, 2, 28));
        assert_eq!(add_months(d(2025, 6, 15), 0), d(2025, 6, 15));
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(d(2025, 12, 28), 7), d(2026, 1, 4));
        assert_eq!(add_days(d(2025, 3, 1), -1), d(2025, 2, 28));
    }

    #[test]
    fn test_days_until() {
        let today = d(2025, 5, 10);
        assert_eq!(days_until(today, d(2025, 5, 20)), 10);
        assert_eq!(days_until(today, d(2025, 5, 10)), 0);
        assert_eq!(days_until(today, d(2025, 5, 1)), -9);
    }

    #[test]
    fn test_age_on() {
        let birth = d(1990, 8, 15);
        assert_eq!(age_on(birth, d(2025, 8, 14)), 34);
        assert_eq!(age_on(birth, d(2025, 8, 15)), 35);
        assert_eq!(age_on(birth, d(2025, 12, 1)), 35);
        assert_eq!(age_on(d(2030, 1, 1), d(2025, 1, 1)), 0);
    }

    #[test]
    fn test_format_br_date() {
        assert_eq!(format_br_date(d(2025, 3, 7)), "07/03/2025");
    }
}
