//! Date arithmetic for taper and banding windows.
//!
//! Taper relief and QSR bands use a fixed 365.25-day year rather than
//! calendar-accurate subtraction; trust exit charges count complete months.

use chrono::{Datelike, Months, NaiveDate};

const DAYS_PER_YEAR: f64 = 365.25;

/// Fractional years between two dates on the 365.25-day convention.
/// Negative when `to` precedes `from`.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Complete months between two dates. A month only counts once the
/// end day-of-month has reached the start day-of-month.
pub fn complete_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let mut total = years * 12 + months;

    if end.day() < start.day() {
        total -= 1;
    }

    total.max(0) as u32
}

/// True when `date` falls on or before `reference` plus three months.
pub fn within_three_months(reference: NaiveDate, date: NaiveDate) -> bool {
    match reference.checked_add_months(Months::new(3)) {
        Some(cutoff) => date <= cutoff,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn years_between_whole_years() {
        let years = years_between(date(2018, 6, 1), date(2020, 6, 1));
        assert!((years - 2.0).abs() < 0.01);
    }

    #[test]
    fn years_between_is_approximate_not_calendar() {
        // 366 days across a leap year is slightly more than one 365.25-day year
        let years = years_between(date(2020, 1, 1), date(2021, 1, 1));
        assert!(years > 1.0);
        assert!(years < 1.01);
    }

    #[test]
    fn years_between_negative_when_reversed() {
        assert!(years_between(date(2020, 1, 1), date(2019, 1, 1)) < 0.0);
    }

    #[test]
    fn complete_months_counts_day_of_month() {
        // 14th to 13th of the following month: not yet a complete month
        assert_eq!(complete_months_between(date(2020, 1, 14), date(2020, 2, 13)), 0);
        assert_eq!(complete_months_between(date(2020, 1, 14), date(2020, 2, 14)), 1);
        assert_eq!(complete_months_between(date(2015, 3, 1), date(2020, 3, 1)), 60);
    }

    #[test]
    fn complete_months_floors_at_zero() {
        assert_eq!(complete_months_between(date(2020, 5, 1), date(2020, 4, 1)), 0);
    }

    #[test]
    fn three_month_grace_boundary() {
        let settlement = date(2020, 1, 15);
        assert!(within_three_months(settlement, date(2020, 4, 15)));
        assert!(!within_three_months(settlement, date(2020, 4, 16)));
    }
}
