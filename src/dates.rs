//! Calendar helpers and payroll cycle dates.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;

use crate::models::PayrollFrequency;

/// Number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// The first day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// The last day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_day_of_month(date)
        + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1)
}

/// Adds calendar months, clamping the day to the length of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name of the month containing `date`.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

/// Number of days from `from_date` to `to_date`, both included.
pub fn days_inclusive(from_date: NaiveDate, to_date: NaiveDate) -> i64 {
    (to_date - from_date).num_days() + 1
}

/// The first and last day of a payroll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayrollCycle {
    /// First day of the cycle.
    pub start_date: NaiveDate,
    /// Last day of the cycle.
    pub end_date: NaiveDate,
}

/// Returns the payroll cycle of a frequency that contains (or starts on) `date`.
///
/// Monthly cycles are calendar months and bimonthly cycles split the month
/// after the 15th. Weekly, fortnightly and daily cycles start on `date`.
///
/// # Examples
///
/// ```
/// use hrms_rules::dates::start_end_dates;
/// use hrms_rules::models::PayrollFrequency;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
/// let cycle = start_end_dates(PayrollFrequency::Bimonthly, date);
/// assert_eq!(cycle.start_date, NaiveDate::from_ymd_opt(2026, 2, 16).unwrap());
/// assert_eq!(cycle.end_date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
/// ```
pub fn start_end_dates(frequency: PayrollFrequency, date: NaiveDate) -> PayrollCycle {
    let (start_date, end_date) = match frequency {
        PayrollFrequency::Monthly => (first_day_of_month(date), last_day_of_month(date)),
        PayrollFrequency::Bimonthly => {
            let first = first_day_of_month(date);
            if date.day() <= 15 {
                (first, first + Duration::days(14))
            } else {
                (first + Duration::days(15), last_day_of_month(date))
            }
        }
        PayrollFrequency::Weekly => (date, date + Duration::days(6)),
        PayrollFrequency::Fortnightly => (date, date + Duration::days(13)),
        PayrollFrequency::Daily => (date, date),
    };
    PayrollCycle {
        start_date,
        end_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_day_of_month(date(2026, 3, 17)), date(2026, 3, 1));
        assert_eq!(last_day_of_month(date(2026, 3, 17)), date(2026, 3, 31));
        assert_eq!(last_day_of_month(date(2028, 2, 1)), date(2028, 2, 29));
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(date(2026, 1, 31), 1), date(2026, 2, 28));
        assert_eq!(add_months(date(2026, 10, 1), 3), date(2027, 1, 1));
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(date(2026, 1, 31)), "January");
        assert_eq!(month_name(date(2026, 12, 1)), "December");
    }

    #[test]
    fn test_monthly_cycle() {
        let cycle = start_end_dates(PayrollFrequency::Monthly, date(2026, 2, 10));
        assert_eq!(cycle.start_date, date(2026, 2, 1));
        assert_eq!(cycle.end_date, date(2026, 2, 28));
    }

    #[test]
    fn test_bimonthly_first_half() {
        let cycle = start_end_dates(PayrollFrequency::Bimonthly, date(2026, 5, 15));
        assert_eq!(cycle.start_date, date(2026, 5, 1));
        assert_eq!(cycle.end_date, date(2026, 5, 15));
    }

    #[test]
    fn test_weekly_and_fortnightly_start_on_date() {
        let weekly = start_end_dates(PayrollFrequency::Weekly, date(2026, 5, 4));
        assert_eq!(weekly.end_date, date(2026, 5, 10));

        let fortnightly = start_end_dates(PayrollFrequency::Fortnightly, date(2026, 5, 4));
        assert_eq!(fortnightly.end_date, date(2026, 5, 17));

        let daily = start_end_dates(PayrollFrequency::Daily, date(2026, 5, 4));
        assert_eq!(daily.start_date, daily.end_date);
    }
}
