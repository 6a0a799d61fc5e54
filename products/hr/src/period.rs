//! Calendar helpers shared by the monthly series.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{HrError, HrResult};

/// Caller-supplied dates must fall inside these years.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Clamps to the last day of the target month, so Jan 31 + 1 is Feb 28/29.
pub fn add_months(day: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        day.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        day.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(day)
}

pub fn month_end(day: NaiveDate) -> NaiveDate {
    let next = add_months(month_start(day), 1);
    next.pred_opt().unwrap_or(day)
}

/// First day of every month from `from`'s month through `to`'s month.
/// Stops at the last month chrono can represent.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut months = Vec::new();
    let end = month_start(to);
    let mut cursor = month_start(from);
    while cursor <= end {
        months.push(cursor);
        let Some(next) = cursor.checked_add_months(Months::new(1)) else {
            break;
        };
        cursor = next;
    }
    months
}

/// Rejects dates outside `MIN_YEAR..=MAX_YEAR`.
pub fn check_date(day: NaiveDate) -> HrResult<NaiveDate> {
    if (MIN_YEAR..=MAX_YEAR).contains(&day.year()) {
        Ok(day)
    } else {
        Err(HrError::InvalidInput(format!(
            "date {day} is outside years {MIN_YEAR}..={MAX_YEAR}"
        )))
    }
}

pub fn earliest_supported() -> NaiveDate {
    NaiveDate::from_ymd_opt(MIN_YEAR, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// `check_date` over the bounds a caller actually supplied.
pub fn check_dates(days: &[Option<NaiveDate>]) -> HrResult<()> {
    for day in days.iter().flatten() {
        check_date(*day)?;
    }
    Ok(())
}

/// `count` month starts ending with the month containing `today`.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    if count == 0 {
        return Vec::new();
    }
    let first = add_months(month_start(today), 1 - count as i32);
    months_between(first, today)
}

/// Short month name, e.g. "Mar".
pub fn month_label(day: NaiveDate) -> String {
    day.format("%b").to_string()
}

/// Inclusive date window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The month ending on `today`, used when callers omit a window.
    pub fn last_month(today: NaiveDate) -> Self {
        Self::new(add_months(today, -1), today)
    }

    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(Self::new(
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        ))
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}
