use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{EngineError, Result};

/// advance a date by whole calendar months, clamping the day to month end
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| EngineError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// whole calendar months from `from` to `to`, ignoring day-of-month.
/// negative when `to` falls in an earlier month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}
