use anyhow::{bail, Context};
use chrono::{Datelike, Months, NaiveDate};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month and year, independent of any particular expense.
///
/// Written and parsed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MonthPointer {
    year: i32,
    /// 1-based, January is 1.
    month: u32,
}

impl MonthPointer {
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("Month must be between 1 and 12, got {month}");
        }
        Ok(Self { year, month })
    }

    /// The month that `date` falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// True when `date` is in this month of this year.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The English name of the month followed by the year, e.g. `February 2025`.
    pub fn label(&self) -> String {
        match self.first_day() {
            Some(d) => d.format("%B %Y").to_string(),
            None => self.to_string(),
        }
    }
}

impl Display for MonthPointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPointer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .with_context(|| format!("Expected a month like 2025-02, got '{s}'"))?;
        let year = y
            .parse::<i32>()
            .with_context(|| format!("Invalid year in '{s}'"))?;
        let month = m
            .parse::<u32>()
            .with_context(|| format!("Invalid month in '{s}'"))?;
        MonthPointer::new(year, month)
    }
}

/// Moves `date` by `delta` calendar months. When the day does not exist in the target month it is
/// clamped to the last day of that month, so January 31st plus one month is the end of February.
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = Months::new(delta.unsigned_abs());
    let moved = if delta >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    };
    moved.unwrap_or(date)
}
