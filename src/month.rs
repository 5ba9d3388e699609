//! The `YYYY-MM` month key used to select and bucket expenses.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, Month};

use crate::Error;

/// A calendar month in a specific year, e.g. `2024-09`.
///
/// Month keys select which expenses belong to a monthly report and label the
/// points of a spending trend. They parse from and display as zero-padded
/// `YYYY-MM` strings, so their textual form sorts chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    /// Create a month key from its parts.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month key a date falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The calendar year.
    pub fn year(self) -> i32 {
        self.year
    }

    /// The calendar month.
    pub fn month(self) -> Month {
        self.month
    }

    /// Whether `date` falls within this month.
    ///
    /// Equivalent to prefix-matching the date's `YYYY-MM-DD` form against
    /// the key's `YYYY-MM` form, which is how month membership is defined
    /// for expense records.
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month immediately before this one.
    pub fn previous(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// The `length` consecutive months ending at (and including) this one,
    /// in chronological order.
    pub fn trailing_window(self, length: usize) -> Vec<YearMonth> {
        let mut months = Vec::with_capacity(length);
        let mut current = self;

        for _ in 0..length {
            months.push(current);
            current = current.previous();
        }

        months.reverse();
        months
    }

    /// The number of calendar days in the month.
    pub fn days(self) -> u8 {
        match self.month {
            Month::January
            | Month::March
            | Month::May
            | Month::July
            | Month::August
            | Month::October
            | Month::December => 31,
            Month::April | Month::June | Month::September | Month::November => 30,
            Month::February => {
                if time::util::is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((year, month)) = value.split_once('-') else {
            return Err(Error::InvalidMonthKey(value.to_owned()));
        };

        // Require zero padding so keys stay lexically sortable.
        if year.len() != 4 || month.len() != 2 {
            return Err(Error::InvalidMonthKey(value.to_owned()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| Error::InvalidMonthKey(value.to_owned()))?;
        let month: u8 = month
            .parse()
            .map_err(|_| Error::InvalidMonthKey(value.to_owned()))?;
        let month = Month::try_from(month).map_err(|_| Error::InvalidMonthKey(value.to_owned()))?;

        Ok(Self { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}
