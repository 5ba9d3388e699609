//! Seasonal spending levels across the calendar year.

use serde::{Deserialize, Serialize};

use crate::Expense;

const MONTHS_IN_YEAR: usize = 12;

/// The average spending level of one calendar month, across every year of
/// data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityPoint {
    /// Calendar month number, 1 (January) through 12 (December).
    pub month: u8,
    /// Mean expense amount recorded in the month.
    pub average_expense: f64,
    /// The month's average relative to one twelfth of all spending;
    /// 1.0 marks a typical month.
    pub seasonal_index: f64,
}

/// Profile how spending varies across the calendar year.
///
/// Expenses from every year pool into twelve calendar-month buckets, so all
/// the Augusts on record merge into one point. The baseline spreads the
/// grand total evenly across 12 months; the seasonal index compares each
/// month's average expense to that even-spending baseline, not to the
/// average transaction size.
///
/// Always returns exactly 12 points, January through December. Months with
/// no data average 0, and when there is no spending at all every index
/// falls back to the neutral 1.0.
pub fn seasonality(expenses: &[Expense]) -> Vec<SeasonalityPoint> {
    let mut sums = [0i64; MONTHS_IN_YEAR];
    let mut counts = [0usize; MONTHS_IN_YEAR];

    for expense in expenses {
        let index = expense.date.month() as usize - 1;
        sums[index] += expense.amount;
        counts[index] += 1;
    }

    let overall_average = sums.iter().sum::<i64>() as f64 / MONTHS_IN_YEAR as f64;

    (0..MONTHS_IN_YEAR)
        .map(|index| {
            let average_expense = if counts[index] == 0 {
                0.0
            } else {
                sums[index] as f64 / counts[index] as f64
            };
            let seasonal_index = if overall_average == 0.0 {
                1.0
            } else {
                average_expense / overall_average
            };

            SeasonalityPoint {
                month: index as u8 + 1,
                average_expense,
                seasonal_index,
            }
        })
        .collect()
}
