//! Builds the chronological monthly series behind the spending trend chart.

use serde::{Deserialize, Serialize};

use crate::{Expense, YearMonth, fixed_categories::is_fixed_category};

/// How many consecutive monthly totals feed each moving-average value.
const MOVING_AVERAGE_WINDOW: usize = 3;

/// One month of the spending trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The month the point describes.
    pub month: YearMonth,
    /// All spending in the month.
    pub total_expense: i64,
    /// Spending in recurring fixed categories.
    pub fixed_expense: i64,
    /// Discretionary spending: total minus fixed.
    pub variable_expense: i64,
    /// Mean of this and the two preceding totals, rounded to the nearest
    /// whole unit. Unset for the first two points, which have too little
    /// history behind them.
    pub moving_average: Option<i64>,
}

/// Build the `months` consecutive trend points ending at `target`.
///
/// Each point totals the expenses whose dates fall in its month; months
/// with no expenses yield zeroed points rather than gaps, so the series
/// always has exactly `months` entries (clamped to at least 1).
pub fn monthly_trend(expenses: &[Expense], target: YearMonth, months: usize) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = target
        .trailing_window(months.max(1))
        .into_iter()
        .map(|month| {
            let mut total = 0;
            let mut fixed = 0;

            for expense in expenses
                .iter()
                .filter(|expense| month.contains(expense.date))
            {
                total += expense.amount;
                if is_fixed_category(&expense.category) {
                    fixed += expense.amount;
                }
            }

            TrendPoint {
                month,
                total_expense: total,
                fixed_expense: fixed,
                variable_expense: total - fixed,
                moving_average: None,
            }
        })
        .collect();

    for index in (MOVING_AVERAGE_WINDOW - 1)..points.len() {
        let window_total: i64 = points[index + 1 - MOVING_AVERAGE_WINDOW..=index]
            .iter()
            .map(|point| point.total_expense)
            .sum();
        points[index].moving_average =
            Some((window_total as f64 / MOVING_AVERAGE_WINDOW as f64).round() as i64);
    }

    points
}
