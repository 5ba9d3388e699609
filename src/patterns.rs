//! Day-of-week spending habits.

use serde::{Deserialize, Serialize};

use crate::Expense;

const DAYS_IN_WEEK: usize = 7;

/// How many categories a day's ranking keeps.
const PEAK_CATEGORY_LIMIT: usize = 3;

/// Spending habits for one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPattern {
    /// Day of the week, 0 (Sunday) through 6 (Saturday).
    pub day_of_week: u8,
    /// Mean expense amount recorded on the day.
    pub average_amount: f64,
    /// How many expenses were recorded on the day.
    pub frequency: usize,
    /// Up to three categories, ranked by how often they occur on the day.
    /// Categories tied on occurrences keep first-seen order.
    pub peak_categories: Vec<String>,
}

/// Profile spending by day of the week.
///
/// Always returns exactly 7 points, Sunday through Saturday. Days with no
/// expenses report a zero average, zero frequency, and no peak categories.
pub fn spending_patterns(expenses: &[Expense]) -> Vec<SpendingPattern> {
    let mut sums = [0i64; DAYS_IN_WEEK];
    let mut counts = [0usize; DAYS_IN_WEEK];
    let mut category_counts: [Vec<(String, usize)>; DAYS_IN_WEEK] =
        std::array::from_fn(|_| Vec::new());

    for expense in expenses {
        let index = expense.date.weekday().number_days_from_sunday() as usize;
        sums[index] += expense.amount;
        counts[index] += 1;

        match category_counts[index]
            .iter_mut()
            .find(|(category, _)| *category == expense.category)
        {
            Some((_, count)) => *count += 1,
            None => category_counts[index].push((expense.category.clone(), 1)),
        }
    }

    category_counts
        .into_iter()
        .enumerate()
        .map(|(index, mut categories)| {
            // Stable sort, so ties keep insertion (first-seen) order.
            categories.sort_by(|a, b| b.1.cmp(&a.1));

            SpendingPattern {
                day_of_week: index as u8,
                average_amount: if counts[index] == 0 {
                    0.0
                } else {
                    sums[index] as f64 / counts[index] as f64
                },
                frequency: counts[index],
                peak_categories: categories
                    .into_iter()
                    .take(PEAK_CATEGORY_LIMIT)
                    .map(|(category, _)| category)
                    .collect(),
            }
        })
        .collect()
}
