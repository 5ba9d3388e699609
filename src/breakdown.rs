//! Groups expenses by category into totals, counts, and percentage shares.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Expense, fixed_categories::is_fixed_category};

/// The share of spending that went to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The canonical category name.
    pub category: String,
    /// Total spend in the category.
    pub amount: i64,
    /// How many expenses the category contains.
    pub count: usize,
    /// The category's share of all spending in the input set, 0–100.
    pub percentage: f64,
    /// Whether the category is a recurring fixed cost.
    pub is_fixed: bool,
}

/// Break a set of expenses down into per-category summaries.
///
/// Summaries are sorted by descending amount; categories with equal totals
/// keep the order they first appeared in. For a non-empty input the
/// percentages sum to 100 (within floating-point error). An empty input
/// yields an empty list, and an input whose amounts are all zero reports
/// every percentage as 0.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<CategorySummary> {
    let total: i64 = expenses.iter().map(|expense| expense.amount).sum();

    let mut summaries: Vec<CategorySummary> = Vec::new();
    let mut indices: HashMap<&str, usize> = HashMap::new();

    for expense in expenses {
        match indices.get(expense.category.as_str()) {
            Some(&index) => {
                summaries[index].amount += expense.amount;
                summaries[index].count += 1;
            }
            None => {
                indices.insert(&expense.category, summaries.len());
                summaries.push(CategorySummary {
                    category: expense.category.clone(),
                    amount: expense.amount,
                    count: 1,
                    percentage: 0.0,
                    is_fixed: is_fixed_category(&expense.category),
                });
            }
        }
    }

    if total > 0 {
        for summary in &mut summaries {
            summary.percentage = summary.amount as f64 / total as f64 * 100.0;
        }
    }

    // Vec::sort_by is stable, so equal amounts keep first-seen order.
    summaries.sort_by(|a, b| b.amount.cmp(&a.amount));

    summaries
}
