//! Compares actual spending against a target budget.

use serde::{Deserialize, Serialize};

/// The outcome of comparing spending against a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    /// The target budget.
    pub budget_amount: i64,
    /// What was actually spent.
    pub actual_amount: i64,
    /// Actual minus budget; positive when over budget.
    pub variance: i64,
    /// The variance as a percentage of the budget, or 0 when the budget is
    /// not positive.
    pub variance_percentage: f64,
    /// Whether spending exceeded the budget.
    pub is_over_budget: bool,
}

/// Compare an actual spending total against a target budget.
///
/// A budget of zero (or less) cannot meaningfully scale the variance, so
/// `variance_percentage` is reported as 0 in that case rather than failing
/// on the division.
pub fn compare_budget(actual: i64, budget: i64) -> BudgetComparison {
    let variance = actual - budget;
    let variance_percentage = if budget > 0 {
        variance as f64 / budget as f64 * 100.0
    } else {
        0.0
    };

    BudgetComparison {
        budget_amount: budget,
        actual_amount: actual,
        variance,
        variance_percentage,
        is_over_budget: variance > 0,
    }
}
