//! Expense analytics for a shared household budgeting app.
//!
//! Callers load a group's full expense history from their document store
//! and hand it to this crate as a slice of [Expense] records. Everything
//! here is a pure, synchronous computation over that slice: category
//! breakdowns, monthly trends, budget variances, statistical outlier
//! detection, seasonality profiles, and day-of-week spending patterns,
//! composed into a [MonthlyReport] by [analyze_month] and optionally
//! memoized for an hour in a [ReportCache].
//!
//! Storage, authentication, and rendering live elsewhere; so does category
//! normalization. Records arrive with their category labels already
//! canonical, and the analytics group by exact string match.
//!
//! ```rust
//! use kakeibo_analytics::{Expense, analyze_month, parse_date};
//!
//! let expenses = vec![
//!     Expense::build(50000, parse_date("2024-09-01")?, "家賃".to_owned()).finalize("a1")?,
//!     Expense::build(1200, parse_date("2024-09-02")?, "食費".to_owned()).finalize("a2")?,
//! ];
//!
//! let report = analyze_month(&expenses, "2024-09".parse()?, Some(100_000));
//!
//! assert_eq!(report.total_expense, 51_200);
//! assert_eq!(report.fixed_expense, 50_000);
//! assert!(!report.budget_comparison.unwrap().is_over_budget);
//! # Ok::<(), kakeibo_analytics::Error>(())
//! ```

#![warn(missing_docs)]

mod analysis;
mod anomaly;
mod breakdown;
mod budget;
mod cache;
mod expense;
mod fixed_categories;
mod month;
mod patterns;
mod seasonality;
mod trend;

pub use analysis::{MonthlyReport, TREND_WINDOW_MONTHS, analyze_month};
pub use anomaly::{Anomaly, Severity, detect_anomalies};
pub use breakdown::{CategorySummary, category_breakdown};
pub use budget::{BudgetComparison, compare_budget};
pub use cache::{Clock, ReportCache, SystemClock, report_cache_key};
pub use expense::{Expense, ExpenseBuilder, parse_date};
pub use fixed_categories::{FIXED_CATEGORIES, is_fixed_category};
pub use month::YearMonth;
pub use patterns::{SpendingPattern, spending_patterns};
pub use seasonality::{SeasonalityPoint, seasonality};
pub use trend::{TrendPoint, monthly_trend};

/// The errors that may occur in the analytics engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A date string was not a valid `YYYY-MM-DD` calendar date.
    ///
    /// Callers should pass in the original parsing error as a string and
    /// the date string that caused it. Dates are validated once at
    /// ingestion so that a malformed date cannot silently fall outside
    /// every month bucket.
    #[error("could not parse date string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// A month key was not in zero-padded `YYYY-MM` form.
    #[error("could not parse month key \"{0}\"")]
    InvalidMonthKey(String),

    /// A negative amount was used to create an expense.
    ///
    /// Expenses record money spent; amounts are magnitudes in the smallest
    /// whole currency unit, therefore negative values are not allowed.
    #[error("{0} is a negative amount, which is not allowed")]
    NegativeAmount(i64),

    /// An empty string was used as an expense category.
    #[error("expense category cannot be empty")]
    EmptyCategory,

    /// Could not acquire the report cache lock.
    #[error("could not acquire the report cache lock")]
    CacheLock,
}
