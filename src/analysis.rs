//! Builds the monthly analytics report shown on a group's dashboard.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{
    Expense, YearMonth,
    anomaly::{Anomaly, detect_anomalies},
    breakdown::{CategorySummary, category_breakdown},
    budget::{BudgetComparison, compare_budget},
    fixed_categories::is_fixed_category,
    trend::{TrendPoint, monthly_trend},
};

/// How many months of history feed the report's trend series.
pub const TREND_WINDOW_MONTHS: usize = 6;

/// Analysis runs longer than this get a warning in the logs. Advisory
/// only; the run is never cut short.
const SLOW_ANALYSIS_THRESHOLD: Duration = Duration::from_millis(2000);

/// Everything the dashboard needs to describe one month of spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// The month the report describes.
    pub month: YearMonth,
    /// All spending in the month.
    pub total_expense: i64,
    /// Spending in recurring fixed categories.
    pub fixed_expense: i64,
    /// Discretionary spending: total minus fixed.
    pub variable_expense: i64,
    /// Per-category totals and shares, largest first.
    pub category_breakdown: Vec<CategorySummary>,
    /// The trailing six-month spending trend ending at this month.
    pub monthly_trend: Vec<TrendPoint>,
    /// How spending compares to the target budget, when one was given.
    pub budget_comparison: Option<BudgetComparison>,
    /// Percentage change in total spending versus the previous calendar
    /// month, or 0 when the previous month has no spending to compare
    /// against.
    pub month_over_month_growth: f64,
    /// Total spending divided by the number of calendar days in the month.
    pub average_daily_expense: f64,
    /// Expenses flagged as statistical outliers, largest first.
    pub anomalies: Vec<Anomaly>,
}

/// Analyze one month of spending against the full expense history.
///
/// `expenses` is the caller's complete in-memory expense collection; the
/// report covers the records falling in `month`, while trend, growth, and
/// anomaly baselines draw on the whole collection (the target month
/// included). A month with no expenses produces a well-formed zeroed
/// report rather than an error.
///
/// This is a pure computation: identical inputs produce identical reports,
/// which is what makes the result safe to memoize in a
/// [ReportCache](crate::ReportCache).
pub fn analyze_month(
    expenses: &[Expense],
    month: YearMonth,
    budget: Option<i64>,
) -> MonthlyReport {
    let started = Instant::now();

    let month_expenses: Vec<Expense> = expenses
        .iter()
        .filter(|expense| month.contains(expense.date))
        .cloned()
        .collect();

    let total_expense: i64 = month_expenses.iter().map(|expense| expense.amount).sum();
    let fixed_expense: i64 = month_expenses
        .iter()
        .filter(|expense| is_fixed_category(&expense.category))
        .map(|expense| expense.amount)
        .sum();

    let previous_month = month.previous();
    let previous_total: i64 = expenses
        .iter()
        .filter(|expense| previous_month.contains(expense.date))
        .map(|expense| expense.amount)
        .sum();
    let month_over_month_growth = if previous_total == 0 {
        0.0
    } else {
        (total_expense - previous_total) as f64 / previous_total as f64 * 100.0
    };

    let report = MonthlyReport {
        month,
        total_expense,
        fixed_expense,
        variable_expense: total_expense - fixed_expense,
        category_breakdown: category_breakdown(&month_expenses),
        monthly_trend: monthly_trend(expenses, month, TREND_WINDOW_MONTHS),
        budget_comparison: budget.map(|budget| compare_budget(total_expense, budget)),
        month_over_month_growth,
        average_daily_expense: total_expense as f64 / f64::from(month.days()),
        anomalies: detect_anomalies(&month_expenses, expenses),
    };

    let elapsed = started.elapsed();
    if elapsed > SLOW_ANALYSIS_THRESHOLD {
        tracing::warn!(
            "monthly analysis for {month} took {elapsed:?} over {} expenses",
            expenses.len()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use super::analyze_month;
    use crate::{Expense, Severity, YearMonth};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    fn create_expense(amount: i64, date: Date, category: &str) -> Expense {
        Expense::build(amount, date, category.to_owned())
            .finalize(format!("{category}-{date}-{amount}"))
            .unwrap()
    }

    /// Two months of household data: August totals 81000 (65000 fixed,
    /// 16000 variable), September totals 280500 including a 200000 outlier.
    fn sample_expenses() -> Vec<Expense> {
        vec![
            create_expense(50000, date!(2024 - 08 - 01), "家賃"),
            create_expense(8000, date!(2024 - 08 - 05), "水道光熱費"),
            create_expense(7000, date!(2024 - 08 - 10), "通信費"),
            create_expense(10000, date!(2024 - 08 - 15), "食費"),
            create_expense(6000, date!(2024 - 08 - 20), "娯楽"),
            create_expense(50000, date!(2024 - 09 - 01), "家賃"),
            create_expense(8500, date!(2024 - 09 - 05), "水道光熱費"),
            create_expense(7000, date!(2024 - 09 - 10), "通信費"),
            create_expense(15000, date!(2024 - 09 - 15), "食費"),
            create_expense(200000, date!(2024 - 09 - 12), "家具"),
        ]
    }

    fn september() -> YearMonth {
        "2024-09".parse().unwrap()
    }

    #[test]
    fn splits_month_totals_into_fixed_and_variable() {
        let august: YearMonth = "2024-08".parse().unwrap();

        let report = analyze_month(&sample_expenses(), august, None);

        assert_eq!(report.total_expense, 81000);
        assert_eq!(report.fixed_expense, 65000);
        assert_eq!(report.variable_expense, 16000);
        assert_eq!(report.budget_comparison, None);
    }

    #[test]
    fn reports_an_over_budget_month_with_its_outlier() {
        init_tracing();

        let report = analyze_month(&sample_expenses(), september(), Some(100000));

        assert_eq!(report.total_expense, 280500);

        let budget = report.budget_comparison.expect("budget was provided");
        assert!(budget.is_over_budget);
        assert_eq!(budget.variance, 180500);

        let expected_growth = (280500.0 - 81000.0) / 81000.0 * 100.0;
        assert!((report.month_over_month_growth - expected_growth).abs() < 1e-9);

        assert!(
            report
                .anomalies
                .iter()
                .any(|anomaly| anomaly.amount == 200000 && anomaly.severity == Severity::High)
        );
    }

    #[test]
    fn averages_spending_over_the_calendar_days_of_the_month() {
        let report = analyze_month(&sample_expenses(), september(), None);

        // September has 30 days.
        assert!((report.average_daily_expense - 9350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trend_covers_six_months_ending_at_the_target() {
        let report = analyze_month(&sample_expenses(), september(), None);

        assert_eq!(report.monthly_trend.len(), 6);
        assert_eq!(report.monthly_trend[0].month.to_string(), "2024-04");
        assert_eq!(report.monthly_trend[5].month.to_string(), "2024-09");
        assert_eq!(report.monthly_trend[4].total_expense, 81000);
        assert_eq!(report.monthly_trend[5].total_expense, 280500);
    }

    #[test]
    fn growth_is_zero_without_a_previous_month() {
        let expenses = vec![create_expense(1200, date!(2024 - 09 - 02), "食費")];

        let report = analyze_month(&expenses, september(), None);

        assert_eq!(report.month_over_month_growth, 0.0);
    }

    #[test]
    fn empty_collection_yields_a_zeroed_report() {
        let report = analyze_month(&[], september(), None);

        assert_eq!(report.total_expense, 0);
        assert_eq!(report.fixed_expense, 0);
        assert_eq!(report.variable_expense, 0);
        assert!(report.category_breakdown.is_empty());
        assert_eq!(report.monthly_trend.len(), 6);
        assert_eq!(report.month_over_month_growth, 0.0);
        assert_eq!(report.average_daily_expense, 0.0);
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn analysis_is_deterministic() {
        let expenses = sample_expenses();

        let first = analyze_month(&expenses, september(), Some(100000));
        let second = analyze_month(&expenses, september(), Some(100000));

        assert_eq!(first, second);
    }
}
