//! Flags expenses that are statistical outliers against spending history.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Expense;

/// z-score at or above which a category outlier is flagged high severity.
const Z_SCORE_HIGH: f64 = 3.0;
/// z-score at or above which a category outlier is flagged medium severity.
const Z_SCORE_MEDIUM: f64 = 2.5;
/// z-score at or above which a category outlier is flagged low severity.
const Z_SCORE_LOW: f64 = 2.0;
/// Multiple of the overall mean expense at or above which a single
/// transaction is flagged, whatever its category's spread.
const OVERALL_MEAN_MULTIPLIER: f64 = 5.0;

/// How unusual a flagged expense is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// At least 2 standard deviations from the category mean.
    Low,
    /// At least 2.5 standard deviations from the category mean.
    Medium,
    /// At least 3 standard deviations from the category mean, or beyond
    /// 5 times the overall average expense.
    High,
}

/// An expense flagged as a statistical outlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// The date of the flagged expense.
    pub date: Date,
    /// The category of the flagged expense.
    pub category: String,
    /// The amount of the flagged expense.
    pub amount: i64,
    /// A human-readable explanation of why the expense was flagged.
    pub reason: String,
    /// How unusual the expense is.
    pub severity: Severity,
}

/// Mean and population standard deviation of a category's amounts.
struct CategoryStats {
    mean: f64,
    std_dev: f64,
}

fn category_statistics(expenses: &[Expense]) -> HashMap<&str, CategoryStats> {
    let mut amounts_by_category: HashMap<&str, Vec<f64>> = HashMap::new();

    for expense in expenses {
        amounts_by_category
            .entry(&expense.category)
            .or_default()
            .push(expense.amount as f64);
    }

    amounts_by_category
        .into_iter()
        .map(|(category, amounts)| {
            let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
            let variance = amounts
                .iter()
                .map(|amount| (amount - mean).powi(2))
                .sum::<f64>()
                / amounts.len() as f64;

            (
                category,
                CategoryStats {
                    mean,
                    std_dev: variance.sqrt(),
                },
            )
        })
        .collect()
}

/// Record `anomaly` under its (date, category, amount) key, keeping the
/// higher-severity reason when both detection rules fire for one expense.
fn record_anomaly<'a>(
    flagged: &mut HashMap<(Date, &'a str, i64), Anomaly>,
    key: (Date, &'a str, i64),
    anomaly: Anomaly,
) {
    match flagged.get_mut(&key) {
        Some(existing) if existing.severity >= anomaly.severity => {}
        Some(existing) => *existing = anomaly,
        None => {
            flagged.insert(key, anomaly);
        }
    }
}

/// Flag the outliers in `month_expenses` against the spending history in
/// `historical_expenses`.
///
/// Two complementary rules run independently:
/// - an expense at least 2 standard deviations from its category's
///   historical mean is flagged, with severity rising at 2.5 and 3
///   deviations; a category whose history never varies (zero standard
///   deviation) produces no z-score flags, however large the amount;
/// - an expense of at least 5 times the overall mean expense across the
///   whole history is flagged high severity, whatever its category's
///   spread.
///
/// The first rule catches "this category usually costs little and this is
/// unusually much"; the second catches a single transaction that dwarfs
/// everything else. An expense flagged by both rules (or recorded twice
/// with the same date, category, and amount) appears once, keeping the
/// higher-severity reason. The result is sorted by descending amount.
///
/// An empty history yields no anomalies: there is no baseline to deviate
/// from.
pub fn detect_anomalies(
    month_expenses: &[Expense],
    historical_expenses: &[Expense],
) -> Vec<Anomaly> {
    let statistics = category_statistics(historical_expenses);
    let overall_mean = if historical_expenses.is_empty() {
        0.0
    } else {
        historical_expenses
            .iter()
            .map(|expense| expense.amount as f64)
            .sum::<f64>()
            / historical_expenses.len() as f64
    };

    let mut flagged: HashMap<(Date, &str, i64), Anomaly> = HashMap::new();

    for expense in month_expenses {
        let key = (expense.date, expense.category.as_str(), expense.amount);

        if let Some(stats) = statistics.get(expense.category.as_str())
            && stats.std_dev > 0.0
        {
            let z_score = (expense.amount as f64 - stats.mean).abs() / stats.std_dev;
            let severity = if z_score >= Z_SCORE_HIGH {
                Some(Severity::High)
            } else if z_score >= Z_SCORE_MEDIUM {
                Some(Severity::Medium)
            } else if z_score >= Z_SCORE_LOW {
                Some(Severity::Low)
            } else {
                None
            };

            if let Some(severity) = severity {
                let deviations = match severity {
                    Severity::High => "3",
                    Severity::Medium => "2.5",
                    Severity::Low => "2",
                };
                record_anomaly(
                    &mut flagged,
                    key,
                    Anomaly {
                        date: expense.date,
                        category: expense.category.clone(),
                        amount: expense.amount,
                        reason: format!(
                            "amount is more than {deviations} standard deviations from the {} average",
                            expense.category
                        ),
                        severity,
                    },
                );
            }
        }

        if overall_mean > 0.0 && expense.amount as f64 >= OVERALL_MEAN_MULTIPLIER * overall_mean {
            record_anomaly(
                &mut flagged,
                key,
                Anomaly {
                    date: expense.date,
                    category: expense.category.clone(),
                    amount: expense.amount,
                    reason: "amount is more than 5 times the overall average expense".to_owned(),
                    severity: Severity::High,
                },
            );
        }
    }

    let mut anomalies: Vec<Anomaly> = flagged.into_values().collect();
    anomalies.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.category.cmp(&b.category))
    });

    anomalies
}

#[cfg(test)]
mod tests {
    use time::{Date, macros::date};

    use super::{Severity, detect_anomalies};
    use crate::Expense;

    fn create_expense(amount: i64, date: Date, category: &str) -> Expense {
        Expense::build(amount, date, category.to_owned())
            .finalize(format!("{category}-{date}-{amount}"))
            .unwrap()
    }

    /// History for the 娯楽 category with mean 1000 and population standard
    /// deviation 200.
    fn entertainment_history() -> Vec<Expense> {
        vec![
            create_expense(800, date!(2024 - 06 - 10), "娯楽"),
            create_expense(1200, date!(2024 - 07 - 10), "娯楽"),
        ]
    }

    #[test]
    fn flags_high_severity_at_three_deviations() {
        let month = vec![create_expense(2000, date!(2024 - 09 - 15), "娯楽")];

        let anomalies = detect_anomalies(&month, &entertainment_history());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].amount, 2000);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!(anomalies[0].reason.contains("3 standard deviations"));
    }

    #[test]
    fn flags_medium_severity_between_two_and_a_half_and_three_deviations() {
        // z = |1540 - 1000| / 200 = 2.7
        let month = vec![create_expense(1540, date!(2024 - 09 - 15), "娯楽")];

        let anomalies = detect_anomalies(&month, &entertainment_history());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Medium);
    }

    #[test]
    fn flags_low_severity_between_two_and_two_and_a_half_deviations() {
        // z = |1450 - 1000| / 200 = 2.25
        let month = vec![create_expense(1450, date!(2024 - 09 - 15), "娯楽")];

        let anomalies = detect_anomalies(&month, &entertainment_history());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::Low);
    }

    #[test]
    fn does_not_flag_below_two_deviations() {
        // z = |1300 - 1000| / 200 = 1.5
        let month = vec![create_expense(1300, date!(2024 - 09 - 15), "娯楽")];

        let anomalies = detect_anomalies(&month, &entertainment_history());

        assert!(anomalies.is_empty());
    }

    #[test]
    fn constant_category_history_never_produces_z_score_flags() {
        let history = vec![
            create_expense(50000, date!(2024 - 07 - 01), "家賃"),
            create_expense(50000, date!(2024 - 08 - 01), "家賃"),
        ];
        // Well above the category's (constant) history, but below 5 times
        // the overall mean of 50000.
        let month = vec![create_expense(60000, date!(2024 - 09 - 01), "家賃")];

        let anomalies = detect_anomalies(&month, &history);

        assert!(anomalies.is_empty());
    }

    #[test]
    fn flags_expenses_beyond_five_times_the_overall_mean() {
        let history = vec![
            create_expense(30000, date!(2024 - 08 - 05), "食費"),
            create_expense(42300, date!(2024 - 08 - 20), "日用品"),
        ];
        // Overall mean 36150; the threshold is 180750. A category unseen in
        // the history has no z-score baseline, so only the overall rule can
        // catch this.
        let month = vec![create_expense(200000, date!(2024 - 09 - 12), "家具")];

        let anomalies = detect_anomalies(&month, &history);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].amount, 200000);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!(anomalies[0].reason.contains("5 times the overall average"));
    }

    #[test]
    fn expense_matching_both_rules_appears_once_with_high_severity() {
        // 家電 history: mean 200, standard deviation 100. Overall mean 200,
        // so 1500 is both 13 deviations out and 7.5 times the overall mean.
        let history = vec![
            create_expense(100, date!(2024 - 07 - 03), "家電"),
            create_expense(300, date!(2024 - 08 - 03), "家電"),
        ];
        let month = vec![create_expense(1500, date!(2024 - 09 - 03), "家電")];

        let anomalies = detect_anomalies(&month, &history);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, Severity::High);
    }

    #[test]
    fn identical_transactions_collapse_to_one_entry() {
        let month = vec![
            create_expense(2000, date!(2024 - 09 - 15), "娯楽"),
            create_expense(2000, date!(2024 - 09 - 15), "娯楽"),
        ];

        let anomalies = detect_anomalies(&month, &entertainment_history());

        assert_eq!(anomalies.len(), 1);
    }

    #[test]
    fn sorts_by_descending_amount() {
        let history = vec![
            create_expense(900, date!(2024 - 06 - 10), "娯楽"),
            create_expense(1100, date!(2024 - 07 - 10), "娯楽"),
            create_expense(400, date!(2024 - 06 - 12), "食費"),
            create_expense(600, date!(2024 - 07 - 12), "食費"),
        ];
        // 娯楽: mean 1000, deviation 100; 食費: mean 500, deviation 100.
        let month = vec![
            create_expense(1400, date!(2024 - 09 - 05), "娯楽"),
            create_expense(900, date!(2024 - 09 - 06), "食費"),
        ];

        let anomalies = detect_anomalies(&month, &history);

        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].amount, 1400);
        assert_eq!(anomalies[1].amount, 900);
    }

    #[test]
    fn empty_history_produces_no_anomalies() {
        let month = vec![create_expense(1000000, date!(2024 - 09 - 15), "家具")];

        let anomalies = detect_anomalies(&month, &[]);

        assert!(anomalies.is_empty());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::High).unwrap(),
            "\"high\""
        );
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
    }
}
