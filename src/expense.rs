//! The expense record supplied by callers, and its ingestion-time validation.

use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

/// The calendar format expense dates arrive in, e.g. `2024-09-15`.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date string into a [Date].
///
/// Expense records arrive from a document store with string-typed dates.
/// Validating them here once, at ingestion, means the aggregations never
/// have to worry about malformed dates silently matching no month.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `value` is not a valid calendar
/// date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> Result<Date, Error> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), value.to_owned()))
}

/// A single household expense, already categorized.
///
/// The category label is normalized upstream before a record reaches this
/// crate; the analytics group by exact string match and apply no
/// normalization of their own.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// An opaque identifier that uniquely names the expense.
    pub id: String,
    /// How much money was spent, in the smallest whole currency unit
    /// (whole yen in the deployed app). Never negative.
    pub amount: i64,
    /// The calendar date the expense happened on.
    pub date: Date,
    /// The canonical spending category, e.g. "食費".
    pub category: String,
    /// A free-text note describing the purchase. Carried through untouched.
    #[serde(default)]
    pub description: String,
    /// Which household member paid. Carried through untouched.
    #[serde(default)]
    pub paid_by: Option<String>,
    /// Whether the group has confirmed the expense. Carried through
    /// untouched.
    #[serde(default)]
    pub confirmed: bool,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(amount: i64, date: Date, category: String) -> ExpenseBuilder {
        ExpenseBuilder {
            amount,
            date,
            category,
            description: String::new(),
            paid_by: None,
            confirmed: false,
        }
    }
}

/// A builder for creating [Expense] instances.
///
/// Required fields are set up front; presentation-only fields default to
/// empty and can be filled in step by step. Call `finalize()` to validate
/// the record and create the actual [Expense].
///
/// # Examples
///
/// ```rust
/// use kakeibo_analytics::{Expense, parse_date};
///
/// let expense = Expense::build(1200, parse_date("2024-09-15")?, "食費".to_owned())
///     .description("スーパーで買い物".to_owned())
///     .paid_by(Some("akiko".to_owned()))
///     .finalize("expense-01")?;
/// # Ok::<(), kakeibo_analytics::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// The monetary magnitude of the expense, in the smallest whole
    /// currency unit. Income is not recorded here, so the amount must not
    /// be negative.
    pub amount: i64,
    /// The date the expense happened on.
    pub date: Date,
    /// The canonical category label. Must not be empty.
    pub category: String,
    /// A free-text note describing the purchase.
    pub description: String,
    /// Which household member paid.
    pub paid_by: Option<String>,
    /// Whether the group has confirmed the expense.
    pub confirmed: bool,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// Set which household member paid for the expense.
    pub fn paid_by(mut self, paid_by: Option<String>) -> Self {
        self.paid_by = paid_by;
        self
    }

    /// Mark whether the group has confirmed the expense.
    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Build the final [Expense] instance.
    ///
    /// # Errors
    /// Returns [Error::NegativeAmount] if the amount is negative, or
    /// [Error::EmptyCategory] if the category label is an empty string.
    pub fn finalize(self, id: impl Into<String>) -> Result<Expense, Error> {
        if self.amount < 0 {
            return Err(Error::NegativeAmount(self.amount));
        }

        if self.category.is_empty() {
            return Err(Error::EmptyCategory);
        }

        Ok(Expense {
            id: id.into(),
            amount: self.amount,
            date: self.date,
            category: self.category,
            description: self.description,
            paid_by: self.paid_by,
            confirmed: self.confirmed,
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{Expense, parse_date};
    use crate::Error;

    #[test]
    fn builder_fills_in_presentation_fields() {
        let expense = Expense::build(1200, date!(2024 - 09 - 15), "食費".to_owned())
            .description("スーパーで買い物".to_owned())
            .paid_by(Some("akiko".to_owned()))
            .confirmed(true)
            .finalize("expense-01")
            .unwrap();

        assert_eq!(expense.id, "expense-01");
        assert_eq!(expense.amount, 1200);
        assert_eq!(expense.date, date!(2024 - 09 - 15));
        assert_eq!(expense.category, "食費");
        assert_eq!(expense.description, "スーパーで買い物");
        assert_eq!(expense.paid_by.as_deref(), Some("akiko"));
        assert!(expense.confirmed);
    }

    #[test]
    fn builder_defaults_presentation_fields() {
        let expense = Expense::build(500, date!(2024 - 09 - 15), "娯楽".to_owned())
            .finalize("expense-02")
            .unwrap();

        assert_eq!(expense.description, "");
        assert_eq!(expense.paid_by, None);
        assert!(!expense.confirmed);
    }

    #[test]
    fn rejects_negative_amounts() {
        let result = Expense::build(-1, date!(2024 - 09 - 15), "食費".to_owned()).finalize("bad");

        assert_eq!(result, Err(Error::NegativeAmount(-1)));
    }

    #[test]
    fn rejects_empty_categories() {
        let result = Expense::build(500, date!(2024 - 09 - 15), String::new()).finalize("bad");

        assert_eq!(result, Err(Error::EmptyCategory));
    }

    #[test]
    fn parses_well_formed_dates() {
        assert_eq!(parse_date("2024-09-15"), Ok(date!(2024 - 09 - 15)));
        assert_eq!(parse_date("2024-02-29"), Ok(date!(2024 - 02 - 29)));
    }

    #[test]
    fn rejects_malformed_dates() {
        for value in ["2024-13-40", "2024-9-5", "15/09/2024", "2023-02-29", ""] {
            match parse_date(value) {
                Err(Error::InvalidDateFormat(_, input)) => assert_eq!(input, value),
                other => panic!("expected InvalidDateFormat for {value:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn serializes_dates_in_calendar_form() {
        let expense = Expense::build(1200, date!(2024 - 09 - 15), "食費".to_owned())
            .finalize("expense-01")
            .unwrap();

        let json = serde_json::to_value(&expense).unwrap();
        assert_eq!(json["date"], "2024-09-15");

        let roundtripped: Expense = serde_json::from_value(json).unwrap();
        assert_eq!(roundtripped, expense);
    }
}
