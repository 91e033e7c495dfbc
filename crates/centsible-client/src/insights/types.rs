use chrono::NaiveDate;

use crate::insights::date::BudgetPeriod;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Display name for the filter echo; matching happens on `category_id`.
    pub category: Option<String>,
    pub category_id: Option<String>,
}

/// A transaction as the analyzers see it: amount is signed, negative means
/// money out, and the joined category name may be absent.
#[derive(Debug, Clone)]
pub struct LedgerTransaction {
    pub txn_id: String,
    pub posted_at: NaiveDate,
    pub amount: f64,
    pub category_id: Option<String>,
    pub category: Option<String>,
    pub description: String,
}

impl LedgerTransaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED_LABEL)
    }
}

/// Half-away-from-zero rounding for reported amounts and percentages.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = i32::try_from(decimals).unwrap_or(2);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}

#[derive(Debug, Clone)]
pub struct Budget {
    pub budget_id: String,
    pub category_id: String,
    pub category: Option<String>,
    pub amount: f64,
    pub period: BudgetPeriod,
}
