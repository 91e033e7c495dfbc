use chrono::NaiveDate;

use crate::insights::policy::{INSIGHTS_POLICY_V1, InsightPolicy};
use crate::insights::types::{Budget, LedgerTransaction, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStatus {
    Under,
    Warning,
    Over,
}

impl BudgetStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Under => "under",
            Self::Warning => "warning",
            Self::Over => "over",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BudgetProgress {
    pub budget_id: String,
    pub category_id: String,
    pub category: Option<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub budget_amount: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub status: BudgetStatus,
}

pub fn budget_progress(
    budget: &Budget,
    transactions: &[LedgerTransaction],
    as_of: NaiveDate,
) -> BudgetProgress {
    budget_progress_with_policy(budget, transactions, as_of, INSIGHTS_POLICY_V1)
}

fn budget_progress_with_policy(
    budget: &Budget,
    transactions: &[LedgerTransaction],
    as_of: NaiveDate,
    policy: InsightPolicy,
) -> BudgetProgress {
    let (window_start, window_end) = budget.period.window(as_of);

    let spent = transactions
        .iter()
        .filter(|transaction| {
            transaction.category_id.as_deref() == Some(budget.category_id.as_str())
                && transaction.posted_at >= window_start
                && transaction.posted_at <= window_end
                && transaction.is_expense()
        })
        .map(LedgerTransaction::abs_amount)
        .sum::<f64>();

    let remaining = budget.amount - spent;
    // A zero or negative limit has no meaningful fill ratio; report 0 instead
    // of dividing by zero.
    let percentage = if budget.amount > 0.0 {
        ((spent / budget.amount) * 100.0).min(100.0)
    } else {
        0.0
    };

    let status = if percentage >= policy.budget_over_percentage {
        BudgetStatus::Over
    } else if percentage >= policy.budget_warning_percentage {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Under
    };

    BudgetProgress {
        budget_id: budget.budget_id.clone(),
        category_id: budget.category_id.clone(),
        category: budget.category.clone(),
        window_start,
        window_end,
        budget_amount: budget.amount,
        spent: round_to(spent, 2),
        remaining: round_to(remaining, 2),
        percentage: round_to(percentage, 1),
        status,
    }
}
