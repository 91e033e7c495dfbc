use std::path::{Path, PathBuf};

use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{BudgetProgressData, BudgetProgressRow};
use crate::insights::date::{format_iso_date, resolve_as_of};
use crate::insights::progress::budget_progress;
use crate::insights::query::{load_budgets, load_transactions};
use crate::insights::types::TransactionFilter;
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::open_connection;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct ProgressRunOptions<'a> {
    pub category: Option<String>,
    pub as_of: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn run(category: Option<String>, as_of: Option<String>) -> ClientResult<SuccessEnvelope> {
    run_with_options(ProgressRunOptions {
        category,
        as_of,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: ProgressRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let as_of = resolve_as_of(options.as_of.as_deref(), "progress")?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);

    let mut budgets = load_budgets(&db_path)?;
    if let Some(raw_name) = options.category.as_deref() {
        let name = raw_name.trim();
        let connection = open_connection(&db_path)?;
        let Some(category_id) =
            crate::commands::category::find_category_id(&connection, &db_path, name)?
        else {
            return Err(ClientError::category_not_found(name));
        };
        budgets.retain(|budget| budget.category_id == category_id);
        if budgets.is_empty() {
            return Err(ClientError::budget_not_found(name));
        }
    }

    let transactions = load_transactions(&db_path, &TransactionFilter::default())?;

    let rows = budgets
        .iter()
        .map(|budget| {
            let progress = budget_progress(budget, &transactions, as_of);
            BudgetProgressRow {
                budget_id: progress.budget_id,
                category: progress.category.unwrap_or_default(),
                period: budget.period.as_str().to_string(),
                window_start: format_iso_date(&progress.window_start),
                window_end: format_iso_date(&progress.window_end),
                budget_amount: progress.budget_amount,
                spent: progress.spent,
                remaining: progress.remaining,
                percentage: progress.percentage,
                status: progress.status.as_str().to_string(),
            }
        })
        .collect::<Vec<BudgetProgressRow>>();

    success(
        "progress",
        BudgetProgressData {
            as_of: format_iso_date(&as_of),
            rows,
        },
    )
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    if let Some(path) = home_override {
        return ensure_initialized_at(path);
    }
    ensure_initialized()
}
