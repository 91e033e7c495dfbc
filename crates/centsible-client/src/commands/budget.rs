use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use ulid::Ulid;

use crate::commands::category::find_category_id;
use crate::commands::common::now_timestamp;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{BudgetListData, BudgetRemoveData, BudgetRow, BudgetSetData};
use crate::insights::date::BudgetPeriod;
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct BudgetSetOptions<'a> {
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct BudgetListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct BudgetRemoveOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn set(category: &str, amount: f64, period: &str) -> ClientResult<SuccessEnvelope> {
    set_with_options(category, amount, period, BudgetSetOptions::default())
}

#[doc(hidden)]
pub fn set_with_options(
    category: &str,
    amount: f64,
    period: &str,
    options: BudgetSetOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ClientError::invalid_argument_for_command(
            "`amount` must be a positive number.",
            Some("budget set"),
        ));
    }
    let Some(parsed_period) = BudgetPeriod::parse(period) else {
        return Err(ClientError::invalid_argument_for_command(
            "`period` must be one of: weekly, monthly, yearly.",
            Some("budget set"),
        ));
    };

    let category = category.trim();
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let Some(category_id) = find_category_id(&connection, &db_path, category)? else {
        return Err(ClientError::category_not_found(category));
    };

    let timestamp = now_timestamp();
    let existing = find_budget_id(&connection, &db_path, &category_id)?;
    let budget_id = match existing {
        Some(budget_id) => {
            connection
                .execute(
                    "UPDATE internal_budgets
                     SET amount = ?1, period = ?2, updated_at = ?3
                     WHERE budget_id = ?4",
                    params![amount, parsed_period.as_str(), timestamp, budget_id],
                )
                .map_err(|error| map_sqlite_error(&db_path, &error))?;
            budget_id
        }
        None => {
            let budget_id = format!("bud_{}", Ulid::new());
            connection
                .execute(
                    "INSERT INTO internal_budgets (
                        budget_id,
                        category_id,
                        amount,
                        period,
                        created_at,
                        updated_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                    params![budget_id, category_id, amount, parsed_period.as_str(), timestamp],
                )
                .map_err(|error| map_sqlite_error(&db_path, &error))?;
            budget_id
        }
    };

    success(
        "budget set",
        BudgetSetData {
            budget_id,
            category: category.to_string(),
            amount,
            period: parsed_period.as_str().to_string(),
            message: format!("Budget of {amount:.2} per {} set for `{category}`.", parsed_period.as_str()),
        },
    )
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(BudgetListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: BudgetListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut statement = connection
        .prepare(
            "SELECT
                b.budget_id,
                c.name,
                b.amount,
                b.period,
                b.created_at,
                b.updated_at
             FROM internal_budgets b
             LEFT JOIN internal_categories c ON c.category_id = b.category_id
             ORDER BY c.name ASC, b.budget_id ASC",
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok(BudgetRow {
                budget_id: row.get(0)?,
                category: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                amount: row.get(2)?,
                period: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(&db_path, &error))?);
    }

    success("budget list", BudgetListData { rows })
}

pub fn remove(category: &str) -> ClientResult<SuccessEnvelope> {
    remove_with_options(category, BudgetRemoveOptions::default())
}

#[doc(hidden)]
pub fn remove_with_options(
    category: &str,
    options: BudgetRemoveOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let category = category.trim();
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let Some(category_id) = find_category_id(&connection, &db_path, category)? else {
        return Err(ClientError::category_not_found(category));
    };

    let removed = connection
        .execute(
            "DELETE FROM internal_budgets WHERE category_id = ?1",
            params![category_id],
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;
    if removed == 0 {
        return Err(ClientError::budget_not_found(category));
    }

    success(
        "budget remove",
        BudgetRemoveData {
            category: category.to_string(),
            message: format!("Budget removed for `{category}`."),
        },
    )
}

fn find_budget_id(
    connection: &Connection,
    db_path: &Path,
    category_id: &str,
) -> ClientResult<Option<String>> {
    connection
        .query_row(
            "SELECT budget_id FROM internal_budgets WHERE category_id = ?1 LIMIT 1",
            params![category_id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    if let Some(path) = home_override {
        return ensure_initialized_at(path);
    }
    ensure_initialized()
}
