use std::path::Path;

use rusqlite::params;

use crate::ClientResult;
use crate::insights::date::{BudgetPeriod, format_iso_date, parse_transaction_date};
use crate::insights::types::{Budget, LedgerTransaction, TransactionFilter};
use crate::state::{map_sqlite_error, open_connection};

pub fn load_transactions(
    db_path: &Path,
    filter: &TransactionFilter,
) -> ClientResult<Vec<LedgerTransaction>> {
    let connection = open_connection(db_path)?;
    let mut statement = connection
        .prepare(
            "SELECT
                t.txn_id,
                t.posted_at,
                t.amount,
                t.category_id,
                c.name,
                t.description
             FROM internal_transactions t
             LEFT JOIN internal_categories c ON c.category_id = t.category_id
             WHERE (?1 IS NULL OR t.posted_at >= ?1)
               AND (?2 IS NULL OR t.posted_at <= ?2)
               AND (?3 IS NULL OR t.category_id = ?3)
             ORDER BY t.posted_at ASC, t.txn_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let from_bound = filter.from.as_ref().map(format_iso_date);
    let to_bound = filter.to.as_ref().map(format_iso_date);

    let rows_iter = statement
        .query_map(
            params![from_bound, to_bound, filter.category_id],
            |row| {
                let txn_id: String = row.get(0)?;
                let posted_at: String = row.get(1)?;
                let amount: f64 = row.get(2)?;
                let category_id: Option<String> = row.get(3)?;
                let category: Option<String> = row.get(4)?;
                let description: String = row.get(5)?;
                Ok((txn_id, posted_at, amount, category_id, category, description))
            },
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows: Vec<LedgerTransaction> = Vec::new();
    for row in rows_iter {
        let (txn_id, posted_at, amount, category_id, category, description) =
            row.map_err(|error| map_sqlite_error(db_path, &error))?;
        let Some(parsed_date) = parse_transaction_date(&posted_at) else {
            continue;
        };

        rows.push(LedgerTransaction {
            txn_id,
            posted_at: parsed_date,
            amount,
            category_id,
            category: category
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            description: description.trim().to_string(),
        });
    }

    Ok(rows)
}

pub fn load_budgets(db_path: &Path) -> ClientResult<Vec<Budget>> {
    let connection = open_connection(db_path)?;
    let mut statement = connection
        .prepare(
            "SELECT
                b.budget_id,
                b.category_id,
                c.name,
                b.amount,
                b.period
             FROM internal_budgets b
             LEFT JOIN internal_categories c ON c.category_id = b.category_id
             ORDER BY c.name ASC, b.budget_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            let budget_id: String = row.get(0)?;
            let category_id: String = row.get(1)?;
            let category: Option<String> = row.get(2)?;
            let amount: f64 = row.get(3)?;
            let period: String = row.get(4)?;
            Ok((budget_id, category_id, category, amount, period))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows: Vec<Budget> = Vec::new();
    for row in rows_iter {
        let (budget_id, category_id, category, amount, period) =
            row.map_err(|error| map_sqlite_error(db_path, &error))?;
        // Rows with an unrecognized period are skipped rather than failing the
        // whole listing; the schema constrains the column so this is rare.
        let Some(parsed_period) = BudgetPeriod::parse(&period) else {
            continue;
        };

        rows.push(Budget {
            budget_id,
            category_id,
            category,
            amount,
            period: parsed_period,
        });
    }

    Ok(rows)
}
