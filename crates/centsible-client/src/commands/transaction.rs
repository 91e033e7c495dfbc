use std::path::{Path, PathBuf};

use rusqlite::params;
use ulid::Ulid;

use crate::commands::category::find_category_id;
use crate::commands::common::{data_range_hint, now_timestamp};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    ImportData, TransactionAddData, TransactionListData, TransactionRow,
};
use crate::import;
use crate::insights::date::{build_filter, format_iso_date, parse_transaction_date};
use crate::insights::query::load_transactions;
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct TransactionAddOptions<'a> {
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionListOptions<'a> {
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct ImportRunOptions<'a> {
    pub path: Option<String>,
    pub dry_run: bool,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

pub fn add(
    posted_at: &str,
    amount: f64,
    description: &str,
    category: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    add_with_options(
        posted_at,
        amount,
        description,
        category,
        TransactionAddOptions::default(),
    )
}

#[doc(hidden)]
pub fn add_with_options(
    posted_at: &str,
    amount: f64,
    description: &str,
    category: Option<&str>,
    options: TransactionAddOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let Some(parsed_date) = parse_transaction_date(posted_at.trim()) else {
        return Err(ClientError::invalid_argument_for_command(
            "`date` must use YYYY-MM-DD format with a real calendar date.",
            Some("txn add"),
        ));
    };
    if !amount.is_finite() || amount == 0.0 {
        return Err(ClientError::invalid_argument_for_command(
            "`amount` must be a non-zero number. Negative means money out, positive means money in.",
            Some("txn add"),
        ));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "`description` cannot be empty.",
            Some("txn add"),
        ));
    }

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let category_name = category.map(str::trim).filter(|value| !value.is_empty());
    let category_id = match category_name {
        Some(name) => match find_category_id(&connection, &db_path, name)? {
            Some(id) => Some(id),
            None => return Err(ClientError::category_not_found(name)),
        },
        None => None,
    };

    let txn_id = format!("txn_{}", Ulid::new());
    let posted_at_value = format_iso_date(&parsed_date);
    connection
        .execute(
            "INSERT INTO internal_transactions (
                txn_id,
                category_id,
                posted_at,
                amount,
                description,
                created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn_id,
                category_id,
                posted_at_value,
                amount,
                description,
                now_timestamp()
            ],
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    success(
        "txn add",
        TransactionAddData {
            txn_id,
            posted_at: posted_at_value,
            amount,
            category: category_name.map(str::to_string),
            message: "Transaction recorded.".to_string(),
        },
    )
}

pub fn list(
    from: Option<String>,
    to: Option<String>,
    category: Option<String>,
) -> ClientResult<SuccessEnvelope> {
    list_with_options(TransactionListOptions {
        from,
        to,
        category,
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: TransactionListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let mut filter = build_filter(options.from.as_deref(), options.to.as_deref(), "txn list")?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);

    let category_name = options
        .category
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(name) = category_name {
        let connection = open_connection(&db_path)?;
        // Category identity is case-insensitive, so rows match on the
        // resolved id rather than the caller's casing of the name.
        let Some(category_id) = find_category_id(&connection, &db_path, name)? else {
            return Err(ClientError::category_not_found(name));
        };
        filter.category = Some(name.to_string());
        filter.category_id = Some(category_id);
    }

    let transactions = load_transactions(&db_path, &filter)?;
    let rows = transactions
        .into_iter()
        .map(|transaction| TransactionRow {
            txn_id: transaction.txn_id,
            posted_at: format_iso_date(&transaction.posted_at),
            amount: transaction.amount,
            category: transaction.category,
            description: transaction.description,
        })
        .collect::<Vec<TransactionRow>>();

    success(
        "txn list",
        TransactionListData {
            from: filter.from.as_ref().map(format_iso_date),
            to: filter.to.as_ref().map(format_iso_date),
            category: filter.category,
            rows,
            data_range_hint: data_range_hint(&setup.data_range),
        },
    )
}

pub fn import(path: Option<String>, dry_run: bool) -> ClientResult<SuccessEnvelope> {
    import_with_options(ImportRunOptions {
        path,
        dry_run,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn import_with_options(options: ImportRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let execution = import::execute(
        &setup,
        options.path.clone(),
        options.dry_run,
        options.stdin_override,
    )?;

    success(
        "txn import",
        ImportData {
            dry_run: execution.dry_run,
            path: options.path,
            message: execution.message,
            summary: execution.summary,
            issues: Vec::new(),
            categories_created: execution.categories_created,
        },
    )
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    if let Some(path) = home_override {
        return ensure_initialized_at(path);
    }
    ensure_initialized()
}
