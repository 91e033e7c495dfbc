use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use ulid::Ulid;

use crate::commands::common::now_timestamp;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CategoryAddData, CategoryListData, CategoryRow};
use crate::setup::{ensure_initialized, ensure_initialized_at};
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

const MAX_CATEGORY_NAME_LENGTH: usize = 64;

#[derive(Debug, Default)]
pub struct CategoryAddOptions<'a> {
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct CategoryListOptions<'a> {
    pub home_override: Option<&'a Path>,
}

pub fn add(name: &str) -> ClientResult<SuccessEnvelope> {
    add_with_options(name, CategoryAddOptions::default())
}

#[doc(hidden)]
pub fn add_with_options(
    name: &str,
    options: CategoryAddOptions<'_>,
) -> ClientResult<SuccessEnvelope> {
    let normalized = normalize_category_name(name)?;

    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    if find_category_id(&connection, &db_path, &normalized)?.is_some() {
        return Err(ClientError::duplicate_category(&normalized));
    }

    let category_id = format!("cat_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO internal_categories (category_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![category_id, normalized, now_timestamp()],
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    success(
        "category add",
        CategoryAddData {
            category_id,
            name: normalized.clone(),
            message: format!("Category `{normalized}` created."),
        },
    )
}

pub fn list() -> ClientResult<SuccessEnvelope> {
    list_with_options(CategoryListOptions::default())
}

#[doc(hidden)]
pub fn list_with_options(options: CategoryListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let setup = load_setup(options.home_override)?;
    let db_path = PathBuf::from(&setup.db_path);
    let connection = open_connection(&db_path)?;

    let mut statement = connection
        .prepare(
            "SELECT category_id, name, created_at
             FROM internal_categories
             ORDER BY name ASC",
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            Ok(CategoryRow {
                category_id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(&db_path, &error))?);
    }

    success("category list", CategoryListData { rows })
}

/// Case-insensitive lookup so `Dining` and `dining` resolve to one category.
pub(crate) fn find_category_id(
    connection: &Connection,
    db_path: &Path,
    name: &str,
) -> ClientResult<Option<String>> {
    connection
        .query_row(
            "SELECT category_id FROM internal_categories
             WHERE LOWER(name) = LOWER(?1) LIMIT 1",
            params![name],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub(crate) fn normalize_category_name(name: &str) -> ClientResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            "Category name cannot be empty.",
            Some("category add"),
        ));
    }
    if trimmed.chars().count() > MAX_CATEGORY_NAME_LENGTH {
        return Err(ClientError::invalid_argument_for_command(
            &format!("Category name cannot exceed {MAX_CATEGORY_NAME_LENGTH} characters."),
            Some("category add"),
        ));
    }
    Ok(trimmed.to_string())
}

fn load_setup(home_override: Option<&Path>) -> ClientResult<crate::setup::SetupContext> {
    if let Some(path) = home_override {
        return ensure_initialized_at(path);
    }
    ensure_initialized()
}
