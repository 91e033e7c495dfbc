use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use rusqlite::{Connection, TransactionBehavior, params};
use serde_json::Value;
use ulid::Ulid;

use crate::commands::common::{
    now_timestamp, optional_import_field_names, required_import_field_names,
};
use crate::contracts::types::{ImportIssue, ImportSummary};
use crate::error::IMPORT_HELP_COMMAND;
use crate::insights::date::parse_transaction_date;
use crate::setup::SetupContext;
use crate::state::{map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
struct ParsedRow {
    row: i64,
    posted_at: Option<String>,
    amount: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Clone)]
struct CanonicalTransaction {
    posted_at: String,
    amount: f64,
    description: String,
    category: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ImportExecution {
    pub dry_run: bool,
    pub message: String,
    pub summary: ImportSummary,
    pub categories_created: Vec<String>,
}

pub(crate) fn execute(
    setup: &SetupContext,
    path: Option<String>,
    dry_run: bool,
    stdin_override: Option<String>,
) -> ClientResult<ImportExecution> {
    let content = resolve_source(path, stdin_override)?;
    let parsed_rows = parse_source(&content)?;
    let rows = validate_rows(parsed_rows)?;

    let db_path = PathBuf::from(&setup.db_path);
    let mut connection = open_connection(&db_path)?;

    let existing_categories = load_category_ids(&connection, &db_path)?;
    let missing_categories = collect_missing_categories(&rows, &existing_categories);

    let summary = ImportSummary {
        rows_read: rows.len() as i64,
        rows_valid: rows.len() as i64,
        rows_invalid: 0,
        inserted: if dry_run { 0 } else { rows.len() as i64 },
    };

    if dry_run {
        return Ok(ImportExecution {
            dry_run: true,
            message: "Validation passed. No rows were written.".to_string(),
            summary,
            categories_created: missing_categories,
        });
    }

    persist_rows(
        &mut connection,
        &db_path,
        &rows,
        &existing_categories,
        &missing_categories,
    )?;

    Ok(ImportExecution {
        dry_run: false,
        message: "Import completed successfully.".to_string(),
        summary,
        categories_created: missing_categories,
    })
}

fn resolve_source(path: Option<String>, stdin_override: Option<String>) -> ClientResult<String> {
    let stdin_body = read_stdin(stdin_override)?;
    let has_stdin = stdin_body
        .as_ref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if let Some(path_value) = path {
        if path_value == "-" {
            if let Some(stdin_value) = stdin_body
                && !stdin_value.trim().is_empty()
            {
                return Ok(stdin_value);
            }
            return Err(invalid_input_error(
                "Path `-` means stdin input, but stdin was empty. Pipe JSON/CSV input or pass a file path.",
            ));
        }

        if has_stdin {
            return Err(invalid_input_error(
                "Both stdin and file input were provided. Pass exactly one source.",
            ));
        }

        return fs::read_to_string(&path_value).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read import file `{path_value}`: {error}"),
                vec![
                    "Verify the path exists and is readable.".to_string(),
                    "Rerun `centsible txn import <path>`.".to_string(),
                ],
            )
        });
    }

    if let Some(stdin_value) = stdin_body
        && !stdin_value.trim().is_empty()
    {
        return Ok(stdin_value);
    }

    Err(invalid_input_error(
        "No import source provided. Pass a file path or pipe input via stdin.",
    ))
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<String>> {
    if let Some(value) = stdin_override {
        return Ok(Some(value));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    if buffer.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(buffer))
}

fn parse_source(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Import source is empty."));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(ClientError::invalid_import_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    Err(ClientError::invalid_import_format(
        "Unsupported import format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    let mut rows = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects with transaction fields.",
            ));
        };

        rows.push(ParsedRow {
            row: (index as i64) + 1,
            posted_at: read_optional_string(object.get("posted_at")),
            amount: read_optional_string(object.get("amount")),
            description: read_optional_string(object.get("description")),
            category: read_optional_string(object.get("category")),
        });
    }

    Ok(rows)
}

fn parse_csv(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !headers_are_valid(&headers) {
        return Err(ClientError::import_schema_mismatch(
            required_import_field_names()
                .iter()
                .map(|value| value.to_string())
                .collect(),
            optional_import_field_names()
                .iter()
                .map(|value| value.to_string())
                .collect(),
            headers,
        ));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect::<HashMap<String, usize>>();

    let mut rows = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;

        rows.push(ParsedRow {
            row: (row_index as i64) + 1,
            posted_at: value_for(&record, &index_by_name, "posted_at"),
            amount: value_for(&record, &index_by_name, "amount"),
            description: value_for(&record, &index_by_name, "description"),
            category: value_for(&record, &index_by_name, "category"),
        });
    }

    Ok(rows)
}

fn validate_rows(parsed_rows: Vec<ParsedRow>) -> ClientResult<Vec<CanonicalTransaction>> {
    let total_rows = parsed_rows.len();
    let mut rows = Vec::new();
    let mut issues = Vec::new();

    for raw in parsed_rows {
        let mut row_issues = Vec::new();

        let posted_at = validate_posted_at(raw.row, raw.posted_at, &mut row_issues);
        let amount = validate_amount(raw.row, raw.amount, &mut row_issues);
        let description = validate_required_string(
            raw.row,
            "description",
            raw.description,
            &mut row_issues,
            "description must be present and non-empty.",
        );
        let category = normalize_optional(raw.category);

        if row_issues.is_empty() {
            rows.push(CanonicalTransaction {
                posted_at: posted_at.unwrap_or_default(),
                amount: amount.unwrap_or_default(),
                description: description.unwrap_or_default(),
                category,
            });
        } else {
            issues.extend(row_issues);
        }
    }

    if !issues.is_empty() {
        let summary = ImportSummary {
            rows_read: total_rows as i64,
            rows_valid: rows.len() as i64,
            rows_invalid: issues
                .iter()
                .map(|issue| issue.row)
                .collect::<HashSet<i64>>()
                .len() as i64,
            inserted: 0,
        };
        return Err(ClientError::import_validation_failed(summary, issues));
    }

    Ok(rows)
}

fn validate_posted_at(
    row: i64,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
) -> Option<String> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(ImportIssue {
            row,
            field: "posted_at".to_string(),
            code: "missing_required_field".to_string(),
            description: "posted_at must be present and non-empty.".to_string(),
            expected: Some("YYYY-MM-DD".to_string()),
            received: Some(String::new()),
        });
        return None;
    };

    if parse_transaction_date(&candidate).is_none() {
        issues.push(ImportIssue {
            row,
            field: "posted_at".to_string(),
            code: "invalid_date".to_string(),
            description: format!("posted_at must be YYYY-MM-DD; got \"{candidate}\""),
            expected: Some("YYYY-MM-DD".to_string()),
            received: Some(candidate),
        });
        return None;
    }

    Some(candidate)
}

fn validate_amount(row: i64, value: Option<String>, issues: &mut Vec<ImportIssue>) -> Option<f64> {
    let Some(candidate) = normalize_optional(value) else {
        issues.push(ImportIssue {
            row,
            field: "amount".to_string(),
            code: "missing_required_field".to_string(),
            description: "amount must be present and non-empty.".to_string(),
            expected: Some("number (e.g. -42.15)".to_string()),
            received: Some(String::new()),
        });
        return None;
    };

    match candidate.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount != 0.0 => Some(amount),
        Ok(amount) if amount == 0.0 => {
            issues.push(ImportIssue {
                row,
                field: "amount".to_string(),
                code: "zero_amount".to_string(),
                description: "amount must be non-zero. Negative means money out.".to_string(),
                expected: Some("non-zero number (e.g. -42.15)".to_string()),
                received: Some(candidate),
            });
            None
        }
        _ => {
            issues.push(ImportIssue {
                row,
                field: "amount".to_string(),
                code: "invalid_number".to_string(),
                description: format!("amount must be numeric; got \"{candidate}\""),
                expected: Some("number (e.g. -42.15)".to_string()),
                received: Some(candidate),
            });
            None
        }
    }
}

fn validate_required_string(
    row: i64,
    field: &str,
    value: Option<String>,
    issues: &mut Vec<ImportIssue>,
    description: &str,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(ImportIssue {
            row,
            field: field.to_string(),
            code: "missing_required_field".to_string(),
            description: description.to_string(),
            expected: Some("non-empty string".to_string()),
            received: Some(String::new()),
        });
    }
    normalized
}

fn load_category_ids(
    connection: &Connection,
    db_path: &Path,
) -> ClientResult<BTreeMap<String, String>> {
    let mut statement = connection
        .prepare("SELECT name, category_id FROM internal_categories")
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map([], |row| {
            let name: String = row.get(0)?;
            let category_id: String = row.get(1)?;
            Ok((name, category_id))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut by_lower_name = BTreeMap::new();
    for row in rows_iter {
        let (name, category_id) = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        by_lower_name.insert(name.to_lowercase(), category_id);
    }

    Ok(by_lower_name)
}

/// Category names referenced by the batch but absent from the ledger, in
/// first-seen casing, name order.
fn collect_missing_categories(
    rows: &[CanonicalTransaction],
    existing: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut missing: BTreeMap<String, String> = BTreeMap::new();
    for row in rows {
        if let Some(name) = row.category.as_deref() {
            let key = name.to_lowercase();
            if !existing.contains_key(&key) && !missing.contains_key(&key) {
                missing.insert(key, name.to_string());
            }
        }
    }
    missing.into_values().collect()
}

fn persist_rows(
    connection: &mut Connection,
    db_path: &Path,
    rows: &[CanonicalTransaction],
    existing_categories: &BTreeMap<String, String>,
    missing_categories: &[String],
) -> ClientResult<()> {
    let timestamp = now_timestamp();
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut category_ids = existing_categories.clone();
    for name in missing_categories {
        let category_id = format!("cat_{}", Ulid::new());
        transaction
            .execute(
                "INSERT INTO internal_categories (category_id, name, created_at)
                 VALUES (?1, ?2, ?3)",
                params![category_id, name, timestamp],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;
        category_ids.insert(name.to_lowercase(), category_id);
    }

    for row in rows {
        let category_id = row
            .category
            .as_deref()
            .and_then(|name| category_ids.get(&name.to_lowercase()));
        let txn_id = format!("txn_{}", Ulid::new());
        transaction
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
                    row.posted_at,
                    row.amount,
                    row.description,
                    timestamp
                ],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;
    }

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn value_for(
    record: &csv::StringRecord,
    index_by_name: &HashMap<String, usize>,
    field_name: &str,
) -> Option<String> {
    let index = index_by_name.get(field_name)?;
    let value = record.get(*index)?;
    Some(value.to_string())
}

fn read_optional_string(value: Option<&Value>) -> Option<String> {
    let current = value?;

    if current.is_null() {
        return None;
    }

    if let Some(string_value) = current.as_str() {
        return Some(string_value.to_string());
    }

    if let Some(number_value) = current.as_f64() {
        return Some(number_value.to_string());
    }

    Some(current.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}

fn headers_are_valid(actual_headers: &[String]) -> bool {
    let required_fields = required_import_field_names();
    let optional_fields = optional_import_field_names();

    for required in &required_fields {
        if !actual_headers.iter().any(|value| value == required) {
            return false;
        }
    }

    for header in actual_headers {
        let allowed = required_fields.iter().any(|value| value == header)
            || optional_fields.iter().any(|value| value == header);
        if !allowed {
            return false;
        }
    }

    true
}

fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide JSON array or CSV input via path or stdin.".to_string(),
            format!("Run `{IMPORT_HELP_COMMAND}` to confirm import field requirements."),
        ],
    )
}
