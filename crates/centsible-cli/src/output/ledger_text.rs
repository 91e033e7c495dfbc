use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_category_add(data: &Value) -> io::Result<String> {
    let message = require_str(data, "message", "category add output requires message")?;
    let category_id = require_str(data, "category_id", "category add output requires category_id")?;

    let mut lines = vec![message.to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[("Category ID:", category_id.to_string())],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_category_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("category list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No categories found yet.",
            "",
            "Create your first category:",
            "  centsible category add Groceries",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 category found.".to_string()
    } else {
        format!("{} categories found.", rows.len())
    };

    let columns = [
        Column {
            name: "Name",
            align: Align::Left,
        },
        Column {
            name: "Category ID",
            align: Align::Left,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_or(row, "name", "unknown").to_string(),
                str_or(row, "category_id", "unknown").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new(), "Categories:".to_string()];
    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}

pub fn render_txn_add(data: &Value) -> io::Result<String> {
    let message = require_str(data, "message", "txn add output requires message")?;
    let txn_id = require_str(data, "txn_id", "txn add output requires txn_id")?;
    let posted_at = str_or(data, "posted_at", "unknown");
    let amount = data.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
    let category = str_or(data, "category", "(uncategorized)");

    let mut lines = vec![message.to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Txn ID:", txn_id.to_string()),
            ("Date:", posted_at.to_string()),
            ("Amount:", format::money(amount)),
            ("Category:", category.to_string()),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_txn_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("txn list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No transactions matched.",
            "",
            "Record or import transactions:",
            "  centsible txn add --date 2026-01-15 --amount -42.15 --description \"Groceries\"",
            "  centsible txn import --help",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 transaction found.".to_string()
    } else {
        format!("{} transactions found.", rows.len())
    };

    let mut lines = vec![count_label];
    if let Some(filter_line) = render_filter_line(data) {
        lines.push(filter_line);
    }
    lines.push(String::new());
    lines.push("Transactions:".to_string());

    let columns = [
        Column {
            name: "Date",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Description",
            align: Align::Left,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                str_or(row, "posted_at", "unknown").to_string(),
                format::money(row.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                str_or(row, "category", "(uncategorized)").to_string(),
                str_or(row, "description", "").to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    lines.extend(format::render_table(&columns, &table_rows));

    if let Some(coverage) = render_data_coverage(data) {
        lines.push(String::new());
        lines.push(coverage);
    }

    Ok(lines.join("\n"))
}

pub fn render_txn_import(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("txn import output requires summary"))?;

    let mut lines = Vec::new();
    if dry_run {
        lines.push("Dry-run validation completed successfully.".to_string());
    } else {
        lines.push("Import completed successfully.".to_string());
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.extend(format::key_value_rows(
        &[
            ("Rows read:", get_i64(summary, "rows_read").to_string()),
            ("Rows valid:", get_i64(summary, "rows_valid").to_string()),
            ("Rows invalid:", get_i64(summary, "rows_invalid").to_string()),
            ("Inserted:", get_i64(summary, "inserted").to_string()),
        ],
        2,
    ));

    let created = data
        .get("categories_created")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !created.is_empty() {
        lines.push(String::new());
        if dry_run {
            lines.push("Categories that would be created:".to_string());
        } else {
            lines.push("Categories created:".to_string());
        }
        for name in &created {
            lines.push(format!("  {}", name.as_str().unwrap_or("unknown")));
        }
    }

    if dry_run {
        lines.push(String::new());
        lines.push("No rows were written because this was a dry run.".to_string());
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push("  1. Rerun without --dry-run to commit these rows.".to_string());
    } else {
        lines.push(String::new());
        lines.push("What to do next:".to_string());
        lines.push("  1. Run `centsible progress` to check budget status.".to_string());
        lines.push("  2. Run `centsible insights` to analyze recent spending.".to_string());
    }

    Ok(lines.join("\n"))
}

fn render_filter_line(data: &Value) -> Option<String> {
    let from = data.get("from").and_then(Value::as_str);
    let to = data.get("to").and_then(Value::as_str);
    let category = data.get("category").and_then(Value::as_str);

    let mut parts = Vec::new();
    match (from, to) {
        (Some(start), Some(end)) => parts.push(format!("window {start} to {end}")),
        (Some(start), None) => parts.push(format!("from {start}")),
        (None, Some(end)) => parts.push(format!("through {end}")),
        (None, None) => {}
    }
    if let Some(name) = category {
        parts.push(format!("category `{name}`"));
    }

    if parts.is_empty() {
        return None;
    }
    Some(format!("Filters: {}.", parts.join(", ")))
}

fn render_data_coverage(data: &Value) -> Option<String> {
    let hint = data.get("data_range_hint")?;
    let earliest = hint.get("earliest").and_then(Value::as_str)?;
    let latest = hint.get("latest").and_then(Value::as_str)?;
    Some(format!("Ledger data covers {earliest} to {latest}."))
}

fn get_i64(summary: &serde_json::Map<String, Value>, key: &str) -> i64 {
    summary.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn str_or<'a>(row: &'a Value, key: &str, default: &'a str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn require_str<'a>(data: &'a Value, key: &str, error: &str) -> io::Result<&'a str> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other(error.to_string()))
}
