use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_budget_set(data: &Value) -> io::Result<String> {
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("budget set output requires message"))?;
    let budget_id = data
        .get("budget_id")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let mut lines = vec![message.to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[("Budget ID:", budget_id.to_string())],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_budget_list(data: &Value) -> io::Result<String> {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("budget list output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No budgets configured yet.",
            "",
            "Set your first budget:",
            "  centsible budget set --category Groceries --amount 400",
        ]
        .join("\n"));
    }

    let count_label = if rows.len() == 1 {
        "1 budget configured.".to_string()
    } else {
        format!("{} budgets configured.", rows.len())
    };

    let columns = [
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Period",
            align: Align::Left,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                row.get("category")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                format::money(row.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                row.get("period")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![count_label, String::new(), "Budgets:".to_string()];
    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}

pub fn render_budget_remove(data: &Value) -> io::Result<String> {
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("budget remove output requires message"))?;
    Ok(message.to_string())
}

pub fn render_progress(data: &Value) -> io::Result<String> {
    let as_of = data
        .get("as_of")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| io::Error::other("progress output requires rows"))?;

    if rows.is_empty() {
        return Ok([
            "No budgets to report on yet.",
            "",
            "Set a budget first:",
            "  centsible budget set --category Groceries --amount 400",
        ]
        .join("\n"));
    }

    let mut lines = vec![format!("Budget progress as of {as_of}.")];

    for row in rows {
        let category = row
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let period = row
            .get("period")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let window_start = row
            .get("window_start")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let window_end = row
            .get("window_end")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let budget_amount = row
            .get("budget_amount")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let spent = row.get("spent").and_then(Value::as_f64).unwrap_or(0.0);
        let remaining = row.get("remaining").and_then(Value::as_f64).unwrap_or(0.0);
        let percentage = row.get("percentage").and_then(Value::as_f64).unwrap_or(0.0);
        let status = row
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        lines.push(String::new());
        lines.push(format!(
            "  {category} ({period}, {window_start} to {window_end})"
        ));
        lines.extend(format::key_value_rows(
            &[
                ("Budget:", format::money(budget_amount)),
                ("Spent:", format::money(spent)),
                ("Remaining:", format::money(remaining)),
                (
                    "Used:",
                    format!("{} ({status})", format::percent(percentage)),
                ),
            ],
            4,
        ));
    }

    Ok(lines.join("\n"))
}
