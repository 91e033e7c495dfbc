use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_insights(data: &Value) -> io::Result<String> {
    let as_of = data
        .get("as_of")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let window_start = data
        .get("window_start")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let total_spent = data
        .get("total_spent")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let average_daily = data
        .get("average_daily")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let previous_total = data
        .get("previous_total")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let trend = data
        .get("trend")
        .and_then(Value::as_str)
        .unwrap_or("stable");
    let potential_savings = data
        .get("potential_savings")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    let mut lines = vec![
        format!("Spending insights as of {as_of}."),
        format!("Window: {window_start} to {as_of}."),
        String::new(),
        "Summary:".to_string(),
    ];
    lines.extend(format::key_value_rows(
        &[
            ("Total spent:", format::money(total_spent)),
            ("Average daily:", format::money(average_daily)),
            ("Previous window:", format::money(previous_total)),
            (
                "Month over month:",
                format!(
                    "{} ({trend})",
                    render_comparison(data.get("monthly_comparison"))
                ),
            ),
            ("Potential savings:", format::money(potential_savings)),
        ],
        2,
    ));

    let top_categories = data
        .get("top_categories")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if !top_categories.is_empty() {
        lines.push(String::new());
        lines.push("Top categories:".to_string());

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
                name: "Share",
                align: Align::Right,
            },
        ];
        let table_rows = top_categories
            .iter()
            .map(|row| {
                vec![
                    row.get("category")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    format::money(row.get("amount").and_then(Value::as_f64).unwrap_or(0.0)),
                    format::percent(
                        row.get("percentage").and_then(Value::as_f64).unwrap_or(0.0),
                    ),
                ]
            })
            .collect::<Vec<Vec<String>>>();
        lines.extend(format::render_table(&columns, &table_rows));
    }

    let insights = data
        .get("insights")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    lines.push(String::new());
    if insights.is_empty() {
        lines.push("No insights for this window.".to_string());
        lines.push("Import more transactions to give the analyzer something to work with.".to_string());
    } else {
        lines.push("Insights:".to_string());
        for insight in &insights {
            let priority = insight
                .get("priority")
                .and_then(Value::as_str)
                .unwrap_or("low");
            let title = insight
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let description = insight
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("");
            let action = insight.get("action").and_then(Value::as_str).unwrap_or("");

            lines.push(format!("  [{priority}] {title}"));
            if !description.is_empty() {
                lines.push(format!("    {description}"));
            }
            if !action.is_empty() {
                lines.push(format!("    Action: {action}"));
            }
        }
    }

    Ok(lines.join("\n"))
}

/// The comparison is null when there was no prior-window spend.
fn render_comparison(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(change) if change >= 0.0 => format!("+{change:.0}%"),
        Some(change) => format!("{change:.0}%"),
        None => "n/a".to_string(),
    }
}
