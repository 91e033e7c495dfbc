use std::time::{SystemTime, UNIX_EPOCH};

use crate::contracts::types::{DataRange, DataRangeHint, PublicView, ViewColumn};

const REQUIRED_IMPORT_FIELDS: [(&str, &str); 3] = [
    ("posted_at", "date"),
    ("amount", "number"),
    ("description", "string"),
];

const OPTIONAL_IMPORT_FIELDS: [(&str, &str); 1] = [("category", "string|null")];

pub(crate) fn required_import_field_names() -> Vec<&'static str> {
    REQUIRED_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub(crate) fn optional_import_field_names() -> Vec<&'static str> {
    OPTIONAL_IMPORT_FIELDS
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub fn public_view_contracts() -> Vec<PublicView> {
    vec![
        PublicView {
            name: "v1_transactions".to_string(),
            columns: vec![
                view_column("txn_id", "text"),
                view_column("posted_at", "date"),
                view_column("amount", "real"),
                view_column("description", "text"),
                view_column("category_id", "text|null"),
                view_column("category", "text|null"),
            ],
        },
        PublicView {
            name: "v1_categories".to_string(),
            columns: vec![
                view_column("category_id", "text"),
                view_column("name", "text"),
                view_column("created_at", "text"),
            ],
        },
        PublicView {
            name: "v1_budgets".to_string(),
            columns: vec![
                view_column("budget_id", "text"),
                view_column("category_id", "text"),
                view_column("category", "text|null"),
                view_column("amount", "real"),
                view_column("period", "text"),
                view_column("created_at", "text"),
                view_column("updated_at", "text"),
            ],
        },
    ]
}

pub fn data_range_hint(data_range: &DataRange) -> DataRangeHint {
    DataRangeHint {
        earliest: data_range.earliest.clone(),
        latest: data_range.latest.clone(),
    }
}

pub(crate) fn now_timestamp() -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH);
    match now {
        Ok(duration) => format!("{}", duration.as_secs()),
        Err(_) => "0".to_string(),
    }
}

fn view_column(name: &str, column_type: &str) -> ViewColumn {
    ViewColumn {
        name: name.to_string(),
        column_type: column_type.to_string(),
        nullable: column_type.ends_with("|null"),
    }
}
