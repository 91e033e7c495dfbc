use std::path::Path;

use serde_json::Value;
use tempfile::tempdir;

use centsible_client::commands::{budget, category, transaction};
use centsible_client::{ClientResult, SuccessEnvelope};

fn add_category(home: &Path, name: &str) -> ClientResult<SuccessEnvelope> {
    category::add_with_options(
        name,
        category::CategoryAddOptions {
            home_override: Some(home),
        },
    )
}

fn add_txn(
    home: &Path,
    posted_at: &str,
    amount: f64,
    description: &str,
    category_name: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    transaction::add_with_options(
        posted_at,
        amount,
        description,
        category_name,
        transaction::TransactionAddOptions {
            home_override: Some(home),
        },
    )
}

fn envelope_data(envelope: &SuccessEnvelope) -> Value {
    envelope.data.clone()
}

#[test]
fn category_add_and_list_round_trip() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Groceries").is_ok());
        assert!(add_category(&home, "Dining").is_ok());

        let listed = category::list_with_options(category::CategoryListOptions {
            home_override: Some(&home),
        });
        assert!(listed.is_ok());
        if let Ok(envelope) = listed {
            let data = envelope_data(&envelope);
            let names = data["rows"]
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .filter_map(|row| row["name"].as_str())
                        .collect::<Vec<&str>>()
                })
                .unwrap_or_default();
            assert_eq!(names, vec!["Dining", "Groceries"]);
        }
    }
}

#[test]
fn duplicate_categories_are_rejected_case_insensitively() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Groceries").is_ok());
        let duplicate = add_category(&home, "groceries");
        assert!(duplicate.is_err());
        if let Err(error) = duplicate {
            assert_eq!(error.code, "duplicate_category");
        }
    }
}

#[test]
fn txn_add_requires_an_existing_category() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        let missing = add_txn(&home, "2026-03-01", -10.0, "Lunch", Some("Dining"));
        assert!(missing.is_err());
        if let Err(error) = missing {
            assert_eq!(error.code, "category_not_found");
        }
    }
}

#[test]
fn txn_add_rejects_bad_dates_and_zero_amounts() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        let bad_date = add_txn(&home, "2026-13-01", -10.0, "Lunch", None);
        assert!(bad_date.is_err());

        let zero = add_txn(&home, "2026-03-01", 0.0, "Lunch", None);
        assert!(zero.is_err());
    }
}

#[test]
fn txn_list_filters_by_window_and_category() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Dining").is_ok());
        assert!(add_txn(&home, "2026-03-01", -10.0, "Lunch", Some("Dining")).is_ok());
        assert!(add_txn(&home, "2026-03-15", -20.0, "Dinner", Some("Dining")).is_ok());
        assert!(add_txn(&home, "2026-03-20", 500.0, "Refund", None).is_ok());

        let listed = transaction::list_with_options(transaction::TransactionListOptions {
            from: Some("2026-03-10".to_string()),
            to: Some("2026-03-31".to_string()),
            category: Some("Dining".to_string()),
            home_override: Some(&home),
        });
        assert!(listed.is_ok());
        if let Ok(envelope) = listed {
            let data = envelope_data(&envelope);
            let rows = data["rows"].as_array().cloned().unwrap_or_default();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["description"], Value::from("Dinner"));
        }
    }
}

#[test]
fn txn_list_category_filter_matches_regardless_of_casing() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Dining").is_ok());
        assert!(add_txn(&home, "2026-03-01", -10.0, "Lunch", Some("Dining")).is_ok());

        let listed = transaction::list_with_options(transaction::TransactionListOptions {
            from: None,
            to: None,
            category: Some("dining".to_string()),
            home_override: Some(&home),
        });
        assert!(listed.is_ok());
        if let Ok(envelope) = listed {
            let data = envelope_data(&envelope);
            let rows = data["rows"].as_array().cloned().unwrap_or_default();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["description"], Value::from("Lunch"));
        }
    }
}

#[test]
fn txn_list_rejects_inverted_date_ranges() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        let listed = transaction::list_with_options(transaction::TransactionListOptions {
            from: Some("2026-03-31".to_string()),
            to: Some("2026-03-01".to_string()),
            category: None,
            home_override: Some(&home),
        });
        assert!(listed.is_err());
    }
}

#[test]
fn budget_set_upserts_for_the_same_category() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Groceries").is_ok());
        let first = budget::set_with_options(
            "Groceries",
            400.0,
            "monthly",
            budget::BudgetSetOptions {
                home_override: Some(&home),
            },
        );
        assert!(first.is_ok());

        let second = budget::set_with_options(
            "Groceries",
            500.0,
            "weekly",
            budget::BudgetSetOptions {
                home_override: Some(&home),
            },
        );
        assert!(second.is_ok());

        let listed = budget::list_with_options(budget::BudgetListOptions {
            home_override: Some(&home),
        });
        assert!(listed.is_ok());
        if let Ok(envelope) = listed {
            let data = envelope_data(&envelope);
            let rows = data["rows"].as_array().cloned().unwrap_or_default();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0]["amount"], Value::from(500.0));
            assert_eq!(rows[0]["period"], Value::from("weekly"));
        }
    }
}

#[test]
fn budget_set_validates_amount_and_period() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Groceries").is_ok());

        let negative = budget::set_with_options(
            "Groceries",
            -50.0,
            "monthly",
            budget::BudgetSetOptions {
                home_override: Some(&home),
            },
        );
        assert!(negative.is_err());

        let bad_period = budget::set_with_options(
            "Groceries",
            50.0,
            "quarterly",
            budget::BudgetSetOptions {
                home_override: Some(&home),
            },
        );
        assert!(bad_period.is_err());
    }
}

#[test]
fn budget_remove_reports_missing_budgets() {
    let temp = tempdir();
    assert!(temp.is_ok());
    if let Ok(temp_dir) = temp {
        let home = temp_dir.path().join("ledger-home");

        assert!(add_category(&home, "Groceries").is_ok());
        let removed = budget::remove_with_options(
            "Groceries",
            budget::BudgetRemoveOptions {
                home_override: Some(&home),
            },
        );
        assert!(removed.is_err());
        if let Err(error) = removed {
            assert_eq!(error.code, "budget_not_found");
        }

        let set = budget::set_with_options(
            "Groceries",
            400.0,
            "monthly",
            budget::BudgetSetOptions {
                home_override: Some(&home),
            },
        );
        assert!(set.is_ok());

        let removed_again = budget::remove_with_options(
            "Groceries",
            budget::BudgetRemoveOptions {
                home_override: Some(&home),
            },
        );
        assert!(removed_again.is_ok());
    }
}
