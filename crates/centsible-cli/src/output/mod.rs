mod budget_text;
mod error_text;
mod format;
mod insights_text;
mod json;
mod ledger_text;
mod mode;

use std::io;

use centsible_client::{ClientError, SuccessEnvelope};

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    println!("{body}");
    Ok(())
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    println!("{body}");
    Ok(())
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "category add" => ledger_text::render_category_add(&success.data),
        "category list" => ledger_text::render_category_list(&success.data),
        "txn add" => ledger_text::render_txn_add(&success.data),
        "txn list" => ledger_text::render_txn_list(&success.data),
        "txn import" => ledger_text::render_txn_import(&success.data),
        "budget set" => budget_text::render_budget_set(&success.data),
        "budget list" => budget_text::render_budget_list(&success.data),
        "budget remove" => budget_text::render_budget_remove(&success.data),
        "progress" => budget_text::render_progress(&success.data),
        "insights" => insights_text::render_insights(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
