mod cli;
mod dispatch;
mod output;
mod stdout_io;

use std::process::ExitCode;

use centsible_client::ClientError;
use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "Centsible - personal budgeting and spending insights

Usage:
  centsible <command>

Start here:
  centsible category add Groceries
  centsible txn import --help
  centsible progress
";

const TOP_LEVEL_HELP: &str = "Centsible — personal budgeting and spending insights

USAGE: centsible <command>

Set up your ledger:
  centsible category add <name>                           Create a spending category
  centsible budget set --category <name> --amount <n>     Set a weekly/monthly/yearly budget

Record transactions:
  centsible txn add --date <YYYY-MM-DD> --amount <n> --description <text>
  1. centsible txn import --help                          Read import schema and workflow details
  2. centsible txn import --dry-run <path>                Safely validate import without data writes
  3. centsible txn import <path>                          Import transactions in bulk

See where your money goes:
  centsible progress                                      Budget progress for the current period
  centsible insights                                      Spending trends, top categories, and tips

Other commands:
  centsible category list                                 List categories
  centsible txn list                                      List transactions (supports --from/--to/--category)
  centsible budget list                                   List configured budgets
  centsible budget remove <category>                      Remove a category's budget

Want to ensure a clean first run, or having issues/errors?
  Run `centsible txn import --help` for import workflow guidance,
  or `centsible <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                if matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) && is_top_level_help_request(&raw_args)
                {
                    if write_stdout_text(TOP_LEVEL_HELP).is_err() {
                        return Err(ExitCode::from(2));
                    }
                } else if write_stdout_text(&err.to_string()).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };
    let mode = output::mode_for_command(&cli.command);

    let dispatched = dispatch::dispatch(&cli);
    match dispatched {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing boilerplate (Usage line, "For more information" hint)
/// so our "What to do next" section is the single source of guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Builds the subcommand path from raw CLI args for use in help hints.
///
/// Collects non-flag arguments after the binary name to form a command
/// string like "txn import" or "budget set".
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();
    if non_flags.is_empty() {
        return None;
    }

    let hint = match non_flags.as_slice() {
        ["category", "add", ..] => Some("category add"),
        ["category", "list", ..] => Some("category list"),
        ["category", ..] => Some("category"),
        ["txn", "add", ..] => Some("txn add"),
        ["txn", "list", ..] => Some("txn list"),
        ["txn", "import", ..] => Some("txn import"),
        ["txn", ..] => Some("txn"),
        ["budget", "set", ..] => Some("budget set"),
        ["budget", "list", ..] => Some("budget list"),
        ["budget", "remove", ..] => Some("budget remove"),
        ["budget", ..] => Some("budget"),
        ["progress", ..] => Some("progress"),
        ["insights", ..] => Some("insights"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

fn is_internal_error(error: &ClientError) -> bool {
    error.code.starts_with("internal_")
        || matches!(
            error.code.as_str(),
            "ledger_init_permission_denied"
                | "ledger_locked"
                | "ledger_corrupt"
                | "migration_failed"
                | "ledger_init_failed"
        )
}
