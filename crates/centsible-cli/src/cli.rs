use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }

    Ok(IsoDate(value.to_string()))
}

pub fn parse_budget_period(value: &str) -> Result<String, String> {
    match value {
        "weekly" | "monthly" | "yearly" => Ok(value.to_string()),
        _ => Err("period must be one of: weekly, monthly, yearly".to_string()),
    }
}

/// Extended help shown after `centsible txn import --help`.
/// Contains workflow guidance, schema, and next-step instructions.
pub const TXN_IMPORT_AFTER_HELP: &str = "\
How import works:
  Centsible does not parse raw bank PDFs or provider-specific exports.
  You parse each statement into a normalized file, then import it.

  Accepted formats:
    JSON — one top-level array of transaction objects
    CSV  — one header row with schema field names

  <path> is a local file path.
  To read stdin explicitly, use `-` as the path.
  Example: cat rows.json | centsible txn import --dry-run -
  One import call takes one file. For multiple files, combine
  first or run multiple import commands.

What to do next:
  1. Parse your source into normalized JSON or schema-matching CSV.
  2. Run `centsible txn import --dry-run <path>` and fix any reported issues.
  3. Run `centsible txn import <path>` once dry-run passes.

Import schema:
  JSON example (one top-level array):
  [
    {
      \"posted_at\": \"2026-01-15\",
      \"amount\": -42.15,
      \"description\": \"WHOLE FOODS\",
      \"category\": \"Groceries\"
    }
  ]

  CSV example (header + rows):
  posted_at,amount,description,category
  2026-01-15,-42.15,WHOLE FOODS,Groceries
  2026-01-16,42.15,REFUND,Groceries

Field rules (very explicit):
  posted_at (required):
    Date only, exactly `YYYY-MM-DD`.
    Example: `2026-01-15`

  amount (required):
    A number, not text. Zero is rejected.
    Signed amount rules (strict):
    - negative = money out (`spend`, `card charge`)
    - positive = money in (`refund`, `income`, `credit`)
    Use exactly one sign convention everywhere. Do not flip signs between imports.
    Use at most 2 decimal places.
    Example charge: `-42.15`
    Example refund/income: `42.15`

  description (required):
    Raw transaction text from the source.

  category (optional):
    Clean category label if you know it.
    Category names match case-insensitively, and unknown names are
    created automatically during import.
    If you do not know it, omit it or leave the CSV cell empty.
";

#[derive(Debug, Parser)]
#[command(
    name = "centsible",
    version,
    about = "personal budgeting and spending insights",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage spending categories
    #[command(arg_required_else_help = true)]
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Record, list, and import transactions
    #[command(arg_required_else_help = true)]
    Txn {
        #[command(subcommand)]
        command: TxnCommand,
    },
    /// Manage per-category budgets
    #[command(arg_required_else_help = true)]
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },
    /// Show budget progress for the current period
    Progress {
        /// Limit progress to one category
        #[arg(long)]
        category: Option<String>,
        /// Evaluate progress as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Analyze recent spending and surface insights
    Insights {
        /// Analyze spending as of this date (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_iso_date)]
        as_of: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CategoryCommand {
    /// Create a new spending category
    Add {
        /// Category name (e.g. Groceries)
        name: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List all categories
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum TxnCommand {
    /// Record a single transaction
    Add {
        /// Transaction date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        date: IsoDate,
        /// Signed amount: negative = money out, positive = money in
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// What the transaction was for
        #[arg(long)]
        description: String,
        /// Existing category name to file the transaction under
        #[arg(long)]
        category: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List transactions, optionally filtered by date window and category
    List {
        /// Start date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        from: Option<IsoDate>,
        /// End date filter (YYYY-MM-DD)
        #[arg(long, value_parser = parse_iso_date)]
        to: Option<IsoDate>,
        /// Category name filter
        #[arg(long)]
        category: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Import normalized transaction data into your local ledger
    #[command(after_long_help = TXN_IMPORT_AFTER_HELP)]
    Import {
        /// Validate import data without writing to the ledger
        #[arg(long)]
        dry_run: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a normalized JSON or CSV file (use `-` for stdin)
        path: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BudgetCommand {
    /// Create or update the budget for a category
    Set {
        /// Category name the budget applies to
        #[arg(long)]
        category: String,
        /// Budget amount per period (must be positive)
        #[arg(long)]
        amount: f64,
        /// Budget period: weekly, monthly, or yearly
        #[arg(long, default_value = "monthly", value_parser = parse_budget_period)]
        period: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List all configured budgets
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Remove the budget for a category
    Remove {
        /// Category name whose budget should be removed
        category: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
