use centsible_client::commands;
use centsible_client::{ClientResult, SuccessEnvelope};

use crate::cli::{BudgetCommand, CategoryCommand, Cli, Commands, TxnCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Category { command } => match command {
            CategoryCommand::Add { name, .. } => commands::category::add(name),
            CategoryCommand::List { .. } => commands::category::list(),
        },
        Commands::Txn { command } => match command {
            TxnCommand::Add {
                date,
                amount,
                description,
                category,
                json: _,
            } => commands::transaction::add(
                date.as_str(),
                *amount,
                description,
                category.as_deref(),
            ),
            TxnCommand::List {
                from,
                to,
                category,
                json: _,
            } => commands::transaction::list(
                from.as_ref().map(|value| value.as_str().to_string()),
                to.as_ref().map(|value| value.as_str().to_string()),
                category.clone(),
            ),
            TxnCommand::Import {
                dry_run,
                json: _,
                path,
            } => commands::transaction::import(path.clone(), *dry_run),
        },
        Commands::Budget { command } => match command {
            BudgetCommand::Set {
                category,
                amount,
                period,
                json: _,
            } => commands::budget::set(category, *amount, period),
            BudgetCommand::List { .. } => commands::budget::list(),
            BudgetCommand::Remove { category, .. } => commands::budget::remove(category),
        },
        Commands::Progress {
            category, as_of, ..
        } => commands::progress::run(
            category.clone(),
            as_of.as_ref().map(|value| value.as_str().to_string()),
        ),
        Commands::Insights { as_of, .. } => commands::insights::run(
            as_of.as_ref().map(|value| value.as_str().to_string()),
        ),
    }
}
