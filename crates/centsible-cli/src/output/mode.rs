use crate::cli::{BudgetCommand, CategoryCommand, Commands, TxnCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Category { command } => match command {
            CategoryCommand::Add { json, .. } | CategoryCommand::List { json } => *json,
        },
        Commands::Txn { command } => match command {
            TxnCommand::Add { json, .. }
            | TxnCommand::List { json, .. }
            | TxnCommand::Import { json, .. } => *json,
        },
        Commands::Budget { command } => match command {
            BudgetCommand::Set { json, .. }
            | BudgetCommand::List { json }
            | BudgetCommand::Remove { json, .. } => *json,
        },
        Commands::Progress { json, .. } | Commands::Insights { json, .. } => *json,
    };

    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
