//! Transaction CLI commands

use clap::Subcommand;

use crate::display::{format_transaction_details, format_transaction_register};
use crate::error::{TallyError, TallyResult};
use crate::models::{parse_date_token, Money, TransactionId, TransactionType};
use crate::services::categorize;
use crate::services::import::TransactionDraft;
use crate::services::TransactionService;
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Description
        description: String,
        /// Amount (e.g. "12.50")
        amount: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Category; picked from the description when omitted
        #[arg(short, long)]
        category: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one transaction
    Show {
        id: TransactionId,
    },

    /// Change fields of a transaction
    Edit {
        id: TransactionId,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionType>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        id: TransactionId,
    },

    /// Delete every transaction
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn parse_amount(text: &str) -> TallyResult<Money> {
    Money::parse(text).map_err(|e| TallyError::Validation(format!("Invalid amount: {}", e)))
}

fn parse_date(text: &str) -> TallyResult<chrono::NaiveDate> {
    parse_date_token(text)
        .ok_or_else(|| TallyError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", text)))
}

/// Handle a transaction command
pub fn handle_transaction_command(storage: &Storage, cmd: TransactionCommands) -> TallyResult<()> {
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Add {
            description,
            amount,
            kind,
            category,
            date,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => chrono::Local::now().date_naive(),
            };
            let categories = storage.categories.get_all()?;
            let category = categorize(&description, kind, category.as_deref(), &categories);

            let txn = service.add(&TransactionDraft {
                date: Some(date),
                description,
                amount: Some(parse_amount(&amount)?),
                kind: Some(kind),
                category,
            })?;

            println!("Added transaction {}", txn.id);
            print!("{}", format_transaction_details(&txn));
        }

        TransactionCommands::List { limit } => {
            let transactions: Vec<_> = service.list()?.into_iter().take(limit).collect();
            print!("{}", format_transaction_register(&transactions));
        }

        TransactionCommands::Show { id } => {
            let txn = service
                .get(id)?
                .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;
            print!("{}", format_transaction_details(&txn));
        }

        TransactionCommands::Edit {
            id,
            description,
            amount,
            kind,
            category,
            date,
        } => {
            let current = service
                .get(id)?
                .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;

            let draft = TransactionDraft {
                date: match date {
                    Some(d) => Some(parse_date(&d)?),
                    None => current.parsed_date(),
                },
                description: description.unwrap_or(current.description),
                amount: Some(match amount {
                    Some(a) => parse_amount(&a)?,
                    None => current.amount,
                }),
                kind: Some(kind.unwrap_or(current.kind)),
                category: category.unwrap_or(current.category),
            };

            let txn = service.edit(id, &draft)?;
            println!("Updated transaction {}", txn.id);
            print!("{}", format_transaction_details(&txn));
        }

        TransactionCommands::Delete { id } => {
            let txn = service.delete(id)?;
            println!("Deleted transaction {} ({})", txn.id, txn.description);
        }

        TransactionCommands::Clear { yes } => {
            if !yes {
                return Err(TallyError::Validation(
                    "Refusing to delete all transactions without --yes".into(),
                ));
            }
            let removed = service.clear_all()?;
            println!("Deleted {} transaction(s)", removed);
        }
    }

    Ok(())
}
