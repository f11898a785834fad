//! Budget CLI commands

use clap::Subcommand;

use crate::cli::report::{today, PeriodArgs};
use crate::config::settings::Settings;
use crate::display::{format_allocations, format_comparison};
use crate::error::TallyResult;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show the percentage of income allocated to each expense category
    List,

    /// Set a category's percentage (clamped to 0-100)
    Set {
        /// Expense category name
        category: String,
        /// Percentage of income
        #[arg(allow_negative_numbers = true)]
        percent: i64,
    },

    /// Compare allocations with actual spending
    Compare {
        #[command(flatten)]
        period: PeriodArgs,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> TallyResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::List => {
            print!("{}", format_allocations(&service.list()?));
        }

        BudgetCommands::Set { category, percent } => {
            let stored = service.set(&category, percent)?;
            println!("{}: {}%", category.trim(), stored);
            if i64::from(stored) != percent {
                println!("  (clamped from {})", percent);
            }

            let total = service.total_allocation()?;
            if total > 100 {
                println!("Warning: total allocation is {}%", total);
            }
        }

        BudgetCommands::Compare { period } => {
            let selector = period.selector(settings.default_period);
            let today = today();
            let transactions = storage.transactions.get_all()?;
            let rows = service.compare(&transactions, &selector, today)?;

            println!("Budget vs. spending: {}", selector.label(today));
            print!("{}", format_comparison(&rows));
        }
    }

    Ok(())
}
