//! Category CLI commands

use clap::Subcommand;

use crate::display::format_category_lists;
use crate::error::TallyResult;
use crate::models::TransactionType;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List income and expense categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
    },

    /// Delete an unused category
    Delete {
        /// Category name
        name: String,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionType,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> TallyResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            print!("{}", format_category_lists(&service.list()?));
        }

        CategoryCommands::Add { name, kind } => {
            let name = service.add(kind, &name)?;
            println!("Added {} category: {}", kind, name);
            if kind == TransactionType::Expense {
                println!("  Budget: 0%");
            }
        }

        CategoryCommands::Delete { name, kind } => {
            service.delete(kind, &name)?;
            println!("Deleted {} category: {}", kind, name.trim());
        }
    }

    Ok(())
}
