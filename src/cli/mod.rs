//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod budget;
pub mod category;
pub mod export;
pub mod import;
pub mod report;
pub mod transaction;

pub use audit::handle_audit_command;
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, handle_restore_command, ExportCommands};
pub use import::{handle_import_command, parse_mapping_override};
pub use report::{handle_report_command, handle_statement_command, ReportArgs, StatementArgs};
pub use transaction::{handle_transaction_command, TransactionCommands};
