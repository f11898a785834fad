//! Export module
//!
//! - CSV: transactions (re-importable) and budget percentages
//! - JSON: full backup and restore
//! - YAML: human-readable full export

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{escape_csv, export_budgets_csv, export_transactions_csv};
pub use json::{export_backup_json, restore_backup, Backup, RestoreSummary, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
