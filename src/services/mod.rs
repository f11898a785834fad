//! Service layer
//!
//! Business logic on top of the storage layer: validation, categorization,
//! audit logging and cross-repository rules.

pub mod budget;
pub mod categorize;
pub mod category;
pub mod import;
pub mod transaction;

pub use budget::{Allocation, BudgetComparison, BudgetService};
pub use categorize::{categorize, categorize_explained, MatchSource};
pub use category::CategoryService;
pub use import::{import_csv, CsvSource, ImportOptions, ImportResult, ImportService};
pub use transaction::TransactionService;
