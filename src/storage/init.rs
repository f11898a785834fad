//! Storage initialization
//!
//! Handles first-run setup: the data directory, the default category set and
//! a zeroed budget entry for every expense category.

use crate::config::paths::TallyPaths;
use crate::error::TallyError;
use crate::models::{Budgets, CategorySet};

use super::file_io::{read_json_or_else, write_json_atomic};

/// Initialize storage for a fresh installation
///
/// Existing data files are left untouched.
pub fn initialize_storage(paths: &TallyPaths) -> Result<(), TallyError> {
    paths.ensure_directories()?;

    let categories: CategorySet = read_json_or_else(paths.categories_file(), CategorySet::default)?;

    if !paths.categories_file().exists() {
        write_json_atomic(paths.categories_file(), &categories)?;
        log::info!("created default categories");
    }

    if !paths.budgets_file().exists() {
        let mut budgets = Budgets::new();
        for name in &categories.expense {
            budgets.ensure(name);
        }
        write_json_atomic(paths.budgets_file(), &budgets)?;
    }

    if !paths.transactions_file().exists() {
        write_json_atomic(paths.transactions_file(), &Vec::<()>::new())?;
    }

    Ok(())
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &TallyPaths) -> bool {
    !paths.categories_file().exists()
}
