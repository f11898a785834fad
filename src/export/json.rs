//! JSON backup and restore
//!
//! A backup is `{"transactions": [...], "categories": {"income": [...],
//! "expense": [...]}}`, optionally with `budgets`, `schema_version` and
//! `exported_at`. Files holding only the first two keys restore as well.

use crate::error::{TallyError, TallyResult};
use crate::models::{
    Budgets, CategorySet, Transaction, TransactionType, SAVINGS_DEPOSIT, SAVINGS_WITHDRAWAL,
};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

/// Current backup schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Complete data backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,

    pub transactions: Vec<Transaction>,

    pub categories: CategorySet,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budgets: Option<Budgets>,
}

/// What a restore replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub transactions: usize,
    pub categories: usize,
    /// Transactions whose category is not in the restored set
    pub orphaned: usize,
    pub budgets_restored: bool,
}

impl Backup {
    /// Snapshot the current storage
    pub fn from_storage(storage: &Storage) -> TallyResult<Self> {
        Ok(Self {
            schema_version: Some(EXPORT_SCHEMA_VERSION.to_string()),
            exported_at: Some(Utc::now()),
            transactions: storage.transactions.get_all()?,
            categories: storage.categories.get_all()?,
            budgets: Some(storage.budgets.get_all()?),
        })
    }

    /// Parse backup text
    ///
    /// Anything that is not an object with a `transactions` array and a
    /// `categories` object of `income`/`expense` arrays is rejected.
    pub fn parse(text: &str) -> TallyResult<Self> {
        let backup: Self = serde_json::from_str(text)
            .map_err(|e| TallyError::Import(format!("invalid backup file: {}", e)))?;
        backup.validate()?;
        Ok(backup)
    }

    pub fn validate(&self) -> TallyResult<()> {
        if let Some(version) = &self.schema_version {
            let major = version.split('.').next().unwrap_or_default();
            let expected = EXPORT_SCHEMA_VERSION.split('.').next().unwrap_or_default();
            if major != expected {
                return Err(TallyError::Import(format!(
                    "unsupported backup schema version {} (expected {})",
                    version, EXPORT_SCHEMA_VERSION
                )));
            }
        }

        let mut seen = HashSet::new();
        for txn in &self.transactions {
            if !seen.insert(txn.id) {
                return Err(TallyError::Import(format!(
                    "backup contains transaction id {} more than once",
                    txn.id
                )));
            }
        }

        Ok(())
    }

    /// Transactions referencing a category missing from the backup's set
    pub fn orphaned_transactions(&self) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| !self.categories.contains(t.kind, &t.category))
            .collect()
    }
}

/// Write a JSON backup of all data
pub fn export_backup_json<W: Write>(storage: &Storage, writer: &mut W) -> TallyResult<()> {
    let backup = Backup::from_storage(storage)?;
    serde_json::to_writer_pretty(writer, &backup)
        .map_err(|e| TallyError::Export(e.to_string()))
}

/// Replace all stored data with a backup
///
/// The savings categories are added back if the backup lacks them. Without
/// a `budgets` section, existing percentages are kept for categories that
/// survive and new expense categories start at 0%.
pub fn restore_backup(storage: &Storage, backup: Backup) -> TallyResult<RestoreSummary> {
    backup.validate()?;

    let mut categories = backup.categories.clone().normalized();
    categories.insert(TransactionType::Expense, SAVINGS_DEPOSIT);
    categories.insert(TransactionType::Income, SAVINGS_WITHDRAWAL);

    let orphaned = backup
        .transactions
        .iter()
        .filter(|t| !categories.contains(t.kind, &t.category))
        .count();
    if orphaned > 0 {
        log::warn!(
            "{} restored transaction(s) reference categories that no longer exist",
            orphaned
        );
    }

    let budgets_restored = backup.budgets.is_some();
    let previous = storage.budgets.get_all()?;
    let mut budgets = Budgets::new();
    for name in &categories.expense {
        let source = backup.budgets.as_ref().unwrap_or(&previous);
        budgets.set(name.as_str(), source.get(name).unwrap_or(0) as i64);
    }

    let summary = RestoreSummary {
        transactions: backup.transactions.len(),
        categories: categories.len(),
        orphaned,
        budgets_restored,
    };

    storage.transactions.replace_all(backup.transactions)?;
    storage.categories.replace_all(categories)?;
    storage.budgets.replace_all(budgets)?;
    storage.save_all()?;

    log::info!(
        "Restored {} transactions and {} categories",
        summary.transactions,
        summary.categories
    );

    Ok(summary)
}
