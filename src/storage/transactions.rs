//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json. The file is
//! a bare JSON array of transaction records.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{IdAllocator, Transaction, TransactionId, TransactionType};

use super::file_io::{read_json, write_json_atomic};

/// Repository for transaction persistence
///
/// Records are keyed by id; since ids come from creation timestamps the map
/// iterates in creation order.
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let records: Vec<Transaction> = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for txn in records {
            if data.insert(txn.id, txn).is_some() {
                log::warn!("duplicate transaction id in {}", self.path.display());
            }
        }

        log::debug!("loaded {} transactions", data.len());
        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let records: Vec<&Transaction> = data.values().collect();
        write_json_atomic(&self.path, &records)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions in creation order
    pub fn get_all(&self) -> Result<Vec<Transaction>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.values().cloned().collect())
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(txn.id, txn);
        Ok(())
    }

    /// Insert many transactions at once (import, restore)
    pub fn insert_many(&self, txns: Vec<Transaction>) -> Result<usize, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let count = txns.len();
        for txn in txns {
            data.insert(txn.id, txn);
        }
        Ok(count)
    }

    /// Delete a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> Result<Option<Transaction>, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }

    /// Remove every transaction, returning how many were removed
    pub fn clear(&self) -> Result<usize, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let count = data.len();
        data.clear();
        Ok(count)
    }

    /// Replace the whole log (restore from backup)
    pub fn replace_all(&self, txns: Vec<Transaction>) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for txn in txns {
            data.insert(txn.id, txn);
        }
        Ok(())
    }

    /// Is a category of the given type referenced by any transaction?
    pub fn uses_category(&self, kind: TransactionType, category: &str) -> Result<bool, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .any(|t| t.kind == kind && t.category == category))
    }

    /// Id allocator positioned after the newest stored id
    pub fn id_allocator(&self) -> Result<IdAllocator, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(IdAllocator::after(data.values()))
    }

    /// Count transactions
    pub fn count(&self) -> Result<usize, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path);
        (temp_dir, repo)
    }

    fn txn(id: i64, kind: TransactionType, category: &str) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            kind,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            "Test",
            Money::from_cents(1000),
            category,
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(1, TransactionType::Expense, "Groceries")).unwrap();

        let got = repo.get(TransactionId::new(1)).unwrap().unwrap();
        assert_eq!(got.category, "Groceries");
        assert!(repo.get(TransactionId::new(2)).unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.insert_many(vec![
            txn(2, TransactionType::Income, "Salary"),
            txn(1, TransactionType::Expense, "Groceries"),
        ])
        .unwrap();
        repo.save().unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("transactions.json")).unwrap();
        assert!(raw.trim_start().starts_with('['));

        let repo2 = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo2.load().unwrap();
        let all = repo2.get_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, TransactionId::new(1));
    }

    #[test]
    fn test_delete_and_clear() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(1, TransactionType::Expense, "Groceries")).unwrap();
        repo.upsert(txn(2, TransactionType::Expense, "Groceries")).unwrap();

        assert!(repo.delete(TransactionId::new(1)).unwrap().is_some());
        assert!(repo.delete(TransactionId::new(1)).unwrap().is_none());
        assert_eq!(repo.clear().unwrap(), 1);
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_uses_category_respects_type() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(1, TransactionType::Expense, "Misc")).unwrap();

        assert!(repo.uses_category(TransactionType::Expense, "Misc").unwrap());
        assert!(!repo.uses_category(TransactionType::Income, "Misc").unwrap());
    }

    #[test]
    fn test_id_allocator_continues_after_existing() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(txn(5_000, TransactionType::Expense, "Misc")).unwrap();

        let mut ids = repo.id_allocator().unwrap();
        assert_eq!(ids.next_at(10).value(), 5_001);
    }
}
