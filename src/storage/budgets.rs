//! Budget repository for JSON storage
//!
//! Stores the percentage allocation per expense category in budgets.json as a
//! plain `{"Groceries": 25, ...}` map.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::Budgets;

use super::file_io::{read_json, write_json_atomic};

/// Repository for budget allocation persistence
pub struct BudgetRepository {
    path: PathBuf,
    data: RwLock<Budgets>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Budgets::new()),
        }
    }

    /// Load allocations from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let loaded: Budgets = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = loaded;
        Ok(())
    }

    /// Save allocations to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(&self.path, &*data)
    }

    pub fn get_all(&self) -> Result<Budgets, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    /// Set a category's percentage, returning the clamped stored value
    pub fn set(&self, category: &str, percentage: i64) -> Result<u8, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.set(category, percentage))
    }

    /// Add a 0% entry for a new expense category
    pub fn ensure(&self, category: &str) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.ensure(category);
        Ok(())
    }

    pub fn remove(&self, category: &str) -> Result<Option<u8>, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(category))
    }

    /// Replace every allocation (restore from backup)
    pub fn replace_all(&self, budgets: Budgets) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = budgets;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_save_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("budgets.json");

        let repo = BudgetRepository::new(path.clone());
        repo.load().unwrap();
        assert_eq!(repo.set("Groceries", 150).unwrap(), 100);
        repo.ensure("Shopping").unwrap();
        repo.save().unwrap();

        let repo2 = BudgetRepository::new(path);
        repo2.load().unwrap();
        let budgets = repo2.get_all().unwrap();
        assert_eq!(budgets.get("Groceries"), Some(100));
        assert_eq!(budgets.get("Shopping"), Some(0));
    }

    #[test]
    fn test_remove() {
        let temp_dir = TempDir::new().unwrap();
        let repo = BudgetRepository::new(temp_dir.path().join("budgets.json"));
        repo.set("Groceries", 10).unwrap();
        assert_eq!(repo.remove("Groceries").unwrap(), Some(10));
        assert_eq!(repo.remove("Groceries").unwrap(), None);
    }
}
