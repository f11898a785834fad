//! Category repository for JSON storage
//!
//! Manages loading and saving the category set to categories.json as
//! `{"income": [...], "expense": [...]}`. A missing file yields the built-in
//! default labels.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{CategorySet, TransactionType};

use super::file_io::{read_json_or_else, write_json_atomic};

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    data: RwLock<CategorySet>,
}

impl CategoryRepository {
    /// Create a new category repository holding the default labels
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(CategorySet::default()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let loaded: CategorySet = read_json_or_else(&self.path, CategorySet::default)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = loaded.normalized();
        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        write_json_atomic(&self.path, &*data)
    }

    /// Snapshot of the whole set
    pub fn get_all(&self) -> Result<CategorySet, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.clone())
    }

    pub fn contains(&self, kind: TransactionType, name: &str) -> Result<bool, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains(kind, name))
    }

    /// Add a label; returns false if it already existed
    pub fn insert(&self, kind: TransactionType, name: &str) -> Result<bool, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.insert(kind, name))
    }

    /// Remove a label; returns false if it was not present
    pub fn remove(&self, kind: TransactionType, name: &str) -> Result<bool, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(kind, name))
    }

    /// Replace the whole set (restore from backup)
    pub fn replace_all(&self, set: CategorySet) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *data = set.normalized();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        let repo = CategoryRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.get_all().unwrap(), CategorySet::default());
    }

    #[test]
    fn test_insert_save_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert!(repo.insert(TransactionType::Expense, "Pets").unwrap());
        assert!(!repo.insert(TransactionType::Expense, "Pets").unwrap());
        repo.save().unwrap();

        let repo2 = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo2.load().unwrap();
        assert!(repo2.contains(TransactionType::Expense, "Pets").unwrap());
        assert!(!repo2.contains(TransactionType::Income, "Pets").unwrap());
    }

    #[test]
    fn test_load_normalizes_foreign_file() {
        let (temp_dir, repo) = create_test_repo();
        std::fs::write(
            temp_dir.path().join("categories.json"),
            r#"{"income": ["Tips", "Salary", "Tips"], "expense": ["Rent"]}"#,
        )
        .unwrap();
        repo.load().unwrap();

        let set = repo.get_all().unwrap();
        assert_eq!(set.income, vec!["Salary".to_string(), "Tips".to_string()]);
    }
}
