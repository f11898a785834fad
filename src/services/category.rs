//! Category service
//!
//! Adding an expense category also gives it a 0% budget; deleting one drops
//! the budget entry. A category referenced by any transaction of its type
//! cannot be deleted, and the two savings categories can never be deleted.
//! Deleting never rewrites transactions.

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::category::{is_reserved, reserved_type};
use crate::models::{CategorySet, TransactionType};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

fn audit_id(kind: TransactionType, name: &str) -> String {
    format!("{}/{}", kind, name)
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> TallyResult<CategorySet> {
        self.storage.categories.get_all()
    }

    /// Add a category, returning the trimmed name
    pub fn add(&self, kind: TransactionType, name: &str) -> TallyResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TallyError::Validation(
                "Category name cannot be empty".into(),
            ));
        }

        if let Some(owner) = reserved_type(name).filter(|owner| *owner != kind) {
            return Err(TallyError::Validation(format!(
                "'{}' is reserved for {} transactions",
                name, owner
            )));
        }

        if !self.storage.categories.insert(kind, name)? {
            return Err(TallyError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }
        self.storage.categories.save()?;

        if kind == TransactionType::Expense {
            self.storage.budgets.ensure(name)?;
            self.storage.budgets.save()?;
        }

        self.storage.log_create(
            EntityType::Category,
            audit_id(kind, name),
            Some(name.to_string()),
            &name,
        )?;

        Ok(name.to_string())
    }

    /// Delete an unused, non-reserved category
    pub fn delete(&self, kind: TransactionType, name: &str) -> TallyResult<()> {
        let name = name.trim();

        if is_reserved(name) {
            return Err(TallyError::Validation(format!(
                "'{}' is a reserved category and cannot be deleted",
                name
            )));
        }

        if !self.storage.categories.contains(kind, name)? {
            return Err(TallyError::category_not_found(audit_id(kind, name)));
        }

        if self.storage.transactions.uses_category(kind, name)? {
            return Err(TallyError::CategoryInUse(name.to_string()));
        }

        self.storage.categories.remove(kind, name)?;
        self.storage.categories.save()?;

        if kind == TransactionType::Expense && self.storage.budgets.remove(name)?.is_some() {
            self.storage.budgets.save()?;
        }

        self.storage.log_delete(
            EntityType::Category,
            audit_id(kind, name),
            Some(name.to_string()),
            &name,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::models::{Money, SAVINGS_DEPOSIT, SAVINGS_WITHDRAWAL};
    use crate::services::import::TransactionDraft;
    use crate::services::TransactionService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_list_defaults() {
        let (_temp_dir, storage) = create_test_storage();
        let set = CategoryService::new(&storage).list().unwrap();
        assert_eq!(set.len(), 15);
    }

    #[test]
    fn test_add_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        assert_eq!(service.add(TransactionType::Expense, "  Pets ").unwrap(), "Pets");
        assert!(storage.categories.contains(TransactionType::Expense, "Pets").unwrap());
        assert_eq!(storage.budgets.get_all().unwrap().get("Pets"), Some(0));

        service.add(TransactionType::Income, "Tips").unwrap();
        assert_eq!(storage.budgets.get_all().unwrap().get("Tips"), None);

        // persisted
        storage.categories.load().unwrap();
        assert!(storage.categories.contains(TransactionType::Income, "Tips").unwrap());
    }

    #[test]
    fn test_add_rejects_empty_and_duplicate() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        assert!(service.add(TransactionType::Expense, "   ").unwrap_err().is_validation());
        assert!(matches!(
            service.add(TransactionType::Expense, "Groceries"),
            Err(TallyError::Duplicate { .. })
        ));
        // the same name under the other type is a different category
        service.add(TransactionType::Income, "Groceries").unwrap();
    }

    #[test]
    fn test_add_rejects_savings_name_under_other_type() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let err = service.add(TransactionType::Income, SAVINGS_DEPOSIT).unwrap_err();
        assert!(err.is_validation());
        assert!(service.add(TransactionType::Expense, SAVINGS_WITHDRAWAL).unwrap_err().is_validation());

        let categories = service.list().unwrap();
        assert!(!categories.contains(TransactionType::Income, SAVINGS_DEPOSIT));
        assert!(!categories.contains(TransactionType::Expense, SAVINGS_WITHDRAWAL));
    }

    #[test]
    fn test_delete_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        storage.budgets.set("Shopping", 20).unwrap();

        service.delete(TransactionType::Expense, "Shopping").unwrap();
        assert!(!storage.categories.contains(TransactionType::Expense, "Shopping").unwrap());
        assert_eq!(storage.budgets.get_all().unwrap().get("Shopping"), None);

        assert!(service
            .delete(TransactionType::Expense, "Shopping")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_reserved_categories_cannot_be_deleted() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        assert!(service
            .delete(TransactionType::Expense, SAVINGS_DEPOSIT)
            .unwrap_err()
            .is_validation());
        assert!(service
            .delete(TransactionType::Income, SAVINGS_WITHDRAWAL)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_category_in_use_cannot_be_deleted() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        TransactionService::new(&storage)
            .add(&TransactionDraft {
                date: NaiveDate::from_ymd_opt(2024, 1, 1),
                description: "Bus".into(),
                amount: Some(Money::from_cents(250)),
                kind: Some(TransactionType::Expense),
                category: "Transport".into(),
            })
            .unwrap();

        assert!(matches!(
            service.delete(TransactionType::Expense, "Transport"),
            Err(TallyError::CategoryInUse(name)) if name == "Transport"
        ));

        // only transactions of the same type count
        service.add(TransactionType::Income, "Transport").unwrap();
        service.delete(TransactionType::Income, "Transport").unwrap();
    }

    #[test]
    fn test_changes_are_audited() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        service.add(TransactionType::Expense, "Pets").unwrap();
        service.delete(TransactionType::Expense, "Pets").unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].entity_id, "expense/Pets");
        assert_eq!(entries[1].entity_type, EntityType::Category);
    }
}
