//! Budget service
//!
//! Percentage allocations of income per expense category, plus a comparison
//! of each allocation against what was actually spent in a report period.

use chrono::NaiveDate;
use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{TallyError, TallyResult};
use crate::models::{Money, PeriodSelector, Transaction, TransactionType};
use crate::reports::generate_report;
use crate::storage::Storage;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// One expense category's allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub category: String,
    pub percentage: u8,
}

/// Allocation vs. actual spending for one category
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetComparison {
    pub category: String,
    pub allocated_percent: u8,
    /// Allocated share of the period's income
    pub target: Money,
    pub spent: Money,
    /// Spending as a percentage of income, 0 when there was no income
    pub actual_percent: f64,
}

impl BudgetComparison {
    pub fn is_over(&self) -> bool {
        self.spent > self.target
    }

    pub fn remaining(&self) -> Money {
        self.target - self.spent
    }
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set the percentage for an expense category
    ///
    /// Values outside 0..=100 are clamped; the stored value is returned.
    pub fn set(&self, category: &str, percentage: i64) -> TallyResult<u8> {
        let category = category.trim();
        if !self
            .storage
            .categories
            .contains(TransactionType::Expense, category)?
        {
            return Err(TallyError::category_not_found(category));
        }

        let before = self.storage.budgets.get_all()?.get(category);
        let stored = self.storage.budgets.set(category, percentage)?;
        self.storage.budgets.save()?;

        let after = Allocation {
            category: category.to_string(),
            percentage: stored,
        };
        match before {
            Some(previous) if previous == stored => {}
            Some(previous) => self.storage.log_update(
                EntityType::Budget,
                category,
                Some(category.to_string()),
                &Allocation {
                    category: category.to_string(),
                    percentage: previous,
                },
                &after,
            )?,
            None => self.storage.log_create(
                EntityType::Budget,
                category,
                Some(category.to_string()),
                &after,
            )?,
        }

        if self.storage.budgets.get_all()?.is_over_allocated() {
            log::warn!("budget allocations exceed 100% of income");
        }

        Ok(stored)
    }

    /// Every expense category with its allocation, in category order
    ///
    /// Categories without a stored entry report 0%.
    pub fn list(&self) -> TallyResult<Vec<Allocation>> {
        let categories = self.storage.categories.get_all()?;
        let budgets = self.storage.budgets.get_all()?;

        Ok(categories
            .expense
            .iter()
            .map(|name| Allocation {
                category: name.clone(),
                percentage: budgets.get(name).unwrap_or(0),
            })
            .collect())
    }

    /// Sum of all allocations
    pub fn total_allocation(&self) -> TallyResult<u32> {
        Ok(self.list()?.iter().map(|a| a.percentage as u32).sum())
    }

    pub fn over_allocated(&self) -> TallyResult<bool> {
        Ok(self.total_allocation()? > 100)
    }

    /// Compare allocations with spending over a report period
    ///
    /// Targets are computed against the period's total income, which
    /// includes savings withdrawals the same way the summary report does.
    pub fn compare(
        &self,
        transactions: &[Transaction],
        period: &PeriodSelector,
        today: NaiveDate,
    ) -> TallyResult<Vec<BudgetComparison>> {
        let report = generate_report(transactions, period, today);
        if let Some(err) = report.range_error {
            return Err(TallyError::Range(err.to_string()));
        }

        let income = report.total_income;
        let comparisons = self
            .list()?
            .into_iter()
            .map(|allocation| {
                let spent = report
                    .expense_by_category
                    .iter()
                    .find(|share| share.category == allocation.category)
                    .map(|share| share.amount)
                    .unwrap_or_else(Money::zero);
                let target = Money::from_cents(
                    (i128::from(income.cents()) * i128::from(allocation.percentage) / 100) as i64,
                );
                let actual_percent = if income.is_positive() {
                    (spent.cents() as f64 / income.cents() as f64 * 1000.0).round() / 10.0
                } else {
                    0.0
                };

                BudgetComparison {
                    category: allocation.category,
                    allocated_percent: allocation.percentage,
                    target,
                    spent,
                    actual_percent,
                }
            })
            .collect();

        Ok(comparisons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::paths::TallyPaths;
    use crate::models::TransactionId;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn txn(id: i64, date: &str, kind: TransactionType, cents: i64, category: &str) -> Transaction {
        Transaction::new(
            TransactionId::new(id),
            kind,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "test",
            Money::from_cents(cents),
            category,
        )
    }

    #[test]
    fn test_set_clamps_and_persists() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        assert_eq!(service.set("Groceries", 25).unwrap(), 25);
        assert_eq!(service.set("Shopping", 140).unwrap(), 100);
        assert_eq!(service.set("Entertainment", -3).unwrap(), 0);

        storage.budgets.load().unwrap();
        assert_eq!(storage.budgets.get_all().unwrap().get("Groceries"), Some(25));
        assert!(service.over_allocated().unwrap());
    }

    #[test]
    fn test_set_rejects_unknown_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        assert!(service.set("Yachts", 10).unwrap_err().is_not_found());
        // income categories have no budget
        assert!(service.set("Salary", 10).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_covers_every_expense_category() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        storage.budgets.remove("Transport").unwrap();
        service.set("Utilities", 10).unwrap();

        let list = service.list().unwrap();
        assert_eq!(list.len(), 10);
        let transport = list.iter().find(|a| a.category == "Transport").unwrap();
        assert_eq!(transport.percentage, 0);
        assert_eq!(service.total_allocation().unwrap(), 10);
        assert!(!service.over_allocated().unwrap());
    }

    #[test]
    fn test_set_is_audited_as_update() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);

        service.set("Groceries", 20).unwrap();
        service.set("Groceries", 20).unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Update);
        assert_eq!(entries[0].entity_type, EntityType::Budget);
    }

    #[test]
    fn test_compare_with_spending() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        service.set("Groceries", 10).unwrap();
        service.set("Dining Out", 5).unwrap();

        let transactions = vec![
            txn(1, "2024-05-01", TransactionType::Income, 200_000, "Salary"),
            txn(2, "2024-05-03", TransactionType::Expense, 15_000, "Groceries"),
            txn(3, "2024-05-04", TransactionType::Expense, 12_000, "Dining Out"),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        let rows = service
            .compare(&transactions, &PeriodSelector::Monthly, today)
            .unwrap();

        let groceries = rows.iter().find(|r| r.category == "Groceries").unwrap();
        assert_eq!(groceries.target, Money::from_cents(20_000));
        assert_eq!(groceries.spent, Money::from_cents(15_000));
        assert_eq!(groceries.actual_percent, 7.5);
        assert!(!groceries.is_over());
        assert_eq!(groceries.remaining(), Money::from_cents(5_000));

        let dining = rows.iter().find(|r| r.category == "Dining Out").unwrap();
        assert!(dining.is_over());
    }

    #[test]
    fn test_compare_without_income() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let transactions = vec![txn(
            1,
            "2024-05-03",
            TransactionType::Expense,
            1_000,
            "Groceries",
        )];
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

        let rows = service
            .compare(&transactions, &PeriodSelector::All, today)
            .unwrap();
        let groceries = rows.iter().find(|r| r.category == "Groceries").unwrap();
        assert_eq!(groceries.actual_percent, 0.0);
        assert_eq!(groceries.target, Money::zero());
    }

    #[test]
    fn test_compare_rejects_invalid_range() {
        let (_temp_dir, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let period = PeriodSelector::Custom {
            start: None,
            end: None,
        };

        assert!(matches!(
            service.compare(&[], &period, today),
            Err(TallyError::Range(_))
        ));
    }
}
