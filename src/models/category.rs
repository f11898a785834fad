//! Category model
//!
//! Categories are plain labels grouped by transaction type. Two labels are
//! reserved for moving money in and out of savings and are only valid for one
//! type each.

use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// Reserved expense category: money moved into savings
pub const SAVINGS_DEPOSIT: &str = "Savings Deposit";

/// Reserved income category: money taken out of savings
pub const SAVINGS_WITHDRAWAL: &str = "Savings Withdrawal";

/// Catch-all income category
pub const OTHER_INCOME: &str = "Other Income";

/// Catch-all expense category
pub const OTHER_EXPENSE: &str = "Other Expense";

const DEFAULT_INCOME: &[&str] = &[
    "Salary",
    "Freelance",
    "Investment",
    OTHER_INCOME,
    SAVINGS_WITHDRAWAL,
];

const DEFAULT_EXPENSE: &[&str] = &[
    "Groceries",
    "Rent/Mortgage",
    "Utilities",
    "Transport",
    "Dining Out",
    "Entertainment",
    "Shopping",
    "Healthcare",
    OTHER_EXPENSE,
    SAVINGS_DEPOSIT,
];

/// Is `name` one of the two savings categories?
pub fn is_reserved(name: &str) -> bool {
    name == SAVINGS_DEPOSIT || name == SAVINGS_WITHDRAWAL
}

/// The only type a reserved category may be used with
pub fn reserved_type(name: &str) -> Option<TransactionType> {
    match name {
        SAVINGS_DEPOSIT => Some(TransactionType::Expense),
        SAVINGS_WITHDRAWAL => Some(TransactionType::Income),
        _ => None,
    }
}

/// Fallback category for a transaction type
pub fn fallback_category(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => OTHER_INCOME,
        TransactionType::Expense => OTHER_EXPENSE,
    }
}

/// Income and expense category labels
///
/// Each list is kept sorted by name and free of duplicates. Serialized as
/// `{"income": [...], "expense": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    #[serde(default)]
    pub income: Vec<String>,
    #[serde(default)]
    pub expense: Vec<String>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::from_lists(
            DEFAULT_INCOME.iter().map(|s| s.to_string()).collect(),
            DEFAULT_EXPENSE.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl CategorySet {
    /// An empty set
    pub fn empty() -> Self {
        Self {
            income: Vec::new(),
            expense: Vec::new(),
        }
    }

    /// Build a set from raw lists, trimming, sorting and dropping duplicates
    ///
    /// A savings category listed under the other type is dropped.
    pub fn from_lists(income: Vec<String>, expense: Vec<String>) -> Self {
        Self {
            income: normalize(income, TransactionType::Income),
            expense: normalize(expense, TransactionType::Expense),
        }
    }

    /// Re-establish ordering and uniqueness after deserializing foreign data
    pub fn normalized(self) -> Self {
        Self::from_lists(self.income, self.expense)
    }

    pub fn for_type(&self, kind: TransactionType) -> &[String] {
        match kind {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    fn for_type_mut(&mut self, kind: TransactionType) -> &mut Vec<String> {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        }
    }

    pub fn contains(&self, kind: TransactionType, name: &str) -> bool {
        self.for_type(kind)
            .binary_search_by(|c| c.as_str().cmp(name))
            .is_ok()
    }

    /// `name` exists for `kind` and, if reserved, belongs to `kind`
    pub fn allows(&self, kind: TransactionType, name: &str) -> bool {
        reserved_type(name).map_or(true, |t| t == kind) && self.contains(kind, name)
    }

    /// Insert a name; returns false if it was already present
    pub fn insert(&mut self, kind: TransactionType, name: &str) -> bool {
        let list = self.for_type_mut(kind);
        match list.binary_search_by(|c| c.as_str().cmp(name)) {
            Ok(_) => false,
            Err(pos) => {
                list.insert(pos, name.to_string());
                true
            }
        }
    }

    /// Remove a name; returns false if it was not present
    pub fn remove(&mut self, kind: TransactionType, name: &str) -> bool {
        let list = self.for_type_mut(kind);
        match list.binary_search_by(|c| c.as_str().cmp(name)) {
            Ok(pos) => {
                list.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Total number of labels across both types
    pub fn len(&self) -> usize {
        self.income.len() + self.expense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expense.is_empty()
    }
}

fn normalize(list: Vec<String>, kind: TransactionType) -> Vec<String> {
    let mut list: Vec<String> = list
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && reserved_type(s).map_or(true, |t| t == kind))
        .collect();
    list.sort();
    list.dedup();
    list
}
