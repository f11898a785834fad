//! Budget allocation model
//!
//! A budget assigns each expense category a whole percentage of income.
//! Values are clamped to 0..=100 on the way in; the sum may exceed 100, which
//! callers surface as a warning rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Clamp a user supplied percentage into 0..=100
pub fn clamp_percentage(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Percentage allocations keyed by expense category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budgets {
    allocations: BTreeMap<String, u8>,
}

impl Budgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a category's share, returning the clamped value that was stored
    pub fn set(&mut self, category: impl Into<String>, percentage: i64) -> u8 {
        let clamped = clamp_percentage(percentage);
        self.allocations.insert(category.into(), clamped);
        clamped
    }

    /// Add a 0% entry unless the category already has one
    pub fn ensure(&mut self, category: &str) {
        self.allocations.entry(category.to_string()).or_insert(0);
    }

    pub fn get(&self, category: &str) -> Option<u8> {
        self.allocations.get(category).copied()
    }

    pub fn remove(&mut self, category: &str) -> Option<u8> {
        self.allocations.remove(category)
    }

    /// Sum of all allocations
    pub fn total(&self) -> u32 {
        self.allocations.values().map(|&p| p as u32).sum()
    }

    pub fn is_over_allocated(&self) -> bool {
        self.total() > 100
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.allocations.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.allocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp_percentage(-5), 0);
        assert_eq!(clamp_percentage(42), 42);
        assert_eq!(clamp_percentage(250), 100);
    }

    #[test]
    fn test_set_and_total() {
        let mut budgets = Budgets::new();
        assert_eq!(budgets.set("Groceries", 30), 30);
        assert_eq!(budgets.set("Rent/Mortgage", 120), 100);
        assert_eq!(budgets.total(), 130);
        assert!(budgets.is_over_allocated());

        budgets.remove("Rent/Mortgage");
        assert_eq!(budgets.total(), 30);
        assert!(!budgets.is_over_allocated());
    }

    #[test]
    fn test_ensure_does_not_overwrite() {
        let mut budgets = Budgets::new();
        budgets.set("Groceries", 25);
        budgets.ensure("Groceries");
        budgets.ensure("Shopping");
        assert_eq!(budgets.get("Groceries"), Some(25));
        assert_eq!(budgets.get("Shopping"), Some(0));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut budgets = Budgets::new();
        budgets.set("Groceries", 25);
        let json = serde_json::to_string(&budgets).unwrap();
        assert_eq!(json, r#"{"Groceries":25}"#);
    }
}
