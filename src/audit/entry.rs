//! Audit log records
//!
//! Transactions are keyed by their timestamp id, categories by
//! `type/name` and budget allocations by category name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Transaction,
    Category,
    Budget,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::Category => "Category",
            Self::Budget => "Budget",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Transaction description or category name, when it adds something to the id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// `field: old -> new` pairs for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

fn snapshot<T: Serialize>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

impl AuditEntry {
    fn now(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::now(Operation::Create, entity_type, entity_id, entity_name);
        entry.after = snapshot(entity);
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        let mut entry = Self::now(Operation::Update, entity_type, entity_id, entity_name);
        entry.before = snapshot(before);
        entry.after = snapshot(after);
        entry.diff_summary = diff_summary;
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::now(Operation::Delete, entity_type, entity_id, entity_name);
        entry.before = snapshot(entity);
        entry
    }

    /// One line per entry, plus an indented line of changes for updates
    pub fn format_human_readable(&self) -> String {
        let name = match &self.entity_name {
            Some(name) if name != &self.entity_id => format!(" ({})", name),
            _ => String::new(),
        };
        let mut line = format!(
            "{}  {:<6} {:<11} {}{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.operation,
            self.entity_type,
            self.entity_id,
            name
        );

        if let Some(diff) = &self.diff_summary {
            line.push_str("\n    ");
            line.push_str(diff);
        }

        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshots_by_operation() {
        let txn = json!({"description": "Paycheck", "amount": 1200.0});

        let created = AuditEntry::create(EntityType::Transaction, "1712345678901", None, &txn);
        assert_eq!(created.operation, Operation::Create);
        assert!(created.before.is_none());
        assert_eq!(created.after, Some(txn.clone()));

        let deleted = AuditEntry::delete(EntityType::Transaction, "1712345678901", None, &txn);
        assert_eq!(deleted.before, Some(txn));
        assert!(deleted.after.is_none());
    }

    #[test]
    fn test_update_keeps_both_sides() {
        let entry = AuditEntry::update(
            EntityType::Budget,
            "Groceries",
            None,
            &json!(10),
            &json!(25),
            Some("10 -> 25".to_string()),
        );

        assert_eq!(entry.before, Some(json!(10)));
        assert_eq!(entry.after, Some(json!(25)));
        assert_eq!(entry.diff_summary.as_deref(), Some("10 -> 25"));
    }

    #[test]
    fn test_serialized_form_omits_empty_fields() {
        let entry = AuditEntry::create(EntityType::Category, "expense/Pets", None, &json!("Pets"));
        let line = serde_json::to_string(&entry).unwrap();

        assert!(line.contains("\"operation\":\"create\""));
        assert!(line.contains("\"entity_type\":\"category\""));
        assert!(!line.contains("before"));
        assert!(!line.contains("diff_summary"));
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::update(
            EntityType::Transaction,
            "1712345678901",
            Some("Corner store".to_string()),
            &json!({}),
            &json!({}),
            Some("amount: 42.50 -> 45.00".to_string()),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("UPDATE Transaction 1712345678901 (Corner store)"));
        assert!(formatted.ends_with("\n    amount: 42.50 -> 45.00"));

        let plain = AuditEntry::create(EntityType::Budget, "Pets", Some("Pets".into()), &json!(5));
        assert!(plain.format_human_readable().ends_with("CREATE Budget      Pets"));
    }
}
