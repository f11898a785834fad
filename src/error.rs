//! Crate-wide error type
//!
//! Row-level and file-level import problems are reported through
//! `services::import::{ValidationError, ImportError}` and only surface here when an
//! entire operation fails.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    /// Bad `config.json` or an unusable data directory
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    /// A data file that does not deserialize
    #[error("JSON error: {0}")]
    Json(String),

    /// Input rejected before anything was stored
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Category '{0}' is used by existing transactions")]
    CategoryInUse(String),

    /// A custom report window with a missing, unparsable or reversed bound
    #[error("Invalid date range: {0}")]
    Range(String),

    /// Unreadable CSV input or backup file
    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),

    /// Lock poisoning or a failed atomic write
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TallyError {
    fn not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    pub fn category_not_found(name: impl Into<String>) -> Self {
        Self::not_found("Category", name)
    }

    pub fn transaction_not_found(id: impl Into<String>) -> Self {
        Self::not_found("Transaction", id)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for TallyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TallyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for TallyError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let err = TallyError::category_not_found("Groceries");
        assert_eq!(err.to_string(), "Category not found: Groceries");
        assert!(err.is_not_found());
        assert!(!err.is_validation());

        let err = TallyError::transaction_not_found("1712345678901");
        assert_eq!(err.to_string(), "Transaction not found: 1712345678901");
    }

    #[test]
    fn test_category_in_use_message() {
        let err = TallyError::CategoryInUse("Rent/Mortgage".into());
        assert_eq!(
            err.to_string(),
            "Category 'Rent/Mortgage' is used by existing transactions"
        );
    }

    #[test]
    fn test_range_message() {
        let err = TallyError::Range("start 2024-02-01 is after end 2024-01-01".into());
        assert!(err.to_string().starts_with("Invalid date range: "));
    }

    #[test]
    fn test_io_and_json_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(TallyError::from(io_err), TallyError::Io(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(TallyError::from(json_err), TallyError::Json(_)));
    }
}
