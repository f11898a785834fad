//! YAML Export functionality
//!
//! Writes the same structure as the JSON backup in YAML, for reading by
//! people. It can be restored like a JSON backup.

use crate::error::{TallyError, TallyResult};
use crate::export::json::Backup;
use crate::storage::Storage;
use std::io::Write;

/// Export all data to YAML
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> TallyResult<()> {
    let backup = Backup::from_storage(storage)?;
    let io = |e: std::io::Error| TallyError::Export(e.to_string());

    writeln!(writer, "# tally data export").map_err(io)?;
    if let Some(at) = backup.exported_at {
        writeln!(writer, "# Generated: {}", at).map_err(io)?;
    }
    writeln!(writer, "# Transactions: {}", backup.transactions.len()).map_err(io)?;
    writeln!(writer).map_err(io)?;

    serde_yaml::to_writer(writer, &backup).map_err(|e| TallyError::Export(e.to_string()))?;

    Ok(())
}

/// Parse a YAML export
pub fn import_from_yaml(yaml_str: &str) -> TallyResult<Backup> {
    let backup: Backup =
        serde_yaml::from_str(yaml_str).map_err(|e| TallyError::Import(e.to_string()))?;
    backup.validate()?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::TallyPaths;
    use crate::export::json::restore_backup;
    use crate::models::{Money, Transaction, TransactionId, TransactionType};
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
    fn test_yaml_export_restores() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .transactions
            .upsert(Transaction::new(
                TransactionId::new(3),
                TransactionType::Income,
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                "Payroll",
                Money::from_cents(310_000),
                "Salary",
            ))
            .unwrap();

        let mut output = Vec::new();
        export_full_yaml(&storage, &mut output).unwrap();
        let yaml = String::from_utf8(output).unwrap();

        assert!(yaml.starts_with("# tally data export"));
        assert!(yaml.contains("Payroll"));
        assert!(yaml.contains("Savings Deposit"));

        let backup = import_from_yaml(&yaml).unwrap();
        assert_eq!(backup.transactions.len(), 1);

        let (_other_dir, target) = create_test_storage();
        restore_backup(&target, backup).unwrap();
        assert_eq!(target.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_yaml_import_rejects_garbage() {
        assert!(import_from_yaml("just: [a, list").is_err());
        assert!(import_from_yaml("transactions: []").is_err());
    }
}
