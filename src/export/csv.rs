//! CSV Export functionality
//!
//! Exports transactions and budget allocations to CSV format. The transaction
//! export uses the same column names the importer recognizes, so an export
//! can be imported again.

use crate::error::{TallyError, TallyResult};
use crate::services::{BudgetService, TransactionService};
use crate::storage::Storage;
use std::io::Write;

fn write_err(e: std::io::Error) -> TallyError {
    TallyError::Export(e.to_string())
}

/// Export all transactions to CSV, newest first
pub fn export_transactions_csv<W: Write>(storage: &Storage, writer: &mut W) -> TallyResult<()> {
    writeln!(writer, "ID,Date,Type,Description,Category,Amount").map_err(write_err)?;

    for txn in TransactionService::new(storage).list()? {
        writeln!(
            writer,
            "{},{},{},{},{},{:.2}",
            txn.id,
            escape_csv(&txn.date),
            txn.kind,
            escape_csv(&txn.description),
            escape_csv(&txn.category),
            txn.amount.as_f64()
        )
        .map_err(write_err)?;
    }

    Ok(())
}

/// Export the budget percentage of every expense category
pub fn export_budgets_csv<W: Write>(storage: &Storage, writer: &mut W) -> TallyResult<()> {
    writeln!(writer, "Category,Percentage").map_err(write_err)?;

    for allocation in BudgetService::new(storage).list()? {
        writeln!(
            writer,
            "{},{}",
            escape_csv(&allocation.category),
            allocation.percentage
        )
        .map_err(write_err)?;
    }

    Ok(())
}

/// Escape a string for CSV format
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
