//! Transaction display formatting
//!
//! Register and detail views of transactions for terminal output.

use crate::models::{Transaction, TransactionType};

/// Format a single transaction for display (register row)
pub fn format_transaction_row(txn: &Transaction) -> String {
    let sign = match txn.kind {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };

    format!(
        "{:>13} {:10} {:7} {:24} {:18} {}{:>11}",
        txn.id,
        txn.date,
        txn.kind,
        truncate(&txn.description, 24),
        truncate(&txn.category, 18),
        sign,
        txn.amount
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction]) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:>13} {:10} {:7} {:24} {:18} {:>12}\n",
        "ID", "Date", "Type", "Description", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn));
        output.push('\n');
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!("Amount:      {}\n", txn.amount));

    output
}

/// Truncate a string to a maximum number of characters, marking the cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
