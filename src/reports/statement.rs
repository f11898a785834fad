//! Monthly statement
//!
//! A fixed-width, printable statement of one calendar month. Unlike the
//! period report, savings deposits and withdrawals are kept out of the
//! operating totals and summarised on their own.

use chrono::{Datelike, Month, NaiveDate};
use std::io::Write;

use crate::error::{TallyError, TallyResult};
use crate::models::{Money, Transaction, TransactionType, SAVINGS_DEPOSIT, SAVINGS_WITHDRAWAL};

const RULE: &str = "----------------------------------------";

/// Statement of a single month
#[derive(Debug, Clone)]
pub struct MonthlyStatement {
    pub year: i32,
    pub month: u32,
    /// Transactions dated in the month, oldest first
    pub transactions: Vec<Transaction>,
    pub income: Money,
    pub expenses: Money,
    pub savings_deposits: Money,
    pub savings_withdrawals: Money,
}

impl MonthlyStatement {
    /// Build the statement for `month` (1-12) of `year` (2000-2100)
    pub fn generate(transactions: &[Transaction], year: i32, month: u32) -> TallyResult<Self> {
        if !(2000..=2100).contains(&year) {
            return Err(TallyError::Validation(format!(
                "year {} is outside 2000-2100",
                year
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(TallyError::Validation(format!(
                "month {} is outside 1-12",
                month
            )));
        }

        let mut dated: Vec<(NaiveDate, &Transaction)> = transactions
            .iter()
            .filter_map(|t| t.parsed_date().map(|d| (d, t)))
            .filter(|(d, _)| d.year() == year && d.month() == month)
            .collect();
        dated.sort_by_key(|(d, _)| *d);

        let mut statement = Self {
            year,
            month,
            transactions: Vec::with_capacity(dated.len()),
            income: Money::zero(),
            expenses: Money::zero(),
            savings_deposits: Money::zero(),
            savings_withdrawals: Money::zero(),
        };

        for (_, txn) in dated {
            match (txn.category.as_str(), txn.kind) {
                (SAVINGS_DEPOSIT, _) => statement.savings_deposits += txn.amount,
                (SAVINGS_WITHDRAWAL, _) => statement.savings_withdrawals += txn.amount,
                (_, TransactionType::Income) => statement.income += txn.amount,
                (_, TransactionType::Expense) => statement.expenses += txn.amount,
            }
            statement.transactions.push(txn.clone());
        }

        Ok(statement)
    }

    pub fn net_operating(&self) -> Money {
        self.income - self.expenses
    }

    pub fn net_savings_flow(&self) -> Money {
        self.savings_deposits - self.savings_withdrawals
    }

    /// "May 2024"
    pub fn title(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }

    /// Render the printable statement
    pub fn format_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Monthly Statement: {}\n", self.title()));
        out.push_str(RULE);
        out.push('\n');
        out.push_str("Date       | Type    | Description          | Category           | Amount\n");
        out.push_str(RULE);
        out.push('\n');

        if self.transactions.is_empty() {
            out.push_str("No transactions found for this month.\n");
        } else {
            for txn in &self.transactions {
                out.push_str(&statement_line(txn));
                out.push('\n');
            }
            out.push_str(RULE);
            out.push('\n');
        }

        out.push_str("\nSummary (Operating):\n");
        out.push_str(&format!(" Total Income:      +{}\n", plain(self.income)));
        out.push_str(&format!(" Total Expenses:    -{}\n", plain(self.expenses)));
        out.push_str(&format!(" Net Balance:        {}\n", signed(self.net_operating())));
        out.push_str("\nSummary (Savings):\n");
        out.push_str(&format!(" Deposits:          +{}\n", plain(self.savings_deposits)));
        out.push_str(&format!(" Withdrawals:       -{}\n", plain(self.savings_withdrawals)));
        out.push_str(&format!(" Net Savings Flow:   {}\n", signed(self.net_savings_flow())));
        out.push_str(RULE);
        out.push('\n');

        out
    }

    /// Write the rendered statement
    pub fn write_text<W: Write>(&self, writer: &mut W) -> TallyResult<()> {
        writer
            .write_all(self.format_text().as_bytes())
            .map_err(|e| TallyError::Export(e.to_string()))
    }
}

fn plain(amount: Money) -> String {
    format!("{:.2}", amount.as_f64())
}

/// Non-negative values get a leading `+`
fn signed(amount: Money) -> String {
    if amount.is_negative() {
        plain(amount)
    } else {
        format!("+{}", plain(amount))
    }
}

fn truncated(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn statement_line(txn: &Transaction) -> String {
    let date = txn
        .parsed_date()
        .map(|d| d.format("%m/%d/%y").to_string())
        .unwrap_or_else(|| txn.date.clone());
    let kind = match txn.kind {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
    };
    let prefix = if txn.kind == TransactionType::Income || txn.category == SAVINGS_WITHDRAWAL {
        "+"
    } else {
        "-"
    };
    let amount = format!("{}{}", prefix, plain(txn.amount));

    format!(
        "{:<10}| {:<8}| {:<20}| {:<18}| {:>8}",
        date,
        kind,
        truncated(&txn.description, 20),
        truncated(&txn.category, 18),
        amount
    )
}
