//! Transaction model
//!
//! An income or expense record. Direction comes from `kind` (and the reserved
//! savings categories), never from the sign of `amount`, which is always
//! positive for a valid record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::date::parse_date_token;
use super::money::Money;

/// Unique identifier for a transaction
///
/// Derived from the creation time in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Hands out strictly increasing timestamp ids
///
/// Several transactions created within the same millisecond (a batch import)
/// get consecutive ids instead of colliding.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    last: i64,
}

impl IdAllocator {
    /// Start after the largest id already in use
    pub fn after<'a>(existing: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let last = existing
            .into_iter()
            .map(|t| t.id.value())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    /// Next id using the current wall clock
    pub fn next_id(&mut self) -> TransactionId {
        self.next_at(chrono::Utc::now().timestamp_millis())
    }

    /// Next id for a given timestamp in milliseconds
    pub fn next_at(&mut self, now_millis: i64) -> TransactionId {
        self.last = now_millis.max(self.last + 1);
        TransactionId(self.last)
    }
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Capitalized form used in tables and statements
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, immutable after creation
    pub id: TransactionId,

    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Calendar date as `YYYY-MM-DD`
    ///
    /// Kept as text so that restored data with a malformed date still loads;
    /// such records are skipped by date-driven reports.
    pub date: String,

    pub description: String,

    /// Always positive
    pub amount: Money,

    pub category: String,
}

impl Transaction {
    /// Create a transaction dated `date`
    pub fn new(
        id: TransactionId,
        kind: TransactionType,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            date: date.format("%Y-%m-%d").to_string(),
            description: description.into(),
            amount,
            category: category.into(),
        }
    }

    /// The calendar date, or `None` when the stored text does not parse
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date_token(&self.date)
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({}) {}",
            self.date,
            self.kind.label(),
            self.description,
            self.category,
            self.amount
        )
    }
}
