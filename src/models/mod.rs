//! Core data models for tally
//!
//! Transactions, category labels, budget percentages, report periods and the
//! money and date primitives they are built from.

pub mod budget;
pub mod category;
pub mod date;
pub mod money;
pub mod period;
pub mod transaction;

pub use budget::Budgets;
pub use category::{
    CategorySet, OTHER_EXPENSE, OTHER_INCOME, SAVINGS_DEPOSIT, SAVINGS_WITHDRAWAL,
};
pub use date::parse_date_token;
pub use money::Money;
pub use period::{DateRange, PeriodKind, PeriodSelector, RangeError};
pub use transaction::{IdAllocator, Transaction, TransactionId, TransactionType};
