//! Display formatting for terminal output

pub mod budget;
pub mod category;
pub mod transaction;

pub use budget::{format_allocations, format_comparison};
pub use category::format_category_lists;
pub use transaction::{format_transaction_details, format_transaction_register};
