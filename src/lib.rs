//! tally - personal income and expense tracking
//!
//! This library provides the core of the tally finance tracker: a CSV
//! import pipeline with column mapping and rule-based categorization, and a
//! report engine that recomputes totals, category breakdowns and savings
//! series for a reporting period from a flat transaction log.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, categories, periods, budgets)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer, including import and categorization
//! - `reports`: Period summary and monthly statement
//! - `export`: CSV, JSON and YAML export, backup restore
//! - `audit`: Audit logging system
//! - `cli`, `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::models::PeriodSelector;
//! use tally::reports::generate_report;
//!
//! let today = chrono::Local::now().date_naive();
//! let report = generate_report(&transactions, &PeriodSelector::Monthly, today);
//! println!("{}", report.format_terminal("$"));
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
