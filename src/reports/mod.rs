//! Reports module
//!
//! The period summary that drives totals, breakdowns and chart series, and
//! the printable monthly statement.

pub mod statement;
pub mod summary;

pub use statement::MonthlyStatement;
pub use summary::{
    generate_report, CategoryShare, ChartSeries, ReportResult, ReportStatus, SavingsPoint,
};
