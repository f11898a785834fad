//! CLI commands for reports
//!
//! The period summary report and the monthly statement, printed or written
//! to a file.

use chrono::{Datelike, NaiveDate};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::settings::Settings;
use crate::error::{TallyError, TallyResult};
use crate::models::{PeriodKind, PeriodSelector};
use crate::reports::{generate_report, MonthlyStatement};
use crate::storage::Storage;

/// Reporting window options shared by report commands
#[derive(Args, Debug, Clone, Default)]
pub struct PeriodArgs {
    /// all, weekly, biweekly, monthly or custom
    #[arg(short, long)]
    pub period: Option<PeriodKind>,

    /// Start date for a custom period (YYYY-MM-DD)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date for a custom period (YYYY-MM-DD)
    #[arg(short, long)]
    pub end: Option<String>,
}

impl PeriodArgs {
    /// Giving a start or end date without a period selects a custom range
    pub fn selector(&self, default: PeriodKind) -> PeriodSelector {
        let kind = match self.period {
            Some(kind) => kind,
            None if self.start.is_some() || self.end.is_some() => PeriodKind::Custom,
            None => default,
        };
        PeriodSelector::from_kind(kind, self.start.clone(), self.end.clone())
    }
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub period: PeriodArgs,

    /// Export to CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StatementArgs {
    /// Month number (1-12), defaults to the current month
    #[arg(short, long)]
    pub month: Option<u32>,

    /// Year, defaults to the current year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Write the statement to a text file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub(crate) fn create_output(path: &Path) -> TallyResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        TallyError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle the summary report
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    args: ReportArgs,
) -> TallyResult<()> {
    let selector = args.period.selector(settings.default_period);
    let transactions = storage.transactions.get_all()?;
    let report = generate_report(&transactions, &selector, today());

    if let Some(err) = &report.range_error {
        return Err(TallyError::Range(err.to_string()));
    }

    if let Some(path) = args.output {
        let mut writer = create_output(&path)?;
        report.export_csv(&mut writer)?;
        println!("Report exported to: {}", path.display());
    } else {
        println!("{}", report.format_terminal(&settings.currency_symbol));
    }

    Ok(())
}

/// Handle the monthly statement
pub fn handle_statement_command(storage: &Storage, args: StatementArgs) -> TallyResult<()> {
    let today = today();
    let transactions = storage.transactions.get_all()?;
    let statement = MonthlyStatement::generate(
        &transactions,
        args.year.unwrap_or(today.year()),
        args.month.unwrap_or(today.month()),
    )?;

    if let Some(path) = args.output {
        let mut writer = create_output(&path)?;
        statement.write_text(&mut writer)?;
        println!("Statement written to: {}", path.display());
    } else {
        print!("{}", statement.format_text());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_without_period_select_custom() {
        let args = PeriodArgs {
            period: None,
            start: Some("2024-01-01".into()),
            end: Some("2024-01-31".into()),
        };
        assert_eq!(args.selector(PeriodKind::Monthly), PeriodSelector::custom("2024-01-01", "2024-01-31"));
    }

    #[test]
    fn test_default_period_used() {
        let args = PeriodArgs::default();
        assert_eq!(args.selector(PeriodKind::Biweekly), PeriodSelector::Biweekly);

        let args = PeriodArgs {
            period: Some(PeriodKind::All),
            ..PeriodArgs::default()
        };
        assert_eq!(args.selector(PeriodKind::Biweekly), PeriodSelector::All);
    }
}
