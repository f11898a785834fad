//! CLI commands for data export, backup and restore

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::report::create_output;
use crate::error::{TallyError, TallyResult};
use crate::export::{self, Backup};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON backup (restorable)
    Json,
    /// YAML (human-readable, restorable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all data to a file
    All {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
    },

    /// Export transactions to CSV
    Transactions {
        /// Output file path
        output: PathBuf,
    },

    /// Export budget percentages to CSV
    Budgets {
        /// Output file path
        output: PathBuf,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> TallyResult<()> {
    match cmd {
        ExportCommands::All { output, format } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Json => export::export_backup_json(storage, &mut writer)?,
                ExportFormat::Yaml => export::export_full_yaml(storage, &mut writer)?,
            }
            println!("Exported all data to: {}", output.display());
        }
        ExportCommands::Transactions { output } => {
            let mut writer = create_output(&output)?;
            export::export_transactions_csv(storage, &mut writer)?;
            println!("Exported transactions to: {}", output.display());
        }
        ExportCommands::Budgets { output } => {
            let mut writer = create_output(&output)?;
            export::export_budgets_csv(storage, &mut writer)?;
            println!("Exported budgets to: {}", output.display());
        }
    }

    Ok(())
}

/// Replace all data with a JSON or YAML backup
pub fn handle_restore_command(storage: &Storage, file: PathBuf, yes: bool) -> TallyResult<()> {
    let text = std::fs::read_to_string(&file)
        .map_err(|e| TallyError::Import(format!("Failed to read {}: {}", file.display(), e)))?;

    let is_yaml = file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    let backup = if is_yaml {
        export::import_from_yaml(&text)?
    } else {
        Backup::parse(&text)?
    };

    if !yes {
        println!(
            "Backup contains {} transaction(s) and {} categories.",
            backup.transactions.len(),
            backup.categories.len()
        );
        println!("Re-run with --yes to replace all current data.");
        return Ok(());
    }

    let summary = export::restore_backup(storage, backup)?;
    println!(
        "Restored {} transaction(s) and {} categories",
        summary.transactions, summary.categories
    );
    if summary.orphaned > 0 {
        println!(
            "Warning: {} transaction(s) use categories missing from the backup",
            summary.orphaned
        );
    }

    Ok(())
}
