//! CLI command handler for CSV import
//!
//! Reads each file, imports the valid rows and prints a per-file report of
//! skipped files and rejected rows.

use std::path::PathBuf;

use crate::config::settings::Settings;
use crate::error::{TallyError, TallyResult};
use crate::services::import::{FieldKind, FileStatus, ImportPolicy};
use crate::services::{CsvSource, ImportOptions, ImportService};
use crate::storage::Storage;

/// Parse a `Header=field` mapping override
pub fn parse_mapping_override(text: &str) -> Result<(String, FieldKind), String> {
    let (header, field) = text
        .rsplit_once('=')
        .ok_or_else(|| format!("expected HEADER=FIELD, got '{}'", text))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(format!("missing header name in '{}'", text));
    }
    Ok((header.to_string(), field.parse()?))
}

/// Handle the import command
pub fn handle_import_command(
    storage: &Storage,
    settings: &Settings,
    files: Vec<PathBuf>,
    overrides: Vec<(String, FieldKind)>,
    strict: bool,
) -> TallyResult<()> {
    if files.is_empty() {
        return Err(TallyError::Import("No files given".into()));
    }

    let options = ImportOptions {
        policy: if strict {
            ImportPolicy::AllOrNothing
        } else {
            settings.import_policy
        },
        overrides,
    };
    let sources: Vec<CsvSource> = files.iter().map(|p| CsvSource::from_path(p)).collect();

    let result = ImportService::new(storage).import(&sources, &options)?;

    for file in &result.files {
        match &file.status {
            FileStatus::Imported { accepted, rejected } => {
                println!("{}: imported {}, rejected {}", file.name, accepted, rejected.len());
                for row in rejected {
                    println!("  {}", row);
                }
            }
            FileStatus::Skipped(e) => {
                println!("{}: skipped ({})", file.name, e);
            }
        }
    }

    println!();
    println!(
        "Imported {} transaction(s); {} row(s) rejected; {} file(s) skipped",
        result.accepted.len(),
        result.rejected_count(),
        result.skipped_count()
    );

    Ok(())
}
