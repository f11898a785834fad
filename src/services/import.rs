//! CSV Import service
//!
//! Turns raw delimited text into validated transactions: parse the text,
//! map header columns to transaction fields, normalize amount and direction,
//! auto-categorize, validate, and collect accepted rows plus a per-row
//! reject report.
//!
//! The pipeline functions are pure over their inputs. `ImportService` is the
//! thin layer that loads categories from storage, persists what was accepted
//! and writes the audit trail.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audit::{AuditEntry, EntityType};
use crate::error::TallyResult;
use crate::models::category::reserved_type;
use crate::models::{
    parse_date_token, CategorySet, IdAllocator, Money, Transaction, TransactionId, TransactionType,
};
use crate::services::categorize::categorize;
use crate::storage::Storage;

/// Why a whole file was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("could not read file: {0}")]
    Read(String),

    #[error("file contains no rows")]
    EmptyFile,

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

/// Required fields with no column mapped to them
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no column mapped for required field(s): {}", join_fields(.missing))]
pub struct MappingError {
    pub missing: Vec<FieldKind>,
}

fn join_fields(fields: &[FieldKind]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The transaction field a CSV column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Date,
    Description,
    Amount,
    Type,
    Category,
    Ignore,
}

impl FieldKind {
    /// Fields every file must map
    pub const REQUIRED: [FieldKind; 3] = [FieldKind::Date, FieldKind::Description, FieldKind::Amount];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Type => "type",
            Self::Category => "category",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "description" | "desc" => Ok(Self::Description),
            "amount" => Ok(Self::Amount),
            "type" => Ok(Self::Type),
            "category" => Ok(Self::Category),
            "ignore" | "skip" | "" => Ok(Self::Ignore),
            other => Err(format!(
                "unknown field '{}' (expected date, description, amount, type, category or ignore)",
                other
            )),
        }
    }
}

/// How a batch treats rows that fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportPolicy {
    /// Import every valid row and report the others
    #[default]
    Partial,
    /// Import nothing from a file if any of its rows is rejected
    AllOrNothing,
}

impl fmt::Display for ImportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial => write!(f, "partial"),
            Self::AllOrNothing => write!(f, "all-or-nothing"),
        }
    }
}

impl FromStr for ImportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "partial" => Ok(Self::Partial),
            "all-or-nothing" | "strict" => Ok(Self::AllOrNothing),
            other => Err(format!("unknown import policy '{}'", other)),
        }
    }
}

/// Header row and data rows of a delimited file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Split comma-delimited text into a header row and data rows
///
/// Quoted fields may contain commas, newlines and `""` escapes. Blank lines
/// are dropped and rows may have fewer or more cells than the header.
pub fn parse_delimited_text(text: &str) -> Result<ParsedCsv, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Malformed(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        lines.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let mut lines = lines.into_iter();
    let headers = lines
        .next()
        .ok_or(ImportError::EmptyFile)?
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    Ok(ParsedCsv {
        headers,
        rows: lines.collect(),
    })
}

/// Header substrings per field, in claim order
const HEADER_SYNONYMS: &[(FieldKind, &[&str])] = &[
    (FieldKind::Category, &["category", "categ"]),
    (FieldKind::Type, &["type", "kind", "direction", "dr/cr"]),
    (FieldKind::Date, &["date", "posted", "time"]),
    (FieldKind::Amount, &["amount", "amt"]),
    (
        FieldKind::Description,
        &[
            "description",
            "desc",
            "memo",
            "payee",
            "merchant",
            "details",
            "narrative",
            "particulars",
            "name",
            "note",
        ],
    ),
];

/// Which field each header column feeds
///
/// Columns keep their file order. At most one column maps to each field
/// other than `Ignore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: Vec<(String, FieldKind)>,
}

/// Guess a mapping from header names
///
/// A header that is exactly a field synonym claims that field first.
/// Remaining headers take the unclaimed field whose synonym occurs furthest
/// to the right, so `Posted Amount` is an amount and `Value Date` a date.
/// When two headers want the same field, the earlier one wins.
pub fn infer_column_mapping(headers: &[String]) -> ColumnMapping {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    let mut fields = vec![FieldKind::Ignore; headers.len()];
    let mut claimed: Vec<FieldKind> = Vec::new();

    for (slot, lower) in fields.iter_mut().zip(&lowered) {
        let exact = HEADER_SYNONYMS
            .iter()
            .find(|(field, synonyms)| {
                !claimed.contains(field)
                    && (lower == field.as_str() || synonyms.contains(&lower.as_str()))
            })
            .map(|(field, _)| *field);
        if let Some(field) = exact {
            claimed.push(field);
            *slot = field;
        }
    }

    for (slot, lower) in fields.iter_mut().zip(&lowered) {
        if *slot != FieldKind::Ignore {
            continue;
        }
        if let Some(field) = rightmost_synonym(lower, &claimed) {
            claimed.push(field);
            *slot = field;
        }
    }

    let columns = headers
        .iter()
        .map(|h| h.trim().to_string())
        .zip(fields)
        .collect();

    ColumnMapping { columns }
}

/// Unclaimed field whose synonym ends latest in `header`; ties go to table order
fn rightmost_synonym(header: &str, claimed: &[FieldKind]) -> Option<FieldKind> {
    let mut best: Option<(usize, FieldKind)> = None;
    for (field, synonyms) in HEADER_SYNONYMS {
        if claimed.contains(field) {
            continue;
        }
        let end = synonyms
            .iter()
            .filter_map(|s| header.rfind(s).map(|i| i + s.len()))
            .max();
        if let Some(end) = end {
            if best.map_or(true, |(b, _)| end > b) {
                best = Some((end, *field));
            }
        }
    }
    best.map(|(_, field)| field)
}

impl ColumnMapping {
    /// Columns in file order
    pub fn columns(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.columns.iter().map(|(h, f)| (h.as_str(), *f))
    }

    pub fn field_of(&self, header: &str) -> Option<FieldKind> {
        self.position(header).map(|i| self.columns[i].1)
    }

    /// Column index feeding `field`
    pub fn index_of(&self, field: FieldKind) -> Option<usize> {
        if field == FieldKind::Ignore {
            return None;
        }
        self.columns.iter().position(|(_, f)| *f == field)
    }

    fn position(&self, header: &str) -> Option<usize> {
        let header = header.trim();
        self.columns
            .iter()
            .position(|(h, _)| h == header)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|(h, _)| h.eq_ignore_ascii_case(header))
            })
    }

    /// Override the field for one header
    ///
    /// Any other column that fed `field` is demoted to `Ignore`. Returns
    /// false if no such header exists.
    pub fn set(&mut self, header: &str, field: FieldKind) -> bool {
        let Some(index) = self.position(header) else {
            return false;
        };

        if field != FieldKind::Ignore {
            for (_, existing) in self.columns.iter_mut().filter(|(_, f)| *f == field) {
                *existing = FieldKind::Ignore;
            }
        }
        self.columns[index].1 = field;
        true
    }

    /// Fail if date, description or amount has no column
    pub fn ensure_required(&self) -> Result<(), MappingError> {
        let missing: Vec<FieldKind> = FieldKind::REQUIRED
            .iter()
            .copied()
            .filter(|f| self.index_of(*f).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MappingError { missing })
        }
    }

    /// View a data row through this mapping
    pub fn row<'a>(&'a self, cells: &'a [String]) -> MappedRow<'a> {
        MappedRow {
            mapping: self,
            cells,
        }
    }
}

/// A data row addressed by field instead of position
#[derive(Debug, Clone, Copy)]
pub struct MappedRow<'a> {
    mapping: &'a ColumnMapping,
    cells: &'a [String],
}

impl<'a> MappedRow<'a> {
    /// Trimmed cell for `field`; `None` when unmapped, absent or blank
    pub fn get(&self, field: FieldKind) -> Option<&'a str> {
        self.mapping
            .index_of(field)
            .and_then(|i| self.cells.get(i))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
    }
}

/// Unsigned amount plus the direction it implies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedAmount {
    /// Absolute value; `None` when the token is not a number
    pub amount: Option<Money>,
    pub kind: TransactionType,
}

/// Derive amount and direction from the raw amount and type cells
///
/// A type cell mentioning income/credit/deposit or expense/debit/withdrawal
/// decides the direction. Otherwise a negative amount is an expense and
/// anything else (including an unreadable amount) is income.
pub fn normalize_amount_and_type(amount_token: &str, type_token: Option<&str>) -> NormalizedAmount {
    let signed = parse_signed_amount(amount_token);

    let kind = type_token.and_then(kind_from_token).unwrap_or(match signed {
        Some(value) if value.is_negative() => TransactionType::Expense,
        _ => TransactionType::Income,
    });

    NormalizedAmount {
        amount: signed.map(|value| value.abs()),
        kind,
    }
}

fn kind_from_token(token: &str) -> Option<TransactionType> {
    let token = token.trim().to_lowercase();
    if ["income", "credit", "deposit"].iter().any(|w| token.contains(w)) || token == "cr" {
        Some(TransactionType::Income)
    } else if ["expense", "debit", "withdrawal"]
        .iter()
        .any(|w| token.contains(w))
        || token == "dr"
    {
        Some(TransactionType::Expense)
    } else {
        None
    }
}

/// Parse `-1,234.56`, `$12.50`, `(45.00)` or `12.50-`
fn parse_signed_amount(token: &str) -> Option<Money> {
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | '(' | ')'))
        .collect();

    let (negative, body) = if cleaned.len() >= 2 && cleaned.starts_with('(') && cleaned.ends_with(')')
    {
        (true, &cleaned[1..cleaned.len() - 1])
    } else if let Some(body) = cleaned.strip_suffix('-') {
        (true, body)
    } else {
        (false, cleaned.as_str())
    };

    let value = Money::parse(body).ok()?;
    Some(if negative { -value.abs() } else { value })
}

/// A candidate transaction before validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransactionDraft {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: Option<Money>,
    pub kind: Option<TransactionType>,
    pub category: String,
}

impl TransactionDraft {
    /// Read a mapped CSV row, filling the category heuristically
    pub fn from_row(row: &MappedRow<'_>, categories: &CategorySet) -> Self {
        let description = row.get(FieldKind::Description).unwrap_or_default();
        let normalized =
            normalize_amount_and_type(row.get(FieldKind::Amount).unwrap_or_default(), row.get(FieldKind::Type));

        Self {
            date: row.get(FieldKind::Date).and_then(parse_date_token),
            description: description.to_string(),
            amount: normalized.amount,
            kind: Some(normalized.kind),
            category: categorize(
                description,
                normalized.kind,
                row.get(FieldKind::Category),
                categories,
            ),
        }
    }

    /// Build the transaction when every field is present
    pub fn build(&self, id: TransactionId) -> Option<Transaction> {
        Some(Transaction::new(
            id,
            self.kind?,
            self.date?,
            self.description.trim(),
            self.amount?,
            self.category.trim(),
        ))
    }
}

/// One violated rule of a candidate transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("date is missing or invalid")]
    MissingDate,

    #[error("description is empty")]
    EmptyDescription,

    #[error("amount is missing or not a number")]
    InvalidAmount,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("type must be income or expense")]
    InvalidType,

    #[error("category is empty")]
    MissingCategory,

    #[error("'{category}' is not an {kind} category")]
    UnknownCategory {
        category: String,
        kind: TransactionType,
    },

    #[error("'{category}' can only be used for {expected} transactions")]
    ReservedCategoryMismatch {
        category: String,
        expected: TransactionType,
    },
}

/// Every rule the draft breaks, in a fixed order
pub fn validate_transaction(draft: &TransactionDraft, categories: &CategorySet) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if draft.date.is_none() {
        errors.push(ValidationError::MissingDate);
    }
    if draft.description.trim().is_empty() {
        errors.push(ValidationError::EmptyDescription);
    }
    match draft.amount {
        None => errors.push(ValidationError::InvalidAmount),
        Some(amount) if !amount.is_positive() => errors.push(ValidationError::NonPositiveAmount),
        Some(_) => {}
    }

    let category = draft.category.trim();
    match draft.kind {
        None => {
            errors.push(ValidationError::InvalidType);
            if category.is_empty() {
                errors.push(ValidationError::MissingCategory);
            }
        }
        Some(_) if category.is_empty() => errors.push(ValidationError::MissingCategory),
        Some(kind) => {
            if let Some(expected) = reserved_type(category).filter(|t| *t != kind) {
                errors.push(ValidationError::ReservedCategoryMismatch {
                    category: category.to_string(),
                    expected,
                });
            } else if !categories.contains(kind, category) {
                errors.push(ValidationError::UnknownCategory {
                    category: category.to_string(),
                    kind,
                });
            }
        }
    }

    errors
}

/// A data row that failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 0-based index among the data rows (header excluded)
    pub row_index: usize,
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for RejectedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "row {}: {}", self.row_index + 1, reasons.join("; "))
    }
}

/// Accepted transactions and rejected rows of one file
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<RejectedRow>,
}

/// Validate and convert the data rows of one file
pub fn import_batch(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    categories: &CategorySet,
    policy: ImportPolicy,
    ids: &mut IdAllocator,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (row_index, cells) in rows.iter().enumerate() {
        let draft = TransactionDraft::from_row(&mapping.row(cells), categories);
        let errors = validate_transaction(&draft, categories);
        if !errors.is_empty() {
            outcome.rejected.push(RejectedRow { row_index, errors });
            continue;
        }
        if let Some(txn) = draft.build(ids.next_id()) {
            outcome.accepted.push(txn);
        }
    }

    if policy == ImportPolicy::AllOrNothing && !outcome.rejected.is_empty() {
        log::debug!(
            "discarding {} valid row(s) because {} row(s) were rejected",
            outcome.accepted.len(),
            outcome.rejected.len()
        );
        outcome.accepted.clear();
    }

    outcome
}

/// One input file, already read (or failed to read) by the caller
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub name: String,
    pub contents: Result<String, String>,
}

impl CsvSource {
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: Ok(text.into()),
        }
    }

    /// Read a file, keeping a read failure to report later
    pub fn from_path(path: &Path) -> Self {
        Self {
            name: path.display().to_string(),
            contents: std::fs::read_to_string(path).map_err(|e| e.to_string()),
        }
    }
}

/// Settings shared by every file of an import
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub policy: ImportPolicy,
    /// `(header, field)` overrides applied on top of the inferred mapping
    pub overrides: Vec<(String, FieldKind)>,
}

#[derive(Debug, Clone)]
pub enum FileStatus {
    Imported {
        accepted: usize,
        rejected: Vec<RejectedRow>,
    },
    Skipped(ImportError),
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub name: String,
    pub status: FileStatus,
}

/// Outcome of a multi-file import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub files: Vec<FileReport>,
    /// Accepted transactions of all files, in file then row order
    pub accepted: Vec<Transaction>,
}

impl ImportResult {
    pub fn rejected_count(&self) -> usize {
        self.files
            .iter()
            .map(|f| match &f.status {
                FileStatus::Imported { rejected, .. } => rejected.len(),
                FileStatus::Skipped(_) => 0,
            })
            .sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Skipped(_)))
            .count()
    }
}

/// Import several files in order
///
/// A file that cannot be read, is empty or lacks a required column is
/// reported as skipped and the next file is processed. Ids come from `ids`,
/// so they stay unique across files and against existing transactions.
pub fn import_csv(
    sources: &[CsvSource],
    categories: &CategorySet,
    options: &ImportOptions,
    ids: &mut IdAllocator,
) -> ImportResult {
    let mut result = ImportResult::default();

    for source in sources {
        let status = match import_file(source, categories, options, ids) {
            Ok(outcome) => {
                log::debug!(
                    "{}: {} accepted, {} rejected",
                    source.name,
                    outcome.accepted.len(),
                    outcome.rejected.len()
                );
                let accepted = outcome.accepted.len();
                result.accepted.extend(outcome.accepted);
                FileStatus::Imported {
                    accepted,
                    rejected: outcome.rejected,
                }
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", source.name, e);
                FileStatus::Skipped(e)
            }
        };

        result.files.push(FileReport {
            name: source.name.clone(),
            status,
        });
    }

    result
}

fn import_file(
    source: &CsvSource,
    categories: &CategorySet,
    options: &ImportOptions,
    ids: &mut IdAllocator,
) -> Result<BatchOutcome, ImportError> {
    let text = source
        .contents
        .as_ref()
        .map_err(|e| ImportError::Read(e.clone()))?;
    let parsed = parse_delimited_text(text)?;

    let mut mapping = infer_column_mapping(&parsed.headers);
    for (header, field) in &options.overrides {
        if !mapping.set(header, *field) {
            log::warn!(
                "{}: no column named '{}' to map as {}",
                source.name,
                header,
                field
            );
        }
    }
    mapping.ensure_required()?;

    Ok(import_batch(
        &parsed.rows,
        &mapping,
        categories,
        options.policy,
        ids,
    ))
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    /// Create a new import service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Import files against the stored categories and persist the result
    pub fn import(&self, sources: &[CsvSource], options: &ImportOptions) -> TallyResult<ImportResult> {
        let categories = self.storage.categories.get_all()?;
        let mut ids = self.storage.transactions.id_allocator()?;

        let result = import_csv(sources, &categories, options, &mut ids);
        if result.accepted.is_empty() {
            return Ok(result);
        }

        self.storage.transactions.insert_many(result.accepted.clone())?;
        self.storage.transactions.save()?;

        let entries = result
            .accepted
            .iter()
            .map(|txn| {
                AuditEntry::create(
                    EntityType::Transaction,
                    txn.id.to_string(),
                    Some(txn.description.clone()),
                    txn,
                )
            })
            .collect();
        self.storage.log_batch(entries)?;

        Ok(result)
    }
}
