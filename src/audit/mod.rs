//! Audit logging system for tally
//!
//! Records every create, update and delete performed through the services in
//! an append-only, line-delimited JSON file (`audit.log`).
//!
//! - `AuditEntry`: timestamp, operation, entity and optional before/after values
//! - `AuditLogger`: appends entries and reads them back
//! - `generate_diff`: one-line summary of changed fields for updates

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
