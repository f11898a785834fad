//! Transaction service
//!
//! Add, edit, delete and clear transactions. Input is checked with the same
//! rules as CSV import, and every change is written to the audit log.

use crate::audit::{AuditEntry, EntityType};
use crate::error::{TallyError, TallyResult};
use crate::models::{Transaction, TransactionId};
use crate::services::import::{validate_transaction, TransactionDraft};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check a draft against the current categories
    ///
    /// All violated rules are reported in one error.
    fn validated(&self, draft: &TransactionDraft, id: TransactionId) -> TallyResult<Transaction> {
        let categories = self.storage.categories.get_all()?;
        let errors = validate_transaction(draft, &categories);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            return Err(TallyError::Validation(messages.join("; ")));
        }

        draft
            .build(id)
            .ok_or_else(|| TallyError::Validation("incomplete transaction".into()))
    }

    /// Create a new transaction
    pub fn add(&self, draft: &TransactionDraft) -> TallyResult<Transaction> {
        let id = self.storage.transactions.id_allocator()?.next_id();
        let txn = self.validated(draft, id)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(txn.description.clone()),
            &txn,
        )?;

        Ok(txn)
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> TallyResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// All transactions, newest date first
    ///
    /// Same-day transactions are ordered by id, newest first. Records whose
    /// date does not parse come last.
    pub fn list(&self) -> TallyResult<Vec<Transaction>> {
        let mut transactions = self.storage.transactions.get_all()?;
        transactions.sort_by(|a, b| {
            b.parsed_date()
                .cmp(&a.parsed_date())
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(transactions)
    }

    /// Replace every field except the id
    pub fn edit(&self, id: TransactionId, draft: &TransactionDraft) -> TallyResult<Transaction> {
        let before = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;

        let txn = self.validated(draft, id)?;
        if txn == before {
            return Ok(txn);
        }

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            id.to_string(),
            Some(txn.description.clone()),
            &before,
            &txn,
        )?;

        Ok(txn)
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> TallyResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .delete(id)?
            .ok_or_else(|| TallyError::transaction_not_found(id.to_string()))?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            id.to_string(),
            Some(txn.description.clone()),
            &txn,
        )?;

        Ok(txn)
    }

    /// Delete every transaction, returning how many were removed
    pub fn clear_all(&self) -> TallyResult<usize> {
        let removed = self.storage.transactions.get_all()?;
        if removed.is_empty() {
            return Ok(0);
        }

        self.storage.transactions.clear()?;
        self.storage.transactions.save()?;

        let entries = removed
            .iter()
            .map(|txn| {
                AuditEntry::delete(
                    EntityType::Transaction,
                    txn.id.to_string(),
                    Some(txn.description.clone()),
                    txn,
                )
            })
            .collect();
        self.storage.log_batch(entries)?;

        Ok(removed.len())
    }
}
