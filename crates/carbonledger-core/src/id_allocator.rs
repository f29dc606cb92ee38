//! Batch id allocation with a side-effect-free preview.
//!
//! `peek()` answers "which id would the next issuance get?" and stays
//! accurate until an issuance commits. Only the ledger calls `allocate()`,
//! and only once every other precondition of the issuance has passed.

use carbonledger_types::{BatchId, LedgerError, Result};

/// Dense, monotonic id source. Ids are never reused.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: BatchId,
}

impl IdAllocator {
    /// Allocator whose first id is [`BatchId::FIRST`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: BatchId::FIRST,
        }
    }

    /// Resume from a stored position.
    #[must_use]
    pub fn resume_at(next: BatchId) -> Self {
        Self { next }
    }

    /// The id the next successful `allocate()` will return.
    #[must_use]
    pub fn peek(&self) -> BatchId {
        self.next
    }

    /// Fail with `IdSpaceExhausted` if `allocate()` would not succeed.
    pub fn ensure_available(&self) -> Result<()> {
        self.next
            .checked_next()
            .map(|_| ())
            .ok_or(LedgerError::IdSpaceExhausted)
    }

    /// Hand out the current id and advance by exactly one.
    pub fn allocate(&mut self) -> Result<BatchId> {
        let id = self.next;
        self.next = id.checked_next().ok_or(LedgerError::IdSpaceExhausted)?;
        Ok(id)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
