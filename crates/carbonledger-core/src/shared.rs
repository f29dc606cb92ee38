//! Thread-safe handle over a single [`Ledger`].
//!
//! Mutations take the write lock, so they execute in one total order and
//! id assignment and retirement append order follow commit order. Reads
//! take the read lock, run concurrently with each other, and only ever
//! see committed state. Callers receive owned copies, never references
//! into the stores.

use std::sync::Arc;

use carbonledger_types::{
    Batch, BatchId, BatchMetadata, LedgerEvent, Principal, Result, RetirementRecord, Role,
};
use parking_lot::RwLock;

use crate::ledger::Ledger;
use crate::snapshot::LedgerSnapshot;

/// Cloneable, shareable ledger handle.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Run several reads against one consistent committed state.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    // --- mutations -----------------------------------------------------

    pub fn grant_role(&self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.inner.write().grant_role(caller, role, principal)
    }

    pub fn revoke_role(&self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.inner.write().revoke_role(caller, role, principal)
    }

    pub fn renounce_role(&self, caller: Principal, role: Role) -> bool {
        self.inner.write().renounce_role(caller, role)
    }

    pub fn issue_batch(
        &self,
        caller: Principal,
        recipient: Principal,
        amount: u64,
        metadata: BatchMetadata,
    ) -> Result<BatchId> {
        self.inner
            .write()
            .issue_batch(caller, recipient, amount, metadata)
    }

    /// Issue only if `expected` is still the next id under the write lock.
    pub fn issue_batch_expecting(
        &self,
        caller: Principal,
        expected: BatchId,
        recipient: Principal,
        amount: u64,
        metadata: BatchMetadata,
    ) -> Result<BatchId> {
        self.inner
            .write()
            .issue_batch_expecting(caller, expected, recipient, amount, metadata)
    }

    pub fn top_up(
        &self,
        caller: Principal,
        recipient: Principal,
        batch_id: BatchId,
        amount: u64,
        evidence_hash: impl Into<String>,
    ) -> Result<()> {
        self.inner
            .write()
            .top_up(caller, recipient, batch_id, amount, evidence_hash)
    }

    pub fn retire(
        &self,
        caller: Principal,
        batch_id: BatchId,
        amount: u64,
        reason: impl Into<String>,
    ) -> Result<()> {
        self.inner.write().retire(caller, batch_id, amount, reason)
    }

    // --- reads ---------------------------------------------------------

    #[must_use]
    pub fn preview_next_id(&self) -> BatchId {
        self.inner.read().next_id()
    }

    pub fn get_batch(&self, batch_id: BatchId) -> Result<Batch> {
        self.inner.read().get_batch(batch_id)
    }

    pub fn get_retirement_history(&self, batch_id: BatchId) -> Result<Vec<RetirementRecord>> {
        self.inner.read().get_retirement_history(batch_id)
    }

    #[must_use]
    pub fn balance_of(&self, holder: Principal, batch_id: BatchId) -> u64 {
        self.inner.read().balance_of(holder, batch_id)
    }

    #[must_use]
    pub fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.inner.read().has_role(role, principal)
    }

    #[must_use]
    pub fn events_since(&self, sequence: u64) -> Vec<LedgerEvent> {
        self.inner.read().events_since(sequence).to_vec()
    }

    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.inner.read().snapshot()
    }

    pub fn verify_invariants(&self) -> Result<()> {
        self.inner.read().verify_invariants()
    }
}
