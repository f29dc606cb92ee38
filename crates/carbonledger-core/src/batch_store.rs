//! Batch store: authoritative metadata and issued/retired totals.
//!
//! Every mutator has a matching `check_*` that runs the same validation
//! without touching state. The ledger runs all checks for an operation
//! before applying any mutation, so a mutator that fails after its check
//! passed means a bug, not bad input.

use std::collections::BTreeMap;

use carbonledger_types::{
    Batch, BatchId, BatchMetadata, LedgerError, Result, ensure_positive,
};

/// Owns every [`Batch`], keyed by id.
#[derive(Debug, Clone, Default)]
pub struct BatchStore {
    batches: BTreeMap<BatchId, Batch>,
}

impl BatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a creation without applying it.
    pub fn check_create(&self, id: BatchId, initial_issued: u64) -> Result<()> {
        ensure_positive(initial_issued)?;
        if self.batches.contains_key(&id) {
            return Err(LedgerError::DuplicateId(id));
        }
        Ok(())
    }

    /// Insert a new batch with `issued = initial_issued`, `retired = 0`.
    ///
    /// # Errors
    /// - `DuplicateId` if `id` already exists
    /// - `InvalidAmount` if `initial_issued` is zero
    pub fn create(&mut self, id: BatchId, metadata: BatchMetadata, initial_issued: u64) -> Result<()> {
        self.check_create(id, initial_issued)?;
        self.batches.insert(
            id,
            Batch {
                id,
                metadata,
                issued: initial_issued,
                retired: 0,
            },
        );
        Ok(())
    }

    /// Validate a top-up without applying it.
    pub fn check_top_up(&self, id: BatchId, additional: u64) -> Result<()> {
        ensure_positive(additional)?;
        let batch = self.get_ref(id)?;
        if batch.issued.checked_add(additional).is_none() {
            return Err(LedgerError::InvalidAmount {
                reason: format!("top-up of {additional} overflows issued total of batch {id}"),
            });
        }
        Ok(())
    }

    /// `issued += additional`; the evidence hash is replaced. Nothing else changes.
    ///
    /// # Errors
    /// - `BatchNotFound` if `id` is unknown
    /// - `InvalidAmount` if `additional` is zero or overflows `issued`
    pub fn top_up(&mut self, id: BatchId, additional: u64, evidence_hash: String) -> Result<()> {
        self.check_top_up(id, additional)?;
        let batch = self.get_mut(id)?;
        batch.issued += additional;
        batch.metadata.evidence_hash = evidence_hash;
        Ok(())
    }

    /// Validate a retirement against the batch totals.
    pub fn check_retirement(&self, id: BatchId, amount: u64) -> Result<()> {
        let batch = self.get_ref(id)?;
        let within_supply = batch
            .retired
            .checked_add(amount)
            .is_some_and(|total| total <= batch.issued);
        if !within_supply {
            return Err(LedgerError::SupplyInvariantViolation {
                reason: format!(
                    "batch {id}: retiring {amount} would exceed issued {} (retired {})",
                    batch.issued, batch.retired
                ),
            });
        }
        Ok(())
    }

    /// `retired += amount`.
    ///
    /// # Errors
    /// - `BatchNotFound` if `id` is unknown
    /// - `SupplyInvariantViolation` if `retired + amount > issued`
    pub fn record_retirement(&mut self, id: BatchId, amount: u64) -> Result<()> {
        self.check_retirement(id, amount)?;
        self.get_mut(id)?.retired += amount;
        Ok(())
    }

    /// Owned snapshot of a batch.
    pub fn get(&self, id: BatchId) -> Result<Batch> {
        self.get_ref(id).cloned()
    }

    pub fn get_ref(&self, id: BatchId) -> Result<&Batch> {
        self.batches.get(&id).ok_or(LedgerError::BatchNotFound(id))
    }

    #[must_use]
    pub fn contains(&self, id: BatchId) -> bool {
        self.batches.contains_key(&id)
    }

    /// All batches in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Highest id ever created.
    #[must_use]
    pub fn last_id(&self) -> Option<BatchId> {
        self.batches.keys().next_back().copied()
    }

    /// Rebuild from stored batches, rejecting repeats and `retired > issued`.
    pub fn from_batches(batches: impl IntoIterator<Item = Batch>) -> Result<Self> {
        let mut store = Self::new();
        for batch in batches {
            if batch.retired > batch.issued {
                return Err(LedgerError::SupplyInvariantViolation {
                    reason: format!(
                        "batch {}: retired {} exceeds issued {}",
                        batch.id, batch.retired, batch.issued
                    ),
                });
            }
            let id = batch.id;
            if store.batches.insert(id, batch).is_some() {
                return Err(LedgerError::DuplicateId(id));
            }
        }
        Ok(store)
    }

    fn get_mut(&mut self, id: BatchId) -> Result<&mut Batch> {
        self.batches
            .get_mut(&id)
            .ok_or(LedgerError::BatchNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_batch(issued: u64) -> BatchStore {
        let mut store = BatchStore::new();
        store
            .create(BatchId(1), BatchMetadata::minimal("p", "ipfs://old"), issued)
            .unwrap();
        store
    }

    #[test]
    fn create_sets_counters() {
        let store = store_with_batch(100);
        let batch = store.get(BatchId(1)).unwrap();
        assert_eq!(batch.issued, 100);
        assert_eq!(batch.retired, 0);
        assert_eq!(batch.evidence_hash(), "ipfs://old");
    }

    #[test]
    fn duplicate_create_rejected() {
        let mut store = store_with_batch(100);
        let err = store
            .create(BatchId(1), BatchMetadata::minimal("q", "h"), 5)
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateId(BatchId(1))));
        assert_eq!(store.get(BatchId(1)).unwrap().issued, 100);
    }

    #[test]
    fn top_up_changes_only_issued_and_evidence() {
        let mut store = store_with_batch(30);
        let before = store.get(BatchId(1)).unwrap();
        store
            .top_up(BatchId(1), 20, "ipfs://new".to_string())
            .unwrap();
        let after = store.get(BatchId(1)).unwrap();
        assert_eq!(after.issued, 50);
        assert_eq!(after.evidence_hash(), "ipfs://new");
        assert_eq!(after.retired, before.retired);
        assert_eq!(
            after.metadata.producer_registration_no,
            before.metadata.producer_registration_no
        );
    }

    #[test]
    fn top_up_unknown_batch() {
        let mut store = BatchStore::new();
        let err = store.top_up(BatchId(9), 1, String::new()).unwrap_err();
        assert!(matches!(err, LedgerError::BatchNotFound(BatchId(9))));
    }

    #[test]
    fn top_up_zero_rejected() {
        let mut store = store_with_batch(30);
        let err = store.top_up(BatchId(1), 0, "x".into()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
        assert_eq!(store.get(BatchId(1)).unwrap().evidence_hash(), "ipfs://old");
    }

    #[test]
    fn top_up_overflow_rejected() {
        let mut store = store_with_batch(u64::MAX - 1);
        let err = store.top_up(BatchId(1), 2, "x".into()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
    }

    #[test]
    fn retirement_guard() {
        let mut store = store_with_batch(50);
        store.record_retirement(BatchId(1), 50).unwrap();
        let err = store.record_retirement(BatchId(1), 1).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(store.get(BatchId(1)).unwrap().retired, 50);
    }

    #[test]
    fn from_batches_rejects_over_retired() {
        let batch = Batch {
            id: BatchId(1),
            metadata: BatchMetadata::minimal("p", "h"),
            issued: 5,
            retired: 6,
        };
        let err = BatchStore::from_batches([batch]).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn last_id_tracks_highest() {
        let mut store = store_with_batch(1);
        store
            .create(BatchId(2), BatchMetadata::minimal("p", "h"), 1)
            .unwrap();
        assert_eq!(store.last_id(), Some(BatchId(2)));
        assert_eq!(store.len(), 2);
    }
}
