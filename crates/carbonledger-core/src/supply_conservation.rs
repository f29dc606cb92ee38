//! Supply conservation invariant checker.
//!
//! Invariants enforced per batch:
//! ```text
//! retired ≤ issued
//! Σ balances(holder, batch) == issued - retired
//! Σ history(batch).amount  == retired
//! ```
//!
//! The checker keeps its own mint/retire tallies, independent of the
//! batch store, so a store that drifts from what was actually committed
//! is caught as well.

use std::collections::HashMap;

use carbonledger_types::{Batch, BatchId, LedgerError, Result};

/// Independent per-batch mint and retire tallies.
#[derive(Debug, Clone, Default)]
pub struct SupplyConservation {
    /// Total minted per batch since genesis (issuance plus top-ups).
    minted: HashMap<BatchId, u128>,
    /// Total retired per batch since genesis.
    retired: HashMap<BatchId, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed tallies from already-committed batches.
    pub fn from_batches<'a>(batches: impl IntoIterator<Item = &'a Batch>) -> Self {
        let mut sc = Self::new();
        for batch in batches {
            sc.record_mint(batch.id, batch.issued);
            if batch.retired > 0 {
                sc.record_retirement(batch.id, batch.retired);
            }
        }
        sc
    }

    /// Record a mint (issuance or top-up).
    pub fn record_mint(&mut self, id: BatchId, amount: u64) {
        *self.minted.entry(id).or_insert(0) += u128::from(amount);
    }

    /// Record a retirement.
    pub fn record_retirement(&mut self, id: BatchId, amount: u64) {
        *self.retired.entry(id).or_insert(0) += u128::from(amount);
    }

    #[must_use]
    pub fn total_minted(&self, id: BatchId) -> u128 {
        self.minted.get(&id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_retired(&self, id: BatchId) -> u128 {
        self.retired.get(&id).copied().unwrap_or(0)
    }

    /// Verify one batch against the tallies, the summed balances, and the
    /// summed retirement history.
    ///
    /// # Errors
    /// Returns [`LedgerError::SupplyInvariantViolation`] on any mismatch.
    pub fn verify(&self, batch: &Batch, balance_total: u128, history_total: u128) -> Result<()> {
        let id = batch.id;
        let violation = |reason: String| LedgerError::SupplyInvariantViolation { reason };

        if batch.retired > batch.issued {
            return Err(violation(format!(
                "batch {id}: retired {} exceeds issued {}",
                batch.retired, batch.issued
            )));
        }
        if u128::from(batch.issued) != self.total_minted(id) {
            return Err(violation(format!(
                "batch {id}: issued {} != minted tally {}",
                batch.issued,
                self.total_minted(id)
            )));
        }
        if u128::from(batch.retired) != self.total_retired(id) {
            return Err(violation(format!(
                "batch {id}: retired {} != retired tally {}",
                batch.retired,
                self.total_retired(id)
            )));
        }
        let outstanding = u128::from(batch.outstanding());
        if balance_total != outstanding {
            return Err(violation(format!(
                "batch {id}: holder balances {balance_total} != issued - retired {outstanding}"
            )));
        }
        if history_total != u128::from(batch.retired) {
            return Err(violation(format!(
                "batch {id}: history total {history_total} != retired {}",
                batch.retired
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonledger_types::BatchMetadata;

    fn batch(issued: u64, retired: u64) -> Batch {
        Batch {
            id: BatchId(1),
            metadata: BatchMetadata::minimal("p", "h"),
            issued,
            retired,
        }
    }

    #[test]
    fn empty_supply_is_zero() {
        let sc = SupplyConservation::new();
        assert_eq!(sc.total_minted(BatchId(1)), 0);
        assert_eq!(sc.total_retired(BatchId(1)), 0);
    }

    #[test]
    fn mints_and_retirements_tracked() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(BatchId(1), 100);
        sc.record_mint(BatchId(1), 20);
        sc.record_retirement(BatchId(1), 20);
        assert_eq!(sc.total_minted(BatchId(1)), 120);
        assert_eq!(sc.total_retired(BatchId(1)), 20);
    }

    #[test]
    fn verify_passes_when_balanced() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(BatchId(1), 120);
        sc.record_retirement(BatchId(1), 20);
        assert!(sc.verify(&batch(120, 20), 100, 20).is_ok());
    }

    #[test]
    fn verify_fails_when_balances_drift() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(BatchId(1), 100);
        let err = sc.verify(&batch(100, 0), 101, 0).unwrap_err();
        assert!(matches!(err, LedgerError::SupplyInvariantViolation { .. }));
    }

    #[test]
    fn verify_fails_when_store_drifts_from_tally() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(BatchId(1), 100);
        let err = sc.verify(&batch(90, 0), 90, 0).unwrap_err();
        assert!(format!("{err}").contains("minted tally"));
    }

    #[test]
    fn verify_fails_when_history_drifts() {
        let mut sc = SupplyConservation::new();
        sc.record_mint(BatchId(1), 100);
        sc.record_retirement(BatchId(1), 10);
        let err = sc.verify(&batch(100, 10), 90, 5).unwrap_err();
        assert!(format!("{err}").contains("history total"));
    }

    #[test]
    fn seeded_from_batches() {
        let b = batch(50, 10);
        let sc = SupplyConservation::from_batches([&b]);
        assert_eq!(sc.total_minted(BatchId(1)), 50);
        assert_eq!(sc.total_retired(BatchId(1)), 10);
        assert!(sc.verify(&b, 40, 10).is_ok());
    }
}
