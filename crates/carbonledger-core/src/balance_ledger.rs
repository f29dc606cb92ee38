//! Per-(holder, batch) balance tracking.
//!
//! Balances are plain `u64` quantities and can never go negative: a debit
//! larger than the balance is rejected before anything changes. A missing
//! entry reads as zero; entries that drain to zero are kept.

use std::collections::HashMap;

use carbonledger_types::{BatchId, LedgerError, Principal, Result, ensure_positive};

/// Quantity held and not yet retired, per holder and batch.
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    balances: HashMap<(Principal, BatchId), u64>,
}

impl BalanceLedger {
    /// Create a new empty balance ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a credit without applying it.
    pub fn check_credit(&self, holder: Principal, id: BatchId, amount: u64) -> Result<()> {
        ensure_positive(amount)?;
        if self.balance_of(holder, id).checked_add(amount).is_none() {
            return Err(LedgerError::InvalidAmount {
                reason: format!("crediting {amount} overflows balance of {holder} in batch {id}"),
            });
        }
        Ok(())
    }

    /// Increase `holder`'s balance in batch `id`.
    ///
    /// # Errors
    /// Returns `InvalidAmount` if `amount` is zero or the balance would overflow.
    pub fn credit(&mut self, holder: Principal, id: BatchId, amount: u64) -> Result<()> {
        self.check_credit(holder, id, amount)?;
        *self.balances.entry((holder, id)).or_insert(0) += amount;
        Ok(())
    }

    /// Validate a debit without applying it.
    pub fn check_debit(&self, holder: Principal, id: BatchId, amount: u64) -> Result<()> {
        ensure_positive(amount)?;
        let available = self.balance_of(holder, id);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Decrease `holder`'s balance in batch `id`.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the balance is below `amount`;
    /// nothing changes in that case.
    pub fn debit(&mut self, holder: Principal, id: BatchId, amount: u64) -> Result<()> {
        self.check_debit(holder, id, amount)?;
        let entry = self
            .balances
            .get_mut(&(holder, id))
            .ok_or(LedgerError::InsufficientBalance {
                needed: amount,
                available: 0,
            })?;
        *entry -= amount;
        Ok(())
    }

    /// Balance for a (holder, batch) pair. Zero when never credited.
    #[must_use]
    pub fn balance_of(&self, holder: Principal, id: BatchId) -> u64 {
        self.balances.get(&(holder, id)).copied().unwrap_or(0)
    }

    /// Sum of every holder's balance in batch `id`.
    ///
    /// Widened to `u128` so a corrupt state cannot wrap during verification.
    #[must_use]
    pub fn total_for_batch(&self, id: BatchId) -> u128 {
        self.balances
            .iter()
            .filter(|((_, b), _)| *b == id)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }

    /// Non-zero holdings of `holder`, sorted by batch id.
    #[must_use]
    pub fn holdings_of(&self, holder: Principal) -> Vec<(BatchId, u64)> {
        let mut holdings: Vec<(BatchId, u64)> = self
            .balances
            .iter()
            .filter(|((h, _), amount)| *h == holder && **amount > 0)
            .map(|((_, id), amount)| (*id, *amount))
            .collect();
        holdings.sort_unstable_by_key(|(id, _)| *id);
        holdings
    }

    /// Every stored entry, sorted by (holder, batch).
    #[must_use]
    pub fn entries(&self) -> Vec<(Principal, BatchId, u64)> {
        let mut rows: Vec<(Principal, BatchId, u64)> = self
            .balances
            .iter()
            .map(|((h, id), amount)| (*h, *id, *amount))
            .collect();
        rows.sort_unstable_by_key(|(h, id, _)| (*h, *id));
        rows
    }

    /// Rebuild from stored rows. A repeated key is rejected.
    pub fn from_entries(rows: impl IntoIterator<Item = (Principal, BatchId, u64)>) -> Result<Self> {
        let mut ledger = Self::new();
        for (holder, id, amount) in rows {
            if ledger.balances.insert((holder, id), amount).is_some() {
                return Err(LedgerError::SupplyInvariantViolation {
                    reason: format!("duplicate balance entry for {holder} in batch {id}"),
                });
            }
        }
        Ok(ledger)
    }
}
