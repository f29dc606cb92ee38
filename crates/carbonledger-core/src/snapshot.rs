//! Whole-ledger snapshots for durable backing stores.
//!
//! A [`LedgerSnapshot`] is the logical state layout: role memberships,
//! the allocator position, batches, balances, per-batch retirement lists,
//! and the event log. Every collection is sorted, so two ledgers in the
//! same state produce byte-identical JSON and the same [`digest`].
//!
//! Restoring re-runs every invariant check before handing back a ledger.
//!
//! [`digest`]: LedgerSnapshot::digest

use std::sync::Arc;

use carbonledger_types::{
    Batch, BatchId, LedgerConfig, LedgerError, LedgerEvent, Principal, Result, RetirementRecord,
    Role,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::balance_ledger::BalanceLedger;
use crate::batch_store::BatchStore;
use crate::clock::{Clock, SystemClock};
use crate::event_log::EventLog;
use crate::id_allocator::IdAllocator;
use crate::ledger::Ledger;
use crate::retirement_history::RetirementHistory;
use crate::role_registry::RoleRegistry;
use crate::supply_conservation::SupplyConservation;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub role: Role,
    pub principal: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub holder: Principal,
    pub batch_id: BatchId,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRetirements {
    pub batch_id: BatchId,
    pub records: Vec<RetirementRecord>,
}

/// The complete logical state of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub next_id: BatchId,
    pub roles: Vec<RoleAssignment>,
    pub batches: Vec<Batch>,
    pub balances: Vec<BalanceRow>,
    pub retirements: Vec<BatchRetirements>,
    pub events: Vec<LedgerEvent>,
}

impl LedgerSnapshot {
    /// Canonical JSON encoding.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Serialization(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Row-level rules the supply sums cannot catch: no nil principal as a
    /// role member, holder, or retiree, and no zero-amount retirement.
    fn check_rows(&self) -> Result<()> {
        let principals = self
            .roles
            .iter()
            .map(|a| a.principal)
            .chain(self.balances.iter().map(|row| row.holder))
            .chain(
                self.retirements
                    .iter()
                    .flat_map(|entry| entry.records.iter().map(|r| r.retired_by)),
            );
        for principal in principals {
            if !principal.is_well_formed() {
                return Err(LedgerError::InvalidPrincipal(principal));
            }
        }
        for entry in &self.retirements {
            if entry.records.iter().any(|r| r.amount == 0) {
                return Err(LedgerError::SupplyInvariantViolation {
                    reason: format!("batch {}: zero-amount retirement record", entry.batch_id),
                });
            }
        }
        Ok(())
    }

    /// Hex SHA-256 over the canonical JSON encoding.
    pub fn digest(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(b"carbonledger:snapshot:v1:");
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}

impl Ledger {
    /// Export the full committed state.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            next_id: self.ids.peek(),
            roles: self
                .roles
                .assignments()
                .map(|(role, principal)| RoleAssignment { role, principal })
                .collect(),
            batches: self.batches.iter().cloned().collect(),
            balances: self
                .balances
                .entries()
                .into_iter()
                .map(|(holder, batch_id, amount)| BalanceRow {
                    holder,
                    batch_id,
                    amount,
                })
                .collect(),
            retirements: self
                .history
                .batch_ids()
                .into_iter()
                .map(|batch_id| BatchRetirements {
                    batch_id,
                    records: self.history.history_of(batch_id).to_vec(),
                })
                .collect(),
            events: self.events.all().to_vec(),
        }
    }

    /// Rebuild a ledger from a snapshot and re-verify every invariant.
    ///
    /// Roles come from the snapshot, not from `config.admin`.
    ///
    /// # Errors
    /// - `SupplyInvariantViolation` if the stored state is not conserved
    /// - `DuplicateId` if a batch repeats or the allocator would reuse an id
    pub fn restore(config: LedgerConfig, snapshot: LedgerSnapshot) -> Result<Self> {
        Self::restore_with_clock(config, snapshot, Arc::new(SystemClock))
    }

    pub fn restore_with_clock(
        config: LedgerConfig,
        snapshot: LedgerSnapshot,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        snapshot.check_rows()?;

        let batches = BatchStore::from_batches(snapshot.batches)?;
        let supply = SupplyConservation::from_batches(batches.iter());
        let balances = BalanceLedger::from_entries(
            snapshot
                .balances
                .into_iter()
                .map(|row| (row.holder, row.batch_id, row.amount)),
        )?;
        let mut history = RetirementHistory::new();
        for entry in snapshot.retirements {
            for record in entry.records {
                history.append(entry.batch_id, record);
            }
        }

        let ledger = Self {
            config,
            roles: RoleRegistry::from_assignments(
                snapshot.roles.into_iter().map(|a| (a.role, a.principal)),
            ),
            ids: IdAllocator::resume_at(snapshot.next_id),
            batches,
            balances,
            history,
            supply,
            events: EventLog::from_events(snapshot.events)?,
            clock,
        };
        ledger
            .verify_invariants()
            .inspect_err(|err| tracing::error!(%err, "snapshot rejected"))?;
        tracing::info!(
            batches = ledger.batch_count(),
            next_id = %ledger.next_id(),
            "ledger restored from snapshot"
        );
        Ok(ledger)
    }
}
