//! The ledger facade: the only externally callable surface.
//!
//! Every mutating operation follows the same shape:
//! 1. Authorize the caller against the role registry
//! 2. Run every validation the stores will need (`check_*`), touching nothing
//! 3. Apply the mutations, which cannot fail once step 2 passed
//! 4. Record supply tallies and emit exactly one event
//!
//! A failure in step 1 or 2 leaves the ledger exactly as it was.

use std::sync::Arc;

use carbonledger_types::{
    Batch, BatchId, BatchMetadata, LedgerConfig, LedgerError, LedgerEvent, LedgerEventKind,
    Principal, Result, RetirementRecord, Role, constants, ensure_positive,
};

use crate::balance_ledger::BalanceLedger;
use crate::batch_store::BatchStore;
use crate::clock::{Clock, SystemClock};
use crate::event_log::EventLog;
use crate::id_allocator::IdAllocator;
use crate::retirement_history::RetirementHistory;
use crate::role_registry::RoleRegistry;
use crate::supply_conservation::SupplyConservation;

/// Owns every store and composes them into atomic operations.
#[derive(Debug)]
pub struct Ledger {
    pub(crate) config: LedgerConfig,
    pub(crate) roles: RoleRegistry,
    pub(crate) ids: IdAllocator,
    pub(crate) batches: BatchStore,
    pub(crate) balances: BalanceLedger,
    pub(crate) history: RetirementHistory,
    pub(crate) supply: SupplyConservation,
    pub(crate) events: EventLog,
    pub(crate) clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Bootstrap a ledger: `config.admin` receives the admin and issuer roles.
    pub fn new(config: LedgerConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Bootstrap with an explicit time source.
    pub fn with_clock(config: LedgerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            ledger = constants::LEDGER_NAME,
            version = constants::VERSION,
            admin = %config.admin,
            "ledger bootstrapped"
        );
        Ok(Self {
            roles: RoleRegistry::bootstrap(config.admin),
            ids: IdAllocator::new(),
            batches: BatchStore::new(),
            balances: BalanceLedger::new(),
            history: RetirementHistory::new(),
            supply: SupplyConservation::new(),
            events: EventLog::new(),
            config,
            clock,
        })
    }

    #[must_use]
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =================================================================
    // Roles
    // =================================================================

    /// Grant `role` to `principal`. Returns `false` if it already held it.
    pub fn grant_role(&mut self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.authorize(caller, Role::Admin)?;
        let changed = self.roles.grant(caller, role, principal)?;
        if changed {
            self.emit(LedgerEventKind::RoleGranted {
                role,
                principal,
                granted_by: caller,
            });
            tracing::info!(%role, principal = %principal, by = %caller, "role granted");
        }
        Ok(changed)
    }

    /// Revoke `role` from `principal`. Returns `false` if it did not hold it.
    pub fn revoke_role(&mut self, caller: Principal, role: Role, principal: Principal) -> Result<bool> {
        self.authorize(caller, Role::Admin)?;
        let changed = self.roles.revoke(caller, role, principal)?;
        if changed {
            self.emit(LedgerEventKind::RoleRevoked {
                role,
                principal,
                revoked_by: caller,
            });
            tracing::info!(%role, principal = %principal, by = %caller, "role revoked");
        }
        Ok(changed)
    }

    /// Drop the caller's own membership of `role`.
    pub fn renounce_role(&mut self, caller: Principal, role: Role) -> bool {
        let changed = self.roles.renounce(caller, role);
        if changed {
            self.emit(LedgerEventKind::RoleRevoked {
                role,
                principal: caller,
                revoked_by: caller,
            });
            tracing::info!(%role, principal = %caller, "role renounced");
        }
        changed
    }

    #[must_use]
    pub fn has_role(&self, role: Role, principal: Principal) -> bool {
        self.roles.has_role(role, principal)
    }

    #[must_use]
    pub fn members_of(&self, role: Role) -> Vec<Principal> {
        self.roles.members_of(role)
    }

    // =================================================================
    // Issuance
    // =================================================================

    /// The id the next successful issuance will receive. No side effects.
    #[must_use]
    pub fn next_id(&self) -> BatchId {
        self.ids.peek()
    }

    /// Create a new batch and mint `amount` to `recipient`.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the issuer role
    /// - `InvalidAmount` if `amount` is zero
    /// - `InvalidPrincipal` if `recipient` is the nil principal
    pub fn issue_batch(
        &mut self,
        caller: Principal,
        recipient: Principal,
        amount: u64,
        metadata: BatchMetadata,
    ) -> Result<BatchId> {
        self.authorize(caller, Role::Issuer)?;
        self.validate_issue(recipient, amount)?;
        self.commit_issue(caller, recipient, amount, metadata)
    }

    /// Minimal call pattern: only a project id and an evidence reference.
    pub fn issue_batch_minimal(
        &mut self,
        caller: Principal,
        recipient: Principal,
        amount: u64,
        project_id: impl Into<String>,
        evidence_hash: impl Into<String>,
    ) -> Result<BatchId> {
        self.issue_batch(
            caller,
            recipient,
            amount,
            BatchMetadata::minimal(project_id, evidence_hash),
        )
    }

    /// Issue only if the next id still equals `expected`, i.e. nothing else
    /// was issued since the caller previewed it.
    ///
    /// # Errors
    /// `StaleIdPreview` in addition to the errors of [`Ledger::issue_batch`].
    pub fn issue_batch_expecting(
        &mut self,
        caller: Principal,
        expected: BatchId,
        recipient: Principal,
        amount: u64,
        metadata: BatchMetadata,
    ) -> Result<BatchId> {
        self.authorize(caller, Role::Issuer)?;
        let actual = self.ids.peek();
        if actual != expected {
            tracing::debug!(%expected, %actual, "stale id preview");
            return Err(LedgerError::StaleIdPreview { expected, actual });
        }
        self.validate_issue(recipient, amount)?;
        self.commit_issue(caller, recipient, amount, metadata)
    }

    fn validate_issue(&self, recipient: Principal, amount: u64) -> Result<()> {
        ensure_positive(amount).inspect_err(|err| tracing::debug!(%err, "issuance rejected"))?;
        ensure_recipient(recipient)?;
        self.ids.ensure_available()?;
        let id = self.ids.peek();
        self.batches
            .check_create(id, amount)
            .inspect_err(|err| tracing::error!(%err, "allocator handed out a live id"))?;
        self.balances.check_credit(recipient, id, amount)
    }

    fn commit_issue(
        &mut self,
        issuer: Principal,
        recipient: Principal,
        amount: u64,
        metadata: BatchMetadata,
    ) -> Result<BatchId> {
        let batch_id = self.ids.allocate()?;
        self.batches.create(batch_id, metadata, amount)?;
        self.balances.credit(recipient, batch_id, amount)?;
        self.supply.record_mint(batch_id, amount);
        self.emit(LedgerEventKind::BatchIssued {
            batch_id,
            recipient,
            amount,
            issuer,
        });
        tracing::info!(
            %batch_id,
            amount,
            recipient = %recipient,
            issuer = %issuer,
            "batch issued"
        );
        self.audit_commit(batch_id);
        Ok(batch_id)
    }

    /// Fold additional verified output into an existing batch.
    ///
    /// `issued` grows by `amount`, the evidence hash is replaced, and
    /// `recipient` (not necessarily the original one) is credited.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the issuer role
    /// - `InvalidAmount` if `amount` is zero or overflows the batch total
    /// - `InvalidPrincipal` if `recipient` is the nil principal
    /// - `BatchNotFound` if `batch_id` was never issued
    pub fn top_up(
        &mut self,
        caller: Principal,
        recipient: Principal,
        batch_id: BatchId,
        amount: u64,
        evidence_hash: impl Into<String>,
    ) -> Result<()> {
        self.authorize(caller, Role::Issuer)?;
        ensure_positive(amount).inspect_err(|err| tracing::debug!(%err, "top-up rejected"))?;
        ensure_recipient(recipient)?;
        self.batches.check_top_up(batch_id, amount)?;
        self.balances.check_credit(recipient, batch_id, amount)?;

        let evidence_hash = evidence_hash.into();
        self.batches
            .top_up(batch_id, amount, evidence_hash.clone())?;
        self.balances.credit(recipient, batch_id, amount)?;
        self.supply.record_mint(batch_id, amount);
        self.emit(LedgerEventKind::BatchToppedUp {
            batch_id,
            recipient,
            amount,
            issuer: caller,
            evidence_hash,
        });
        tracing::info!(%batch_id, amount, recipient = %recipient, "batch topped up");
        self.audit_commit(batch_id);
        Ok(())
    }

    // =================================================================
    // Retirement
    // =================================================================

    /// Permanently retire `amount` of the caller's own credits.
    ///
    /// No role is required.
    ///
    /// # Errors
    /// - `BatchNotFound` if `batch_id` was never issued
    /// - `InvalidAmount` if `amount` is zero
    /// - `InvalidReason` if `reason` exceeds the configured length
    /// - `InsufficientBalance` if the caller holds less than `amount`
    pub fn retire(
        &mut self,
        caller: Principal,
        batch_id: BatchId,
        amount: u64,
        reason: impl Into<String>,
    ) -> Result<()> {
        let reason = reason.into();
        self.batches.get_ref(batch_id)?;
        ensure_positive(amount).inspect_err(|err| tracing::debug!(%err, "retirement rejected"))?;
        if reason.len() > self.config.max_reason_len {
            return Err(LedgerError::InvalidReason {
                len: reason.len(),
                max: self.config.max_reason_len,
            });
        }
        self.balances
            .check_debit(caller, batch_id, amount)
            .inspect_err(|err| tracing::debug!(%batch_id, holder = %caller, %err, "retirement rejected"))?;
        self.batches
            .check_retirement(batch_id, amount)
            .inspect_err(|err| tracing::error!(%batch_id, %err, "balance exceeds batch supply"))?;

        let timestamp = self.clock.now();
        self.balances.debit(caller, batch_id, amount)?;
        self.batches.record_retirement(batch_id, amount)?;
        self.history.append(
            batch_id,
            RetirementRecord {
                retired_by: caller,
                amount,
                timestamp,
                reason: reason.clone(),
            },
        );
        self.supply.record_retirement(batch_id, amount);
        self.events.append(
            LedgerEventKind::CreditsRetired {
                batch_id,
                holder: caller,
                amount,
                reason,
            },
            timestamp,
        );
        tracing::info!(%batch_id, amount, holder = %caller, "credits retired");
        self.audit_commit(batch_id);
        Ok(())
    }

    // =================================================================
    // Read-only projections
    // =================================================================

    pub fn get_batch(&self, batch_id: BatchId) -> Result<Batch> {
        self.batches.get(batch_id)
    }

    /// Retirement records of an existing batch, oldest first.
    pub fn get_retirement_history(&self, batch_id: BatchId) -> Result<Vec<RetirementRecord>> {
        self.batches.get_ref(batch_id)?;
        Ok(self.history.history_of(batch_id).to_vec())
    }

    #[must_use]
    pub fn balance_of(&self, holder: Principal, batch_id: BatchId) -> u64 {
        self.balances.balance_of(holder, batch_id)
    }

    /// Non-zero holdings of `holder`, sorted by batch id.
    #[must_use]
    pub fn holdings_of(&self, holder: Principal) -> Vec<(BatchId, u64)> {
        self.balances.holdings_of(holder)
    }

    /// Every batch in id order.
    #[must_use]
    pub fn batches(&self) -> Vec<Batch> {
        self.batches.iter().cloned().collect()
    }

    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// `metadata_base_uri` followed by the decimal batch id.
    pub fn metadata_uri(&self, batch_id: BatchId) -> Result<String> {
        self.batches.get_ref(batch_id)?;
        Ok(format!("{}{}", self.config.metadata_base_uri, batch_id))
    }

    #[must_use]
    pub fn events(&self) -> &[LedgerEvent] {
        self.events.all()
    }

    #[must_use]
    pub fn events_since(&self, sequence: u64) -> &[LedgerEvent] {
        self.events.since(sequence)
    }

    // =================================================================
    // Invariants
    // =================================================================

    /// Check the supply invariants of one batch.
    pub fn verify_batch(&self, batch_id: BatchId) -> Result<()> {
        let batch = self.batches.get_ref(batch_id)?;
        self.supply.verify(
            batch,
            self.balances.total_for_batch(batch_id),
            self.history.total_retired(batch_id),
        )
    }

    /// Check every batch, plus that no balance or history entry points at a
    /// batch that does not exist, ids are dense from 1, and the allocator
    /// sits right after the last id.
    pub fn verify_invariants(&self) -> Result<()> {
        for batch in self.batches.iter() {
            self.verify_batch(batch.id)?;
        }
        if let Some((holder, id, _)) = self
            .balances
            .entries()
            .into_iter()
            .find(|(_, id, _)| !self.batches.contains(*id))
        {
            return Err(LedgerError::SupplyInvariantViolation {
                reason: format!("balance of {holder} references unknown batch {id}"),
            });
        }
        if let Some(id) = self
            .history
            .batch_ids()
            .into_iter()
            .find(|id| !self.batches.contains(*id))
        {
            return Err(LedgerError::SupplyInvariantViolation {
                reason: format!("retirement history references unknown batch {id}"),
            });
        }
        self.verify_id_sequence()
    }

    /// Batch ids must be exactly `1..=n` and the allocator must sit at `n + 1`.
    fn verify_id_sequence(&self) -> Result<()> {
        let mut expected = BatchId::FIRST;
        for batch in self.batches.iter() {
            if batch.id != expected {
                return Err(LedgerError::SupplyInvariantViolation {
                    reason: format!("batch ids not dense: expected {expected}, found {}", batch.id),
                });
            }
            expected = expected.checked_next().ok_or(LedgerError::IdSpaceExhausted)?;
        }
        let next = self.ids.peek();
        if next == expected {
            Ok(())
        } else if self.batches.contains(next) {
            Err(LedgerError::DuplicateId(next))
        } else {
            Err(LedgerError::SupplyInvariantViolation {
                reason: format!("allocator at {next}, expected {expected}"),
            })
        }
    }

    // =================================================================
    // Internals
    // =================================================================

    fn authorize(&self, caller: Principal, role: Role) -> Result<()> {
        self.roles.ensure(role, caller).inspect_err(|_| {
            tracing::warn!(caller = %caller, %role, "authorization denied");
        })
    }

    fn emit(&mut self, kind: LedgerEventKind) -> u64 {
        let now = self.clock.now();
        self.events.append(kind, now)
    }

    #[cfg(debug_assertions)]
    fn audit_commit(&self, batch_id: BatchId) {
        if let Err(err) = self.verify_batch(batch_id) {
            tracing::error!(%batch_id, %err, "supply invariant broken after commit");
        }
    }

    #[cfg(not(debug_assertions))]
    fn audit_commit(&self, _batch_id: BatchId) {}
}

fn ensure_recipient(recipient: Principal) -> Result<()> {
    if recipient.is_well_formed() {
        Ok(())
    } else {
        Err(LedgerError::InvalidPrincipal(recipient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{Duration, Utc};

    struct Fixture {
        ledger: Ledger,
        admin: Principal,
        issuer: Principal,
        farmer: Principal,
        buyer: Principal,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let admin = Principal::new();
        let issuer = Principal::new();
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let mut ledger = Ledger::with_clock(LedgerConfig::new(admin), clock.clone()).unwrap();
        ledger.grant_role(admin, Role::Issuer, issuer).unwrap();
        Fixture {
            ledger,
            admin,
            issuer,
            farmer: Principal::new(),
            buyer: Principal::new(),
            clock,
        }
    }

    #[test]
    fn bootstrap_assigns_admin_and_issuer() {
        let f = fixture();
        assert!(f.ledger.has_role(Role::Admin, f.admin));
        assert!(f.ledger.has_role(Role::Issuer, f.admin));
        assert!(f.ledger.has_role(Role::Issuer, f.issuer));
        assert!(!f.ledger.has_role(Role::Admin, f.issuer));
    }

    #[test]
    fn invalid_config_rejected() {
        let err = Ledger::new(LedgerConfig::new(Principal::NIL)).unwrap_err();
        assert!(matches!(err, LedgerError::Configuration(_)));
    }

    #[test]
    fn issue_returns_previewed_id() {
        let mut f = fixture();
        let preview = f.ledger.next_id();
        assert_eq!(preview, f.ledger.next_id());
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 100, BatchMetadata::dummy())
            .unwrap();
        assert_eq!(id, preview);
        assert_eq!(id, BatchId(1));
        assert_eq!(f.ledger.next_id(), BatchId(2));
    }

    #[test]
    fn full_metadata_is_stored() {
        let mut f = fixture();
        let metadata = BatchMetadata::dummy();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 100, metadata.clone())
            .unwrap();
        assert_eq!(f.ledger.get_batch(id).unwrap().metadata, metadata);
    }

    #[test]
    fn minimal_issue_leaves_optional_fields_empty() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch_minimal(f.issuer, f.farmer, 10, "project", "ipfs://cid")
            .unwrap();
        let batch = f.ledger.get_batch(id).unwrap();
        assert_eq!(batch.metadata.producer_registration_no, "project");
        assert!(batch.metadata.location.is_empty());
        assert!(batch.metadata.vintage_date.is_none());
        assert_eq!(batch.evidence_hash(), "ipfs://cid");
    }

    #[test]
    fn zero_amount_issue_rejected_without_consuming_id() {
        let mut f = fixture();
        let err = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 0, BatchMetadata::dummy())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
        assert_eq!(f.ledger.next_id(), BatchId(1));
        assert_eq!(f.ledger.batch_count(), 0);
    }

    #[test]
    fn nil_recipient_rejected() {
        let mut f = fixture();
        let err = f
            .ledger
            .issue_batch(f.issuer, Principal::NIL, 5, BatchMetadata::dummy())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPrincipal(_)));
        assert_eq!(f.ledger.next_id(), BatchId(1));
    }

    #[test]
    fn expecting_detects_stale_preview() {
        let mut f = fixture();
        let preview = f.ledger.next_id();
        f.ledger
            .issue_batch(f.admin, f.farmer, 1, BatchMetadata::dummy())
            .unwrap();
        let events_before = f.ledger.events().len();
        let err = f
            .ledger
            .issue_batch_expecting(f.issuer, preview, f.farmer, 1, BatchMetadata::dummy())
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::StaleIdPreview {
                expected: BatchId(1),
                actual: BatchId(2)
            }
        ));
        assert_eq!(f.ledger.batch_count(), 1);
        assert_eq!(f.ledger.events().len(), events_before);

        let id = f
            .ledger
            .issue_batch_expecting(f.issuer, BatchId(2), f.farmer, 1, BatchMetadata::dummy())
            .unwrap();
        assert_eq!(id, BatchId(2));
    }

    #[test]
    fn top_up_to_different_recipient() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 30, BatchMetadata::dummy())
            .unwrap();
        f.ledger
            .top_up(f.issuer, f.buyer, id, 20, "ipfs://new")
            .unwrap();
        let batch = f.ledger.get_batch(id).unwrap();
        assert_eq!(batch.issued, 50);
        assert_eq!(batch.evidence_hash(), "ipfs://new");
        assert_eq!(f.ledger.balance_of(f.farmer, id), 30);
        assert_eq!(f.ledger.balance_of(f.buyer, id), 20);
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn top_up_unknown_batch() {
        let mut f = fixture();
        let err = f
            .ledger
            .top_up(f.issuer, f.farmer, BatchId(7), 5, "h")
            .unwrap_err();
        assert!(matches!(err, LedgerError::BatchNotFound(BatchId(7))));
        assert!(f.ledger.balance_of(f.farmer, BatchId(7)) == 0);
    }

    #[test]
    fn top_up_requires_issuer() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 30, BatchMetadata::dummy())
            .unwrap();
        let err = f
            .ledger
            .top_up(f.farmer, f.farmer, id, 5, "h")
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Unauthorized {
                role: Role::Issuer,
                ..
            }
        ));
        assert_eq!(f.ledger.get_batch(id).unwrap().issued, 30);
    }

    #[test]
    fn retire_records_history_with_clock_time() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 50, BatchMetadata::dummy())
            .unwrap();
        f.clock.advance(Duration::hours(1));
        let at = f.clock.now();
        f.ledger
            .retire(f.farmer, id, 20, "Reforestation North America")
            .unwrap();

        let history = f.ledger.get_retirement_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].retired_by, f.farmer);
        assert_eq!(history[0].amount, 20);
        assert_eq!(history[0].timestamp, at);
        assert_eq!(history[0].reason, "Reforestation North America");
    }

    #[test]
    fn retire_with_empty_reason_allowed() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 5, BatchMetadata::dummy())
            .unwrap();
        f.ledger.retire(f.farmer, id, 5, "").unwrap();
        assert!(f.ledger.get_batch(id).unwrap().is_fully_retired());
    }

    #[test]
    fn retire_overlong_reason_rejected() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 5, BatchMetadata::dummy())
            .unwrap();
        let reason = "x".repeat(f.ledger.config().max_reason_len + 1);
        let err = f.ledger.retire(f.farmer, id, 1, reason).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidReason { .. }));
        assert_eq!(f.ledger.balance_of(f.farmer, id), 5);
    }

    #[test]
    fn retire_unknown_batch() {
        let mut f = fixture();
        let err = f.ledger.retire(f.farmer, BatchId(3), 1, "").unwrap_err();
        assert!(matches!(err, LedgerError::BatchNotFound(BatchId(3))));
    }

    #[test]
    fn retire_zero_rejected() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 5, BatchMetadata::dummy())
            .unwrap();
        let err = f.ledger.retire(f.farmer, id, 0, "").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { .. }));
        assert!(f.ledger.get_retirement_history(id).unwrap().is_empty());
    }

    #[test]
    fn fully_retired_batch_can_be_topped_up() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 10, BatchMetadata::dummy())
            .unwrap();
        f.ledger.retire(f.farmer, id, 10, "offset").unwrap();
        assert!(f.ledger.get_batch(id).unwrap().is_fully_retired());

        f.ledger.top_up(f.issuer, f.farmer, id, 4, "ipfs://v2").unwrap();
        let batch = f.ledger.get_batch(id).unwrap();
        assert_eq!(batch.outstanding(), 4);
        assert_eq!(f.ledger.balance_of(f.farmer, id), 4);
        f.ledger.verify_invariants().unwrap();
    }

    #[test]
    fn history_of_unknown_batch_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.ledger.get_retirement_history(BatchId(1)).unwrap_err(),
            LedgerError::BatchNotFound(_)
        ));
    }

    #[test]
    fn metadata_uri_appends_id() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 1, BatchMetadata::dummy())
            .unwrap();
        assert_eq!(
            f.ledger.metadata_uri(id).unwrap(),
            "https://example.com/metadata/1"
        );
        assert!(f.ledger.metadata_uri(BatchId(2)).is_err());
    }

    #[test]
    fn events_follow_commit_order() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 10, BatchMetadata::dummy())
            .unwrap();
        f.ledger.top_up(f.issuer, f.farmer, id, 5, "h2").unwrap();
        f.ledger.retire(f.farmer, id, 3, "r").unwrap();
        // Failed operations and no-op grants emit nothing.
        let _ = f.ledger.retire(f.farmer, id, 1000, "r");
        f.ledger.grant_role(f.admin, Role::Issuer, f.issuer).unwrap();

        let names: Vec<&str> = f.ledger.events().iter().map(|e| e.kind.name()).collect();
        assert_eq!(
            names,
            vec![
                "ROLE_GRANTED",
                "BATCH_ISSUED",
                "BATCH_TOPPED_UP",
                "CREDITS_RETIRED"
            ]
        );
        let sequences: Vec<u64> = f.ledger.events().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3]);
        assert_eq!(f.ledger.events_since(3).len(), 1);
    }

    #[test]
    fn renounce_emits_revoke_event() {
        let mut f = fixture();
        assert!(f.ledger.renounce_role(f.issuer, Role::Issuer));
        assert!(!f.ledger.has_role(Role::Issuer, f.issuer));
        assert!(!f.ledger.renounce_role(f.issuer, Role::Issuer));
        let last = f.ledger.events().last().unwrap();
        assert!(matches!(
            last.kind,
            LedgerEventKind::RoleRevoked { principal, revoked_by, .. }
                if principal == f.issuer && revoked_by == f.issuer
        ));
    }

    #[test]
    fn holdings_and_listing() {
        let mut f = fixture();
        let a = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 10, BatchMetadata::dummy())
            .unwrap();
        let b = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 20, BatchMetadata::dummy())
            .unwrap();
        f.ledger.retire(f.farmer, a, 10, "").unwrap();
        assert_eq!(f.ledger.holdings_of(f.farmer), vec![(b, 20)]);
        let ids: Vec<BatchId> = f.ledger.batches().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn verify_detects_tampered_store() {
        let mut f = fixture();
        let id = f
            .ledger
            .issue_batch(f.issuer, f.farmer, 10, BatchMetadata::dummy())
            .unwrap();
        // Credit outside the facade to simulate a core bug.
        f.ledger.balances.credit(f.buyer, id, 1).unwrap();
        let err = f.ledger.verify_invariants().unwrap_err();
        assert!(err.is_fatal());
    }
}
