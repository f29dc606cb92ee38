//! Ledger events for the audit trail.
//!
//! Every committed mutation produces exactly one [`LedgerEvent`]. Failed
//! operations and idempotent no-ops produce none. Sequence numbers follow
//! commit order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BatchId, Principal, Role};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEventKind {
    RoleGranted {
        role: Role,
        principal: Principal,
        granted_by: Principal,
    },
    RoleRevoked {
        role: Role,
        principal: Principal,
        revoked_by: Principal,
    },
    BatchIssued {
        batch_id: BatchId,
        recipient: Principal,
        amount: u64,
        issuer: Principal,
    },
    BatchToppedUp {
        batch_id: BatchId,
        recipient: Principal,
        amount: u64,
        issuer: Principal,
        evidence_hash: String,
    },
    CreditsRetired {
        batch_id: BatchId,
        holder: Principal,
        amount: u64,
        reason: String,
    },
}

impl LedgerEventKind {
    /// The batch this event touches, if any.
    #[must_use]
    pub fn batch_id(&self) -> Option<BatchId> {
        match self {
            Self::BatchIssued { batch_id, .. }
            | Self::BatchToppedUp { batch_id, .. }
            | Self::CreditsRetired { batch_id, .. } => Some(*batch_id),
            Self::RoleGranted { .. } | Self::RoleRevoked { .. } => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "ROLE_GRANTED",
            Self::RoleRevoked { .. } => "ROLE_REVOKED",
            Self::BatchIssued { .. } => "BATCH_ISSUED",
            Self::BatchToppedUp { .. } => "BATCH_TOPPED_UP",
            Self::CreditsRetired { .. } => "CREDITS_RETIRED",
        }
    }
}

impl std::fmt::Display for LedgerEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the commit order, starting at 0.
    pub sequence: u64,
    pub kind: LedgerEventKind,
    pub committed_at: DateTime<Utc>,
}
