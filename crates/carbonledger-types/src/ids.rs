//! Identifiers used throughout CarbonLedger.
//!
//! Batches use a dense, monotonically increasing `u64` so callers can
//! predict the id of an issuance before committing it. Principals use
//! UUIDv7, matching the identity the external auth layer hands us.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::FIRST_BATCH_ID;

// ---------------------------------------------------------------------------
// BatchId
// ---------------------------------------------------------------------------

/// Monotonically increasing identifier for a carbon credit batch.
///
/// Ids start at 1 and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BatchId(pub u64);

impl BatchId {
    /// The id assigned to the very first issuance.
    pub const FIRST: Self = Self(FIRST_BATCH_ID);

    /// The id that follows this one, or `None` on `u64` exhaustion.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BatchId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// An authenticated identity: producer, buyer organization, or administrator.
///
/// The nil UUID is reserved as the "zero principal" and can never hold
/// credits or roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Principal(pub Uuid);

impl Principal {
    /// The reserved zero principal.
    pub const NIL: Self = Self(Uuid::nil());

    /// A fresh identity. Every call yields a distinct principal.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Whether this principal may appear as a holder or role member.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_nil()
    }

    /// First 8 hex chars, handy for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Principal {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
