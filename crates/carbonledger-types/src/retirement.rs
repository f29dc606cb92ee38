//! Retirement records: the auditable proof that credits were consumed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Principal;

/// One retirement of credits from a batch. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementRecord {
    /// The holder whose balance was consumed.
    pub retired_by: Principal,
    /// Quantity retired. Always > 0.
    pub amount: u64,
    /// Commit time of the retirement.
    pub timestamp: DateTime<Utc>,
    /// Free-text eco-action description. May be empty.
    pub reason: String,
}
