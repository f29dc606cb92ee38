//! Batch model: provenance metadata plus the issued/retired counter pair.
//!
//! Provenance dates are producer/verifier supplied. The expected ordering
//! `vintage ≤ verification ≤ issuance ≤ tokenization` is the caller's
//! responsibility and is not enforced here; see
//! [`BatchMetadata::dates_in_expected_order`] for an advisory check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BatchId;

/// Provenance supplied at issuance.
///
/// Two call patterns share this schema: the full form carries every field,
/// the minimal `(project, evidence)` form leaves the rest empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchMetadata {
    /// Producer (farmer) registration number, or a project id in the minimal form.
    pub producer_registration_no: String,
    /// Free-form location, usually coordinates.
    #[serde(default)]
    pub location: String,
    /// When the credits were earned.
    #[serde(default)]
    pub vintage_date: Option<DateTime<Utc>>,
    /// When the underlying output was verified.
    #[serde(default)]
    pub verification_date: Option<DateTime<Utc>>,
    /// When the credits were issued off-ledger.
    #[serde(default)]
    pub issuance_date: Option<DateTime<Utc>>,
    /// When the credits were tokenized onto this ledger.
    #[serde(default)]
    pub tokenization_date: Option<DateTime<Utc>>,
    /// Opaque reference to the verification evidence (hash or URI).
    pub evidence_hash: String,
}

impl BatchMetadata {
    /// Minimal form: a project id and an evidence reference, nothing else.
    #[must_use]
    pub fn minimal(project_id: impl Into<String>, evidence_hash: impl Into<String>) -> Self {
        Self {
            producer_registration_no: project_id.into(),
            evidence_hash: evidence_hash.into(),
            ..Self::default()
        }
    }

    /// Set all four provenance dates at once.
    #[must_use]
    pub fn with_dates(
        mut self,
        vintage: DateTime<Utc>,
        verification: DateTime<Utc>,
        issuance: DateTime<Utc>,
        tokenization: DateTime<Utc>,
    ) -> Self {
        self.vintage_date = Some(vintage);
        self.verification_date = Some(verification);
        self.issuance_date = Some(issuance);
        self.tokenization_date = Some(tokenization);
        self
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence_hash: impl Into<String>) -> Self {
        self.evidence_hash = evidence_hash.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Whether the dates that are present follow
    /// `vintage ≤ verification ≤ issuance ≤ tokenization`.
    /// Missing dates are skipped.
    #[must_use]
    pub fn dates_in_expected_order(&self) -> bool {
        let present: Vec<DateTime<Utc>> = [
            self.vintage_date,
            self.verification_date,
            self.issuance_date,
            self.tokenization_date,
        ]
        .into_iter()
        .flatten()
        .collect();
        present.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl BatchMetadata {
    pub fn dummy() -> Self {
        let now = Utc::now();
        Self {
            producer_registration_no: "FARMER-001".to_string(),
            location: "45.4215 N, 75.6972 W".to_string(),
            ..Self::default()
        }
        .with_dates(
            now - chrono::Duration::days(30),
            now - chrono::Duration::days(15),
            now - chrono::Duration::days(5),
            now,
        )
        .with_evidence("ipfs://QmDummyEvidence")
    }
}

/// A read-only snapshot of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub metadata: BatchMetadata,
    /// Total ever minted into this batch (creation plus top-ups).
    pub issued: u64,
    /// Total ever retired from this batch. Never exceeds `issued`.
    pub retired: u64,
}

impl Batch {
    /// Credits still held by someone (`issued - retired`).
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.issued.saturating_sub(self.retired)
    }

    #[must_use]
    pub fn is_fully_retired(&self) -> bool {
        self.retired == self.issued
    }

    #[must_use]
    pub fn evidence_hash(&self) -> &str {
        &self.metadata.evidence_hash
    }
}
