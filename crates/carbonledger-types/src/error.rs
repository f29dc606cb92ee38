//! Error types for the CarbonLedger batch ledger.
//!
//! All errors use the `CL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Argument errors (amounts, principals, reasons)
//! - 3xx: Batch errors
//! - 4xx: Balance errors
//! - 8xx: Invariant errors (fatal: a core bug, never bad input)
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{BatchId, Principal, Role};

/// Central error enum for all CarbonLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller does not hold the role the operation requires.
    #[error("CL_ERR_100: Unauthorized: {principal} lacks {role}")]
    Unauthorized { principal: Principal, role: Role },

    /// A role name that is not part of the closed capability set.
    #[error("CL_ERR_101: Unknown role: {0}")]
    UnknownRole(String),

    // =================================================================
    // Argument Errors (2xx)
    // =================================================================
    /// Zero or out-of-range quantity.
    #[error("CL_ERR_200: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The nil principal was named as a recipient or role member.
    #[error("CL_ERR_201: Invalid principal: {0}")]
    InvalidPrincipal(Principal),

    /// The retirement reason exceeds the configured bound.
    #[error("CL_ERR_202: Invalid reason: {len} bytes exceeds limit of {max}")]
    InvalidReason { len: usize, max: usize },

    // =================================================================
    // Batch Errors (3xx)
    // =================================================================
    /// The referenced batch has never been issued.
    #[error("CL_ERR_300: Batch not found: {0}")]
    BatchNotFound(BatchId),

    /// A previewed id no longer matches the id the next issuance would get.
    #[error("CL_ERR_301: Stale id preview: expected {expected}, next is {actual}")]
    StaleIdPreview { expected: BatchId, actual: BatchId },

    /// The id space is exhausted.
    #[error("CL_ERR_302: Batch id space exhausted")]
    IdSpaceExhausted,

    // =================================================================
    // Balance Errors (4xx)
    // =================================================================
    /// Holder's balance is below the requested retirement.
    #[error("CL_ERR_400: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// A batch id was created twice.
    #[error("CL_ERR_800: Duplicate batch id: {0}")]
    DuplicateId(BatchId),

    /// Supply conservation invariant violated.
    #[error("CL_ERR_801: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CL_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("CL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("CL_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("CL_ERR_903: I/O error: {0}")]
    Io(String),
}

impl LedgerError {
    /// Whether this error indicates a bug in the ledger rather than bad input.
    ///
    /// Fatal errors should never be reachable through the public API.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateId(_) | Self::SupplyInvariantViolation { .. } | Self::Internal(_)
        )
    }

    /// The numeric `CL_ERR_` code.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 100,
            Self::UnknownRole(_) => 101,
            Self::InvalidAmount { .. } => 200,
            Self::InvalidPrincipal(_) => 201,
            Self::InvalidReason { .. } => 202,
            Self::BatchNotFound(_) => 300,
            Self::StaleIdPreview { .. } => 301,
            Self::IdSpaceExhausted => 302,
            Self::InsufficientBalance { .. } => 400,
            Self::DuplicateId(_) => 800,
            Self::SupplyInvariantViolation { .. } => 801,
            Self::Internal(_) => 900,
            Self::Serialization(_) => 901,
            Self::Configuration(_) => 902,
            Self::Io(_) => 903,
        }
    }

    pub(crate) fn zero_amount() -> Self {
        Self::InvalidAmount {
            reason: "amount must be greater than zero".into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Reject a zero quantity. Every mutating entry point calls this first.
pub fn ensure_positive(amount: u64) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::zero_amount());
    }
    Ok(())
}
