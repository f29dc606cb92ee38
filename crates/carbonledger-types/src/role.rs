//! The closed set of capabilities the ledger gates mutations on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// A named capability.
///
/// Retirement needs no role: a holder may always consume its own credits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    /// May grant and revoke roles.
    Admin,
    /// May create batches and top them up.
    Issuer,
}

impl Role {
    /// Canonical wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "DEFAULT_ADMIN_ROLE",
            Self::Issuer => "ISSUER_ROLE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT_ADMIN_ROLE" | "admin" => Ok(Self::Admin),
            "ISSUER_ROLE" | "issuer" => Ok(Self::Issuer),
            other => Err(LedgerError::UnknownRole(other.to_string())),
        }
    }
}
