//! # Tenant Scope
//!
//! Every row in Dukaan POS belongs to exactly one shop (tenant). There is
//! no ambient "current shop" state anywhere: the scope is an explicit
//! value that every repository and ledger call must receive, and that
//! every entity constructor requires before a row can exist.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Auth layer (out of scope)                                              │
//! │       │  resolves the shop from the JWT / session                       │
//! │       ▼                                                                 │
//! │  TenantId ──► Ledger / Repositories ──► every WHERE and every INSERT   │
//! │                                                                         │
//! │  No global state, no implicit filter: a call without a TenantId         │
//! │  does not compile.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one shop's isolated data partition.
///
/// Opaque to this crate: whatever the authentication layer hands over
/// (typically a UUID) is carried verbatim onto every row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct TenantId(String);

impl TenantId {
    /// Wraps a raw tenant identifier.
    pub fn new(id: impl Into<String>) -> Self {
        TenantId(id.into())
    }

    /// Returns the raw identifier for query binding.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        TenantId::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let t = TenantId::new("shop-01");
        assert_eq!(t.as_str(), "shop-01");
        assert_eq!(t.to_string(), "shop-01");
        assert_eq!(t, TenantId::from("shop-01"));
    }
}
