// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redeem code model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A redeem code exchangeable for a time-boxed premium grant.
///
/// Stored in Firestore with the code string itself as the document ID,
/// which keeps active codes unique. A code becomes permanently inert once
/// `usage_count` reaches `usage_limit`; the redemption path never deletes
/// it (deletion is a separate admin action).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RedeemCode {
    /// The code string presented by users (case-sensitive)
    pub code: String,
    /// Premium grant length in milliseconds, added to "now" at redemption
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_ms: i64,
    /// Successful redemptions so far
    pub usage_count: u32,
    /// Maximum allowed redemptions (>= 1)
    pub usage_limit: u32,
    /// Who created the code: an admin uid, or "system" for prize codes
    pub created_by: String,
    /// Creation time in milliseconds since epoch
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub created_at: i64,
    /// uid of the most recent redeemer
    #[serde(default)]
    pub last_used_by: Option<String>,
    /// Most recent redemption time in milliseconds since epoch
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub last_used_at: Option<i64>,
}

impl RedeemCode {
    /// True once the code can no longer be redeemed.
    pub fn is_exhausted(&self) -> bool {
        self.usage_count >= self.usage_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(usage_count: u32, usage_limit: u32) -> RedeemCode {
        RedeemCode {
            code: "ABC123".to_string(),
            duration_ms: 86_400_000,
            usage_count,
            usage_limit,
            created_by: "admin-1".to_string(),
            created_at: 0,
            last_used_by: None,
            last_used_at: None,
        }
    }

    #[test]
    fn test_exhaustion_boundary() {
        assert!(!code(0, 1).is_exhausted());
        assert!(code(1, 1).is_exhausted());
        assert!(!code(4, 5).is_exhausted());
        assert!(code(5, 5).is_exhausted());
        // Over-limit counts stay inert
        assert!(code(6, 5).is_exhausted());
    }
}
