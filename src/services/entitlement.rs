// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entitlement management.
//!
//! Decides, at every read of a user's role, whether the stored role is
//! still valid, and corrects a lapsed premium grant back to basic. The
//! corrected record may not be visible to other readers immediately, so
//! every gating decision performs this live check rather than trusting a
//! cached role.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{Role, User};

/// Point-in-time decision about a stored entitlement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoleCheck {
    /// The stored role stands; for an active premium grant, carries the
    /// remaining time in milliseconds (display only).
    Valid { remaining_ms: Option<i64> },
    /// The premium grant has lapsed and must be corrected to basic.
    Lapsed,
}

/// A user's effective access tier after the live check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAccess {
    pub role: Role,
    /// Remaining premium time in milliseconds; None for permanent premium
    /// and for non-premium roles.
    pub premium_remaining_ms: Option<i64>,
}

impl ResolvedAccess {
    /// Whether premium-gated content may be served.
    pub fn has_premium_access(&self) -> bool {
        matches!(self.role, Role::Premium | Role::Admin)
    }
}

/// Resolves and self-heals user entitlements.
#[derive(Clone)]
pub struct EntitlementService {
    db: FirestoreDb,
}

impl EntitlementService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Evaluate a stored entitlement against the clock.
    ///
    /// Non-premium roles and premium without an expiration (permanent)
    /// pass through unchanged. A missing expiration is never an error.
    pub fn evaluate(role: Role, premium_expiration: Option<i64>, now_ms: i64) -> RoleCheck {
        if role != Role::Premium {
            return RoleCheck::Valid { remaining_ms: None };
        }
        match premium_expiration {
            None => RoleCheck::Valid { remaining_ms: None },
            Some(expiration) if now_ms > expiration => RoleCheck::Lapsed,
            Some(expiration) => RoleCheck::Valid {
                remaining_ms: Some(expiration - now_ms),
            },
        }
    }

    /// Resolve the effective role for a user, persisting a correction if
    /// the stored premium grant has lapsed.
    ///
    /// The correction write is best-effort: if the store is unavailable the
    /// stale record stays behind, and the next access check re-evaluates
    /// and re-corrects it.
    pub async fn resolve_role(&self, user: &User, now_ms: i64) -> Result<ResolvedAccess> {
        match Self::evaluate(user.role, user.premium_expiration, now_ms) {
            RoleCheck::Valid { remaining_ms } => Ok(ResolvedAccess {
                role: user.role,
                premium_remaining_ms: remaining_ms,
            }),
            RoleCheck::Lapsed => {
                let mut corrected = user.clone();
                corrected.role = Role::Basic;
                corrected.premium_expiration = None;

                if let Err(e) = self.db.upsert_user(&corrected).await {
                    tracing::warn!(
                        uid = %user.uid,
                        error = %e,
                        "Failed to persist lapsed premium correction; will retry on next check"
                    );
                } else {
                    tracing::info!(uid = %user.uid, "Premium grant lapsed, demoted to basic");
                }

                Ok(ResolvedAccess {
                    role: Role::Basic,
                    premium_remaining_ms: None,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_role_passes_through() {
        assert_eq!(
            EntitlementService::evaluate(Role::Basic, None, 1_000),
            RoleCheck::Valid { remaining_ms: None }
        );
        // Leftover expiration on a basic account is ignored
        assert_eq!(
            EntitlementService::evaluate(Role::Basic, Some(500), 1_000),
            RoleCheck::Valid { remaining_ms: None }
        );
    }

    #[test]
    fn test_admin_never_lapses() {
        assert_eq!(
            EntitlementService::evaluate(Role::Admin, Some(500), 1_000),
            RoleCheck::Valid { remaining_ms: None }
        );
    }

    #[test]
    fn test_permanent_premium_has_no_remaining_time() {
        assert_eq!(
            EntitlementService::evaluate(Role::Premium, None, 1_000),
            RoleCheck::Valid { remaining_ms: None }
        );
    }

    #[test]
    fn test_active_premium_reports_remaining() {
        assert_eq!(
            EntitlementService::evaluate(Role::Premium, Some(5_000), 1_000),
            RoleCheck::Valid {
                remaining_ms: Some(4_000)
            }
        );
    }

    #[test]
    fn test_expired_premium_lapses() {
        assert_eq!(
            EntitlementService::evaluate(Role::Premium, Some(500), 1_000),
            RoleCheck::Lapsed
        );
    }

    #[test]
    fn test_expiration_boundary_is_inclusive() {
        // Exactly at the expiration instant the grant still holds
        assert_eq!(
            EntitlementService::evaluate(Role::Premium, Some(1_000), 1_000),
            RoleCheck::Valid {
                remaining_ms: Some(0)
            }
        );
        assert_eq!(
            EntitlementService::evaluate(Role::Premium, Some(1_000), 1_001),
            RoleCheck::Lapsed
        );
    }

    #[test]
    fn test_premium_access_includes_admin() {
        let premium = ResolvedAccess {
            role: Role::Premium,
            premium_remaining_ms: Some(1),
        };
        let admin = ResolvedAccess {
            role: Role::Admin,
            premium_remaining_ms: None,
        };
        let basic = ResolvedAccess {
            role: Role::Basic,
            premium_remaining_ms: None,
        };
        assert!(premium.has_premium_access());
        assert!(admin.has_premium_access());
        assert!(!basic.has_premium_access());
    }
}
