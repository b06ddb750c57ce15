// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Redeem code processing.
//!
//! Converts a presented code string into a premium entitlement grant,
//! exactly once per successful call. All validation and both record
//! writes happen inside one Firestore transaction (see
//! [`FirestoreDb::redeem_code_atomic`]), so concurrent attempts can never
//! push a code past its usage limit.

use crate::db::{FirestoreDb, RedeemOutcome};
use crate::error::{AppError, Result};

/// A successful redemption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedeemGrant {
    /// Granted premium duration in milliseconds
    pub duration_ms: i64,
    /// Absolute expiration instant in milliseconds since epoch
    pub premium_expiration: i64,
}

/// Validates and redeems codes.
#[derive(Clone)]
pub struct RedemptionService {
    db: FirestoreDb,
}

impl RedemptionService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Redeem `code` for `user_id` at instant `now_ms`.
    ///
    /// Failures are terminal for this attempt; redemption is safe to retry
    /// by resubmission and is never retried automatically at this level.
    pub async fn redeem(&self, user_id: &str, code: &str, now_ms: i64) -> Result<RedeemGrant> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::BadRequest(
                "Please enter a redeem code".to_string(),
            ));
        }

        tracing::debug!(uid = user_id, code, "Redeeming code");

        match self.db.redeem_code_atomic(code, user_id, now_ms).await? {
            RedeemOutcome::Granted {
                duration_ms,
                premium_expiration,
            } => {
                tracing::info!(
                    uid = user_id,
                    code,
                    duration_ms,
                    premium_expiration,
                    "Code redeemed"
                );
                Ok(RedeemGrant {
                    duration_ms,
                    premium_expiration,
                })
            }
            RedeemOutcome::UnknownCode => Err(AppError::InvalidCode),
            RedeemOutcome::Exhausted => Err(AppError::CodeExhausted),
            RedeemOutcome::MissingUser => {
                Err(AppError::NotFound(format!("User {} not found", user_id)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::FirestoreDb;

    #[tokio::test]
    async fn test_empty_code_rejected_before_any_store_access() {
        // Offline mock: any store call would fail, so reaching the store
        // would turn these into Database errors instead.
        let service = RedemptionService::new(FirestoreDb::new_mock());

        let err = service.redeem("u1", "", 1_000).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = service.redeem("u1", "   ", 1_000).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
