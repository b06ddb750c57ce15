// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + entitlement storage)
//! - Redeem codes (creation, lookup, atomic redemption)
//! - Scripts (downloadable assets)
//! - Prizes (daily draw provenance)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{PrizeRecord, RedeemCode, Role, Script, User};
use futures_util::FutureExt;

/// Outcome of an atomic redemption attempt.
///
/// Domain failures are values rather than errors so that the transaction
/// machinery only retries on store contention, never on a rejected code.
#[derive(Debug, Clone, PartialEq)]
pub enum RedeemOutcome {
    /// Entitlement written and usage counted in the same commit.
    Granted {
        duration_ms: i64,
        premium_expiration: i64,
    },
    /// No document for this code string.
    UnknownCode,
    /// usage_count had already reached usage_limit.
    Exhausted,
    /// The redeeming user has no profile document.
    MissingUser,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator ignores credentials; a static dummy token keeps the
        // SDK from looking for real ones.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their auth provider uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Redeem Code Operations ──────────────────────────────────

    /// Get a code record by exact code string (the document ID).
    pub async fn get_code(&self, code: &str) -> Result<Option<RedeemCode>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REDEEM_CODES)
            .obj()
            .one(code)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new redeem code document.
    ///
    /// Uses a create (not upsert) so a concurrent duplicate fails at the
    /// store rather than silently resetting an existing code's counter.
    pub async fn create_code(&self, code: &RedeemCode) -> Result<(), AppError> {
        let _: RedeemCode = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::REDEEM_CODES)
            .document_id(&code.code)
            .object(code)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// List all redeem codes, newest first.
    pub async fn list_codes(&self) -> Result<Vec<RedeemCode>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REDEEM_CODES)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a redeem code (administrative action).
    pub async fn delete_code(&self, code: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::REDEEM_CODES)
            .document_id(code)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Atomic Redemption ───────────────────────────────────────

    /// Atomically redeem a code for a user.
    ///
    /// Runs a Firestore transaction that re-reads the code and the user,
    /// re-validates the usage limit, and commits the entitlement write and
    /// the usage increment together. If another redemption commits first,
    /// Firestore retries this transaction with fresh data, so a code can
    /// never be redeemed more times than its usage_limit, no matter how
    /// many clients race.
    ///
    /// The existing entitlement is overwritten with `now + duration`, even
    /// when the user already holds a later expiration. Overwrite is the
    /// policy; there is no max-merge.
    pub async fn redeem_code_atomic(
        &self,
        code_value: &str,
        user_id: &str,
        now_ms: i64,
    ) -> Result<RedeemOutcome, AppError> {
        let code_value = code_value.to_string();
        let user_id = user_id.to_string();

        self.get_client()?
            .run_transaction(|db, transaction| {
                let code_value = code_value.clone();
                let user_id = user_id.clone();
                async move {
                    // 1. Reads inside the transaction register both documents
                    //    for conflict detection.
                    let code: Option<RedeemCode> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::REDEEM_CODES)
                        .obj()
                        .one(&code_value)
                        .await?;

                    let Some(mut code) = code else {
                        return Ok(RedeemOutcome::UnknownCode);
                    };

                    // 2. Usage-limit check against the transactional read
                    if code.is_exhausted() {
                        return Ok(RedeemOutcome::Exhausted);
                    }

                    let user: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;

                    let Some(mut user) = user else {
                        return Ok(RedeemOutcome::MissingUser);
                    };

                    // 3. Grant: overwrite the entitlement
                    let premium_expiration = now_ms + code.duration_ms;
                    user.role = Role::Premium;
                    user.premium_expiration = Some(premium_expiration);

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.uid)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    // 4. Count the use and stamp provenance
                    code.usage_count += 1;
                    code.last_used_by = Some(user_id.clone());
                    code.last_used_at = Some(now_ms);

                    db.fluent()
                        .update()
                        .in_col(collections::REDEEM_CODES)
                        .document_id(&code.code)
                        .object(&code)
                        .add_to_transaction(transaction)?;

                    Ok(RedeemOutcome::Granted {
                        duration_ms: code.duration_ms,
                        premium_expiration,
                    })
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Redemption transaction failed: {}", e)))
    }

    // ─── Script Operations ───────────────────────────────────────

    /// Get a script by slug.
    pub async fn get_script(&self, slug: &str) -> Result<Option<Script>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SCRIPTS)
            .obj()
            .one(slug)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a script record.
    pub async fn upsert_script(&self, script: &Script) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SCRIPTS)
            .document_id(&script.slug)
            .object(script)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Prize Operations ────────────────────────────────────────

    /// Store a daily prize record.
    ///
    /// Document ID combines the uid and win time so a user's prizes never
    /// collide.
    pub async fn record_prize(&self, prize: &PrizeRecord) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", prize.user_id, prize.won_at);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PRIZES)
            .document_id(&doc_id)
            .object(prize)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
