// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes: redeem code management and script publishing.
//!
//! All routes here sit behind the admin middleware; `created_by` comes
//! from the verified caller, never the payload.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::script::slugify;
use crate::models::{RedeemCode, Script};
use crate::time_utils::{now_millis, now_rfc3339, MILLIS_PER_DAY, MILLIS_PER_HOUR};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MILLIS_PER_YEAR: i64 = 365 * MILLIS_PER_DAY;

/// Admin routes (require admin role).
/// Auth and admin middleware are applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/codes", post(create_code).get(list_codes))
        .route("/api/admin/codes/{code}", delete(delete_code))
        .route("/api/admin/scripts", post(create_script))
}

// ─── Redeem Codes ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateCodeRequest {
    /// The code string users will enter (case-sensitive)
    #[validate(length(min = 1, max = 64))]
    code: String,
    /// Grant duration, summed from the parts below
    #[serde(default)]
    years: u32,
    #[serde(default)]
    days: u32,
    #[serde(default)]
    hours: u32,
    /// Maximum successful redemptions; defaults to single-use
    usage_limit: Option<u32>,
}

impl CreateCodeRequest {
    fn duration_ms(&self) -> i64 {
        self.years as i64 * MILLIS_PER_YEAR
            + self.days as i64 * MILLIS_PER_DAY
            + self.hours as i64 * MILLIS_PER_HOUR
    }
}

/// Response wrapping a code record.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CodeResponse {
    pub code: RedeemCode,
}

/// Create a new redeem code.
async fn create_code(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Json(payload): Json<CreateCodeRequest>,
) -> Result<Json<CodeResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let code_value = payload.code.trim().to_string();
    if code_value.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter a redeem code".to_string(),
        ));
    }

    let duration_ms = payload.duration_ms();
    if duration_ms <= 0 {
        return Err(AppError::BadRequest(
            "Please set a duration for the redeem code".to_string(),
        ));
    }

    let usage_limit = payload.usage_limit.unwrap_or(1);
    if usage_limit < 1 {
        return Err(AppError::BadRequest(
            "Usage limit must be at least 1".to_string(),
        ));
    }

    // Active codes are unique; the store-level create backstops this
    // pre-check under races
    if state.db.get_code(&code_value).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "Code {} already exists",
            code_value
        )));
    }

    let code = RedeemCode {
        code: code_value,
        duration_ms,
        usage_count: 0,
        usage_limit,
        created_by: admin.uid,
        created_at: now_millis(),
        last_used_by: None,
        last_used_at: None,
    };
    state.db.create_code(&code).await?;

    tracing::info!(
        code = %code.code,
        duration_ms,
        usage_limit,
        created_by = %code.created_by,
        "Redeem code created"
    );

    Ok(Json(CodeResponse { code }))
}

/// List all redeem codes, newest first.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CodeListResponse {
    pub codes: Vec<RedeemCode>,
}

async fn list_codes(State(state): State<Arc<AppState>>) -> Result<Json<CodeListResponse>> {
    let codes = state.db.list_codes().await?;
    Ok(Json(CodeListResponse { codes }))
}

/// Response for code deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteCodeResponse {
    pub success: bool,
}

/// Delete a redeem code.
///
/// This is the only way a code leaves the registry; exhausted codes stay
/// behind (inert) until an admin removes them.
async fn delete_code(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Result<Json<DeleteCodeResponse>> {
    if state.db.get_code(&code).await?.is_none() {
        return Err(AppError::NotFound(format!("Code {} not found", code)));
    }

    state.db.delete_code(&code).await?;
    tracing::info!(code = %code, deleted_by = %admin.uid, "Redeem code deleted");

    Ok(Json(DeleteCodeResponse { success: true }))
}

// ─── Scripts ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateScriptRequest {
    #[validate(length(min = 1, max = 200))]
    title: String,
    #[serde(default)]
    description: String,
    #[validate(url)]
    script_url: String,
    #[serde(default)]
    is_premium: bool,
}

/// Response wrapping a script record.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScriptResponse {
    pub script: Script,
}

/// Publish a script record.
async fn create_script(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Json(payload): Json<CreateScriptRequest>,
) -> Result<Json<ScriptResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let slug = slugify(&payload.title);
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Title must contain at least one alphanumeric character".to_string(),
        ));
    }

    if state.db.get_script(&slug).await?.is_some() {
        return Err(AppError::BadRequest(format!(
            "A script with slug {} already exists",
            slug
        )));
    }

    let script = Script {
        slug,
        title: payload.title,
        description: payload.description,
        script_url: payload.script_url,
        is_premium: payload.is_premium,
        created_at: now_rfc3339(),
    };
    state.db.upsert_script(&script).await?;

    tracing::info!(
        slug = %script.slug,
        is_premium = script.is_premium,
        created_by = %admin.uid,
        "Script published"
    );

    Ok(Json(ScriptResponse { script }))
}
