// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::services::{rewards::DRAW_COOLDOWN_MS, DrawOutcome};
use crate::time_utils::{duration_days, now_millis};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/redeem", post(redeem_code))
        .route("/api/prizes/daily", post(play_daily_prize))
        .route("/api/scripts/{slug}/download", get(download_script))
}

/// Load the caller's profile document or fail with NotFound.
async fn load_user(state: &AppState, uid: &str) -> Result<User> {
    state
        .db
        .get_user(uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub uid: String,
    pub email: Option<String>,
    pub username: String,
    /// Effective role after the live entitlement check
    pub role: String,
    /// Remaining premium time in ms; absent for permanent premium and
    /// non-premium roles
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub premium_remaining_ms: Option<i64>,
}

/// Get current user profile with the resolved (self-healed) role.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = load_user(&state, &user.uid).await?;

    // Live check: a lapsed premium grant is corrected here, not merely
    // reported
    let access = state
        .entitlements
        .resolve_role(&profile, now_millis())
        .await?;

    Ok(Json(UserResponse {
        uid: profile.uid,
        email: profile.email,
        username: profile.username,
        role: access.role.as_str().to_string(),
        premium_remaining_ms: access.premium_remaining_ms,
    }))
}

// ─── Code Redemption ─────────────────────────────────────────

#[derive(Deserialize)]
struct RedeemRequest {
    code: String,
}

/// Response for a successful redemption.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RedeemResponse {
    pub success: bool,
    /// Granted duration in milliseconds
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_ms: i64,
    /// Granted duration in whole days (rounded up, for display)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration_days: i64,
    /// New premium expiration in milliseconds since epoch
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub premium_expiration: i64,
}

/// Redeem a code for premium access.
async fn redeem_code(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>> {
    let grant = state
        .redemptions
        .redeem(&user.uid, &payload.code, now_millis())
        .await?;

    Ok(Json(RedeemResponse {
        success: true,
        duration_ms: grant.duration_ms,
        duration_days: duration_days(grant.duration_ms),
        premium_expiration: grant.premium_expiration,
    }))
}

// ─── Daily Prize ─────────────────────────────────────────────

/// Response for a daily prize draw.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyPrizeResponse {
    pub won: bool,
    /// The minted redeem code, when the draw wins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// When the user may draw again (ms since epoch)
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub next_draw_at: i64,
}

/// Play the daily prize draw.
async fn play_daily_prize(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DailyPrizeResponse>> {
    let profile = load_user(&state, &user.uid).await?;
    let now = now_millis();

    let outcome = state.rewards.play_daily(&profile, now).await?;

    let (won, code) = match outcome {
        DrawOutcome::Won { code } => (true, Some(code)),
        DrawOutcome::Lost => (false, None),
    };

    Ok(Json(DailyPrizeResponse {
        won,
        code,
        next_draw_at: now + DRAW_COOLDOWN_MS,
    }))
}

// ─── Script Download ─────────────────────────────────────────

/// Response for a script download request.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DownloadResponse {
    pub title: String,
    pub url: String,
}

/// Get the download URL for a script.
///
/// Premium-gated scripts require a live entitlement check; the stored
/// role is never trusted directly, because a lapsed grant may not have
/// been corrected yet.
async fn download_script(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<DownloadResponse>> {
    let script = state
        .db
        .get_script(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Script {} not found", slug)))?;

    if script.is_premium {
        let profile = load_user(&state, &user.uid).await?;
        let access = state
            .entitlements
            .resolve_role(&profile, now_millis())
            .await?;

        if !access.has_premium_access() {
            return Err(AppError::Forbidden(
                "Premium access required for this script".to_string(),
            ));
        }
    }

    tracing::debug!(uid = %user.uid, slug = %script.slug, "Serving script download");

    Ok(Json(DownloadResponse {
        title: script.title,
        url: script.script_url,
    }))
}
