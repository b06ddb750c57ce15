// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily prize draw.
//!
//! Once per day a basic user can play the draw; a winning draw mints a
//! fresh single-use redeem code worth one hour of premium and records the
//! prize. The code itself goes through the normal redemption path.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{PrizeRecord, RedeemCode, Role, User};
use crate::time_utils::{MILLIS_PER_DAY, MILLIS_PER_HOUR};
use rand::{distributions::Alphanumeric, Rng};

/// Minimum gap between draws per user.
pub const DRAW_COOLDOWN_MS: i64 = MILLIS_PER_DAY;
/// Chance that a draw wins a code.
const WIN_CHANCE: f64 = 0.25;
/// Premium duration carried by prize codes.
const PRIZE_DURATION_MS: i64 = MILLIS_PER_HOUR;
const PRIZE_CODE_LEN: usize = 8;

/// Outcome of a daily draw.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// A single-use redeem code was minted for the user.
    Won { code: String },
    Lost,
}

/// Runs the daily prize draw.
#[derive(Clone)]
pub struct RewardsService {
    db: FirestoreDb,
}

impl RewardsService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Whether a user may draw again at `now_ms`.
    pub fn can_draw(last_prize_at: Option<i64>, now_ms: i64) -> bool {
        match last_prize_at {
            None => true,
            Some(last) => now_ms - last > DRAW_COOLDOWN_MS,
        }
    }

    /// Generate a prize code value: 8 uppercase alphanumeric characters.
    fn generate_code() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PRIZE_CODE_LEN)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect()
    }

    /// Play the daily draw for `user` at instant `now_ms`.
    ///
    /// Only basic accounts play; premium and admin accounts have nothing
    /// to win. The cooldown is stamped whether or not the draw wins.
    pub async fn play_daily(&self, user: &User, now_ms: i64) -> Result<DrawOutcome> {
        if user.role != Role::Basic {
            return Err(AppError::Forbidden(
                "The daily prize draw is only available to basic accounts".to_string(),
            ));
        }
        if !Self::can_draw(user.last_prize_at, now_ms) {
            return Err(AppError::BadRequest(
                "Daily prize already played; try again tomorrow".to_string(),
            ));
        }

        let won = rand::thread_rng().gen::<f64>() < WIN_CHANCE;
        let outcome = if won {
            let code_value = Self::generate_code();

            self.db
                .create_code(&RedeemCode {
                    code: code_value.clone(),
                    duration_ms: PRIZE_DURATION_MS,
                    usage_count: 0,
                    usage_limit: 1,
                    created_by: "system".to_string(),
                    created_at: now_ms,
                    last_used_by: None,
                    last_used_at: None,
                })
                .await?;

            self.db
                .record_prize(&PrizeRecord {
                    user_id: user.uid.clone(),
                    code: code_value.clone(),
                    won_at: now_ms,
                })
                .await?;

            tracing::info!(uid = %user.uid, code = %code_value, "Daily prize won");
            DrawOutcome::Won { code: code_value }
        } else {
            tracing::debug!(uid = %user.uid, "Daily prize lost");
            DrawOutcome::Lost
        };

        // Stamp the cooldown last so a store failure above leaves the draw
        // replayable.
        let mut updated = user.clone();
        updated.last_prize_at = Some(now_ms);
        self.db.upsert_user(&updated).await?;

        Ok(outcome)
    }
}
