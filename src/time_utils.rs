// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for timestamps.
//!
//! Entitlement expirations and code durations are stored as milliseconds
//! since the Unix epoch, matching the store layout the frontend reads.

use chrono::{SecondsFormat, Utc};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current time as RFC3339 with a `Z` suffix.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Grant length in whole days, rounded up (matches the frontend display).
pub fn duration_days(duration_ms: i64) -> i64 {
    (duration_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}
