// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! ScriptHub: downloadable script assets with premium access gating
//!
//! This crate provides the backend API for the ScriptHub site: premium
//! entitlement management, redeem-code processing, the daily prize draw,
//! and gated script downloads.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{EntitlementService, RedemptionService, RewardsService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub entitlements: EntitlementService,
    pub redemptions: RedemptionService,
    pub rewards: RewardsService,
}
