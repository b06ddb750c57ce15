// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod entitlement;
pub mod redemption;
pub mod rewards;

pub use entitlement::{EntitlementService, ResolvedAccess, RoleCheck};
pub use redemption::{RedeemGrant, RedemptionService};
pub use rewards::{DrawOutcome, RewardsService};
