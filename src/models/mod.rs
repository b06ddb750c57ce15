// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod code;
pub mod prize;
pub mod script;
pub mod user;

pub use code::RedeemCode;
pub use prize::PrizeRecord;
pub use script::Script;
pub use user::{Role, User};
