//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// Access tier of a user account.
///
/// `Admin` is assigned out-of-band by a direct store write, never through
/// code redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Basic,
    Premium,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Basic => "basic",
            Role::Premium => "premium",
            Role::Admin => "admin",
        }
    }
}

/// User profile stored in Firestore (document ID is the auth provider's uid).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable user ID from the auth provider (also used as document ID)
    pub uid: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// Display name
    pub username: String,
    /// Stored access tier. Never trust this directly for gating; resolve
    /// it through the entitlement service first.
    pub role: Role,
    /// Premium expiration in milliseconds since epoch.
    /// Only meaningful while `role` is premium; None means permanent.
    #[serde(default)]
    pub premium_expiration: Option<i64>,
    /// When the account was created
    pub created_at: String,
    /// Last daily prize draw in milliseconds since epoch
    #[serde(default)]
    pub last_prize_at: Option<i64>,
}
