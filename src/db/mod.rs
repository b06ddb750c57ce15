//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{FirestoreDb, RedeemOutcome};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Redeem codes, keyed by the code string itself
    pub const REDEEM_CODES: &str = "redeem_codes";
    pub const SCRIPTS: &str = "scripts";
    /// Daily prize provenance records
    pub const PRIZES: &str = "prizes";
}
