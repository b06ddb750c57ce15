//! Daily prize record.

use serde::{Deserialize, Serialize};

/// A redeem code won through the daily prize draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeRecord {
    /// Winner's uid
    pub user_id: String,
    /// The generated redeem code value
    pub code: String,
    /// When the prize was won, in milliseconds since epoch
    pub won_at: i64,
}
