// src/models/reward.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'rewards' table: items purchasable with points.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reward {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: i64,
    pub stock: i32,
    pub is_active: bool,
}

/// Represents the 'reward_redemptions' table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Redemption {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    pub cost: i64,
    pub redeemed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for adding a reward to the catalog (admin).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRewardRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub cost: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
}

/// Represents the 'point_transactions' ledger. Redemptions are negative.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointTransaction {
    pub id: i64,
    pub amount: i64,
    pub reason: String,
    pub source_type: String,
    pub source_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Query parameters for cursor-based listing of the points ledger.
#[derive(Debug, Deserialize)]
pub struct LedgerParams {
    /// Only entries with an id below this one.
    pub before: Option<i64>,
    pub limit: Option<i64>,
}
