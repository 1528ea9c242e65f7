use serde::{Deserialize, Serialize};

/// Fixed conversion rate: 100 points redeem for ₹1.
pub const POINTS_PER_RUPEE: i64 = 100;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PointsBalance {
    pub points_balance: i64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PointsTransaction {
    pub id: String,
    pub description: String,
    pub points: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub fn redemption_value(points_balance: i64) -> f64 {
    points_balance as f64 / POINTS_PER_RUPEE as f64
}
