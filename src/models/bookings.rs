use serde::{Deserialize, Serialize};

pub const CURRENCY_PREFIX: &str = "₹";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub total_amount: Option<f64>,
}

/// One user's booking denormalized for display: station name instead of id.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BookingDetail {
    pub id: String,
    pub station_name: Option<String>,
    pub start_at: chrono::DateTime<chrono::Utc>,
    pub total_amount: Option<f64>,
}

impl BookingDetail {
    pub fn display_amount(&self) -> String {
        format!("{}{}", CURRENCY_PREFIX, self.total_amount.unwrap_or(0.0))
    }
}

/// Per-user summary derived from the full booking list on each directory
/// load. Never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct UserAggregate {
    pub booking_count: u64,
    pub total_spent: f64,
}
