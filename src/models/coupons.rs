use serde::{Deserialize, Serialize};

/// A discount code from the coupon API, redeemable once. `used_by` records
/// which user consumed it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_percentage: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub used_by: Option<String>,
}

impl Coupon {
    pub fn is_available(&self) -> bool {
        self.used_by.is_none()
    }
}
