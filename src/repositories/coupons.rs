use anyhow::bail;
use async_trait::async_trait;
use reqwest;

use super::CouponStore;
use crate::models::coupons::Coupon;

/// Client for the coupon service, a separate HTTP API authenticated with the
/// caller's own session token rather than a service key.
#[derive(Clone)]
pub struct CouponApi {
    url: String,
    client: reqwest::Client,
}

impl CouponApi {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CouponStore for CouponApi {
    async fn my_coupons(&self, access_token: &str) -> Result<Vec<Coupon>, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/api/v1/my-coupons", self.url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Coupon API returned {}", response.status());
        }

        let coupons: Vec<Coupon> = response.json().await?;
        Ok(coupons)
    }
}
