use anyhow::bail;
use async_trait::async_trait;
use reqwest;

use super::PointsStore;
use crate::models::points::{PointsBalance, PointsTransaction};

#[derive(Clone)]
pub struct PointsRepository {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl PointsRepository {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PointsStore for PointsRepository {
    async fn get_balance(&self, user_id: &str) -> Result<PointsBalance, anyhow::Error> {
        let filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(format!("{}/rest/v1/user_points", self.url))
            .query(&[("select", "points_balance"), ("user_id", filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} fetching balance", response.status());
        }

        let mut rows: Vec<PointsBalance> = response.json().await?;
        if rows.is_empty() {
            Ok(PointsBalance::default())
        } else {
            Ok(rows.remove(0))
        }
    }

    async fn get_history(&self, user_id: &str) -> Result<Vec<PointsTransaction>, anyhow::Error> {
        let filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(format!("{}/rest/v1/points_transactions", self.url))
            .query(&[
                ("select", "*"),
                ("user_id", filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} fetching history", response.status());
        }

        let history: Vec<PointsTransaction> = response.json().await?;
        Ok(history)
    }
}
