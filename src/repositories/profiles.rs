use anyhow::bail;
use async_trait::async_trait;
use reqwest;

use super::ProfileStore;
use crate::models::profiles::{NewProfile, ProfileUpdate, UserProfile};

/// Profile rows live in the hosted backend and are reached over its REST
/// surface. Filters use the backend's `column=eq.value` query syntax.
#[derive(Clone)]
pub struct ProfileRepository {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ProfileRepository {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.url)
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn get_all(&self) -> Result<Vec<UserProfile>, anyhow::Error> {
        let response = self
            .client
            .get(self.rows_url())
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} listing profiles", response.status());
        }

        let profiles: Vec<UserProfile> = response.json().await?;
        Ok(profiles)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error> {
        let filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(self.rows_url())
            .query(&[("select", "*"), ("user_id", filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} fetching profile", response.status());
        }

        let mut rows: Vec<UserProfile> = response.json().await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, anyhow::Error> {
        let response = self
            .client
            .post(self.rows_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&profile)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} creating profile", response.status());
        }

        let mut rows: Vec<UserProfile> = response.json().await?;
        if rows.is_empty() {
            bail!("Backend did not return the created profile");
        }
        Ok(rows.remove(0))
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .patch(self.rows_url())
            .query(&[("user_id", format!("eq.{user_id}"))])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&update)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} updating profile", response.status());
        }

        Ok(())
    }

    async fn check_username(&self, username: &str) -> Result<bool, anyhow::Error> {
        let filter = format!("eq.{username}");
        let response = self
            .client
            .get(self.rows_url())
            .query(&[("select", "id"), ("username", filter.as_str())])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} checking username", response.status());
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(rows.is_empty())
    }
}
