use anyhow::bail;
use async_trait::async_trait;
use reqwest;
use serde_json::json;

use super::AuthProvider;
use crate::models::auth::AuthUser;

#[derive(Clone)]
pub struct AuthApi {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AuthApi {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AuthProvider for AuthApi {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Auth backend returned {} resolving user", response.status());
        }

        let user: AuthUser = response.json().await?;
        Ok(Some(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<(), anyhow::Error> {
        let payload = json!({
            "email": email,
            "password": password
        });

        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", self.url))
            .header("apikey", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Sign-in rejected with {}", response.status());
        }

        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), anyhow::Error> {
        let payload = json!({ "password": new_password });

        let response = self
            .client
            .put(format!("{}/auth/v1/user", self.url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!(
                "Auth backend returned {} changing password",
                response.status()
            );
        }

        Ok(())
    }
}
