use anyhow::bail;
use async_trait::async_trait;
use reqwest;
use serde::Deserialize;

use super::BookingStore;
use crate::models::bookings::{Booking, BookingDetail};

#[derive(Deserialize)]
struct StationRef {
    name: String,
}

/// Wire shape of a per-user booking row with the station joined in.
#[derive(Deserialize)]
struct UserBookingRow {
    id: String,
    start_at: chrono::DateTime<chrono::Utc>,
    total_amount: Option<f64>,
    stations: Option<StationRef>,
}

#[derive(Clone)]
pub struct BookingRepository {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BookingRepository {
    pub fn new(url: String, api_key: String) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/bookings", self.url)
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn get_all(&self) -> Result<Vec<Booking>, anyhow::Error> {
        let response = self
            .client
            .get(self.rows_url())
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Backend returned {} listing bookings", response.status());
        }

        let bookings: Vec<Booking> = response.json().await?;
        Ok(bookings)
    }

    async fn get_user_bookings(&self, user_id: &str) -> Result<Vec<BookingDetail>, anyhow::Error> {
        let filter = format!("eq.{user_id}");
        let response = self
            .client
            .get(self.rows_url())
            .query(&[
                ("select", "id,start_at,total_amount,stations(name)"),
                ("user_id", filter.as_str()),
                ("order", "start_at.desc"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!(
                "Backend returned {} listing bookings for user",
                response.status()
            );
        }

        let rows: Vec<UserBookingRow> = response.json().await?;
        Ok(rows
            .into_iter()
            .map(|row| BookingDetail {
                id: row.id,
                station_name: row.stations.map(|s| s.name),
                start_at: row.start_at,
                total_amount: row.total_amount,
            })
            .collect())
    }
}
