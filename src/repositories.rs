use async_trait::async_trait;

use crate::models::{
    auth::AuthUser,
    bookings::{Booking, BookingDetail},
    coupons::Coupon,
    points::{PointsBalance, PointsTransaction},
    profiles::{NewProfile, ProfileUpdate, UserProfile},
};

pub mod auth;
pub mod bookings;
pub mod coupons;
pub mod points;
pub mod profiles;

// Views talk to these seams rather than to the concrete clients, so tests can
// drive them with in-memory implementations.

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<UserProfile>, anyhow::Error>;
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error>;
    async fn create(&self, profile: NewProfile) -> Result<UserProfile, anyhow::Error>;
    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<(), anyhow::Error>;
    /// Returns true when the username is free.
    async fn check_username(&self, username: &str) -> Result<bool, anyhow::Error>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Booking>, anyhow::Error>;
    async fn get_user_bookings(&self, user_id: &str) -> Result<Vec<BookingDetail>, anyhow::Error>;
}

#[async_trait]
pub trait PointsStore: Send + Sync {
    async fn get_balance(&self, user_id: &str) -> Result<PointsBalance, anyhow::Error>;
    /// Recency-ordered, newest first.
    async fn get_history(&self, user_id: &str) -> Result<Vec<PointsTransaction>, anyhow::Error>;
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn my_coupons(&self, access_token: &str) -> Result<Vec<Coupon>, anyhow::Error>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, anyhow::Error>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), anyhow::Error>;
    async fn change_password(
        &self,
        access_token: &str,
        new_password: &str,
    ) -> Result<(), anyhow::Error>;
}
