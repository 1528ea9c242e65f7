#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::bail;
use async_trait::async_trait;

use lounge_dashboard::models::auth::AuthUser;
use lounge_dashboard::models::bookings::{Booking, BookingDetail};
use lounge_dashboard::models::coupons::Coupon;
use lounge_dashboard::models::points::{PointsBalance, PointsTransaction};
use lounge_dashboard::models::profiles::{NewProfile, ProfileUpdate, UserProfile};
use lounge_dashboard::repositories::{
    AuthProvider, BookingStore, CouponStore, PointsStore, ProfileStore,
};

pub fn profile(username: &str, full_name: &str) -> UserProfile {
    UserProfile {
        id: format!("p-{username}"),
        user_id: format!("u-{username}"),
        username: username.to_string(),
        full_name: full_name.to_string(),
        phone: None,
        profile_pic_url: None,
        referral_code: None,
        created_at: chrono::Utc::now(),
    }
}

pub fn booking(id: &str, user_id: &str, amount: Option<f64>) -> Booking {
    Booking {
        id: id.to_string(),
        user_id: user_id.to_string(),
        station_id: "st-1".to_string(),
        start_at: chrono::Utc::now(),
        total_amount: amount,
    }
}

pub fn booking_detail(id: &str, station: &str, amount: Option<f64>) -> BookingDetail {
    BookingDetail {
        id: id.to_string(),
        station_name: Some(station.to_string()),
        start_at: chrono::Utc::now(),
        total_amount: amount,
    }
}

pub fn transaction(id: &str, description: &str, points: i64) -> PointsTransaction {
    PointsTransaction {
        id: id.to_string(),
        description: description.to_string(),
        points,
        created_at: chrono::Utc::now(),
    }
}

pub fn coupon(id: &str, code: &str, used_by: Option<&str>) -> Coupon {
    Coupon {
        id: id.to_string(),
        code: code.to_string(),
        discount_percentage: 5.0,
        kind: "first_booking".to_string(),
        used_by: used_by.map(|u| u.to_string()),
    }
}

pub fn auth_user(id: &str, email: &str) -> AuthUser {
    AuthUser {
        id: id.to_string(),
        email: email.to_string(),
    }
}

#[derive(Default)]
pub struct FakeProfileStore {
    pub profiles: Mutex<Vec<UserProfile>>,
    pub taken_usernames: Mutex<Vec<String>>,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    pub fail_get_all: AtomicBool,
    pub last_update: Mutex<Option<ProfileUpdate>>,
}

impl FakeProfileStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<UserProfile>) -> Self {
        FakeProfileStore {
            profiles: Mutex::new(profiles),
            ..Default::default()
        }
    }

    pub fn mark_taken(&self, username: &str) {
        self.taken_usernames
            .lock()
            .unwrap()
            .push(username.to_string());
    }
}

#[async_trait]
impl ProfileStore for FakeProfileStore {
    async fn get_all(&self) -> Result<Vec<UserProfile>, anyhow::Error> {
        if self.fail_get_all.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, anyhow::Error> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let created = UserProfile {
            id: format!("p-{}", profile.username),
            user_id: profile.user_id,
            username: profile.username.clone(),
            full_name: profile.full_name,
            phone: profile.phone,
            profile_pic_url: None,
            referral_code: Some(format!("REF-{}", profile.username.to_uppercase())),
            created_at: chrono::Utc::now(),
        };
        self.profiles.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, user_id: &str, update: ProfileUpdate) -> Result<(), anyhow::Error> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_update.lock().unwrap() = Some(update.clone());

        let mut profiles = self.profiles.lock().unwrap();
        if let Some(profile) = profiles.iter_mut().find(|p| p.user_id == user_id) {
            if let Some(username) = update.username {
                profile.username = username;
            }
            if let Some(full_name) = update.full_name {
                profile.full_name = full_name;
            }
            if let Some(phone) = update.phone {
                profile.phone = Some(phone);
            }
            if let Some(pic) = update.profile_pic_url {
                profile.profile_pic_url = if pic.is_empty() { None } else { Some(pic) };
            }
        }
        Ok(())
    }

    async fn check_username(&self, username: &str) -> Result<bool, anyhow::Error> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        let taken = self
            .taken_usernames
            .lock()
            .unwrap()
            .iter()
            .any(|u| u == username)
            || self
                .profiles
                .lock()
                .unwrap()
                .iter()
                .any(|p| p.username == username);
        Ok(!taken)
    }
}

#[derive(Default)]
pub struct FakeBookingStore {
    pub all: Mutex<Vec<Booking>>,
    pub per_user: Mutex<HashMap<String, Vec<BookingDetail>>>,
    pub all_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub fail_all: AtomicBool,
    pub fail_user: AtomicBool,
}

impl FakeBookingStore {
    pub fn with_bookings(all: Vec<Booking>) -> Self {
        FakeBookingStore {
            all: Mutex::new(all),
            ..Default::default()
        }
    }

    pub fn set_user_bookings(&self, user_id: &str, bookings: Vec<BookingDetail>) {
        self.per_user
            .lock()
            .unwrap()
            .insert(user_id.to_string(), bookings);
    }
}

#[async_trait]
impl BookingStore for FakeBookingStore {
    async fn get_all(&self) -> Result<Vec<Booking>, anyhow::Error> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        Ok(self.all.lock().unwrap().clone())
    }

    async fn get_user_bookings(&self, user_id: &str) -> Result<Vec<BookingDetail>, anyhow::Error> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_user.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        Ok(self
            .per_user
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakePointsStore {
    pub balance: Mutex<PointsBalance>,
    pub history: Mutex<Vec<PointsTransaction>>,
    pub fail: AtomicBool,
}

impl FakePointsStore {
    pub fn with_points(balance: i64, history: Vec<PointsTransaction>) -> Self {
        FakePointsStore {
            balance: Mutex::new(PointsBalance {
                points_balance: balance,
            }),
            history: Mutex::new(history),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl PointsStore for FakePointsStore {
    async fn get_balance(&self, _user_id: &str) -> Result<PointsBalance, anyhow::Error> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        Ok(self.balance.lock().unwrap().clone())
    }

    async fn get_history(&self, _user_id: &str) -> Result<Vec<PointsTransaction>, anyhow::Error> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        Ok(self.history.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeCouponStore {
    pub coupons: Mutex<Vec<Coupon>>,
    pub fail: AtomicBool,
    pub last_token: Mutex<Option<String>>,
}

impl FakeCouponStore {
    pub fn with_coupons(coupons: Vec<Coupon>) -> Self {
        FakeCouponStore {
            coupons: Mutex::new(coupons),
            ..Default::default()
        }
    }
}

#[async_trait]
impl CouponStore for FakeCouponStore {
    async fn my_coupons(&self, access_token: &str) -> Result<Vec<Coupon>, anyhow::Error> {
        *self.last_token.lock().unwrap() = Some(access_token.to_string());
        if self.fail.load(Ordering::SeqCst) {
            bail!("coupon API offline");
        }
        Ok(self.coupons.lock().unwrap().clone())
    }
}

pub struct FakeAuth {
    pub user: Mutex<Option<AuthUser>>,
    pub password: Mutex<String>,
    pub sign_in_calls: AtomicUsize,
    pub change_calls: AtomicUsize,
    pub fail_change: AtomicBool,
}

impl FakeAuth {
    pub fn signed_in(user: AuthUser, password: &str) -> Self {
        FakeAuth {
            user: Mutex::new(Some(user)),
            password: Mutex::new(password.to_string()),
            sign_in_calls: AtomicUsize::new(0),
            change_calls: AtomicUsize::new(0),
            fail_change: AtomicBool::new(false),
        }
    }

    pub fn signed_out() -> Self {
        FakeAuth {
            user: Mutex::new(None),
            password: Mutex::new(String::new()),
            sign_in_calls: AtomicUsize::new(0),
            change_calls: AtomicUsize::new(0),
            fail_change: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn get_user(&self, _access_token: &str) -> Result<Option<AuthUser>, anyhow::Error> {
        Ok(self.user.lock().unwrap().clone())
    }

    async fn sign_in(&self, _email: &str, password: &str) -> Result<(), anyhow::Error> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        if *self.password.lock().unwrap() != password {
            bail!("invalid login credentials");
        }
        Ok(())
    }

    async fn change_password(
        &self,
        _access_token: &str,
        new_password: &str,
    ) -> Result<(), anyhow::Error> {
        if self.fail_change.load(Ordering::SeqCst) {
            bail!("backend offline");
        }
        self.change_calls.fetch_add(1, Ordering::SeqCst);
        *self.password.lock().unwrap() = new_password.to_string();
        Ok(())
    }
}
