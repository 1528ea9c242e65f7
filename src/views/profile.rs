use std::sync::Arc;

use serde::Serialize;

use crate::models::auth::AuthUser;
use crate::models::coupons::Coupon;
use crate::models::points::{self, PointsTransaction};
use crate::models::profiles::{NewProfile, ProfileUpdate, UserProfile};
use crate::repositories::{AuthProvider, CouponStore, PointsStore, ProfileStore};
use crate::services::ServiceError;
use crate::utils;

const RECENT_HISTORY_LEN: usize = 5;

#[derive(Clone, Debug, Default)]
pub struct ProfileForm {
    pub username: String,
    pub full_name: String,
    pub phone: String,
    /// Set once a profile exists; the username field is then display-only.
    pub username_locked: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PasswordForm {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

/// The page is always in exactly one mode; a profile form and a password form
/// can never be open at the same time.
#[derive(Clone, Debug)]
pub enum ProfileMode {
    Viewing,
    EditingProfile(ProfileForm),
    EditingPassword(PasswordForm),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Error(String),
}

pub fn validate_profile_form(form: &ProfileForm) -> Result<(), String> {
    if form.username.trim().is_empty() || form.full_name.trim().is_empty() {
        return Err("Username and full name are required".to_string());
    }
    Ok(())
}

pub fn validate_password_form(form: &PasswordForm) -> Result<(), String> {
    if form.current.is_empty() || form.new.is_empty() || form.confirm.is_empty() {
        return Err("All password fields are required".to_string());
    }
    if form.new != form.confirm {
        return Err("New passwords do not match".to_string());
    }
    if form.new.chars().count() < 6 {
        return Err("New password must be at least 6 characters".to_string());
    }
    Ok(())
}

#[derive(Serialize)]
pub struct CouponEntry {
    #[serde(flatten)]
    pub coupon: Coupon,
    pub available: bool,
}

/// Serializable shape of the page, handed back to the browser.
#[derive(Serialize)]
pub struct ProfilePage {
    pub email: String,
    pub profile: Option<UserProfile>,
    pub referral_code: Option<String>,
    pub points_balance: i64,
    pub redemption_value: f64,
    pub points_history: Vec<PointsTransaction>,
    pub coupons: Vec<CouponEntry>,
    pub editing: &'static str,
    pub notice: Option<Notice>,
}

/// The profile & settings page for one signed-in user.
pub struct ProfileView {
    user: AuthUser,
    profile: Option<UserProfile>,
    referral_code: Option<String>,
    points_balance: i64,
    points_history: Vec<PointsTransaction>,
    coupons: Vec<Coupon>,
    mode: ProfileMode,
    notice: Option<Notice>,
    generation: u64,
    profiles: Arc<dyn ProfileStore>,
    points: Arc<dyn PointsStore>,
    coupon_api: Arc<dyn CouponStore>,
    auth: Arc<dyn AuthProvider>,
}

impl ProfileView {
    pub fn new(
        user: AuthUser,
        profiles: Arc<dyn ProfileStore>,
        points: Arc<dyn PointsStore>,
        coupon_api: Arc<dyn CouponStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            user,
            profile: None,
            referral_code: None,
            points_balance: 0,
            points_history: Vec::new(),
            coupons: Vec::new(),
            mode: ProfileMode::Viewing,
            notice: None,
            generation: 0,
            profiles,
            points,
            coupon_api,
            auth,
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn referral_code(&self) -> Option<&str> {
        self.referral_code.as_deref()
    }

    pub fn points_balance(&self) -> i64 {
        self.points_balance
    }

    pub fn points_history(&self) -> &[PointsTransaction] {
        &self.points_history
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn mode(&self) -> &ProfileMode {
        &self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    /// Fetches profile, points balance, points history, and coupons in
    /// parallel. Each arm fails independently: a failed fetch is logged and
    /// leaves that section at its default without blocking the others.
    pub async fn load(&mut self, access_token: &str) {
        let user_id = self.user.id.clone();
        let (profile, balance, history, coupons) = tokio::join!(
            self.profiles.get(&user_id),
            self.points.get_balance(&user_id),
            self.points.get_history(&user_id),
            self.coupon_api.my_coupons(access_token),
        );

        match profile {
            Ok(profile) => {
                self.referral_code = profile.as_ref().and_then(|p| p.referral_code.clone());
                self.profile = profile;
            }
            Err(e) => log::warn!("Error loading profile: {e}"),
        }

        match balance {
            Ok(balance) => self.points_balance = balance.points_balance,
            Err(e) => log::warn!("Error loading points balance: {e}"),
        }

        match history {
            Ok(mut history) => {
                history.truncate(RECENT_HISTORY_LEN);
                self.points_history = history;
            }
            Err(e) => log::warn!("Error loading points history: {e}"),
        }

        match coupons {
            Ok(coupons) => self.coupons = coupons,
            Err(e) => log::warn!("Failed to fetch coupons: {e}"),
        }
    }

    pub fn begin_edit_profile(&mut self) {
        let form = match &self.profile {
            Some(profile) => ProfileForm {
                username: profile.username.clone(),
                full_name: profile.full_name.clone(),
                phone: profile.phone.clone().unwrap_or_default(),
                username_locked: true,
            },
            None => ProfileForm::default(),
        };
        self.mode = ProfileMode::EditingProfile(form);
    }

    pub fn begin_edit_password(&mut self) {
        self.mode = ProfileMode::EditingPassword(PasswordForm::default());
    }

    pub fn cancel_edit(&mut self) {
        self.mode = ProfileMode::Viewing;
    }

    pub fn profile_form(&self) -> Option<&ProfileForm> {
        match &self.mode {
            ProfileMode::EditingProfile(form) => Some(form),
            _ => None,
        }
    }

    pub fn profile_form_mut(&mut self) -> Option<&mut ProfileForm> {
        match &mut self.mode {
            ProfileMode::EditingProfile(form) => Some(form),
            _ => None,
        }
    }

    pub fn password_form_mut(&mut self) -> Option<&mut PasswordForm> {
        match &mut self.mode {
            ProfileMode::EditingPassword(form) => Some(form),
            _ => None,
        }
    }

    /// Validates the open profile form, gates a new or changed username on a
    /// remote availability check, then creates or patches the record and
    /// refreshes local state. A conflict aborts without writing.
    pub async fn submit_profile(&mut self) -> Result<(), ServiceError> {
        let form = match &self.mode {
            ProfileMode::EditingProfile(form) => form.clone(),
            _ => return Err(ServiceError::Validation("No profile form is open".to_string())),
        };

        if let Err(msg) = validate_profile_form(&form) {
            self.notice = Some(Notice::Error(msg.clone()));
            return Err(ServiceError::Validation(msg));
        }

        let needs_check = match &self.profile {
            None => true,
            Some(existing) => existing.username != form.username,
        };
        if needs_check {
            let available = match self.profiles.check_username(&form.username).await {
                Ok(available) => available,
                Err(e) => {
                    self.notice = Some(Notice::Error("Failed to update profile".to_string()));
                    return Err(ServiceError::Backend(e.to_string()));
                }
            };
            if !available {
                let msg = "Username is already taken".to_string();
                self.notice = Some(Notice::Error(msg.clone()));
                return Err(ServiceError::Conflict(msg));
            }
        }

        let phone = if form.phone.trim().is_empty() {
            None
        } else {
            Some(form.phone.clone())
        };

        let write = match &self.profile {
            Some(_) => {
                self.profiles
                    .update(
                        &self.user.id,
                        ProfileUpdate {
                            username: Some(form.username.clone()),
                            full_name: Some(form.full_name.clone()),
                            phone,
                            ..Default::default()
                        },
                    )
                    .await
            }
            None => self
                .profiles
                .create(NewProfile {
                    user_id: self.user.id.clone(),
                    username: form.username.clone(),
                    full_name: form.full_name.clone(),
                    phone,
                })
                .await
                .map(|_| ()),
        };
        if let Err(e) = write {
            self.notice = Some(Notice::Error("Failed to update profile".to_string()));
            return Err(ServiceError::Backend(e.to_string()));
        }

        match self.profiles.get(&self.user.id).await {
            Ok(profile) => {
                self.referral_code = profile.as_ref().and_then(|p| p.referral_code.clone());
                self.profile = profile;
            }
            Err(e) => log::warn!("Error refreshing profile: {e}"),
        }

        self.mode = ProfileMode::Viewing;
        self.notice = Some(Notice::Success("Profile updated successfully!".to_string()));
        Ok(())
    }

    /// Checks the password form locally, then verifies the current password
    /// with a fresh sign-in before calling the change endpoint. The sign-in
    /// intentionally produces an extra authentication event on the backend.
    pub async fn submit_password(&mut self, access_token: &str) -> Result<(), ServiceError> {
        let form = match &self.mode {
            ProfileMode::EditingPassword(form) => form.clone(),
            _ => {
                return Err(ServiceError::Validation(
                    "No password form is open".to_string(),
                ))
            }
        };

        if let Err(msg) = validate_password_form(&form) {
            self.notice = Some(Notice::Error(msg.clone()));
            return Err(ServiceError::Validation(msg));
        }

        if self
            .auth
            .sign_in(&self.user.email, &form.current)
            .await
            .is_err()
        {
            let msg = "Current password is incorrect".to_string();
            self.notice = Some(Notice::Error(msg.clone()));
            return Err(ServiceError::Auth(msg));
        }

        if let Err(e) = self.auth.change_password(access_token, &form.new).await {
            self.notice = Some(Notice::Error("Failed to change password".to_string()));
            return Err(ServiceError::Backend(e.to_string()));
        }

        self.mode = ProfileMode::Viewing;
        self.notice = Some(Notice::Success("Password changed successfully!".to_string()));
        Ok(())
    }

    /// Encodes the image wholly in memory as a data URI and stores the encoded
    /// string directly in the profile record.
    pub async fn set_picture(&mut self, data: &[u8], content_type: &str) -> Result<(), ServiceError> {
        let data_uri = utils::encode_image_data_uri(data, content_type);

        let update = ProfileUpdate {
            profile_pic_url: Some(data_uri.clone()),
            ..Default::default()
        };
        if let Err(e) = self.profiles.update(&self.user.id, update).await {
            self.notice = Some(Notice::Error(
                "Failed to update profile picture".to_string(),
            ));
            return Err(ServiceError::Backend(e.to_string()));
        }

        if let Some(profile) = &mut self.profile {
            profile.profile_pic_url = Some(data_uri);
        }
        self.notice = Some(Notice::Success("Profile picture updated!".to_string()));
        Ok(())
    }

    pub async fn remove_picture(&mut self) -> Result<(), ServiceError> {
        let update = ProfileUpdate {
            profile_pic_url: Some(String::new()),
            ..Default::default()
        };
        if let Err(e) = self.profiles.update(&self.user.id, update).await {
            self.notice = Some(Notice::Error("Failed to remove image".to_string()));
            return Err(ServiceError::Backend(e.to_string()));
        }

        if let Some(profile) = &mut self.profile {
            profile.profile_pic_url = None;
        }
        self.notice = Some(Notice::Success("Profile picture removed!".to_string()));
        Ok(())
    }

    pub fn page(&self) -> ProfilePage {
        ProfilePage {
            email: self.user.email.clone(),
            profile: self.profile.clone(),
            referral_code: self.referral_code.clone(),
            points_balance: self.points_balance,
            redemption_value: points::redemption_value(self.points_balance),
            points_history: self.points_history.clone(),
            coupons: self
                .coupons
                .iter()
                .map(|coupon| CouponEntry {
                    available: coupon.is_available(),
                    coupon: coupon.clone(),
                })
                .collect(),
            editing: match self.mode {
                ProfileMode::Viewing => "viewing",
                ProfileMode::EditingProfile(_) => "profile",
                ProfileMode::EditingPassword(_) => "password",
            },
            notice: self.notice.clone(),
        }
    }
}
