use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::auth::AuthUser;
use crate::repositories::{AuthProvider, CouponStore, PointsStore, ProfileStore};
use crate::views::profile::{ProfilePage, ProfileView};

pub enum ProfileRequest {
    LoadPage {
        access_token: String,
        response: oneshot::Sender<Result<ProfilePage, ServiceError>>,
    },
    UpdateProfile {
        access_token: String,
        username: String,
        full_name: String,
        phone: Option<String>,
        response: oneshot::Sender<Result<ProfilePage, ServiceError>>,
    },
    ChangePassword {
        access_token: String,
        current_password: String,
        new_password: String,
        confirm_password: String,
        response: oneshot::Sender<Result<ProfilePage, ServiceError>>,
    },
    SetPicture {
        access_token: String,
        data: Vec<u8>,
        content_type: String,
        response: oneshot::Sender<Result<ProfilePage, ServiceError>>,
    },
    RemovePicture {
        access_token: String,
        response: oneshot::Sender<Result<ProfilePage, ServiceError>>,
    },
}

/// One `ProfileView` session per signed-in user.
#[derive(Clone)]
pub struct ProfileRequestHandler {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    points: Arc<dyn PointsStore>,
    coupons: Arc<dyn CouponStore>,
    sessions: Arc<DashMap<String, ProfileView>>,
}

impl ProfileRequestHandler {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        points: Arc<dyn PointsStore>,
        coupons: Arc<dyn CouponStore>,
    ) -> Self {
        ProfileRequestHandler {
            auth,
            profiles,
            points,
            coupons,
            sessions: Arc::new(DashMap::new()),
        }
    }

    async fn identity(&self, access_token: &str) -> Result<AuthUser, ServiceError> {
        match self.auth.get_user(access_token).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(ServiceError::Auth("Not signed in".to_string())),
            Err(e) => Err(ServiceError::Backend(e.to_string())),
        }
    }

    fn new_view(&self, user: AuthUser) -> ProfileView {
        ProfileView::new(
            user,
            self.profiles.clone(),
            self.points.clone(),
            self.coupons.clone(),
            self.auth.clone(),
        )
    }

    /// Loads the page into a fresh view and commits it as the user's session.
    /// Loads carry a generation token: if a newer load committed while this
    /// one was in flight, the stale result is dropped and the fresher session
    /// answers instead.
    async fn load_page(&self, access_token: &str) -> Result<ProfilePage, ServiceError> {
        let user = self.identity(access_token).await?;

        let started = self
            .sessions
            .get(&user.id)
            .map(|view| view.generation())
            .unwrap_or(0);

        let mut view = self.new_view(user.clone());
        view.load(access_token).await;
        view.set_generation(started + 1);

        match self.sessions.entry(user.id) {
            Entry::Occupied(mut entry) => {
                if entry.get().generation() > started {
                    return Ok(entry.get().page());
                }
                entry.insert(view);
                Ok(entry.get().page())
            }
            Entry::Vacant(entry) => {
                let view = entry.insert(view);
                Ok(view.page())
            }
        }
    }

    /// Takes the user's session out of the map, loading one first if the page
    /// was never activated. The caller must put it back.
    async fn take_session(&self, access_token: &str) -> Result<(AuthUser, ProfileView), ServiceError> {
        let user = self.identity(access_token).await?;

        let view = match self.sessions.remove(&user.id) {
            Some((_, view)) => view,
            None => {
                let mut view = self.new_view(user.clone());
                view.load(access_token).await;
                view.set_generation(1);
                view
            }
        };

        Ok((user, view))
    }

    async fn update_profile(
        &self,
        access_token: &str,
        username: String,
        full_name: String,
        phone: Option<String>,
    ) -> Result<ProfilePage, ServiceError> {
        let (user, mut view) = self.take_session(access_token).await?;

        view.begin_edit_profile();
        if let Some(form) = view.profile_form_mut() {
            form.username = username;
            form.full_name = full_name;
            form.phone = phone.unwrap_or_default();
        }
        let result = view.submit_profile().await;

        let page = view.page();
        self.sessions.insert(user.id, view);
        result.map(|_| page)
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: String,
        new_password: String,
        confirm_password: String,
    ) -> Result<ProfilePage, ServiceError> {
        let (user, mut view) = self.take_session(access_token).await?;

        view.begin_edit_password();
        if let Some(form) = view.password_form_mut() {
            form.current = current_password;
            form.new = new_password;
            form.confirm = confirm_password;
        }
        let result = view.submit_password(access_token).await;

        let page = view.page();
        self.sessions.insert(user.id, view);
        result.map(|_| page)
    }

    async fn set_picture(
        &self,
        access_token: &str,
        data: Vec<u8>,
        content_type: String,
    ) -> Result<ProfilePage, ServiceError> {
        let (user, mut view) = self.take_session(access_token).await?;

        let result = view.set_picture(&data, &content_type).await;

        let page = view.page();
        self.sessions.insert(user.id, view);
        result.map(|_| page)
    }

    async fn remove_picture(&self, access_token: &str) -> Result<ProfilePage, ServiceError> {
        let (user, mut view) = self.take_session(access_token).await?;

        let result = view.remove_picture().await;

        let page = view.page();
        self.sessions.insert(user.id, view);
        result.map(|_| page)
    }
}

#[async_trait]
impl RequestHandler<ProfileRequest> for ProfileRequestHandler {
    async fn handle_request(&self, request: ProfileRequest) {
        match request {
            ProfileRequest::LoadPage {
                access_token,
                response,
            } => {
                let page = self.load_page(&access_token).await;
                let _ = response.send(page);
            }
            ProfileRequest::UpdateProfile {
                access_token,
                username,
                full_name,
                phone,
                response,
            } => {
                let page = self
                    .update_profile(&access_token, username, full_name, phone)
                    .await;
                let _ = response.send(page);
            }
            ProfileRequest::ChangePassword {
                access_token,
                current_password,
                new_password,
                confirm_password,
                response,
            } => {
                let page = self
                    .change_password(
                        &access_token,
                        current_password,
                        new_password,
                        confirm_password,
                    )
                    .await;
                let _ = response.send(page);
            }
            ProfileRequest::SetPicture {
                access_token,
                data,
                content_type,
                response,
            } => {
                let page = self.set_picture(&access_token, data, content_type).await;
                let _ = response.send(page);
            }
            ProfileRequest::RemovePicture {
                access_token,
                response,
            } => {
                let page = self.remove_picture(&access_token).await;
                let _ = response.send(page);
            }
        }
    }
}

pub struct ProfileService;

impl ProfileService {
    pub fn new() -> Self {
        ProfileService {}
    }
}

#[async_trait]
impl Service<ProfileRequest, ProfileRequestHandler> for ProfileService {}
