use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::auth::AuthUser;
use crate::repositories::{AuthProvider, BookingStore, ProfileStore};
use crate::views::directory::{DirectorySnapshot, DirectoryView};

pub enum DirectoryRequest {
    /// Page activation: reload everything, optionally with a search term.
    Load {
        access_token: String,
        search: Option<String>,
        response: oneshot::Sender<Result<DirectorySnapshot, ServiceError>>,
    },
    /// Re-filter the already-loaded list without refetching.
    Search {
        access_token: String,
        term: String,
        response: oneshot::Sender<Result<DirectorySnapshot, ServiceError>>,
    },
    OpenDetails {
        access_token: String,
        user_id: String,
        response: oneshot::Sender<Result<DirectorySnapshot, ServiceError>>,
    },
    OpenBookings {
        access_token: String,
        user_id: String,
        response: oneshot::Sender<Result<DirectorySnapshot, ServiceError>>,
    },
    CloseModal {
        access_token: String,
        response: oneshot::Sender<Result<DirectorySnapshot, ServiceError>>,
    },
}

/// One `DirectoryView` session per admin identity.
#[derive(Clone)]
pub struct DirectoryRequestHandler {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    bookings: Arc<dyn BookingStore>,
    sessions: Arc<DashMap<String, DirectoryView>>,
}

impl DirectoryRequestHandler {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        bookings: Arc<dyn BookingStore>,
    ) -> Self {
        DirectoryRequestHandler {
            auth,
            profiles,
            bookings,
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

    async fn fresh_view(&self) -> DirectoryView {
        let mut view = DirectoryView::new(self.profiles.clone(), self.bookings.clone());
        view.load().await;
        view
    }

    /// Takes the caller's session out of the map, loading one first if the
    /// page was never activated. The caller must put it back.
    async fn take_session(&self, user: &AuthUser) -> DirectoryView {
        match self.sessions.remove(&user.id) {
            Some((_, view)) => view,
            None => {
                let mut view = self.fresh_view().await;
                view.set_generation(1);
                view
            }
        }
    }

    /// Loads into a fresh view and commits it as the caller's session. Loads
    /// carry a generation token: if a newer load committed while this one was
    /// in flight, the stale result is dropped and the fresher session answers
    /// instead.
    async fn load(
        &self,
        access_token: &str,
        search: Option<String>,
    ) -> Result<DirectorySnapshot, ServiceError> {
        let user = self.identity(access_token).await?;

        let started = self
            .sessions
            .get(&user.id)
            .map(|view| view.generation())
            .unwrap_or(0);

        let mut view = self.fresh_view().await;
        view.set_generation(started + 1);
        if let Some(term) = search {
            view.set_search(term);
        }

        match self.sessions.entry(user.id) {
            Entry::Occupied(mut entry) => {
                if entry.get().generation() > started {
                    return Ok(entry.get().snapshot());
                }
                entry.insert(view);
                Ok(entry.get().snapshot())
            }
            Entry::Vacant(entry) => {
                let view = entry.insert(view);
                Ok(view.snapshot())
            }
        }
    }

    async fn search(
        &self,
        access_token: &str,
        term: String,
    ) -> Result<DirectorySnapshot, ServiceError> {
        let user = self.identity(access_token).await?;

        let mut view = self.take_session(&user).await;
        view.set_search(term);

        let snapshot = view.snapshot();
        self.sessions.insert(user.id, view);
        Ok(snapshot)
    }

    async fn open_details(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<DirectorySnapshot, ServiceError> {
        let user = self.identity(access_token).await?;

        let mut view = self.take_session(&user).await;
        let result = view.open_details(user_id);

        let snapshot = view.snapshot();
        self.sessions.insert(user.id, view);
        result.map(|_| snapshot)
    }

    async fn open_bookings(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<DirectorySnapshot, ServiceError> {
        let user = self.identity(access_token).await?;

        let mut view = self.take_session(&user).await;
        let result = view.open_bookings(user_id).await;

        let snapshot = view.snapshot();
        self.sessions.insert(user.id, view);
        result.map(|_| snapshot)
    }

    async fn close_modal(&self, access_token: &str) -> Result<DirectorySnapshot, ServiceError> {
        let user = self.identity(access_token).await?;

        let mut view = self.take_session(&user).await;
        view.close_modal();

        let snapshot = view.snapshot();
        self.sessions.insert(user.id, view);
        Ok(snapshot)
    }
}

#[async_trait]
impl RequestHandler<DirectoryRequest> for DirectoryRequestHandler {
    async fn handle_request(&self, request: DirectoryRequest) {
        match request {
            DirectoryRequest::Load {
                access_token,
                search,
                response,
            } => {
                let snapshot = self.load(&access_token, search).await;
                let _ = response.send(snapshot);
            }
            DirectoryRequest::Search {
                access_token,
                term,
                response,
            } => {
                let snapshot = self.search(&access_token, term).await;
                let _ = response.send(snapshot);
            }
            DirectoryRequest::OpenDetails {
                access_token,
                user_id,
                response,
            } => {
                let snapshot = self.open_details(&access_token, &user_id).await;
                let _ = response.send(snapshot);
            }
            DirectoryRequest::OpenBookings {
                access_token,
                user_id,
                response,
            } => {
                let snapshot = self.open_bookings(&access_token, &user_id).await;
                let _ = response.send(snapshot);
            }
            DirectoryRequest::CloseModal {
                access_token,
                response,
            } => {
                let snapshot = self.close_modal(&access_token).await;
                let _ = response.send(snapshot);
            }
        }
    }
}

pub struct DirectoryService;

impl DirectoryService {
    pub fn new() -> Self {
        DirectoryService {}
    }
}

#[async_trait]
impl Service<DirectoryRequest, DirectoryRequestHandler> for DirectoryService {}
