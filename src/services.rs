use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::repositories::{
    auth::AuthApi, bookings::BookingRepository, coupons::CouponApi, points::PointsRepository,
    profiles::ProfileRepository, AuthProvider, BookingStore, CouponStore, PointsStore,
    ProfileStore,
};
use crate::settings::Settings;

pub mod directory;
pub mod http;
pub mod profile;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("Communication error: {0} - {1}")]
    Communication(String, String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(settings: Settings) -> Result<(), anyhow::Error> {
    let (directory_tx, mut directory_rx) = mpsc::channel(512);
    let (profile_tx, mut profile_rx) = mpsc::channel(512);

    let auth: Arc<dyn AuthProvider> = Arc::new(AuthApi::new(
        settings.backend.url.clone(),
        settings.backend.api_key.clone(),
    ));
    let profiles: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(
        settings.backend.url.clone(),
        settings.backend.api_key.clone(),
    ));
    let bookings: Arc<dyn BookingStore> = Arc::new(BookingRepository::new(
        settings.backend.url.clone(),
        settings.backend.api_key.clone(),
    ));
    let points: Arc<dyn PointsStore> = Arc::new(PointsRepository::new(
        settings.backend.url.clone(),
        settings.backend.api_key.clone(),
    ));
    let coupons: Arc<dyn CouponStore> = Arc::new(CouponApi::new(settings.coupons.url.clone()));

    let mut directory_service = directory::DirectoryService::new();
    let mut profile_service = profile::ProfileService::new();

    log::info!("Starting directory service.");
    let directory_auth = auth.clone();
    let directory_profiles = profiles.clone();
    let directory_bookings = bookings.clone();
    tokio::spawn(async move {
        directory_service
            .run(
                directory::DirectoryRequestHandler::new(
                    directory_auth,
                    directory_profiles,
                    directory_bookings,
                ),
                &mut directory_rx,
            )
            .await;
    });

    log::info!("Starting profile service.");
    tokio::spawn(async move {
        profile_service
            .run(
                profile::ProfileRequestHandler::new(auth, profiles, points, coupons),
                &mut profile_rx,
            )
            .await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(&settings.http.bind, directory_tx, profile_tx).await
}
