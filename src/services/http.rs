use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use super::directory::DirectoryRequest;
use super::profile::ProfileRequest;
use super::ServiceError;

mod directory;
mod profile;

#[derive(Clone)]
struct AppState {
    directory_channel: mpsc::Sender<DirectoryRequest>,
    profile_channel: mpsc::Sender<ProfileRequest>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

fn error_response(error: ServiceError) -> (StatusCode, Json<serde_json::Value>) {
    match error {
        ServiceError::Auth(message) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": message, "redirect": "/auth"})),
        ),
        ServiceError::Validation(message) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": message})),
        ),
        ServiceError::Conflict(message) => (StatusCode::CONFLICT, Json(json!({"error": message}))),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": other.to_string()})),
        ),
    }
}

pub async fn start_http_server(
    bind: &str,
    directory_channel: mpsc::Sender<DirectoryRequest>,
    profile_channel: mpsc::Sender<ProfileRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        directory_channel,
        profile_channel,
    };

    let app = Router::new()
        .route("/api/admin/users", get(directory::list_users))
        .route("/api/admin/users/filter", get(directory::filter_users))
        .route("/api/admin/users/{user_id}", get(directory::user_details))
        .route(
            "/api/admin/users/{user_id}/bookings",
            get(directory::user_bookings),
        )
        .route("/api/admin/modal/close", post(directory::close_modal))
        .route(
            "/api/profile",
            get(profile::load_page).put(profile::update_profile),
        )
        .route("/api/profile/password", post(profile::change_password))
        .route(
            "/api/profile/picture",
            put(profile::set_picture).delete(profile::remove_picture),
        )
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
