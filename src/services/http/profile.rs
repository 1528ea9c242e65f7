use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{bearer_token, error_response, AppState};
use crate::services::profile::ProfileRequest;
use crate::services::ServiceError;
use crate::views::profile::ProfilePage;

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub username: String,
    pub full_name: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

async fn run_request(
    request_rx: oneshot::Receiver<Result<ProfilePage, ServiceError>>,
    send_result: Result<(), tokio::sync::mpsc::error::SendError<ProfileRequest>>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "Profile".to_string(),
            e.to_string(),
        ));
    }

    match request_rx.await {
        Ok(Ok(page)) => (StatusCode::OK, Json(json!(page))),
        Ok(Err(error)) => error_response(error),
        Err(e) => error_response(ServiceError::Communication(
            "Profile".to_string(),
            e.to_string(),
        )),
    }
}

pub async fn load_page(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .profile_channel
        .send(ProfileRequest::LoadPage {
            access_token,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateProfileBody>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .profile_channel
        .send(ProfileRequest::UpdateProfile {
            access_token,
            username: body.username,
            full_name: body.full_name,
            phone: body.phone,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordBody>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .profile_channel
        .send(ProfileRequest::ChangePassword {
            access_token,
            current_password: body.current_password,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

/// The image arrives as the raw request body; the Content-Type header carries
/// the mime type baked into the stored data URI.
pub async fn set_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .profile_channel
        .send(ProfileRequest::SetPicture {
            access_token,
            data: body.to_vec(),
            content_type,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn remove_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .profile_channel
        .send(ProfileRequest::RemovePicture {
            access_token,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}
