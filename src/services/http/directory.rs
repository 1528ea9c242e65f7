use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::oneshot;

use super::{bearer_token, error_response, AppState};
use crate::services::directory::DirectoryRequest;
use crate::services::ServiceError;
use crate::views::directory::DirectorySnapshot;

#[derive(Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub term: String,
}

async fn run_request(
    request_rx: oneshot::Receiver<Result<DirectorySnapshot, ServiceError>>,
    send_result: Result<(), tokio::sync::mpsc::error::SendError<DirectoryRequest>>,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Err(e) = send_result {
        return error_response(ServiceError::Communication(
            "Directory".to_string(),
            e.to_string(),
        ));
    }

    match request_rx.await {
        Ok(Ok(snapshot)) => (StatusCode::OK, Json(json!(snapshot))),
        Ok(Err(error)) => error_response(error),
        Err(e) => error_response(ServiceError::Communication(
            "Directory".to_string(),
            e.to_string(),
        )),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .directory_channel
        .send(DirectoryRequest::Load {
            access_token,
            search: params.search,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn filter_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .directory_channel
        .send(DirectoryRequest::Search {
            access_token,
            term: params.term,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn user_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .directory_channel
        .send(DirectoryRequest::OpenDetails {
            access_token,
            user_id,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn user_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .directory_channel
        .send(DirectoryRequest::OpenBookings {
            access_token,
            user_id,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}

pub async fn close_modal(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(access_token) = bearer_token(&headers) else {
        return error_response(ServiceError::Auth("Missing bearer token".to_string()));
    };

    let (response_tx, response_rx) = oneshot::channel();
    let sent = state
        .directory_channel
        .send(DirectoryRequest::CloseModal {
            access_token,
            response: response_tx,
        })
        .await;

    run_request(response_rx, sent).await
}
