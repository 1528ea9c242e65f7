mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use lounge_dashboard::models::profiles::{NewProfile, ProfileUpdate, UserProfile};
use lounge_dashboard::repositories::ProfileStore;
use lounge_dashboard::services::directory::{DirectoryRequest, DirectoryRequestHandler};
use lounge_dashboard::services::{RequestHandler, ServiceError};
use tokio::sync::{oneshot, Notify};

#[tokio::test]
async fn missing_identity_is_an_auth_error() {
    let handler = DirectoryRequestHandler::new(
        Arc::new(FakeAuth::signed_out()),
        Arc::new(FakeProfileStore::empty()),
        Arc::new(FakeBookingStore::default()),
    );

    let (response_tx, response_rx) = oneshot::channel();
    handler
        .handle_request(DirectoryRequest::Load {
            access_token: "stale-token".to_string(),
            search: None,
            response: response_tx,
        })
        .await;

    let result = response_rx.await.unwrap();
    assert!(matches!(result, Err(ServiceError::Auth(_))));
}

#[tokio::test]
async fn search_reuses_the_loaded_session_without_refetching() {
    let bookings = Arc::new(FakeBookingStore::default());
    let handler = DirectoryRequestHandler::new(
        Arc::new(FakeAuth::signed_in(
            auth_user("u-admin", "admin@example.com"),
            "pw",
        )),
        Arc::new(FakeProfileStore::with_profiles(vec![
            profile("nova", "Nova Lee"),
            profile("kai", "Kai Moreno"),
        ])),
        bookings.clone(),
    );

    let (response_tx, response_rx) = oneshot::channel();
    handler
        .handle_request(DirectoryRequest::Load {
            access_token: "tok".to_string(),
            search: None,
            response: response_tx,
        })
        .await;
    assert_eq!(response_rx.await.unwrap().unwrap().total, 2);
    assert_eq!(bookings.all_calls.load(Ordering::SeqCst), 1);

    let (response_tx, response_rx) = oneshot::channel();
    handler
        .handle_request(DirectoryRequest::Search {
            access_token: "tok".to_string(),
            term: "nova".to_string(),
            response: response_tx,
        })
        .await;

    let snapshot = response_rx.await.unwrap().unwrap();
    assert_eq!(snapshot.total, 1);
    assert_eq!(snapshot.users[0].profile.username, "nova");
    assert_eq!(bookings.all_calls.load(Ordering::SeqCst), 1);
}

/// Blocks the first full fetch until released and returns a shorter list for
/// it, so a slow first load can be made to finish after a later one.
struct GatedProfileStore {
    calls: AtomicUsize,
    release: Notify,
}

impl GatedProfileStore {
    fn new() -> Self {
        GatedProfileStore {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl ProfileStore for GatedProfileStore {
    async fn get_all(&self) -> Result<Vec<UserProfile>, anyhow::Error> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.release.notified().await;
            return Ok(vec![profile("nova", "Nova Lee")]);
        }
        Ok(vec![profile("nova", "Nova Lee"), profile("kai", "Kai Moreno")])
    }

    async fn get(&self, _user_id: &str) -> Result<Option<UserProfile>, anyhow::Error> {
        Ok(None)
    }

    async fn create(&self, profile: NewProfile) -> Result<UserProfile, anyhow::Error> {
        Ok(UserProfile {
            id: format!("p-{}", profile.username),
            user_id: profile.user_id,
            username: profile.username,
            full_name: profile.full_name,
            phone: profile.phone,
            profile_pic_url: None,
            referral_code: None,
            created_at: chrono::Utc::now(),
        })
    }

    async fn update(&self, _user_id: &str, _update: ProfileUpdate) -> Result<(), anyhow::Error> {
        Ok(())
    }

    async fn check_username(&self, _username: &str) -> Result<bool, anyhow::Error> {
        Ok(true)
    }
}

#[tokio::test]
async fn stale_load_does_not_overwrite_a_newer_session() {
    let profiles = Arc::new(GatedProfileStore::new());
    let handler = DirectoryRequestHandler::new(
        Arc::new(FakeAuth::signed_in(
            auth_user("u-admin", "admin@example.com"),
            "pw",
        )),
        profiles.clone(),
        Arc::new(FakeBookingStore::default()),
    );

    // First load blocks inside the profile fetch.
    let slow_handler = handler.clone();
    let (slow_tx, slow_rx) = oneshot::channel();
    tokio::spawn(async move {
        slow_handler
            .handle_request(DirectoryRequest::Load {
                access_token: "tok".to_string(),
                search: None,
                response: slow_tx,
            })
            .await;
    });
    while profiles.calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // A second load completes and commits while the first is still in flight.
    let (fast_tx, fast_rx) = oneshot::channel();
    handler
        .handle_request(DirectoryRequest::Load {
            access_token: "tok".to_string(),
            search: None,
            response: fast_tx,
        })
        .await;
    assert_eq!(fast_rx.await.unwrap().unwrap().total, 2);

    // The released first load answers from the fresher committed session
    // instead of clobbering it with its single-profile result.
    profiles.release.notify_one();
    let snapshot = slow_rx.await.unwrap().unwrap();
    assert_eq!(snapshot.total, 2);

    let (response_tx, response_rx) = oneshot::channel();
    handler
        .handle_request(DirectoryRequest::Search {
            access_token: "tok".to_string(),
            term: String::new(),
            response: response_tx,
        })
        .await;
    assert_eq!(response_rx.await.unwrap().unwrap().total, 2);
}
