//! Integration tests for the signed-in profile.
//!
//! The credential sits in a file-backed store next to the cart; the profile
//! endpoint is a mock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use sentrobuv_integration_tests::api_for;
use sentrobuv_storefront::api::ApiError;
use sentrobuv_storefront::basket::CredentialStore;
use sentrobuv_storefront::storage::{FileStore, KeyValueStore};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SIGN_IN_PAYLOAD: &str = r#"{"user":{"id":"u1"},"tokens":{"accessToken":"live-token"}}"#;

#[tokio::test]
async fn test_profile_with_stored_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("Authorization", "Bearer live-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "first_name": "Aziz",
            "last_name": "Karimov",
            "email": "aziz@example.uz",
            "phone_number": "+998901234567",
            "role": "user"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::open(dir.path()).unwrap());
    storage.set("token", SIGN_IN_PAYLOAD).unwrap();

    let user = api_for(&server)
        .profile()
        .fetch_signed_in(&CredentialStore::new(storage, "token"))
        .await
        .unwrap();
    assert_eq!(user.full_name(), "Aziz Karimov");
    assert_eq!(user.created_at, None);
}

#[tokio::test]
async fn test_expired_profile_session_removes_token_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStore::open(dir.path()).unwrap());
    storage.set("token", SIGN_IN_PAYLOAD).unwrap();
    storage.set("cart", "[]").unwrap();

    let err = api_for(&server)
        .profile()
        .fetch_signed_in(&CredentialStore::new(storage.clone(), "token"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(storage.get("token").unwrap(), None);
    assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[]"));
}
