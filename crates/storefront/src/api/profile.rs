//! Signed-in user profile endpoint.

use chrono::{DateTime, Utc};
use sentrobuv_core::{AccessToken, UserId};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{ApiClient, ApiError};
use crate::basket::CredentialStore;
use crate::error::add_breadcrumb;

/// Account details of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// First and last name joined, skipping empty parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Client for `/users/profile`.
#[derive(Clone)]
pub struct ProfileClient {
    api: ApiClient,
}

impl ProfileClient {
    pub(super) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get the profile of the user the token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` if the token was rejected, or
    /// another error if the request fails or the payload is not a profile.
    #[instrument(skip_all)]
    pub async fn fetch(&self, token: &AccessToken) -> Result<UserProfile, ApiError> {
        let body = self.api.get_json(&["users", "profile"], Some(token)).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Get the profile with the stored credential.
    ///
    /// A rejected credential is cleared before the error is returned, so the
    /// next call reports `ApiError::MissingCredential`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingCredential` without making a request when no
    /// credential is stored, `ApiError::SessionExpired` after clearing a
    /// rejected one, or the error from the profile endpoint.
    pub async fn fetch_signed_in(
        &self,
        credentials: &CredentialStore,
    ) -> Result<UserProfile, ApiError> {
        let token = credentials.token().ok_or(ApiError::MissingCredential)?;
        match self.fetch(&token).await {
            Err(ApiError::SessionExpired) => {
                info!("Session expired, clearing stored credential");
                credentials.clear();
                add_breadcrumb("profile", "Session expired", None);
                Err(ApiError::SessionExpired)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::storage::MemoryStore;

    fn profile(server: &MockServer) -> ProfileClient {
        ApiClient::new(server.uri().parse().unwrap(), Duration::from_secs(5))
            .unwrap()
            .profile()
    }

    fn credentials(token: Option<&str>) -> CredentialStore {
        let credentials = CredentialStore::new(Arc::new(MemoryStore::new()), "token");
        if let Some(token) = token {
            credentials.store(token).unwrap();
        }
        credentials
    }

    fn profile_body() -> serde_json::Value {
        json!({
            "id": "u1",
            "first_name": "Aziz",
            "last_name": "Karimov",
            "email": "aziz@example.uz",
            "phone_number": "+998901234567",
            "role": "user",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-02T08:30:00.000Z"
        })
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(1)
            .mount(&server)
            .await;

        let user = profile(&server)
            .fetch(&AccessToken::new("tok"))
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new("u1"));
        assert_eq!(user.full_name(), "Aziz Karimov");
        assert_eq!(user.phone_number, "+998901234567");
        assert!(user.created_at.is_some());
    }

    #[tokio::test]
    async fn test_not_a_profile_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = profile(&server)
            .fetch(&AccessToken::new("tok"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_signed_out_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = profile(&server)
            .fetch_signed_in(&credentials(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[tokio::test]
    async fn test_malformed_token_clears_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "jwt malformed"})),
            )
            .mount(&server)
            .await;

        let credentials = credentials(Some(r#"{"tokens":{"accessToken":"bad"}}"#));
        let client = profile(&server);

        let err = client.fetch_signed_in(&credentials).await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(credentials.token().is_none());

        let err = client.fetch_signed_in(&credentials).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[tokio::test]
    async fn test_other_failure_keeps_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;

        let credentials = credentials(Some("tok"));
        let err = profile(&server)
            .fetch_signed_in(&credentials)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert!(credentials.token().is_some());
    }
}
