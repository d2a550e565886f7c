//! Sentrobuv REST API clients.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` behind an `Arc`, cheap to clone
//! - The API is source of truth for products and server baskets - no sync
//! - Every payload is untyped until normalized into core types
//! - Catalog responses are cached in memory via `moka` (5 minute TTL)
//!
//! # Endpoints
//!
//! - `GET /products` - product listing
//! - `GET /products/{id}` - single product
//! - `GET /baskets` - the signed-in user's baskets (bearer auth)
//! - `GET /users/profile` - the signed-in user's profile (bearer auth)
//!
//! # Example
//!
//! ```rust,ignore
//! use sentrobuv_storefront::api::ApiClient;
//!
//! let api = ApiClient::from_config(&config)?;
//! let products = api.catalog().list_products().await?;
//! let items = api.basket().fetch_items(&token).await?;
//! ```

mod basket;
mod cache;
mod catalog;
mod profile;

pub use basket::{BasketClient, BasketItem};
pub use catalog::CatalogClient;
pub use profile::{ProfileClient, UserProfile};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sentrobuv_core::AccessToken;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::StorefrontConfig;
use cache::{CacheKey, CacheValue};

/// Messages the API uses to signal an unusable bearer token.
const SESSION_EXPIRED_MESSAGES: &[&str] = &["jwt expired", "jwt malformed"];

/// Errors that can occur when calling the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but did not have the expected shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Non-success status with the API's message.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The bearer token expired or was rejected; sign in again.
    #[error("Session expired")]
    SessionExpired,

    /// No credential is stored.
    #[error("No stored credential")]
    MissingCredential,

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        match self.message? {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Array(parts) => Some(
                parts
                    .iter()
                    .map(|p| p.as_str().map_or_else(|| p.to_string(), String::from))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            other => Some(other.to_string()),
        }
    }
}

/// Shared HTTP client for the Sentrobuv API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a client for the API at `base`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self, ApiError> {
        // Url::join replaces the last segment unless the base ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, base, cache }),
        })
    }

    /// Create a client from storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), config.http_timeout)
    }

    /// API origin.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    /// Catalog endpoints. Clients from the same `ApiClient` share one cache.
    #[must_use]
    pub fn catalog(&self) -> CatalogClient {
        CatalogClient::new(self.clone())
    }

    /// Basket endpoints.
    #[must_use]
    pub fn basket(&self) -> BasketClient {
        BasketClient::new(self.clone())
    }

    /// Profile endpoint.
    #[must_use]
    pub fn profile(&self) -> ProfileClient {
        ProfileClient::new(self.clone())
    }

    /// Endpoint URL under the API base. Each segment is percent-encoded, so
    /// ids containing `/`, `?` or `#` stay one segment.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the base cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document from the endpoint at `segments`.
    ///
    /// With a token, `jwt expired` / `jwt malformed` error messages and
    /// `401 Unauthorized` map to `ApiError::SessionExpired`.
    #[instrument(skip(self, token), fields(authenticated = token.is_some()))]
    pub(crate) async fn get_json(
        &self,
        segments: &[&str],
        token: Option<&AccessToken>,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(segments)?;
        let mut request = self.inner.http.get(url);
        if let Some(token) = token {
            request = request.header(reqwest::header::AUTHORIZATION, token.bearer());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::message)
                .unwrap_or_else(|| body.chars().take(200).collect());

            if token.is_some()
                && (status == reqwest::StatusCode::UNAUTHORIZED
                    || SESSION_EXPIRED_MESSAGES.contains(&message.as_str()))
            {
                debug!(%status, %message, "Bearer token rejected");
                return Err(ApiError::SessionExpired);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(segments.join("/")));
            }

            tracing::error!(
                %status,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri().parse().unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_gets_trailing_slash() {
        let api = ApiClient::new(
            "https://api.sentrobuv.uz/v1".parse().unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(api.base().as_str(), "https://api.sentrobuv.uz/v1/");
        assert_eq!(
            api.endpoint(&["products"]).unwrap().as_str(),
            "https://api.sentrobuv.uz/v1/products"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = ApiClient::new(
            "https://api.sentrobuv.uz/v1".parse().unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            api.endpoint(&["products", "a/b?c#d"]).unwrap().as_str(),
            "https://api.sentrobuv.uz/v1/products/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            api.endpoint(&["products", "42"]).unwrap().as_str(),
            "https://api.sentrobuv.uz/v1/products/42"
        );
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server).await;
        let body = api
            .get_json(&["baskets"], Some(&AccessToken::new("abc")))
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_expired_message_maps_to_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "jwt expired"})),
            )
            .mount(&server)
            .await;

        let api = client(&server).await;
        let err = api
            .get_json(&["baskets"], Some(&AccessToken::new("old")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"message": ["db down", "retry"]})),
            )
            .mount(&server)
            .await;

        let api = client(&server).await;
        let err = api.get_json(&["products"], None).await.unwrap_err();
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down; retry");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let api = client(&server).await;
        let err = api.get_json(&["products"], None).await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited(7)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let api = client(&server).await;
        let err = api.get_json(&["products"], None).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
