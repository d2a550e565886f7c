//! One refresh of the server basket.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::credential::CredentialStore;
use crate::api::{ApiError, BasketClient, BasketItem};
use crate::error::add_breadcrumb;

/// How the current [`BasketView`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasketStatus {
    /// Nothing fetched yet.
    #[default]
    Pending,
    /// No credential is stored.
    SignedOut,
    /// Items reflect the latest successful fetch.
    Ready,
    /// The last fetch failed; items are from an earlier fetch.
    Stale,
    /// The credential was rejected and cleared; the user must sign in again.
    ReauthenticationRequired,
}

/// Read-only view of the server basket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BasketView {
    pub items: Vec<BasketItem>,
    pub status: BasketStatus,
}

impl BasketView {
    #[must_use]
    pub const fn empty(status: BasketStatus) -> Self {
        Self {
            items: Vec::new(),
            status,
        }
    }

    /// Sum of price times count.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(BasketItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of counts.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.count)).sum()
    }
}

/// Fetches the basket with the stored credential.
#[derive(Clone)]
pub struct BasketSync {
    client: BasketClient,
    credentials: CredentialStore,
}

impl BasketSync {
    #[must_use]
    pub const fn new(client: BasketClient, credentials: CredentialStore) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Credential slot this sync reads.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Fetch the basket with the stored credential.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingCredential` without making a request when no
    /// credential is stored, or the error from the basket endpoint.
    pub async fn fetch(&self) -> Result<Vec<BasketItem>, ApiError> {
        let token = self.credentials.token().ok_or(ApiError::MissingCredential)?;
        self.client.fetch_items(&token).await
    }

    /// Produce the next view from `previous`.
    ///
    /// Without a credential no request is made. A rejected credential is
    /// cleared. Any other failure keeps the previous items.
    pub async fn refresh(&self, previous: &BasketView) -> BasketView {
        match self.fetch().await {
            Ok(items) => BasketView {
                items,
                status: BasketStatus::Ready,
            },
            Err(ApiError::MissingCredential) => {
                debug!("No credential, skipped basket fetch");
                BasketView::empty(BasketStatus::SignedOut)
            }
            Err(ApiError::SessionExpired) => {
                info!("Session expired, clearing stored credential");
                self.credentials.clear();
                add_breadcrumb("basket", "Session expired", None);
                BasketView::empty(BasketStatus::ReauthenticationRequired)
            }
            Err(e) => {
                warn!(error = %e, "Basket refresh failed, keeping last view");
                BasketView {
                    items: previous.items.clone(),
                    status: BasketStatus::Stale,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::ApiClient;
    use crate::storage::MemoryStore;

    fn sync(server: &MockServer, token: Option<&str>) -> BasketSync {
        let storage = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(storage, "token");
        if let Some(token) = token {
            credentials.store(token).unwrap();
        }
        let api = ApiClient::new(server.uri().parse().unwrap(), Duration::from_secs(5)).unwrap();
        BasketSync::new(api.basket(), credentials)
    }

    fn basket_body() -> serde_json::Value {
        json!([{"basketItems": [
            {"id": "i1", "product_id": 1, "count": 2, "price": "1000"},
            {"id": "i2", "product_id": 2, "count": 1, "price": 500}
        ]}])
    }

    #[tokio::test]
    async fn test_signed_out_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(basket_body()))
            .expect(0)
            .mount(&server)
            .await;

        let sync = sync(&server, None);
        assert!(matches!(sync.fetch().await, Err(ApiError::MissingCredential)));
        let view = sync.refresh(&BasketView::default()).await;
        assert_eq!(view, BasketView::empty(BasketStatus::SignedOut));
    }

    #[tokio::test]
    async fn test_ready_view_totals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(basket_body()))
            .mount(&server)
            .await;

        let view = sync(&server, Some("tok")).refresh(&BasketView::default()).await;
        assert_eq!(view.status, BasketStatus::Ready);
        assert_eq!(view.total(), Decimal::from(2500));
        assert_eq!(view.item_count(), 3);
    }

    #[tokio::test]
    async fn test_expired_session_clears_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})),
            )
            .mount(&server)
            .await;

        let sync = sync(&server, Some(r#"{"accessToken":"old"}"#));
        let view = sync.refresh(&BasketView::default()).await;

        assert_eq!(view, BasketView::empty(BasketStatus::ReauthenticationRequired));
        assert!(sync.credentials().token().is_none());
    }

    #[tokio::test]
    async fn test_other_failure_keeps_previous_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(basket_body()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/baskets"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let sync = sync(&server, Some("tok"));
        let first = sync.refresh(&BasketView::default()).await;
        let second = sync.refresh(&first).await;

        assert_eq!(second.status, BasketStatus::Stale);
        assert_eq!(second.items, first.items);
        assert!(sync.credentials().token().is_some());
    }
}
