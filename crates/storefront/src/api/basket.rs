//! Server basket endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sentrobuv_core::{AccessToken, BasketId, BasketItemId, ProductId, ProductSnapshot, UnitPrice};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{ApiClient, ApiError};

/// A line in the signed-in user's server basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketItem {
    pub id: BasketItemId,
    #[serde(default)]
    pub basket_id: Option<BasketId>,
    pub product_id: ProductId,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub count: u32,
    pub price: UnitPrice,
    #[serde(default)]
    pub product: Option<ProductSnapshot>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BasketItem {
    /// Unit price times count.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.count)
    }

    /// Product name when the server embedded the product.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.product.as_ref().map(|p| p.name.as_str())
    }
}

/// Client for `/baskets`.
#[derive(Clone)]
pub struct BasketClient {
    api: ApiClient,
}

impl BasketClient {
    pub(super) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get the items of the user's first basket.
    ///
    /// Returns an empty list when the user has no basket. Items that cannot
    /// be normalized are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` if the token was rejected, or
    /// another error if the request fails.
    #[instrument(skip_all)]
    pub async fn fetch_items(&self, token: &AccessToken) -> Result<Vec<BasketItem>, ApiError> {
        let body = self.api.get_json(&["baskets"], Some(token)).await?;

        let raw_items = match body {
            serde_json::Value::Array(baskets) => baskets
                .into_iter()
                .next()
                .and_then(|mut basket| basket.get_mut("basketItems").map(serde_json::Value::take)),
            _ => {
                return Err(ApiError::UnexpectedShape(
                    "expected an array of baskets".to_string(),
                ));
            }
        };

        let Some(serde_json::Value::Array(raw_items)) = raw_items else {
            debug!("No basket items");
            return Ok(Vec::new());
        };

        let items: Vec<BasketItem> = raw_items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<BasketItem>(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed basket item");
                    None
                }
            })
            .collect();

        debug!(count = items.len(), "Fetched basket items");
        Ok(items)
    }
}
