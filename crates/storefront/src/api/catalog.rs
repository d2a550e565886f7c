//! Catalog endpoints.

use std::sync::Arc;

use sentrobuv_core::{ProductId, ProductSnapshot};
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, ApiError};

/// Client for `/products`.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub(super) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Get every product.
    ///
    /// Entries that cannot be normalized are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an array.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<ProductSnapshot>>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.api.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let body = self.api.get_json(&["products"], None).await?;
        let serde_json::Value::Array(entries) = body else {
            return Err(ApiError::UnexpectedShape(
                "expected an array of products".to_string(),
            ));
        };

        let total = entries.len();
        let products: Vec<ProductSnapshot> = entries
            .into_iter()
            .filter_map(|entry| match ProductSnapshot::from_value(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed product");
                    None
                }
            })
            .collect();

        debug!(total, kept = products.len(), "Fetched products");

        let products = Arc::new(products);
        self.api
            .inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist, or another
    /// error if the request fails or the payload cannot be normalized.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<ProductSnapshot, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        // Check cache
        if let Some(CacheValue::Product(product)) = self.api.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let segment = id.to_path_segment();
        let body = self.api.get_json(&["products", &segment], None).await?;
        let product = ProductSnapshot::from_value(body)?;

        self.api
            .inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get every product, or an empty list if the catalog is unreachable.
    pub async fn products_or_empty(&self) -> Arc<Vec<ProductSnapshot>> {
        match self.list_products().await {
            Ok(products) => products,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch products");
                Arc::default()
            }
        }
    }

    /// Drop every cached catalog response.
    pub fn invalidate(&self) {
        self.api.inner.cache.invalidate_all();
    }
}
