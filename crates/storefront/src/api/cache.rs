//! Cache types for catalog responses.

use std::sync::Arc;

use sentrobuv_core::{ProductId, ProductSnapshot};

/// Cache key for products.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductSnapshot>),
    Products(Arc<Vec<ProductSnapshot>>),
}
