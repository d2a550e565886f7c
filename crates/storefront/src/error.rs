//! Cart error types with Sentry breadcrumbs.
//!
//! Cart operations never fail past the store boundary for storage problems;
//! only input validation is reported to callers as a [`CartError`]. Storage
//! faults are logged and recorded as Sentry breadcrumbs so they show up in
//! the trail of any later error report.

use sentrobuv_core::PriceError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors reported by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity was zero, negative, or too large to hold.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The product price could not be normalized.
    #[error("Invalid price for product {product}: {source}")]
    InvalidPrice {
        product: String,
        #[source]
        source: PriceError,
    },

    /// The cart could not be serialized for storage.
    #[error("Failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    /// Whether the error came from caller input (as opposed to the store).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidQuantity(_) | Self::InvalidPrice { .. })
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error. Without an initialized Sentry client this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
