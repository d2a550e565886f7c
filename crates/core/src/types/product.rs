//! Catalog product payloads.
//!
//! The catalog API is untyped from the cart's point of view: prices can be
//! strings, option lists can be `null`, images can be missing. A
//! [`ProductSnapshot`] accepts all of that leniently and leaves price
//! validation to the point where a product enters the cart.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::{PriceError, UnitPrice};

/// An image attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Path relative to the API origin (e.g. `uploads/abc.jpg`).
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: Option<String>,
}

/// A product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Raw price; see [`ProductSnapshot::unit_price`].
    #[serde(default)]
    pub price: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
    #[serde(default, rename = "size", deserialize_with = "null_as_default")]
    pub sizes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_images: Vec<ProductImage>,
}

impl ProductSnapshot {
    /// Decode a raw catalog payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object or has no usable `id`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Normalized unit price.
    ///
    /// # Errors
    ///
    /// Returns a `PriceError` if the raw price is missing, non-numeric or
    /// negative.
    pub fn unit_price(&self) -> Result<UnitPrice, PriceError> {
        UnitPrice::from_value(&self.price)
    }

    /// Path of the first image, if it has one.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.product_images
            .first()
            .and_then(|img| img.image.as_deref())
            .filter(|path| !path.trim().is_empty())
    }
}

/// A shopper's pending choice on a product page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSelection {
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

impl ProductSelection {
    /// First offered size and color (empty when none are offered), quantity 1.
    #[must_use]
    pub fn defaults(product: &ProductSnapshot) -> Self {
        Self {
            size: product.sizes.first().cloned().unwrap_or_default(),
            color: product.colors.first().cloned().unwrap_or_default(),
            quantity: 1,
        }
    }
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
