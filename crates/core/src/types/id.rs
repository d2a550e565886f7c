//! Identifier types for catalog and basket entities.
//!
//! Product identifiers arrive from the catalog as either JSON numbers or
//! strings, and the two are never coerced into each other: `1` and `"1"`
//! name different products. Server-side basket records use opaque string
//! identifiers, wrapped with `define_id!` so they cannot be mixed up.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use sentrobuv_core::define_id;
/// define_id!(WishlistId);
/// define_id!(ReviewId);
///
/// let wishlist = WishlistId::new("w-1");
/// let review = ReviewId::new("w-1");
///
/// // These are different types, so this won't compile:
/// // let _: WishlistId = review;
/// # let _ = (wishlist, review);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Server-side basket and account identifiers
define_id!(BasketId);
define_id!(BasketItemId);
define_id!(UserId);

/// Catalog product identifier.
///
/// Serialized untagged so the persisted cart keeps the exact JSON type the
/// catalog sent. Equality is type-strict: `Numeric(1) != Text("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Integer identifier (`"id": 42`).
    Numeric(i64),
    /// String identifier (`"id": "a1b2"`).
    Text(String),
}

impl ProductId {
    /// Create a string identifier.
    #[must_use]
    pub fn text(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// Create a numeric identifier.
    #[must_use]
    pub const fn numeric(id: i64) -> Self {
        Self::Numeric(id)
    }

    /// Path segment used when addressing the product on the catalog API.
    #[must_use]
    pub fn to_path_segment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}
