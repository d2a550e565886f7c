//! Core types for Sentrobuv.
//!
//! This module provides type-safe wrappers for the cart and catalog domain.

pub mod cart;
pub mod credential;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{Cart, LineItem, LineKey, QuantityChange};
pub use credential::AccessToken;
pub use id::*;
pub use price::{MAX_PRICE_UNITS, PriceError, UnitPrice};
pub use product::{ProductImage, ProductSelection, ProductSnapshot};
