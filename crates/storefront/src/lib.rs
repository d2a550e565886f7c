//! Sentrobuv storefront library.
//!
//! Client-side shopping state for the Sentrobuv shoe shop:
//!
//! - [`cart`] - the local cart store, its shared handle and provider scope
//! - [`storage`] - key-value backends the cart and credential slots live in
//! - [`api`] - catalog and basket HTTP clients
//! - [`basket`] - read-only server basket kept fresh by a poller
//! - [`views`] - display data for cart and catalog consumers
//!
//! Exactly one of [`cart`] and [`basket`] is the authoritative cart for a
//! session, chosen by [`config::CartBackend`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod basket;
pub mod cart;
pub mod config;
pub mod error;
pub mod storage;
pub mod views;

pub use cart::{CartHandle, CartProvider, CartStore, use_cart};
pub use config::{CartBackend, CartSettings, StorefrontConfig};
pub use error::CartError;
