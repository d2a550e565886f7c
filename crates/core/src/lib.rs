//! Sentrobuv Core - Shared cart and catalog types.
//!
//! This crate provides the types used across all Sentrobuv components:
//! - `storefront` - Cart store, storage backends, and API clients
//! - `cli` - Command-line consumer of the cart and catalog
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no HTTP clients. The [`Cart`] aggregate enforces the
//! line-item invariants; persistence and sharing live in the storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Product ids, unit prices, line items, the cart aggregate,
//!   catalog product snapshots, and access tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
