//! Local cart: the store, its shared handle, and the provider scope.
//!
//! # Example
//!
//! ```rust,ignore
//! use sentrobuv_storefront::cart::{CartHandle, CartProvider, use_cart};
//! use sentrobuv_storefront::storage::FileStore;
//!
//! let cart = CartHandle::open(FileStore::open(&config.data_dir)?, config.cart.clone());
//!
//! CartProvider::scope(cart, async {
//!     let cart = use_cart();
//!     cart.add_item(&product, 1, "42", "black")?;
//!     println!("{} items", cart.item_count());
//! }).await;
//! ```

mod provider;
mod store;

pub use provider::{CartHandle, CartProvider, CartSummary, try_use_cart, use_cart};
pub use store::{CartStore, OrderSummary};
