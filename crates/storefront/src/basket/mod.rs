//! Server-backed basket: read-only view of the signed-in user's basket.
//!
//! Used instead of the local cart when `SENTROBUV_CART_BACKEND=server`. The
//! two are never wired to the same consumers.
//!
//! # Example
//!
//! ```rust,ignore
//! use sentrobuv_storefront::basket::{BasketPoller, BasketSync, CredentialStore};
//!
//! let credentials = CredentialStore::new(storage, &config.token_key);
//! let sync = BasketSync::new(api.basket(), credentials);
//! let poller = BasketPoller::spawn(sync, config.basket_poll_interval);
//!
//! let mut views = poller.subscribe();
//! while views.changed().await.is_ok() {
//!     let view = views.borrow_and_update().clone();
//!     tracing::info!(items = view.item_count(), "Basket updated");
//! }
//! ```

mod credential;
mod poller;
mod sync;

pub use credential::CredentialStore;
pub use poller::BasketPoller;
pub use sync::{BasketStatus, BasketSync, BasketView};
