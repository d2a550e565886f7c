//! Shared cart handle and task-scoped provider.
//!
//! Independent consumers (navbar badge, mini-cart, product page, cart page)
//! share one [`CartHandle`]. Every mutation republishes a [`CartSummary`] on
//! a `watch` channel so subscribers see the same state the store persisted.
//!
//! [`CartProvider::scope`] installs a handle as task-local context for the
//! duration of a future; [`use_cart`] fetches it from inside. Calling
//! `use_cart` outside any scope is a wiring bug and panics. Task-locals do
//! not cross `tokio::spawn`; pass the handle explicitly to spawned tasks.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use sentrobuv_core::{Cart, LineItem, LineKey, ProductSnapshot, QuantityChange};
use tokio::sync::watch;

use super::store::{CartStore, OrderSummary};
use crate::config::CartSettings;
use crate::error::Result;
use crate::storage::KeyValueStore;

/// Snapshot published to cart subscribers after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSummary {
    pub lines: Vec<LineItem>,
    pub total: Decimal,
    pub item_count: u64,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

type DynCartStore = CartStore<Box<dyn KeyValueStore>>;

/// Cloneable handle to one shared cart store.
#[derive(Clone)]
pub struct CartHandle {
    inner: Arc<CartHandleInner>,
}

struct CartHandleInner {
    store: Mutex<DynCartStore>,
    summary: watch::Sender<CartSummary>,
}

impl CartHandle {
    /// Open a cart store over `storage` and wrap it in a handle.
    #[must_use]
    pub fn open(storage: impl KeyValueStore + 'static, settings: CartSettings) -> Self {
        let storage: Box<dyn KeyValueStore> = Box::new(storage);
        Self::new(CartStore::open(storage, settings))
    }

    /// Wrap an already-open store.
    #[must_use]
    pub fn new(store: DynCartStore) -> Self {
        let (summary, _) = watch::channel(CartSummary::from(store.cart()));
        Self {
            inner: Arc::new(CartHandleInner {
                store: Mutex::new(store),
                summary,
            }),
        }
    }

    // A panic while holding the lock cannot leave the cart half-updated:
    // every `Cart` mutation is a single assignment, push or remove.
    fn lock(&self) -> MutexGuard<'_, DynCartStore> {
        self.inner
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Publishes while still holding the store lock so summaries go out in
    // the order the mutations were applied.
    fn mutate<R>(&self, op: impl FnOnce(&mut DynCartStore) -> R) -> R {
        let mut store = self.lock();
        let result = op(&mut store);
        let summary = CartSummary::from(store.cart());
        self.inner.summary.send_if_modified(|current| {
            if *current == summary {
                false
            } else {
                *current = summary;
                true
            }
        });
        drop(store);
        result
    }

    /// See [`CartStore::add_item`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the quantity or price is invalid.
    pub fn add_item(
        &self,
        product: &ProductSnapshot,
        quantity: i64,
        size: &str,
        color: &str,
    ) -> Result<()> {
        self.mutate(|store| store.add_item(product, quantity, size, color))
    }

    /// See [`CartStore::update_quantity`].
    pub fn update_quantity(&self, key: &LineKey, change: QuantityChange) {
        self.mutate(|store| store.update_quantity(key, change));
    }

    /// See [`CartStore::remove_item`].
    pub fn remove_item(&self, key: &LineKey) {
        self.mutate(|store| store.remove_item(key));
    }

    /// See [`CartStore::clear_cart`].
    pub fn clear_cart(&self) {
        self.mutate(CartStore::clear_cart);
    }

    /// See [`CartStore::checkout`].
    #[must_use]
    pub fn checkout(&self) -> Option<OrderSummary> {
        self.mutate(CartStore::checkout)
    }

    /// Sum of unit price times quantity, computed from the current cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().total()
    }

    /// Sum of quantities, computed from the current cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }

    /// Copy of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<LineItem> {
        self.lock().lines().to_vec()
    }

    /// Copy of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.lock().cart().clone()
    }

    /// Whether mutations are still being written to storage.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.lock().is_durable()
    }

    /// Latest published summary.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.inner.summary.borrow().clone()
    }

    /// Subscribe to summaries published after each change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.inner.summary.subscribe()
    }
}

tokio::task_local! {
    static CURRENT_CART: CartHandle;
}

/// Installs a [`CartHandle`] as the cart for a unit of work.
pub struct CartProvider;

impl CartProvider {
    /// Run `future` with `handle` available through [`use_cart`].
    pub async fn scope<F: Future>(handle: CartHandle, future: F) -> F::Output {
        CURRENT_CART.scope(handle, future).await
    }

    /// Run `f` synchronously with `handle` available through [`use_cart`].
    pub fn sync_scope<R>(handle: CartHandle, f: impl FnOnce() -> R) -> R {
        CURRENT_CART.sync_scope(handle, f)
    }
}

/// The cart of the enclosing [`CartProvider`] scope.
///
/// # Panics
///
/// Panics when called outside a provider scope.
#[must_use]
#[track_caller]
pub fn use_cart() -> CartHandle {
    match try_use_cart() {
        Some(handle) => handle,
        None => panic!("use_cart must be called within a CartProvider scope"),
    }
}

/// The cart of the enclosing [`CartProvider`] scope, if any.
#[must_use]
pub fn try_use_cart() -> Option<CartHandle> {
    CURRENT_CART.try_with(Clone::clone).ok()
}
