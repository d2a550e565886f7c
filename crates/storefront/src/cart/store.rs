//! The cart store: an in-memory [`Cart`] mirrored to one storage slot.

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use sentrobuv_core::{Cart, LineItem, LineKey, ProductSnapshot, QuantityChange};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CartSettings;
use crate::error::{CartError, Result, add_breadcrumb};
use crate::storage::KeyValueStore;

/// Lines and totals captured when a cart is checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub lines: Vec<LineItem>,
    pub total: Decimal,
    pub item_count: u64,
}

/// Single source of truth for the in-progress order.
///
/// Every mutation that changes the cart is followed by a full write of the
/// cart to the storage slot. A failed write is logged and switches the store
/// to in-memory operation for the rest of its life; the in-memory cart is
/// never rolled back.
pub struct CartStore<S> {
    storage: S,
    settings: CartSettings,
    cart: Cart,
    durable: bool,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the store, rehydrating from the storage slot.
    ///
    /// An absent slot yields an empty cart. A slot that cannot be read or
    /// does not hold a valid cart array is logged and also yields an empty
    /// cart; this never fails.
    pub fn open(storage: S, settings: CartSettings) -> Self {
        let key = settings.storage_key.as_str();
        let (cart, durable) = match storage.get(key) {
            Ok(Some(raw)) => (decode_snapshot(key, &raw), true),
            Ok(None) => {
                debug!(key, "No saved cart, starting empty");
                (Cart::new(), true)
            }
            Err(e) => {
                error!(key, error = %e, "Cart storage unreadable, continuing in memory only");
                (Cart::new(), false)
            }
        };

        Self {
            storage,
            settings,
            cart,
            durable,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        self.cart.lines()
    }

    /// Whether mutations are still being written to storage.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        self.durable
    }

    /// Settings the store was opened with.
    #[must_use]
    pub const fn settings(&self) -> &CartSettings {
        &self.settings
    }

    /// Add `quantity` units of a product in the given size and color.
    ///
    /// Merges into the existing line for the same product, size and color,
    /// or appends a new line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity` is not positive and
    /// `CartError::InvalidPrice` if the product price does not normalize. The
    /// cart is unchanged in both cases.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: i64,
        size: &str,
        color: &str,
    ) -> Result<()> {
        let Some(quantity) = u32::try_from(quantity).ok().and_then(NonZeroU32::new) else {
            warn!(quantity, "Rejected add with non-positive quantity");
            return Err(CartError::InvalidQuantity(quantity));
        };

        let price = product.unit_price().map_err(|source| {
            warn!(price = %product.price, error = %source, "Rejected add with invalid price");
            CartError::InvalidPrice {
                product: product.id.to_string(),
                source,
            }
        })?;

        let line = LineItem {
            id: product.id.clone(),
            name: product.name.clone(),
            price,
            quantity,
            selected_size: size.to_string(),
            selected_color: color.to_string(),
            image: self.settings.image_for(product),
        };

        let product_id = product.id.to_string();
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[
                ("product_id", product_id.as_str()),
                ("size", size),
                ("color", color),
            ]),
        );

        self.cart.add(line);
        self.save();
        Ok(())
    }

    /// Step a line's quantity by one. Absent keys are ignored; decrementing
    /// a line at quantity 1 leaves it at 1.
    pub fn update_quantity(&mut self, key: &LineKey, change: QuantityChange) {
        if self.cart.change_quantity(key, change) {
            self.save();
        } else {
            debug!(product_id = %key.product_id, ?change, "Quantity unchanged");
        }
    }

    /// Remove a line. Absent keys are ignored.
    pub fn remove_item(&mut self, key: &LineKey) {
        if self.cart.remove(key).is_some() {
            let product_id = key.product_id.to_string();
            add_breadcrumb(
                "cart",
                "Removed item",
                Some(&[("product_id", product_id.as_str())]),
            );
            self.save();
        }
    }

    /// Empty the cart and persist the empty state.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.save();
    }

    /// Capture the current order and empty the cart.
    ///
    /// Returns `None` (and leaves storage untouched) when the cart is empty.
    pub fn checkout(&mut self) -> Option<OrderSummary> {
        if self.cart.is_empty() {
            return None;
        }

        let summary = OrderSummary {
            lines: self.cart.lines().to_vec(),
            total: self.cart.total(),
            item_count: self.cart.item_count(),
        };
        info!(
            lines = summary.lines.len(),
            items = summary.item_count,
            total = %summary.total,
            "Checked out cart"
        );
        self.clear_cart();
        Some(summary)
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Write the cart to storage now.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Encode` if the cart cannot be serialized and
    /// `CartError::Storage` if the write fails. Unlike the automatic
    /// writes after each mutation, this does not switch the store to
    /// in-memory operation.
    pub fn persist(&self) -> Result<()> {
        let encoded = encode_snapshot(&self.cart)?;
        self.storage.set(&self.settings.storage_key, &encoded)?;
        Ok(())
    }

    fn save(&mut self) {
        if !self.durable {
            debug!("Cart storage disabled, change kept in memory only");
            return;
        }

        if let Err(e) = self.persist() {
            self.durable = false;
            error!(
                key = %self.settings.storage_key,
                error = %e,
                "Failed to persist cart, continuing in memory only"
            );
            add_breadcrumb("cart", "Cart persistence disabled", None);
        }
    }
}

fn decode_snapshot(key: &str, raw: &str) -> Cart {
    match serde_json::from_str::<Cart>(raw) {
        Ok(cart) => {
            info!(key, lines = cart.len(), "Restored saved cart");
            cart
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding malformed saved cart");
            Cart::new()
        }
    }
}

fn encode_snapshot(cart: &Cart) -> Result<String> {
    Ok(serde_json::to_string(cart)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use sentrobuv_core::ProductId;
    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn product(id: &str, price: serde_json::Value) -> ProductSnapshot {
        ProductSnapshot::from_value(json!({
            "id": id,
            "name": format!("Product {id}"),
            "price": price,
            "productImages": [{"image": format!("uploads/{id}.jpg")}]
        }))
        .unwrap()
    }

    fn settings() -> CartSettings {
        CartSettings {
            image_base: Some(Url::parse("https://api.sentrobuv.uz").unwrap()),
            ..CartSettings::default()
        }
    }

    fn key(id: &str, size: &str, color: &str) -> LineKey {
        LineKey::new(ProductId::text(id), size, color)
    }

    fn open(storage: &Arc<MemoryStore>) -> CartStore<Arc<MemoryStore>> {
        CartStore::open(Arc::clone(storage), settings())
    }

    #[test]
    fn test_merge_scenario() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        store.add_item(&product("P1", json!(100)), 2, "M", "red").unwrap();
        store.add_item(&product("P1", json!(100)), 3, "M", "red").unwrap();

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity.get(), 5);
        assert_eq!(store.total(), Decimal::from(500));
        assert_eq!(store.item_count(), 5);
    }

    #[test]
    fn test_sizes_are_distinct_lines() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        store.add_item(&product("P1", json!(100)), 1, "M", "red").unwrap();
        store.add_item(&product("P1", json!(100)), 1, "L", "red").unwrap();

        assert_eq!(store.lines().len(), 2);
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store.add_item(&product("P1", json!(100)), 2, "M", "red").unwrap();

        for qty in [0, -3] {
            let err = store
                .add_item(&product("P1", json!(100)), qty, "M", "red")
                .unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity(q) if q == qty));
        }
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.item_count(), 2);
    }

    #[test]
    fn test_string_price_is_normalized() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        store.add_item(&product("P1", json!("250000")), 2, "42", "black").unwrap();
        assert_eq!(store.total(), Decimal::from(500_000));
    }

    #[test]
    fn test_unparseable_price_rejected() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        let err = store
            .add_item(&product("P1", json!("free")), 1, "M", "red")
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.cart().is_empty());
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_image_resolution_and_placeholder() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        store.add_item(&product("P1", json!(1)), 1, "M", "red").unwrap();
        let bare = ProductSnapshot::from_value(json!({"id": 2, "name": "Bare", "price": 1})).unwrap();
        store.add_item(&bare, 1, "", "").unwrap();

        assert_eq!(store.lines()[0].image, "https://api.sentrobuv.uz/uploads/P1.jpg");
        assert_eq!(store.lines()[1].image, "https://via.placeholder.com/150");
    }

    #[test]
    fn test_decrement_at_one_stays_one() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store.add_item(&product("P1", json!(100)), 1, "M", "red").unwrap();

        store.update_quantity(&key("P1", "M", "red"), QuantityChange::Decrement);
        assert_eq!(store.lines()[0].quantity.get(), 1);

        store.update_quantity(&key("P1", "M", "red"), QuantityChange::Increment);
        assert_eq!(store.lines()[0].quantity.get(), 2);
    }

    #[test]
    fn test_remove_absent_key_is_noop() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store.add_item(&product("P1", json!(100)), 1, "M", "red").unwrap();
        let before = store.cart().clone();

        store.remove_item(&key("P1", "L", "red"));
        assert_eq!(store.cart(), &before);

        store.remove_item(&key("P1", "M", "red"));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        store.add_item(&product("P1", json!(100)), 1, "M", "red").unwrap();
        store.update_quantity(&key("P1", "M", "red"), QuantityChange::Increment);

        let saved: Cart = serde_json::from_str(&storage.get("cart").unwrap().unwrap()).unwrap();
        assert_eq!(&saved, store.cart());

        store.clear_cart();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_round_trip_through_storage() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store.add_item(&product("P1", json!("19.99")), 2, "M", "red").unwrap();
        store.add_item(&product("P2", json!(5)), 1, "L", "blue").unwrap();
        let before = store.cart().clone();
        drop(store);

        let reopened = open(&storage);
        assert_eq!(reopened.cart(), &before);
        assert_eq!(reopened.total(), before.total());
    }

    #[test]
    fn test_high_precision_price_round_trips() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store
            .add_item(&product("P1", json!("1234567890.123456789")), 3, "M", "red")
            .unwrap();
        let before = store.cart().clone();
        drop(store);

        let reopened = open(&storage);
        assert_eq!(reopened.cart(), &before);
        assert_eq!(reopened.total(), before.total());
    }

    #[test]
    fn test_out_of_range_price_rejected() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);

        let err = store
            .add_item(&product("P1", json!("50000000000000000000000000000")), 2, "M", "red")
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.cart().is_empty());
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_snapshot_with_out_of_range_price_is_discarded() {
        let raw = r#"[{"id": "P1", "name": "P1", "price": "50000000000000000000000000000",
            "quantity": 2, "selectedSize": "M", "selectedColor": "red", "image": ""}]"#;
        let storage = Arc::new(MemoryStore::with_entries([("cart", raw)]));
        let store = open(&storage);
        assert!(store.cart().is_empty());
        assert_eq!(store.total(), Decimal::ZERO);
    }

    #[test]
    fn test_persist_writes_encoded_snapshot() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        store.add_item(&product("P1", json!("19.5")), 1, "M", "red").unwrap();

        store.persist().unwrap();
        assert_eq!(
            storage.get("cart").unwrap(),
            Some(encode_snapshot(store.cart()).unwrap())
        );
    }

    #[test]
    fn test_malformed_snapshot_yields_empty_cart() {
        for raw in ["not-json", "{\"id\": 1}", "42", "[{\"id\": 1}]"] {
            let storage = Arc::new(MemoryStore::with_entries([("cart", raw)]));
            let store = open(&storage);
            assert!(store.cart().is_empty(), "snapshot {raw} should be discarded");
            assert!(store.is_durable());
        }
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(MemoryStore::with_quota(16));
        let mut store = open(&storage);

        store.add_item(&product("P1", json!(100)), 1, "M", "red").unwrap();
        assert_eq!(store.item_count(), 1);
        assert!(!store.is_durable());
        assert_eq!(storage.get("cart").unwrap(), None);

        store.update_quantity(&key("P1", "M", "red"), QuantityChange::Increment);
        assert_eq!(store.item_count(), 2);
        assert!(matches!(
            store.persist().unwrap_err(),
            CartError::Storage(StorageError::QuotaExceeded { .. })
        ));
    }

    #[test]
    fn test_checkout_clears_and_summarizes() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open(&storage);
        assert!(store.checkout().is_none());

        store.add_item(&product("P1", json!(100)), 2, "M", "red").unwrap();
        let order = store.checkout().unwrap();

        assert_eq!(order.total, Decimal::from(200));
        assert_eq!(order.item_count, 2);
        assert_eq!(order.lines.len(), 1);
        assert!(store.cart().is_empty());
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[]"));
    }
}
