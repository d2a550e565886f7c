//! Local cart commands.
//!
//! Every command except [`open`] runs inside a `CartProvider` scope and
//! reaches the cart through `use_cart()`.

use sentrobuv_core::{LineKey, ProductSelection, QuantityChange};
use sentrobuv_storefront::api::ApiClient;
use sentrobuv_storefront::cart::{CartHandle, use_cart};
use sentrobuv_storefront::config::{CartBackend, StorefrontConfig};
use sentrobuv_storefront::storage::FileStore;
use sentrobuv_storefront::views::{CartView, MiniCartView, format_som};
use tracing::{info, warn};

use super::{parse_product_id, render_cart, render_mini_cart};

/// Open the cart persisted under the data directory.
///
/// # Errors
///
/// Returns an error if the server basket is the configured backend or the
/// data directory cannot be created.
pub fn open(config: &StorefrontConfig) -> Result<CartHandle, Box<dyn std::error::Error>> {
    if config.backend != CartBackend::Local {
        return Err(
            "cart commands need SENTROBUV_CART_BACKEND=local; use `sentro basket` instead".into(),
        );
    }

    let storage = FileStore::open(&config.data_dir)?;
    let cart = CartHandle::open(storage, config.cart.clone());
    if !cart.is_durable() {
        warn!("Cart could not be read from disk; changes will not be saved");
    }
    Ok(cart)
}

/// Show cart contents.
pub fn show() {
    render_cart(&CartView::from(&use_cart().summary()));
}

/// Add a product, defaulting unspecified options to the product's first.
///
/// # Errors
///
/// Returns an error if the product cannot be fetched or the quantity or
/// price is invalid.
pub async fn add(
    config: &StorefrontConfig,
    product_id: &str,
    qty: Option<i64>,
    size: Option<String>,
    color: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = ApiClient::from_config(config)?;
    let product = api
        .catalog()
        .get_product(&parse_product_id(product_id))
        .await?;

    let selection = ProductSelection::defaults(&product);
    let quantity = qty.unwrap_or_else(|| i64::from(selection.quantity));
    let size = size.unwrap_or(selection.size);
    let color = color.unwrap_or(selection.color);

    let cart = use_cart();
    cart.add_item(&product, quantity, &size, &color)?;
    info!("Added {} x{} to cart", product.name, quantity);

    render_mini_cart(&MiniCartView::from(CartView::from(&cart.summary())));
    Ok(())
}

/// Increase a line's quantity by one.
pub fn increment(product_id: &str, size: &str, color: &str) {
    change(product_id, size, color, QuantityChange::Increment);
}

/// Decrease a line's quantity by one.
pub fn decrement(product_id: &str, size: &str, color: &str) {
    change(product_id, size, color, QuantityChange::Decrement);
}

fn change(product_id: &str, size: &str, color: &str, change: QuantityChange) {
    let cart = use_cart();
    let key = LineKey::new(parse_product_id(product_id), size, color);
    if cart.cart().get(&key).is_none() {
        warn!(%product_id, size, color, "No such cart line");
        return;
    }
    cart.update_quantity(&key, change);
    show();
}

/// Remove a line.
pub fn remove(product_id: &str, size: &str, color: &str) {
    let cart = use_cart();
    let key = LineKey::new(parse_product_id(product_id), size, color);
    if cart.cart().get(&key).is_none() {
        warn!(%product_id, size, color, "No such cart line");
        return;
    }
    cart.remove_item(&key);
    show();
}

/// Remove every line.
pub fn clear() {
    use_cart().clear_cart();
    info!("Cart cleared");
}

/// Place the order and empty the cart.
pub fn checkout() {
    match use_cart().checkout() {
        Some(order) => {
            info!(
                "Order placed: {} items, total {}",
                order.item_count,
                format_som(order.total)
            );
        }
        None => info!("Cart is empty, nothing to check out"),
    }
}
