//! Command implementations.

pub mod basket;
pub mod cart;
pub mod products;
pub mod profile;

use sentrobuv_core::ProductId;
use sentrobuv_storefront::views::{CartView, MiniCartView};

/// Integer ids are numeric, anything else is a string id.
pub fn parse_product_id(raw: &str) -> ProductId {
    let raw = raw.trim();
    raw.parse::<i64>()
        .map_or_else(|_| ProductId::text(raw), ProductId::numeric)
}

/// Log a cart for the terminal.
pub fn render_cart(view: &CartView) {
    if view.is_empty() {
        tracing::info!("Cart is empty");
        return;
    }

    for item in &view.items {
        tracing::info!(
            "  {} x{}  [{} / {}]  {} each, {}",
            item.name,
            item.quantity,
            display_option(&item.size),
            display_option(&item.color),
            item.price,
            item.line_price
        );
    }
    tracing::info!("{} items, subtotal {}", view.item_count, view.subtotal);
}

/// Log the compact preview shown next to the cart badge.
pub fn render_mini_cart(view: &MiniCartView) {
    for item in &view.items {
        tracing::info!("  {} x{}  {}", item.name, item.quantity, item.line_price);
    }
    if view.remaining > 0 {
        tracing::info!("  +{} more", view.remaining);
    }
}

fn display_option(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
