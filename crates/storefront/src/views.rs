//! Display data for cart and catalog consumers.
//!
//! Amounts are formatted in so'm: integer part, thousands grouped with
//! spaces (`1 250 000 so'm`).

use rust_decimal::Decimal;
use sentrobuv_core::{Cart, LineItem, ProductSnapshot};

use crate::api::BasketItem;
use crate::basket::BasketView;
use crate::cart::CartSummary;
use crate::config::CartSettings;

/// Number of lines the mini-cart shows.
pub const MINI_CART_LINES: usize = 2;

/// Format an amount as so'm.
#[must_use]
pub fn format_som(amount: Decimal) -> String {
    let whole = amount.trunc().abs().to_string();
    let digits = whole.split('.').next().unwrap_or("0");

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.trunc().is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped} so'm")
}

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub color: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: String,
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            product_id: line.id.to_string(),
            name: line.name.clone(),
            size: line.selected_size.clone(),
            color: line.selected_color.clone(),
            quantity: line.quantity.get(),
            price: format_som(line.price.amount()),
            line_price: format_som(line.line_total()),
            image: line.image.clone(),
        }
    }
}

impl CartItemView {
    fn from_basket_item(item: &BasketItem, settings: &CartSettings) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name().unwrap_or_default().to_string(),
            size: item.size.clone().unwrap_or_default(),
            color: item.color.clone().unwrap_or_default(),
            quantity: item.count,
            price: format_som(item.price.amount()),
            line_price: format_som(item.line_total()),
            image: item.product.as_ref().map_or_else(
                || settings.image_placeholder.clone(),
                |product| settings.image_for(product),
            ),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: format_som(Decimal::ZERO),
            item_count: 0,
        }
    }

    /// Display data for a server basket.
    #[must_use]
    pub fn from_basket(view: &BasketView, settings: &CartSettings) -> Self {
        Self {
            items: view
                .items
                .iter()
                .map(|item| CartItemView::from_basket_item(item, settings))
                .collect(),
            subtotal: format_som(view.total()),
            item_count: view.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: format_som(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartSummary> for CartView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            items: summary.lines.iter().map(CartItemView::from).collect(),
            subtotal: format_som(summary.total),
            item_count: summary.item_count,
        }
    }
}

/// Compact cart preview: the first lines plus how many more there are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniCartView {
    pub items: Vec<CartItemView>,
    pub remaining: usize,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<CartView> for MiniCartView {
    fn from(mut cart: CartView) -> Self {
        let remaining = cart.items.len().saturating_sub(MINI_CART_LINES);
        cart.items.truncate(MINI_CART_LINES);
        Self {
            items: cart.items,
            remaining,
            subtotal: cart.subtotal,
            item_count: cart.item_count,
        }
    }
}

/// Product card for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Formatted price, or `None` when the catalog price is unusable.
    pub price: Option<String>,
    pub image: String,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &ProductSnapshot, settings: &CartSettings) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product
                .unit_price()
                .ok()
                .map(|price| format_som(price.amount())),
            image: settings.image_for(product),
        }
    }
}

/// Cards for a product listing, truncated to `limit` when given.
#[must_use]
pub fn product_cards(
    products: &[ProductSnapshot],
    settings: &CartSettings,
    limit: Option<usize>,
) -> Vec<ProductCardView> {
    products
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|product| ProductCardView::new(product, settings))
        .collect()
}
