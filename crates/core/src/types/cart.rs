//! The cart aggregate.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with at most one line per
//! [`LineKey`] (product id, size, color). Quantities are [`NonZeroU32`], so a
//! line can never hold zero units; removal is always explicit.
//!
//! The serialized form is the plain JSON array stored in the cart slot:
//!
//! ```json
//! [{"id": 1, "name": "Krossovka", "price": 250000, "quantity": 2,
//!   "selectedSize": "42", "selectedColor": "black", "image": "https://..."}]
//! ```

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::UnitPrice;

/// Identity of a cart line: the same product in another size or color is a
/// different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    /// Create a new line key.
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

/// Direction of a single-step quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityChange {
    Increment,
    Decrement,
}

/// One entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: UnitPrice,
    pub quantity: NonZeroU32,
    pub selected_size: String,
    pub selected_color: String,
    pub image: String,
}

impl LineItem {
    /// The identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(
            self.id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }

    /// Whether this line has the given identity, without cloning.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.id == key.product_id
            && self.selected_size == key.size
            && self.selected_color == key.color
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity.get())
    }
}

/// Ordered collection of line items, unique per [`LineKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines, merging any that share an identity key.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add(line);
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up a line by identity key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Add a line, merging its quantity into an existing line with the same
    /// key. The existing line keeps its name, price and image.
    pub fn add(&mut self, line: LineItem) {
        let key = line.key();
        if let Some(existing) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity.get());
        } else {
            self.lines.push(line);
        }
    }

    /// Step a line's quantity up or down by one.
    ///
    /// Decrementing a line at quantity 1 leaves it at 1. Returns `true` if
    /// the cart changed.
    pub fn change_quantity(&mut self, key: &LineKey, change: QuantityChange) -> bool {
        let Some(line) = self.lines.iter_mut().find(|l| l.matches(key)) else {
            return false;
        };
        match change {
            QuantityChange::Increment => {
                line.quantity = line.quantity.saturating_add(1);
                true
            }
            QuantityChange::Decrement => match NonZeroU32::new(line.quantity.get() - 1) {
                Some(lower) => {
                    line.quantity = lower;
                    true
                }
                None => false,
            },
        }
    }

    /// Remove a line. Returns the removed line, or `None` if absent.
    pub fn remove(&mut self, key: &LineKey) -> Option<LineItem> {
        let index = self.lines.iter().position(|l| l.matches(key))?;
        Some(self.lines.remove(index))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity over all lines, saturating at
    /// `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

impl From<Vec<LineItem>> for Cart {
    fn from(lines: Vec<LineItem>) -> Self {
        Self::from_lines(lines)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
