//! Shopping cart.
//!
//! [`Cart`] is the in-memory line-item collection with merge-on-add
//! semantics. [`CartStore`] wraps a `Cart` together with a
//! [`KeyValueStore`](crate::storage::KeyValueStore) slot and persists the
//! items after every mutation.
//!
//! # Invariants
//!
//! - At most one [`CartItem`] per product id.
//! - Every quantity is at least 1.
//! - Items keep insertion order; merging into an existing line never moves it.
//! - Totals are recomputed from the items on every read.
//! - Every line total and the cart total fit in a [`Decimal`]; a mutation
//!   that would overflow either is ignored.

mod store;

pub use store::{CART_KEY, CartStore};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// One product line in the cart.
///
/// Serialized as `{id, name, price, image, quantity}` with `price` as a JSON
/// number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identity; unique within a cart.
    pub id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
    /// Number of units, always >= 1 once stored.
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity` for this line, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    fn checked_line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Sum of line totals, or `None` if any product or the sum overflows.
fn checked_total<'a>(lines: impl IntoIterator<Item = &'a CartItem>) -> Option<Decimal> {
    lines.into_iter().try_fold(Decimal::ZERO, |total, line| {
        total.checked_add(line.checked_line_total()?)
    })
}

/// Why a stored item list could not become a [`Cart`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartStateError {
    /// Two lines share a product id.
    #[error("duplicate cart line for product {0}")]
    DuplicateItem(ProductId),
    /// A line has quantity 0.
    #[error("cart line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),
    /// A line has a negative price.
    #[error("cart line for product {0} has a negative price")]
    NegativePrice(ProductId),
    /// The line totals do not fit in a decimal.
    #[error("cart total overflows")]
    TotalOverflow,
}

/// Insertion-ordered collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from previously stored lines, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns `CartStateError` if the lines contain a duplicate id, a zero
    /// quantity or a negative price, or if their total overflows.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartStateError> {
        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(CartStateError::ZeroQuantity(item.id));
            }
            if item.price < Decimal::ZERO {
                return Err(CartStateError::NegativePrice(item.id));
            }
            if items.iter().take(index).any(|other| other.id == item.id) {
                return Err(CartStateError::DuplicateItem(item.id));
            }
        }
        if checked_total(&items).is_none() {
            return Err(CartStateError::TotalOverflow);
        }
        Ok(Self { items })
    }

    /// Add a line, merging into an existing line with the same id.
    ///
    /// A merge only grows the quantity; the stored name, price and image stay
    /// those of the first add. Items with quantity 0 or a negative price are
    /// ignored, as is any add that would overflow the totals. Returns whether
    /// the cart changed.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        if item.quantity == 0 || item.price < Decimal::ZERO {
            return false;
        }

        let existing = self
            .items
            .iter()
            .enumerate()
            .find(|(_, line)| line.id == item.id)
            .map(|(index, line)| (index, line.quantity));

        match existing {
            Some((index, quantity)) => {
                self.set_quantity_at(index, quantity.saturating_add(item.quantity))
            }
            None => {
                if checked_total(self.items.iter().chain([&item])).is_none() {
                    return false;
                }
                self.items.push(item);
                true
            }
        }
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Quantities below 1 leave the line unchanged; removal is
    /// [`remove_item`](Self::remove_item). Unknown ids and quantities that
    /// would overflow the totals are ignored. Returns whether the cart
    /// changed.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.items.iter().position(|line| line.id == id) {
            Some(index) => self.set_quantity_at(index, quantity),
            None => false,
        }
    }

    fn set_quantity_at(&mut self, index: usize, quantity: u32) -> bool {
        let Some(current) = self.items.get(index) else {
            return false;
        };
        if current.quantity == quantity {
            return false;
        }
        let candidate = CartItem {
            quantity,
            ..current.clone()
        };
        let lines = self
            .items
            .iter()
            .enumerate()
            .map(|(i, line)| if i == index { &candidate } else { line });
        if checked_total(lines).is_none() {
            return false;
        }
        if let Some(line) = self.items.get_mut(index) {
            line.quantity = quantity;
        }
        true
    }

    /// Delete the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        self.items.len() != before
    }

    /// Remove every line. Returns whether the cart had any.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| line.id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn item(id: i32, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Produit {id}"),
            price: Decimal::new(cents, 2),
            image: format!("https://img.example/{id}.jpg"),
            quantity,
        }
    }

    #[test]
    fn test_add_same_id_merges_quantities() {
        let mut cart = Cart::new();
        for quantity in [1, 2, 4] {
            assert!(cart.add_item(item(1, 1000, quantity)));
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_merge_keeps_first_name_and_price() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 1));
        let mut repriced = item(1, 5000, 1);
        repriced.name = "Renamed".to_string();
        cart.add_item(repriced);

        let line = cart.get(ProductId::new(1)).unwrap();
        assert_eq!(line.price, Decimal::new(1000, 2));
        assert_eq!(line.name, "Produit 1");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(item(3, 100, 1));
        cart.add_item(item(1, 100, 1));
        cart.add_item(item(2, 100, 1));
        cart.add_item(item(3, 100, 1));

        let ids: Vec<i32> = cart.items().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_zero_quantity_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(item(1, 1000, 0)));
        assert!(cart.is_empty());

        cart.add_item(item(1, 1000, 2));
        assert!(!cart.add_item(item(1, 1000, 0)));
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn test_add_negative_price_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(item(1, -100, 1)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_saturates_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 100, u32::MAX - 1));
        assert!(cart.add_item(item(1, 100, 5)));
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert!(!cart.add_item(item(1, 100, 1)));
    }

    fn huge(id: i32, quantity: u32) -> CartItem {
        CartItem {
            price: Decimal::MAX - Decimal::TEN,
            ..item(id, 0, quantity)
        }
    }

    #[test]
    fn test_add_overflowing_line_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.add_item(huge(1, 3)));
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_overflowing_cart_total_are_noops() {
        let mut cart = Cart::new();
        assert!(cart.add_item(huge(1, 1)));
        assert!(!cart.add_item(huge(1, 2)));
        assert!(!cart.update_quantity(ProductId::new(1), 3));
        assert!(!cart.add_item(huge(2, 1)));

        let one_euro = CartItem {
            price: Decimal::ONE,
            ..item(3, 0, 1)
        };
        assert!(cart.add_item(one_euro));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total_price(), Decimal::MAX - Decimal::from(9));
    }

    #[test]
    fn test_update_below_one_leaves_quantity() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 3));

        assert!(!cart.update_quantity(ProductId::new(1), 0));
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_update_sets_quantity_and_ignores_unknown_id() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 3));

        assert!(cart.update_quantity(ProductId::new(1), 5));
        assert_eq!(cart.items()[0].quantity, 5);
        assert!(!cart.update_quantity(ProductId::new(1), 5));
        assert!(!cart.update_quantity(ProductId::new(99), 2));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_then_add_starts_fresh_line() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 4));
        assert!(cart.remove_item(ProductId::new(1)));
        assert!(!cart.remove_item(ProductId::new(1)));

        let fresh = item(1, 1000, 1);
        cart.add_item(fresh.clone());
        assert_eq!(cart.items(), &[fresh]);
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);

        cart.add_item(item(1, 89999, 2));
        cart.add_item(item(5, 12999, 1));

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::new(192997, 2));
    }

    #[test]
    fn test_clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 1));
        cart.add_item(item(2, 2000, 1));

        assert!(cart.clear());
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(!cart.clear());
    }

    #[test]
    fn test_worked_example() {
        let mut cart = Cart::new();
        cart.add_item(item(1, 1000, 1));
        cart.add_item(item(1, 1000, 2));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.total_price(), Decimal::new(30, 0));
        assert_eq!(cart.total_items(), 3);

        cart.update_quantity(ProductId::new(1), 0);
        assert_eq!(cart.items()[0].quantity, 3);

        cart.remove_item(ProductId::new(1));
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_from_items_rejects_broken_state() {
        assert_eq!(
            Cart::from_items(vec![item(1, 100, 1), item(1, 100, 2)]),
            Err(CartStateError::DuplicateItem(ProductId::new(1)))
        );
        assert_eq!(
            Cart::from_items(vec![item(2, 100, 0)]),
            Err(CartStateError::ZeroQuantity(ProductId::new(2)))
        );
        assert_eq!(
            Cart::from_items(vec![item(3, -1, 1)]),
            Err(CartStateError::NegativePrice(ProductId::new(3)))
        );
        assert_eq!(
            Cart::from_items(vec![huge(1, 1), huge(2, 1)]),
            Err(CartStateError::TotalOverflow)
        );
        assert!(Cart::from_items(vec![item(1, 0, 1), item(2, 100, 1)]).is_ok());
    }

    #[test]
    fn test_item_wire_format() {
        let json = serde_json::to_value(item(1, 1000, 2)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Produit 1",
                "price": 10.0,
                "image": "https://img.example/1.jpg",
                "quantity": 2
            })
        );

        let parsed: CartItem = serde_json::from_str(
            r#"{"id":4,"name":"Montre","price":299.99,"image":"x","quantity":1}"#,
        )
        .unwrap();
        assert_eq!(parsed.price, Decimal::new(29999, 2));
    }
}
