//! Cart persisted to a durable key-value slot.

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use super::{Cart, CartItem};
use crate::storage::KeyValueStore;
use crate::types::ProductId;

/// Slot name holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// A [`Cart`] bound to the slot it is persisted in.
///
/// The store is an owned value handed to whoever drives the cart (a request
/// handler, a test); there is no process-wide instance. Mutations are applied
/// in memory first and then written to the slot synchronously. A failed write
/// is logged and otherwise ignored: the in-memory cart stays authoritative and
/// no operation surfaces an error.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart persisted in `store`.
    ///
    /// A missing slot yields an empty cart. A slot that cannot be decoded, or
    /// that decodes to lines breaking the cart invariants, is discarded: the
    /// cart starts empty and the slot is reset.
    pub fn open(store: S) -> Self {
        let mut this = Self {
            cart: Cart::new(),
            store,
        };

        let raw = match this.store.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return this,
            Err(e) => {
                error!(error = %e, "Failed to read persisted cart, starting empty");
                return this;
            }
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw)
            .map_err(|e| e.to_string())
            .and_then(|items| Cart::from_items(items).map_err(|e| e.to_string()))
        {
            Ok(cart) => {
                debug!(lines = cart.items().len(), "Rehydrated cart");
                this.cart = cart;
            }
            Err(reason) => {
                warn!(%reason, "Discarding malformed persisted cart");
                this.persist();
            }
        }

        this
    }

    /// Add a line, merging quantities on a matching id.
    pub fn add_item(&mut self, item: CartItem) -> bool {
        self.apply(|cart| cart.add_item(item))
    }

    /// Set a line's quantity; values below 1 are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: u32) -> bool {
        self.apply(|cart| cart.update_quantity(id, quantity))
    }

    /// Remove the line for `id`.
    pub fn remove_item(&mut self, id: ProductId) -> bool {
        self.apply(|cart| cart.remove_item(id))
    }

    /// Empty the cart.
    pub fn clear(&mut self) -> bool {
        self.apply(Cart::clear)
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of `price × quantity`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Give back the backing store, e.g. to copy a snapshot elsewhere.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn apply(&mut self, op: impl FnOnce(&mut Cart) -> bool) -> bool {
        let changed = op(&mut self.cart);
        if changed {
            self.persist();
        }
        changed
    }

    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.cart) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "Failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.store.set(CART_KEY, &json) {
            error!(error = %e, "Failed to persist cart");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore, StorageError};

    fn item(id: i32, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Produit {id}"),
            price: Decimal::new(cents, 2),
            image: String::new(),
            quantity,
        }
    }

    fn persisted(store: &CartStore<MemoryStore>) -> Vec<CartItem> {
        let raw = store.store().get(CART_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    /// Store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_owned(),
                source: std::io::Error::other("read-only"),
            })
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_open_missing_slot_is_empty() {
        let store = CartStore::open(MemoryStore::new());
        assert!(store.cart().is_empty());
        assert_eq!(store.store().get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let mut store = CartStore::open(MemoryStore::new());

        store.add_item(item(1, 1000, 1));
        store.add_item(item(2, 500, 2));
        assert_eq!(persisted(&store), store.items());

        store.update_quantity(ProductId::new(1), 4);
        assert_eq!(persisted(&store)[0].quantity, 4);

        store.remove_item(ProductId::new(2));
        assert_eq!(persisted(&store).len(), 1);

        store.clear();
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn test_reopen_restores_state() {
        let mut store = CartStore::open(MemoryStore::new());
        store.add_item(item(8, 49999, 1));
        store.add_item(item(3, 24999, 2));

        let reopened = CartStore::open(store.into_store());
        let ids: Vec<i32> = reopened.items().iter().map(|l| l.id.as_i32()).collect();
        assert_eq!(ids, vec![8, 3]);
        assert_eq!(reopened.total_items(), 3);
        assert_eq!(reopened.total_price(), Decimal::new(99997, 2));
    }

    #[test]
    fn test_file_backed_cart_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("riziky-cart-{}", uuid::Uuid::new_v4()));
        {
            let mut store = CartStore::open(FileStore::open(&dir).unwrap());
            store.add_item(item(2, 129_999, 1));
            store.add_item(item(2, 129_999, 1));
        }

        let reopened = CartStore::open(FileStore::open(&dir).unwrap());
        assert_eq!(reopened.items().len(), 1);
        assert_eq!(reopened.total_items(), 2);
        assert_eq!(reopened.total_price(), Decimal::new(259_998, 2));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_json_resets_to_empty() {
        let store = CartStore::open(MemoryStore::with_slot(CART_KEY, "{not json"));
        assert!(store.cart().is_empty());
        assert_eq!(store.store().get(CART_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_invariant_violation_resets_to_empty() {
        let raw = r#"[
            {"id":1,"name":"a","price":1.0,"image":"","quantity":1},
            {"id":1,"name":"a","price":1.0,"image":"","quantity":2}
        ]"#;
        let store = CartStore::open(MemoryStore::with_slot(CART_KEY, raw));
        assert!(store.cart().is_empty());

        let raw = r#"[{"id":1,"name":"a","price":1.0,"image":"","quantity":0}]"#;
        let store = CartStore::open(MemoryStore::with_slot(CART_KEY, raw));
        assert!(store.cart().is_empty());

        let raw = r#"[{"id":1,"name":"a","price":1e28,"image":"","quantity":4000000000}]"#;
        let store = CartStore::open(MemoryStore::with_slot(CART_KEY, raw));
        assert!(store.cart().is_empty());
        assert_eq!(store.store().get(CART_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_noop_does_not_write() {
        let mut store = CartStore::open(MemoryStore::new());
        assert!(!store.update_quantity(ProductId::new(1), 3));
        assert!(!store.remove_item(ProductId::new(1)));
        assert_eq!(store.store().get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut store = CartStore::open(ReadOnlyStore);
        assert!(store.add_item(item(1, 1000, 2)));
        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price(), Decimal::new(20, 0));
    }
}
