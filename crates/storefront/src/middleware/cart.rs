//! Session-backed cart extractor.
//!
//! The visitor's cart is a [`CartStore`] over a one-slot [`MemoryStore`]
//! seeded from the session. Handlers mutate it, then call
//! [`SessionCart::save`] to copy the slot back into the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use riziky_core::cart::{CART_KEY, Cart, CartStore};
use riziky_core::storage::MemoryStore;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// The current visitor's cart.
pub struct SessionCart {
    session: Session,
    store: CartStore<MemoryStore>,
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let raw: Option<String> = session.get(session_keys::CART).await?;
        let slot = raw.map_or_else(MemoryStore::new, |raw| {
            MemoryStore::with_slot(CART_KEY, raw)
        });

        Ok(Self {
            session,
            store: CartStore::open(slot),
        })
    }
}

impl SessionCart {
    /// The cart store, for reads and mutations.
    pub const fn store(&mut self) -> &mut CartStore<MemoryStore> {
        &mut self.store
    }

    /// Current contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Write the cart slot back into the session and return the final cart.
    ///
    /// Nothing is written for a visitor who never had a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(self) -> Result<Cart, AppError> {
        let cart = self.store.cart().clone();
        if let Some(raw) = self.store.into_store().take(CART_KEY) {
            self.session.insert(session_keys::CART, raw).await?;
        }
        Ok(cart)
    }
}
