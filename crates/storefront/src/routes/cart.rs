//! Cart route handlers.
//!
//! The cart lives in the visitor's session (see [`SessionCart`]); every
//! handler answers with the full cart so the client can re-render at once.

use axum::{Json, extract::State};
use riziky_core::cart::{Cart, CartItem};
use riziky_core::checkout::{self, CartSummary};
use riziky_core::types::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::SessionCart;
use crate::state::AppState;

/// Cart response.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_items: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub summary: CartSummary,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            summary: CartSummary::for_cart(cart),
        }
    }
}

/// Add to cart request.
///
/// Quantities are read as signed so that zero, negative and out-of-range
/// values reach the handler and leave the cart unchanged.
#[derive(Debug, Deserialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A requested quantity the cart can store, or `None` for anything below 1
/// or beyond `u32`.
fn line_quantity(requested: i64) -> Option<u32> {
    u32::try_from(requested).ok().filter(|&q| q >= 1)
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCart {
    pub product_id: ProductId,
}

/// Coupon request.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

/// Current cart.
pub async fn show(cart: SessionCart) -> Json<CartView> {
    Json(CartView::from(cart.cart()))
}

/// Add a catalog product to the cart.
///
/// Unknown products are a 404, out-of-stock products a 400.
#[instrument(skip(state, cart))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Json(form): Json<AddToCart>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .get(form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    if !product.in_stock {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let added = line_quantity(form.quantity)
        .is_some_and(|quantity| cart.store().add_item(product.to_cart_item(quantity)));
    if added {
        tracing::info!(product_id = %product.id, quantity = form.quantity, "Added to cart");
    } else {
        tracing::debug!("Add left cart unchanged");
    }
    let cart = cart.save().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Set a line's quantity. Quantities below 1 leave the cart unchanged.
#[instrument(skip(cart))]
pub async fn update(
    mut cart: SessionCart,
    Json(form): Json<UpdateQuantity>,
) -> Result<Json<CartView>> {
    let changed = line_quantity(form.quantity)
        .is_some_and(|quantity| cart.store().update_quantity(form.product_id, quantity));
    if !changed {
        tracing::debug!("Quantity update left cart unchanged");
    }
    let cart = cart.save().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line.
#[instrument(skip(cart))]
pub async fn remove(
    mut cart: SessionCart,
    Json(form): Json<RemoveFromCart>,
) -> Result<Json<CartView>> {
    cart.store().remove_item(form.product_id);
    let cart = cart.save().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(cart))]
pub async fn clear(mut cart: SessionCart) -> Result<Json<CartView>> {
    cart.store().clear();
    let cart = cart.save().await?;
    Ok(Json(CartView::from(&cart)))
}

/// Cart badge count.
pub async fn count(cart: SessionCart) -> Json<Value> {
    Json(json!({ "count": cart.cart().total_items() }))
}

/// Try a promotional code.
#[instrument(skip(form))]
pub async fn coupon(Json(form): Json<CouponForm>) -> Result<Json<Value>> {
    let discount = checkout::apply_coupon(&form.code)?;
    Ok(Json(json!({ "discount": discount })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_view_from_empty_cart() {
        let view = CartView::from(&Cart::new());
        assert!(view.items.is_empty());
        assert_eq!(view.total_items, 0);
        assert_eq!(view.summary.total, Decimal::ZERO);
    }

    #[test]
    fn test_add_to_cart_defaults_quantity() {
        let form: AddToCart = serde_json::from_str(r#"{"product_id": 3}"#).unwrap();
        assert_eq!(form.quantity, 1);
        assert_eq!(form.product_id, ProductId::new(3));
    }

    #[test]
    fn test_line_quantity_rejects_non_positive_and_oversized() {
        assert_eq!(line_quantity(1), Some(1));
        assert_eq!(line_quantity(i64::from(u32::MAX)), Some(u32::MAX));
        assert_eq!(line_quantity(0), None);
        assert_eq!(line_quantity(-1), None);
        assert_eq!(line_quantity(i64::from(u32::MAX) + 1), None);
    }

    #[test]
    fn test_negative_quantity_deserializes() {
        let form: UpdateQuantity =
            serde_json::from_str(r#"{"product_id": 5, "quantity": -1}"#).unwrap();
        assert_eq!(form.quantity, -1);
    }
}
