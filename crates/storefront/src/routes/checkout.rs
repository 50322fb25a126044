//! Checkout route handlers.
//!
//! All checkout routes require a signed-in user. The [`CheckoutFlow`] is kept
//! in the session between steps; each step runs against the session cart.

use axum::{Json, extract::State};
use riziky_core::account::UserProfile;
use riziky_core::cart::{Cart, CartItem};
use riziky_core::checkout::{
    CardDetails, CheckoutFlow, CheckoutStep, CheckoutTotals, OrderConfirmation, PaymentMethod,
    PaymentSummary, ShippingInfo, ShippingMethod,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{RequireAuth, SessionCart};
use crate::models::session_keys;
use crate::state::AppState;

/// Checkout state response.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub items: Vec<CartItem>,
    pub shipping: ShippingInfo,
    pub shipping_method: ShippingMethod,
    pub save_shipping_info: bool,
    pub payment: Option<PaymentSummary>,
    pub summary: CheckoutTotals,
    pub confirmation: Option<OrderConfirmation>,
}

impl CheckoutView {
    fn new(flow: &CheckoutFlow, cart: &Cart) -> Self {
        Self {
            step: flow.step(),
            items: cart.items().to_vec(),
            shipping: flow.shipping().clone(),
            shipping_method: flow.shipping_method(),
            save_shipping_info: flow.save_shipping_info(),
            payment: flow.payment().cloned(),
            summary: flow.summary(cart),
            confirmation: flow.confirmation().cloned(),
        }
    }
}

/// Shipping step submission.
#[derive(Debug, Deserialize)]
pub struct ShippingForm {
    #[serde(flatten)]
    pub info: ShippingInfo,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    #[serde(default = "default_save_info")]
    pub save_shipping_info: bool,
}

const fn default_save_info() -> bool {
    true
}

/// Payment step submission.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

/// Back-navigation request.
#[derive(Debug, Deserialize)]
pub struct BackForm {
    pub step: CheckoutStep,
}

/// Load the user's checkout, starting over when there is none or when a
/// finished checkout meets a refilled cart.
async fn load_flow(session: &Session, user: &UserProfile, cart: &Cart) -> Result<CheckoutFlow> {
    let stored: Option<CheckoutFlow> = session.get(session_keys::CHECKOUT).await?;
    let flow = match stored {
        Some(flow) if !(flow.step() == CheckoutStep::Confirmation && !cart.is_empty()) => flow,
        _ => CheckoutFlow::new(Some(user)),
    };
    Ok(flow)
}

async fn store_flow(session: &Session, flow: &CheckoutFlow) -> Result<()> {
    session.insert(session_keys::CHECKOUT, flow).await?;
    Ok(())
}

/// Current checkout state.
///
/// An empty cart before confirmation is a 409.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    session: Session,
    cart: SessionCart,
) -> Result<Json<CheckoutView>> {
    let flow = load_flow(&session, &user, cart.cart()).await?;
    flow.ensure_active(cart.cart())?;
    store_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::new(&flow, cart.cart())))
}

/// Submit the shipping step.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn shipping(
    RequireAuth(user): RequireAuth,
    session: Session,
    cart: SessionCart,
    Json(form): Json<ShippingForm>,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session, &user, cart.cart()).await?;
    flow.submit_shipping(
        cart.cart(),
        form.info,
        form.shipping_method,
        form.save_shipping_info,
    )?;
    store_flow(&session, &flow).await?;
    tracing::info!(method = ?flow.shipping_method(), "Shipping step completed");
    Ok(Json(CheckoutView::new(&flow, cart.cart())))
}

/// Submit the payment step.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn payment(
    RequireAuth(user): RequireAuth,
    session: Session,
    cart: SessionCart,
    Json(form): Json<PaymentForm>,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session, &user, cart.cart()).await?;
    flow.submit_payment(cart.cart(), form.payment_method, form.card.as_ref())?;
    store_flow(&session, &flow).await?;
    tracing::info!(method = ?form.payment_method, "Payment step completed");
    Ok(Json(CheckoutView::new(&flow, cart.cart())))
}

/// Return to an earlier step.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn back(
    RequireAuth(user): RequireAuth,
    session: Session,
    cart: SessionCart,
    Json(form): Json<BackForm>,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session, &user, cart.cart()).await?;
    flow.back_to(form.step)?;
    store_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::new(&flow, cart.cart())))
}

/// Place the order and empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    mut cart: SessionCart,
) -> Result<Json<CheckoutView>> {
    let mut flow = load_flow(&session, &user, cart.cart()).await?;
    state.simulate_latency().await;

    let order_id = state.next_order_id();
    let order = flow.place_order(cart.store(), order_id)?;
    tracing::info!(
        order_id = %order.order_id,
        total = %order.total,
        lines = order.items.len(),
        "Order placed"
    );
    add_breadcrumb("checkout", "Order placed", &[("order_id", &order_id.to_string())]);

    let cart = cart.save().await?;
    store_flow(&session, &flow).await?;
    Ok(Json(CheckoutView::new(&flow, &cart)))
}
