//! Multi-step checkout.
//!
//! [`CheckoutFlow`] walks a customer through
//! `Shipping -> Payment -> Review -> Confirmation`. The flow itself is plain
//! serializable state so the web layer can keep it in the session between
//! requests; the cart is passed in on each call instead of being owned here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::UserProfile;
use crate::cart::{Cart, CartItem, CartStore};
use crate::storage::KeyValueStore;
use crate::types::{Email, OrderId};

/// Orders strictly above this subtotal ship for free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Flat shipping estimate shown on the cart page.
pub const CART_PAGE_SHIPPING: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

const DEFAULT_COUNTRY: &str = "France";

/// Errors raised while checking out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// The cart is empty and no order has been placed yet.
    #[error("cart is empty")]
    EmptyCart,

    /// The requested action belongs to another step.
    #[error("checkout is at the {actual:?} step, expected {expected:?}")]
    WrongStep {
        expected: CheckoutStep,
        actual: CheckoutStep,
    },

    /// `back_to` targeted the current or a later step, or the order is placed.
    #[error("cannot go back from {from:?} to {to:?}")]
    InvalidBackStep { from: CheckoutStep, to: CheckoutStep },

    /// A required shipping or payment field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Shipping email is malformed.
    #[error("invalid email address")]
    InvalidEmail,

    /// Card payment chosen without card details.
    #[error("card details are required for card payments")]
    MissingCard,

    /// Card number, expiry or CVV is malformed.
    #[error("invalid card {0}")]
    InvalidCard(&'static str),

    /// Coupon field submitted blank.
    #[error("coupon code is empty")]
    EmptyCoupon,

    /// Coupon code not recognized.
    #[error("coupon code is not valid")]
    InvalidCoupon,
}

/// Checkout steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Shipping,
    Payment,
    Review,
    Confirmation,
}

/// Delivery speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl ShippingMethod {
    /// Price of the method before the free-shipping rule.
    #[must_use]
    pub const fn cost(self) -> Decimal {
        match self {
            Self::Standard => Decimal::from_parts(599, 0, 0, false, 2),
            Self::Express => Decimal::from_parts(1299, 0, 0, false, 2),
        }
    }
}

/// Shipping cost for `subtotal`: free above the threshold, else the method's price.
#[must_use]
pub fn shipping_cost(subtotal: Decimal, method: ShippingMethod) -> Decimal {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        method.cost()
    }
}

/// Delivery address and contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
}

impl ShippingInfo {
    /// Prefill from the signed-in customer's profile.
    #[must_use]
    pub fn prefilled(user: Option<&UserProfile>) -> Self {
        let Some(user) = user else {
            return Self {
                country: DEFAULT_COUNTRY.to_owned(),
                ..Self::default()
            };
        };
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            address: user.address.clone().unwrap_or_default(),
            city: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_owned(),
            phone: user.phone.clone().unwrap_or_default(),
            email: user.email.to_string(),
        }
    }

    fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            (&self.first_name, "first_name"),
            (&self.last_name, "last_name"),
            (&self.address, "address"),
            (&self.city, "city"),
            (&self.postal_code, "postal_code"),
            (&self.country, "country"),
            (&self.phone, "phone"),
            (&self.email, "email"),
        ];
        if let Some((_, field)) = required.into_iter().find(|(value, _)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(field));
        }
        Email::parse(&self.email).map_err(|_| CheckoutError::InvalidEmail)?;
        Ok(())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
}

/// Card form as submitted. Never stored as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    fn digits(&self) -> String {
        self.card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    fn validate(&self) -> Result<(), CheckoutError> {
        if self.card_holder.trim().is_empty() {
            return Err(CheckoutError::MissingField("card_holder"));
        }

        let digits = self.digits();
        if !(13..=19).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CheckoutError::InvalidCard("number"));
        }

        let expiry_ok = self
            .expiry
            .trim()
            .split_once('/')
            .filter(|(mm, yy)| {
                mm.len() == 2
                    && yy.len() == 2
                    && yy.bytes().all(|b| b.is_ascii_digit())
                    && mm.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
            })
            .is_some();
        if !expiry_ok {
            return Err(CheckoutError::InvalidCard("expiry"));
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CheckoutError::InvalidCard("cvv"));
        }
        Ok(())
    }
}

/// What the flow remembers about the chosen payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub method: PaymentMethod,
    pub card_holder: Option<String>,
    /// Last four digits of the card number.
    pub card_last4: Option<String>,
}

/// Money totals of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CheckoutTotals {
    fn new(subtotal: Decimal, shipping: Decimal) -> Self {
        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
        }
    }
}

/// Record of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Where the confirmation email goes.
    pub email: String,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    pub placed_at: DateTime<Utc>,
}

/// State of one customer's checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    shipping: ShippingInfo,
    save_shipping_info: bool,
    shipping_method: ShippingMethod,
    payment: Option<PaymentSummary>,
    confirmation: Option<OrderConfirmation>,
}

impl CheckoutFlow {
    /// Start a checkout, prefilling the address from `user`.
    #[must_use]
    pub fn new(user: Option<&UserProfile>) -> Self {
        Self {
            step: CheckoutStep::Shipping,
            shipping: ShippingInfo::prefilled(user),
            save_shipping_info: true,
            shipping_method: ShippingMethod::default(),
            payment: None,
            confirmation: None,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Shipping form contents.
    #[must_use]
    pub const fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    /// Whether the customer asked to remember the address.
    #[must_use]
    pub const fn save_shipping_info(&self) -> bool {
        self.save_shipping_info
    }

    /// Selected delivery speed.
    #[must_use]
    pub const fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    /// Selected payment, once the payment step is done.
    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentSummary> {
        self.payment.as_ref()
    }

    /// The placed order, once confirmed.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Refuse to continue over an empty cart unless the order is already placed.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` when `cart` is empty before
    /// confirmation.
    pub fn ensure_active(&self, cart: &Cart) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Confirmation && cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(())
    }

    /// Totals for `cart` with the current shipping method.
    ///
    /// After confirmation the totals of the placed order are returned, since
    /// the cart has been emptied by then.
    #[must_use]
    pub fn summary(&self, cart: &Cart) -> CheckoutTotals {
        if let Some(order) = &self.confirmation {
            return CheckoutTotals::new(order.subtotal, order.shipping);
        }
        let subtotal = cart.total_price();
        CheckoutTotals::new(subtotal, shipping_cost(subtotal, self.shipping_method))
    }

    /// Complete the shipping step.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the flow is not at the shipping step, the
    /// cart is empty, or a field is blank or malformed.
    pub fn submit_shipping(
        &mut self,
        cart: &Cart,
        info: ShippingInfo,
        method: ShippingMethod,
        save_shipping_info: bool,
    ) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Shipping)?;
        self.ensure_active(cart)?;
        info.validate()?;

        self.shipping = info;
        self.shipping_method = method;
        self.save_shipping_info = save_shipping_info;
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Complete the payment step.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the flow is not at the payment step, the cart
    /// is empty, or card details are missing or malformed for a card payment.
    pub fn submit_payment(
        &mut self,
        cart: &Cart,
        method: PaymentMethod,
        card: Option<&CardDetails>,
    ) -> Result<(), CheckoutError> {
        self.expect_step(CheckoutStep::Payment)?;
        self.ensure_active(cart)?;

        let summary = match method {
            PaymentMethod::CreditCard => {
                let card = card.ok_or(CheckoutError::MissingCard)?;
                card.validate()?;
                let digits = card.digits();
                let last4 = digits.get(digits.len().saturating_sub(4)..).map(str::to_owned);
                PaymentSummary {
                    method,
                    card_holder: Some(card.card_holder.trim().to_owned()),
                    card_last4: last4,
                }
            }
            PaymentMethod::Paypal => PaymentSummary {
                method,
                card_holder: None,
                card_last4: None,
            },
        };

        self.payment = Some(summary);
        self.step = CheckoutStep::Review;
        Ok(())
    }

    /// Return to an earlier step to edit it.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidBackStep` unless `step` precedes the
    /// current step and the order has not been placed.
    pub fn back_to(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Confirmation || step >= self.step {
            return Err(CheckoutError::InvalidBackStep {
                from: self.step,
                to: step,
            });
        }
        self.step = step;
        Ok(())
    }

    /// Place the order: snapshot the cart, empty it and confirm.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the flow is not at the review step or the
    /// cart is empty. The cart is untouched on error.
    pub fn place_order<S: KeyValueStore>(
        &mut self,
        cart: &mut CartStore<S>,
        order_id: OrderId,
    ) -> Result<&OrderConfirmation, CheckoutError> {
        self.expect_step(CheckoutStep::Review)?;
        self.ensure_active(cart.cart())?;

        let totals = self.summary(cart.cart());
        let payment_method = self
            .payment
            .as_ref()
            .map_or(PaymentMethod::default(), |p| p.method);
        let order = OrderConfirmation {
            order_id,
            items: cart.items().to_vec(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.total,
            email: self.shipping.email.clone(),
            shipping_method: self.shipping_method,
            payment_method,
            placed_at: Utc::now(),
        };

        cart.clear();
        self.step = CheckoutStep::Confirmation;
        Ok(self.confirmation.insert(order))
    }

    fn expect_step(&self, expected: CheckoutStep) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }
}

/// Totals shown on the cart page, before a shipping method is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub total_items: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CartSummary {
    /// Subtotal plus the flat shipping estimate (nothing for an empty cart).
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        let subtotal = cart.total_price();
        let shipping = if cart.is_empty() {
            Decimal::ZERO
        } else {
            CART_PAGE_SHIPPING
        };
        Self {
            total_items: cart.total_items(),
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
        }
    }
}

/// Try a promotional code and return the discount it grants.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCoupon` for a blank code and
/// `CheckoutError::InvalidCoupon` otherwise: no promotions are running.
pub fn apply_coupon(code: &str) -> Result<Decimal, CheckoutError> {
    if code.trim().is_empty() {
        return Err(CheckoutError::EmptyCoupon);
    }
    Err(CheckoutError::InvalidCoupon)
}
