//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?q=&category=&min_price=&max_price=)
//! GET  /products/featured      - Featured products
//! GET  /products/best-sellers  - Best sellers
//! GET  /products/categories    - Category list
//! GET  /products/{id}          - Product detail with related products
//!
//! # Cart
//! GET  /cart                   - Cart contents and totals
//! POST /cart/add               - Add a product
//! POST /cart/update            - Set a line's quantity
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart badge count
//! POST /cart/coupon            - Apply a promotional code
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Current step and totals
//! POST /checkout/shipping      - Submit shipping step
//! POST /checkout/payment       - Submit payment step
//! POST /checkout/back          - Return to an earlier step
//! POST /checkout/order         - Place the order
//!
//! # Auth
//! POST /auth/login             - Login
//! POST /auth/register          - Registration form
//! POST /auth/register/verify   - Registration verification code
//! POST /auth/logout            - Logout
//! POST /auth/forgot-password   - Password reset request
//!
//! # Account (requires auth)
//! GET  /account                - Profile
//! PUT  /account                - Edit profile
//! POST /account/password       - Change password
//! GET  /account/orders         - Order history
//!
//! # Admin (requires the admin account)
//! GET    /admin/products       - Product table (?search=&sort=&direction=)
//! POST   /admin/products       - Add product
//! PUT    /admin/products/{id}  - Edit product
//! DELETE /admin/products/{id}  - Delete product
//! GET    /admin/stats          - Sales dashboard
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/best-sellers", get(products::best_sellers))
        .route("/categories", get(products::categories))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/coupon", post(cart::coupon))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/shipping", post(checkout::shipping))
        .route("/payment", post(checkout::payment))
        .route("/back", post(checkout::back))
        .route("/order", post(checkout::place_order))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/register/verify", post(auth::verify))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index).put(account::update))
        .route("/password", post(account::change_password))
        .route("/orders", get(account::orders))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(admin::products).post(admin::create))
        .route(
            "/products/{id}",
            put(admin::update).delete(admin::delete),
        )
        .route("/stats", get(admin::stats))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
}
