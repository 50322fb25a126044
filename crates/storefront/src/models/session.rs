//! Session-related types.
//!
//! Everything a visitor accumulates (cart, sign-in, checkout progress, the
//! admin's product working copy) lives in their session under these keys.

/// Session keys.
pub mod keys {
    /// Key for the signed-in user's profile.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the serialized cart slot.
    pub const CART: &str = "cart";

    /// Key for the in-progress checkout.
    pub const CHECKOUT: &str = "checkout";

    /// Key for a registration awaiting its verification code.
    pub const PENDING_REGISTRATION: &str = "pending_registration";

    /// Key for the admin's editable product list.
    pub const ADMIN_CATALOG: &str = "admin_catalog";

    /// Key for the admin product table's search and sort settings.
    pub const ADMIN_TABLE: &str = "admin_table";
}
