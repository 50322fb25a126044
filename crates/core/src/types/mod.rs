//! Core types for Riziky-Beauté.
//!
//! Type-safe wrappers for IDs, prices and email addresses.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
