//! Riziky-Beauté Core - Shop domain library.
//!
//! This crate holds the shop's domain logic, shared by the `storefront`
//! service and the integration tests:
//! - the cart state container and its persistence
//! - the demo product catalog
//! - account, checkout and admin flows
//!
//! # Architecture
//!
//! Apart from [`storage::FileStore`], the core crate does no I/O and has no
//! HTTP types. Stateful pieces ([`cart::CartStore`], [`checkout::CheckoutFlow`],
//! [`admin::AdminCatalog`]) are owned values handed to whoever drives them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails
//! - [`storage`] - Durable string key-value slots
//! - [`cart`] - Cart lines, totals and the persisted cart store
//! - [`catalog`] - Products, search and filtering
//! - [`account`] - Login, registration and profile edits
//! - [`checkout`] - Multi-step checkout
//! - [`admin`] - Product table, product editing and sales statistics

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod storage;
pub mod types;

pub use cart::{Cart, CartItem, CartStore};
pub use catalog::{Catalog, Product};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
