//! HomeStore cart
//!
//! Client-side cart ledger and catalog client for the HomeStore storefront.
//! The cart is a pure local ledger: a single [`store::CartStore`] owns the
//! ordered line items, merges additions on the `(product, variant)` identity
//! key, and persists synchronously to a key-value store after every
//! mutation. Product and variant data comes from the read-only
//! [`catalog::CatalogClient`]; stock truth stays with the catalog service
//! and is checked by callers before lines are added.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod items;
pub mod products;
pub mod records;
pub mod storage;
pub mod store;
