//! REST client and list caches for the stockroom inventory API.
//!
//! [`api::InventoryApi`] wraps every endpoint the dashboard consumes.
//! [`cache::ListCache`] keeps one remote collection in memory, reloading
//! it wholesale after each write, and [`dashboard::Dashboard`] ties the
//! product, owner and stock ledger caches together.

pub mod api;
pub mod cache;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod error;
