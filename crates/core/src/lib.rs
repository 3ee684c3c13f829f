//! Domain types and pure logic for the stockroom dashboard.
//!
//! Nothing in this crate performs I/O. The client crate fetches data from
//! the inventory API and hands it to the functions defined here for
//! validation, search and derived views.

pub mod error;
pub mod low_stock;
pub mod owner;
pub mod product;
pub mod search;
pub mod stock;
pub mod types;
pub mod validation;
