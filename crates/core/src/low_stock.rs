//! Low-stock derivation and the home-screen summary counts.

use serde::Serialize;

use crate::product::Product;

/// Threshold used when the caller does not pick one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Whether a product's item count is strictly below `threshold`.
pub fn is_low_stock(product: &Product, threshold: u32) -> bool {
    product.product_quantity < threshold
}

/// Products whose item count is strictly below `threshold`, in list order.
///
/// A product sitting exactly on the threshold is not low.
pub fn derive_low_stock(products: &[Product], threshold: u32) -> Vec<&Product> {
    products
        .iter()
        .filter(|p| is_low_stock(p, threshold))
        .collect()
}

/// Counts shown on the dashboard home cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StockSummary {
    pub products: usize,
    pub low_stock: usize,
    pub stock_ins: usize,
    pub stock_outs: usize,
    pub threshold: u32,
}

impl StockSummary {
    pub fn compute(products: &[Product], stock_ins: usize, stock_outs: usize, threshold: u32) -> Self {
        Self {
            products: products.len(),
            low_stock: products.iter().filter(|p| is_low_stock(p, threshold)).count(),
            stock_ins,
            stock_outs,
            threshold,
        }
    }
}
