//! Client-side text search over cached lists.
//!
//! Matching is a case-insensitive substring test against each entity's
//! searchable fields. It runs on every keystroke, so it allocates only the
//! lower-cased query and never touches the source list.

use crate::owner::Owner;
use crate::product::Product;
use crate::stock::StockMovement;

/// An entity with text fields the search box matches against.
pub trait Searchable {
    /// Fields checked by [`matches`], in display order.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Product {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.owner_name.as_str(),
            self.description.as_str(),
        ]
    }
}

impl Searchable for Owner {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.company_name.as_str(),
            self.owner_name.as_str(),
            self.phone.as_str(),
        ];
        fields.extend(self.gst.as_deref());
        fields
    }
}

impl Searchable for StockMovement {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(2);
        fields.extend(self.product.name.as_deref());
        fields.extend(self.note.as_deref());
        fields
    }
}

/// Whether any searchable field of `item` contains `needle`.
///
/// `needle` must already be lower-cased.
pub fn matches<T: Searchable>(item: &T, needle: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filter `items` by a free-text query.
///
/// A blank query returns every item in its original order.
pub fn filter_items<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| matches(*item, &needle)).collect()
}
