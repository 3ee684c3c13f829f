//! Product entity and its write model.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Draft, EntityId, Identified, Timestamp};
use crate::validation::{description_rule, validate_images, ImageUpload};

/// Measurement unit for a product's `quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Liter,
    Piece,
    Packet,
    Box,
    Gram,
    Ml,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Liter => "liter",
            Unit::Piece => "piece",
            Unit::Packet => "packet",
            Unit::Box => "box",
            Unit::Gram => "gram",
            Unit::Ml => "ml",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product as returned by the inventory API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    /// Secondary price.
    #[serde(rename = "price_BCN", default)]
    pub price_bcn: Option<f64>,
    /// Measurement amount, expressed in `unit`.
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub unit: Option<Unit>,
    /// Number of items in stock. This is the stock level that low-stock
    /// derivation compares against.
    #[serde(default)]
    pub product_quantity: u32,
    #[serde(default)]
    pub register: Option<Timestamp>,
    #[serde(default)]
    pub expiry: Option<Timestamp>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: EntityId,
    #[serde(default)]
    pub owner_name: String,
    /// Stored image filenames or URLs. The API sends either a single
    /// string or an array.
    #[serde(rename = "image", default, deserialize_with = "one_or_many")]
    pub images: Vec<String>,
}

impl Identified for Product {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

/// Older records store an unselected unit as `""`.
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Unit>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Unit::deserialize(serde::de::value::StringDeserializer::<D::Error>::new(s))
            .map(Some),
    }
}

/// Form data for creating or updating a product.
///
/// Sent as multipart: every scalar field becomes a text part, each new
/// image becomes an `image` file part, and on update each kept image is
/// repeated as an `existingImages` part.
#[derive(Debug, Clone, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Price BCN cannot be negative"))]
    pub price_bcn: Option<f64>,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: f64,
    pub unit: Unit,
    pub product_quantity: u32,
    pub register: NaiveDate,
    pub expiry: Option<NaiveDate>,
    #[validate(custom(function = "description_rule"))]
    pub description: String,
    #[validate(length(min = 1, message = "Owner is required"))]
    pub owner_id: EntityId,
    pub owner_name: String,
    /// Images already stored on the server that should be kept.
    pub existing_images: Vec<String>,
    /// Newly selected image files.
    pub images: Vec<ImageUpload>,
}

impl Draft for ProductDraft {
    fn validate_on(&self, _today: NaiveDate) -> Result<(), CoreError> {
        self.validate()?;
        validate_images(&self.existing_images, &self.images)
    }
}

impl ProductDraft {
    /// Pre-fill an update form from a stored product, keeping its images.
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            price_bcn: product.price_bcn,
            quantity: product.quantity,
            unit: product.unit.unwrap_or(Unit::Piece),
            product_quantity: product.product_quantity,
            register: product
                .register
                .map(|ts| ts.date_naive())
                .unwrap_or_default(),
            expiry: product.expiry.map(|ts| ts.date_naive()),
            description: product.description.clone(),
            owner_id: product.owner_id.clone(),
            owner_name: product.owner_name.clone(),
            existing_images: product.images.clone(),
            images: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
