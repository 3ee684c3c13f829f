//! Stock movements (stock in / stock out ledger entries).

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::product::Unit;
use crate::types::{Draft, EntityId, Identified, Timestamp};

/// Whether a movement adds to or removes from a product's stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// The product a movement refers to.
///
/// The ledger endpoints populate `product_id` with `{ _id, name }`, but
/// older entries (and write responses) carry just the id string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRef {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: Option<String>,
}

impl<'de> Deserialize<'de> for ProductRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Id(String),
            Populated {
                #[serde(rename = "_id")]
                id: String,
                #[serde(default)]
                name: Option<String>,
            },
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Id(id) => ProductRef { id, name: None },
            Wire::Populated { id, name } => ProductRef { id, name },
        })
    }
}

/// A single stock in or stock out ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(rename = "_id")]
    pub id: EntityId,
    #[serde(rename = "product_id")]
    pub product: ProductRef,
    pub quantity: u32,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub note: Option<String>,
    pub date: Timestamp,
    /// Absent on most stored entries; the client stamps it from the
    /// endpoint the entry was read from.
    #[serde(rename = "type", default)]
    pub direction: Option<Direction>,
}

impl Identified for StockMovement {
    fn id(&self) -> &str {
        &self.id
    }
}

/// JSON body for `POST /api/stock/in` and `POST /api/stock/out`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct StockMovementDraft {
    #[validate(length(min = 1, message = "Product is required"))]
    pub product_id: EntityId,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub direction: Direction,
}

impl StockMovementDraft {
    pub fn stock_in(product_id: impl Into<EntityId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            unit: None,
            note: None,
            direction: Direction::In,
        }
    }

    pub fn stock_out(product_id: impl Into<EntityId>, quantity: u32) -> Self {
        Self {
            direction: Direction::Out,
            ..Self::stock_in(product_id, quantity)
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Draft for StockMovementDraft {
    fn validate_on(&self, _today: NaiveDate) -> Result<(), CoreError> {
        self.validate()?;
        if self.unit.is_none() {
            return Err(CoreError::Validation("unit: Unit is required".to_string()));
        }
        Ok(())
    }
}
