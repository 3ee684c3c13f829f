//! Owner (supplier) entity and its write model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Draft, EntityId, Identified, Timestamp};
use crate::validation::validate_not_future;

/// A supplier/company that products are associated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub company_name: String,
    pub owner_name: String,
    pub phone: String,
    #[serde(default)]
    pub gst: Option<String>,
    #[serde(default)]
    pub register: Option<Timestamp>,
}

impl Identified for Owner {
    fn id(&self) -> &str {
        &self.id
    }
}

/// JSON body for `POST /api/owner/create`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct OwnerDraft {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Owner name is required"))]
    pub owner_name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,
    pub register: NaiveDate,
}

impl Draft for OwnerDraft {
    fn validate_on(&self, today: NaiveDate) -> Result<(), CoreError> {
        self.validate()?;
        if self.phone.trim().is_empty() {
            return Err(CoreError::Validation("phone: Phone is required".to_string()));
        }
        validate_not_future(self.register, today, "Register date")
    }
}
