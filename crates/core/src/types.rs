use chrono::NaiveDate;

use crate::error::CoreError;

/// Server-assigned identifiers are opaque strings (`_id` on the wire).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// An entity that carries a server-assigned identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Client-side validation run on a write model before it is submitted.
///
/// `today` is passed in rather than read from the clock so date rules are
/// deterministic under test.
pub trait Draft {
    fn validate_on(&self, today: NaiveDate) -> Result<(), CoreError>;
}
