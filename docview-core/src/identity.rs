//! Identity types for document-view entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Property identifier. Server-assigned, opaque to the engine.
pub type PropertyId = String;

/// View identifier. System views use readable ids such as `all-people`.
pub type ViewId = String;

/// Record identifier.
pub type RecordId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 identifier for client-created sub-entities
/// (select options, draft views). Timestamp-sortable.
pub fn new_entity_id() -> String {
    Uuid::now_v7().to_string()
}
