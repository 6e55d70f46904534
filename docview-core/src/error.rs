//! Error types for document-view operations

use crate::{FilterOperator, PropertyType};
use std::fmt;
use thiserror::Error;

/// Kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Property,
    View,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            EntityKind::Property => "property",
            EntityKind::View => "view",
        };
        write!(f, "{}", value)
    }
}

/// Local validation errors. Raised before any network call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Operator {operator} is not valid for {property_type} property {property_id}")]
    OperatorNotAllowed {
        property_id: String,
        property_type: PropertyType,
        operator: FilterOperator,
    },

    #[error("Filter on {property_id} with operator {operator} requires a value")]
    MissingFilterValue {
        property_id: String,
        operator: FilterOperator,
    },

    #[error("Invalid filter value for {property_id}: {reason}")]
    InvalidFilterValue { property_id: String, reason: String },

    #[error("Property {property_id} is already sorted")]
    DuplicateSort { property_id: String },

    #[error("Index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Policy forbids {action} on property {property_id}{}", reason_suffix(.reason))]
    PolicyViolation {
        property_id: String,
        action: PolicyAction,
        reason: Option<String>,
    },

    #[error("Required property {property_id} is not visible in view {view_id}")]
    RequiredPropertyHidden { view_id: String, property_id: String },

    #[error("Properties {first} and {second} share order {order}")]
    DuplicateOrder {
        first: String,
        second: String,
        order: i32,
    },

    #[error("Default view {view_id} cannot be deleted")]
    DefaultViewDeletion { view_id: String },

    #[error("Operation {operation} requires {id}")]
    MissingEndpointId {
        operation: &'static str,
        id: &'static str,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Bulk {operation} requires at least one record id")]
    EmptyBatch { operation: &'static str },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!(" ({})", reason),
        None => String::new(),
    }
}

/// Policy-gated actions on a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyAction {
    Delete,
    Hide,
    Edit,
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PolicyAction::Delete => "delete",
            PolicyAction::Hide => "hide",
            PolicyAction::Edit => "edit",
        };
        write!(f, "{}", value)
    }
}

/// Reference to an id absent from the currently loaded configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} not found: {id}")]
pub struct NotFoundError {
    pub kind: EntityKind,
    pub id: String,
}

impl NotFoundError {
    pub fn property(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Property,
            id: id.into(),
        }
    }

    pub fn view(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::View,
            id: id.into(),
        }
    }
}

/// Transport-level failures (connection refused, timeout, unreadable body).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Master error type for engine operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocViewError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),
}

/// Result type alias for engine operations.
pub type DocViewResult<T> = Result<T, DocViewError>;

// =============================================================================
// TESTS
// =============================================================================
