//! Property type registry
//!
//! Two immutable lookup tables: client→server type tags and per-type filter
//! operator catalogs. This is the only place the client tag (`MULTI_SELECT`)
//! is translated to the server tag (`multiSelect`).

use crate::{FilterOperator, PropertyType};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Operator entry of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub operator: FilterOperator,
    pub label: &'static str,
    pub requires_value: bool,
}

const fn op(
    operator: FilterOperator,
    label: &'static str,
    requires_value: bool,
) -> OperatorDescriptor {
    OperatorDescriptor {
        operator,
        label,
        requires_value,
    }
}

/// Catalog families. Several property types share one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCatalog {
    Text,
    Number,
    Date,
    Checkbox,
    Select,
    MultiSelect,
}

const TEXT_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::Contains, "Contains", true),
    op(FilterOperator::NotContains, "Does not contain", true),
    op(FilterOperator::Equals, "Is", true),
    op(FilterOperator::NotEquals, "Is not", true),
    op(FilterOperator::StartsWith, "Starts with", true),
    op(FilterOperator::EndsWith, "Ends with", true),
    op(FilterOperator::IsEmpty, "Is empty", false),
    op(FilterOperator::IsNotEmpty, "Is not empty", false),
];

const NUMBER_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::Equals, "=", true),
    op(FilterOperator::NotEquals, "≠", true),
    op(FilterOperator::GreaterThan, ">", true),
    op(FilterOperator::LessThan, "<", true),
    op(FilterOperator::GreaterThanOrEqual, "≥", true),
    op(FilterOperator::LessThanOrEqual, "≤", true),
    op(FilterOperator::IsEmpty, "Is empty", false),
    op(FilterOperator::IsNotEmpty, "Is not empty", false),
];

const DATE_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::Equals, "Is", true),
    op(FilterOperator::Before, "Is before", true),
    op(FilterOperator::After, "Is after", true),
    op(FilterOperator::OnOrBefore, "Is on or before", true),
    op(FilterOperator::OnOrAfter, "Is on or after", true),
    op(FilterOperator::IsEmpty, "Is empty", false),
    op(FilterOperator::IsNotEmpty, "Is not empty", false),
];

const CHECKBOX_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::Checked, "Is checked", false),
    op(FilterOperator::Unchecked, "Is not checked", false),
];

const SELECT_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::Equals, "Is", true),
    op(FilterOperator::NotEquals, "Is not", true),
    op(FilterOperator::IsEmpty, "Is empty", false),
    op(FilterOperator::IsNotEmpty, "Is not empty", false),
];

const MULTI_SELECT_OPERATORS: &[OperatorDescriptor] = &[
    op(FilterOperator::In, "Contains any of", true),
    op(FilterOperator::NotIn, "Contains none of", true),
    op(FilterOperator::ContainsAll, "Contains all of", true),
    op(FilterOperator::IsEmpty, "Is empty", false),
    op(FilterOperator::IsNotEmpty, "Is not empty", false),
];

static SERVER_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("TEXT", "text"),
        ("TEXTAREA", "textarea"),
        ("NUMBER", "number"),
        ("DATE", "date"),
        ("DATE_RANGE", "dateRange"),
        ("SELECT", "select"),
        ("MULTI_SELECT", "multiSelect"),
        ("CHECKBOX", "checkbox"),
        ("RELATION", "relation"),
        ("PERSON", "relation"),
        ("URL", "url"),
        ("EMAIL", "email"),
        ("PHONE", "phone"),
        ("FILE", "file"),
        ("FORMULA", "text"),
        ("ROLLUP", "text"),
        ("CREATED_TIME", "date"),
        ("LAST_EDITED_TIME", "date"),
        ("CREATED_BY", "text"),
        ("LAST_EDITED_BY", "text"),
        ("ICON", "text"),
        ("IMAGE", "url"),
    ])
});

/// Translate a client type tag to the server tag. Unmapped tags fall back to
/// a lower-cased copy of the input.
pub fn to_server_type(client_type: &str) -> String {
    match SERVER_TYPES.get(client_type) {
        Some(server) => (*server).to_string(),
        None => client_type.to_lowercase(),
    }
}

impl PropertyType {
    /// Server wire tag for this type.
    pub fn server_type(&self) -> &'static str {
        SERVER_TYPES.get(self.as_str()).copied().unwrap_or("text")
    }

    /// Catalog family used for filtering on this type.
    pub fn operator_catalog(&self) -> OperatorCatalog {
        match self {
            PropertyType::Number => OperatorCatalog::Number,
            PropertyType::Date
            | PropertyType::DateRange
            | PropertyType::CreatedTime
            | PropertyType::LastEditedTime => OperatorCatalog::Date,
            PropertyType::Checkbox => OperatorCatalog::Checkbox,
            PropertyType::Select => OperatorCatalog::Select,
            PropertyType::MultiSelect => OperatorCatalog::MultiSelect,
            _ => OperatorCatalog::Text,
        }
    }
}

impl OperatorCatalog {
    pub fn operators(&self) -> &'static [OperatorDescriptor] {
        match self {
            OperatorCatalog::Text => TEXT_OPERATORS,
            OperatorCatalog::Number => NUMBER_OPERATORS,
            OperatorCatalog::Date => DATE_OPERATORS,
            OperatorCatalog::Checkbox => CHECKBOX_OPERATORS,
            OperatorCatalog::Select => SELECT_OPERATORS,
            OperatorCatalog::MultiSelect => MULTI_SELECT_OPERATORS,
        }
    }
}

/// Operator catalog for a property type. Never empty; the first entry is the
/// default operator.
pub fn operators_for(property_type: PropertyType) -> &'static [OperatorDescriptor] {
    property_type.operator_catalog().operators()
}

/// Operator catalog for a raw type tag. Unknown tags use the TEXT catalog.
pub fn operators_for_tag(tag: &str) -> &'static [OperatorDescriptor] {
    tag.parse::<PropertyType>()
        .map(operators_for)
        .unwrap_or(TEXT_OPERATORS)
}

/// Default operator for a property type.
pub fn default_operator(property_type: PropertyType) -> FilterOperator {
    operators_for(property_type)[0].operator
}

/// Whether `operator` belongs to the catalog of `property_type`.
pub fn supports_operator(property_type: PropertyType, operator: FilterOperator) -> bool {
    operators_for(property_type)
        .iter()
        .any(|descriptor| descriptor.operator == operator)
}
