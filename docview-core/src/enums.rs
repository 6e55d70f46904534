//! Enum types for document-view entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// PROPERTY TYPES
// ============================================================================

/// Client-side property type tag. Serialized in upper-snake-case
/// (`MULTI_SELECT`); the server tag comes from the registry. Deserializing
/// accepts either tag form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Text,
    Textarea,
    Number,
    Date,
    DateRange,
    Select,
    MultiSelect,
    Checkbox,
    Relation,
    Person,
    Url,
    Email,
    Phone,
    File,
    Formula,
    Rollup,
    CreatedTime,
    LastEditedTime,
    CreatedBy,
    LastEditedBy,
    Icon,
    Image,
}

impl PropertyType {
    /// Every property type, in declaration order.
    pub const ALL: [PropertyType; 22] = [
        PropertyType::Text,
        PropertyType::Textarea,
        PropertyType::Number,
        PropertyType::Date,
        PropertyType::DateRange,
        PropertyType::Select,
        PropertyType::MultiSelect,
        PropertyType::Checkbox,
        PropertyType::Relation,
        PropertyType::Person,
        PropertyType::Url,
        PropertyType::Email,
        PropertyType::Phone,
        PropertyType::File,
        PropertyType::Formula,
        PropertyType::Rollup,
        PropertyType::CreatedTime,
        PropertyType::LastEditedTime,
        PropertyType::CreatedBy,
        PropertyType::LastEditedBy,
        PropertyType::Icon,
        PropertyType::Image,
    ];

    /// Client wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Text => "TEXT",
            PropertyType::Textarea => "TEXTAREA",
            PropertyType::Number => "NUMBER",
            PropertyType::Date => "DATE",
            PropertyType::DateRange => "DATE_RANGE",
            PropertyType::Select => "SELECT",
            PropertyType::MultiSelect => "MULTI_SELECT",
            PropertyType::Checkbox => "CHECKBOX",
            PropertyType::Relation => "RELATION",
            PropertyType::Person => "PERSON",
            PropertyType::Url => "URL",
            PropertyType::Email => "EMAIL",
            PropertyType::Phone => "PHONE",
            PropertyType::File => "FILE",
            PropertyType::Formula => "FORMULA",
            PropertyType::Rollup => "ROLLUP",
            PropertyType::CreatedTime => "CREATED_TIME",
            PropertyType::LastEditedTime => "LAST_EDITED_TIME",
            PropertyType::CreatedBy => "CREATED_BY",
            PropertyType::LastEditedBy => "LAST_EDITED_BY",
            PropertyType::Icon => "ICON",
            PropertyType::Image => "IMAGE",
        }
    }

    /// Whether values of this type are drawn from `options`.
    pub fn has_options(&self) -> bool {
        matches!(self, PropertyType::Select | PropertyType::MultiSelect)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = PropertyTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_token(s);
        PropertyType::ALL
            .iter()
            .copied()
            .find(|ty| normalize_token(ty.as_str()) == normalized)
            .ok_or_else(|| PropertyTypeParseError(s.to_string()))
    }
}

/// Error when parsing an invalid property type tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTypeParseError(pub String);

impl fmt::Display for PropertyTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid property type: {}", self.0)
    }
}

impl std::error::Error for PropertyTypeParseError {}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// VIEW TYPES
// ============================================================================

/// Presentation type of a view. The engine never renders; the type only
/// selects which frozen-property config applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewType {
    #[default]
    Table,
    Board,
    Kanban,
    Calendar,
    Gallery,
    List,
    Timeline,
}

// ============================================================================
// RULE ENUMS
// ============================================================================

/// Filter operator. Which operators apply to a property is decided by the
/// registry's per-type catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Before,
    After,
    OnOrBefore,
    OnOrAfter,
    Checked,
    Unchecked,
    In,
    NotIn,
    ContainsAll,
}

impl FilterOperator {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::GreaterThanOrEqual => "greater_than_or_equal",
            FilterOperator::LessThanOrEqual => "less_than_or_equal",
            FilterOperator::Before => "before",
            FilterOperator::After => "after",
            FilterOperator::OnOrBefore => "on_or_before",
            FilterOperator::OnOrAfter => "on_or_after",
            FilterOperator::Checked => "checked",
            FilterOperator::Unchecked => "unchecked",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::ContainsAll => "contains_all",
        }
    }

    /// Whether a rule with this operator must carry a value.
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            FilterOperator::IsEmpty
                | FilterOperator::IsNotEmpty
                | FilterOperator::Checked
                | FilterOperator::Unchecked
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Relation of a filter rule to its immediate predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Direction for moving a sort rule within its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP verb of a resolved endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// STRING CONVERSIONS
// ============================================================================

pub(crate) fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
