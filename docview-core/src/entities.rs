//! Core entity structures

use crate::{
    new_entity_id, Combinator, FilterOperator, PropertyId, PropertyType, RecordId,
    SortDirection, Timestamp, ViewId, ViewType,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One choice of a SELECT / MULTI_SELECT property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
    pub color: String,
}

impl SelectOption {
    /// Create an option with a fresh client-side id.
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            label: label.into(),
            color: color.into(),
        }
    }
}

/// Column/field definition shared by every record of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub id: PropertyId,
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Unique within a view.
    pub order: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub frozen: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

fn default_true() -> bool {
    true
}

impl PropertyDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        property_type: PropertyType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            property_type,
            order: 0,
            visible: true,
            frozen: false,
            required: false,
            width: None,
            options: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

/// A persisted filter/sort/visibility configuration over a module's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub id: ViewId,
    pub module_type: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub view_type: ViewType,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_system_view: bool,
    #[serde(default)]
    pub filters: Vec<FilterRule>,
    #[serde(default)]
    pub sorts: Vec<SortRule>,
    #[serde(default)]
    pub visible_properties: BTreeSet<PropertyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<PropertyId>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,
}

/// One entry of a view's filter list. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub property_id: PropertyId,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// Relation to the preceding rule; absent on the first rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<Combinator>,
}

/// One entry of a view's sort list. Priority is the list position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRule {
    pub property_id: PropertyId,
    pub direction: SortDirection,
}

impl SortRule {
    pub fn new(property_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property_id: property_id.into(),
            direction,
        }
    }
}

/// Backend-declared constraint on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrozenProperty {
    pub property_id: PropertyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub allow_edit: bool,
    pub allow_hide: bool,
    pub allow_delete: bool,
}

/// Frozen/required-property policy for one module and view type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrozenPropertyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_type: Option<ViewType>,
    #[serde(default)]
    pub required_properties: BTreeSet<PropertyId>,
    #[serde(default)]
    pub frozen_properties: Vec<FrozenProperty>,
}

impl FrozenPropertyConfig {
    pub fn frozen_entry(&self, property_id: &str) -> Option<&FrozenProperty> {
        self.frozen_properties
            .iter()
            .find(|entry| entry.property_id == property_id)
    }

    pub fn is_required(&self, property_id: &str) -> bool {
        self.required_properties.contains(property_id)
    }
}

/// A module record. Opaque to the engine apart from type-directed checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEntity {
    pub id: RecordId,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ============================================================================
// MUTATION PAYLOADS
// ============================================================================

/// One entry of a batch visibility/order/freeze update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPropertyUpdate {
    pub property_id: PropertyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frozen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl ViewPropertyUpdate {
    pub fn new(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            ..Default::default()
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.frozen = Some(frozen);
        self
    }
}

/// Payload for creating or inserting a property. `property_type` is the
/// client tag; the façade sends the server tag.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub name: String,
    pub property_type: PropertyType,
    pub options: Vec<SelectOption>,
    pub width: Option<u32>,
    /// Anchor for `insert`; the new property lands right after it.
    pub insert_after: Option<PropertyId>,
}

impl NewProperty {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            options: Vec::new(),
            width: None,
            insert_after: None,
        }
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Wire body with the server type tag.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert("name".to_string(), self.name.clone().into());
        body.insert("type".to_string(), self.property_type.server_type().into());
        if !self.options.is_empty() {
            let options = self
                .options
                .iter()
                .map(|option| {
                    let mut entry = serde_json::Map::new();
                    entry.insert("id".to_string(), option.id.clone().into());
                    entry.insert("label".to_string(), option.label.clone().into());
                    entry.insert("color".to_string(), option.color.clone().into());
                    serde_json::Value::Object(entry)
                })
                .collect();
            body.insert("options".to_string(), serde_json::Value::Array(options));
        }
        if let Some(width) = self.width {
            body.insert("width".to_string(), width.into());
        }
        if let Some(anchor) = &self.insert_after {
            body.insert("insertAfter".to_string(), anchor.clone().into());
        }
        serde_json::Value::Object(body)
    }
}

/// Partial property update. Retyping goes through `change-type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// Caller-owned snapshot of a loaded view, passed to gated operations.
/// The engine never caches it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewContext {
    pub view: ViewDefinition,
    pub properties: Vec<PropertyDefinition>,
    pub frozen: FrozenPropertyConfig,
}

impl ViewContext {
    pub fn property(&self, property_id: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.id == property_id)
    }
}
