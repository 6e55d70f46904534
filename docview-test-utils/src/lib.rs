//! docview Test Utilities
//!
//! Shared test infrastructure for the docview workspace:
//! - Mock transport that records requests and replays canned responses
//! - Fixtures for common modules (tasks, people)
//! - Proptest generators for property definitions and filter rules

// Re-export core types for convenience
pub use docview_core::{
    ApiRequest, ApiResponse, FilterOperator, FilterRule, FrozenProperty, FrozenPropertyConfig,
    HttpMethod, PropertyDefinition, PropertyType, RecordEntity, SelectOption, SortDirection,
    SortRule, Transport, TransportError, ViewContext, ViewDefinition, ViewType,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// Transport double. Every request is recorded; responses are served in
/// FIFO order. An exhausted queue answers with a transport failure.
#[derive(Debug, Default)]
pub struct MockTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, status: u16, body: impl Into<String>) -> &Self {
        self.push(Ok(ApiResponse {
            status,
            body: body.into(),
        }))
    }

    /// Queue `{success: true, data}` with status 200.
    pub fn push_success(&self, data: Value) -> &Self {
        self.push_response(200, json!({"success": true, "data": data}).to_string())
    }

    /// Queue `{success: false, message}` with the given status.
    pub fn push_failure(&self, status: u16, message: &str) -> &Self {
        self.push_response(
            status,
            json!({"success": false, "data": null, "message": message}).to_string(),
        )
    }

    pub fn push_transport_error(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, response: Result<ApiResponse, TransportError>) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(response);
        self
    }

    /// Snapshot of every request sent so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::RequestFailed {
                    reason: "no canned response queued".to_string(),
                })
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn option(id: &str, color: &str) -> SelectOption {
    SelectOption {
        id: id.to_string(),
        label: id.replace('-', " "),
        color: color.to_string(),
    }
}

/// Task properties: title (required), status (select), tags (multi-select),
/// estimate, done, due.
pub fn task_properties() -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new("title", "Title", PropertyType::Text),
        PropertyDefinition::new("status", "Status", PropertyType::Select)
            .with_order(1)
            .with_options(vec![
                option("todo", "gray"),
                option("in-progress", "blue"),
                option("done", "green"),
            ]),
        PropertyDefinition::new("tags", "Tags", PropertyType::MultiSelect)
            .with_order(2)
            .with_options(vec![
                option("x", "red"),
                option("y", "yellow"),
                option("z", "purple"),
            ]),
        PropertyDefinition::new("estimate", "Estimate", PropertyType::Number).with_order(3),
        PropertyDefinition::new("done", "Done", PropertyType::Checkbox).with_order(4),
        PropertyDefinition::new("due", "Due", PropertyType::Date).with_order(5),
    ]
}

/// Tasks policy: `title` required, `status` frozen (no hide, no delete).
pub fn task_frozen_config() -> FrozenPropertyConfig {
    FrozenPropertyConfig {
        module_type: Some("tasks".to_string()),
        view_type: Some(ViewType::Table),
        required_properties: BTreeSet::from(["title".to_string()]),
        frozen_properties: vec![FrozenProperty {
            property_id: "status".to_string(),
            reason: Some("drives the board columns".to_string()),
            allow_edit: true,
            allow_hide: false,
            allow_delete: false,
        }],
    }
}

pub fn view(id: &str, module: &str, is_default: bool, visible: &[&str]) -> ViewDefinition {
    ViewDefinition {
        id: id.to_string(),
        module_type: module.to_string(),
        name: id.replace('-', " "),
        view_type: ViewType::Table,
        is_default,
        is_system_view: is_default,
        filters: Vec::new(),
        sorts: Vec::new(),
        visible_properties: visible.iter().map(|s| s.to_string()).collect(),
        group_by: None,
        config: Value::Null,
    }
}

/// Loaded tasks view with every property visible.
pub fn task_context(view_id: &str, is_default: bool) -> ViewContext {
    let properties = task_properties();
    let visible: Vec<&str> = properties.iter().map(|p| p.id.as_str()).collect();
    ViewContext {
        view: view(view_id, "tasks", is_default, &visible),
        properties: properties.clone(),
        frozen: task_frozen_config(),
    }
}

/// People properties, managed under the `all-people` view.
pub fn people_context() -> ViewContext {
    let properties = vec![
        PropertyDefinition::new("name", "Name", PropertyType::Text),
        PropertyDefinition::new("email", "Email", PropertyType::Email).with_order(1),
        PropertyDefinition::new("company", "Company", PropertyType::Relation).with_order(2),
    ];
    ViewContext {
        view: view("all-people", "people", true, &["name", "email", "company"]),
        properties,
        frozen: FrozenPropertyConfig {
            module_type: Some("people".to_string()),
            view_type: Some(ViewType::Table),
            required_properties: BTreeSet::from(["name".to_string()]),
            frozen_properties: Vec::new(),
        },
    }
}

pub fn record(id: &str, properties: Value) -> RecordEntity {
    let props: BTreeMap<String, Value> = match properties {
        Value::Object(map) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    };
    let created = Utc.with_ymd_and_hms(2026, 1, 5, 9, 30, 0).single().unwrap_or_default();
    RecordEntity {
        id: id.to_string(),
        properties: props,
        created_at: created,
        updated_at: created,
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_property_type() -> impl Strategy<Value = PropertyType> {
        prop::sample::select(PropertyType::ALL.to_vec())
    }

    pub fn arb_sort_direction() -> impl Strategy<Value = SortDirection> {
        prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
    }

    /// Property with a stable id, arbitrary type and three options.
    pub fn arb_property(id: &'static str, order: i32) -> impl Strategy<Value = PropertyDefinition> {
        arb_property_type().prop_map(move |ty| {
            PropertyDefinition::new(id, id, ty)
                .with_order(order)
                .with_options(vec![option("x", "red"), option("y", "blue"), option("z", "green")])
        })
    }

    /// A rule that passes validation for `property`.
    pub fn valid_rule_for(property: &PropertyDefinition) -> impl Strategy<Value = FilterRule> {
        let ops: Vec<FilterOperator> = docview_core::operators_for(property.property_type)
            .iter()
            .map(|d| d.operator)
            .collect();
        let property = property.clone();
        prop::sample::select(ops).prop_map(move |operator| {
            let rule = FilterRule::new(property.id.clone(), operator);
            if !operator.requires_value() {
                return rule;
            }
            let value = match property.property_type.operator_catalog() {
                docview_core::OperatorCatalog::Number => json!(42),
                docview_core::OperatorCatalog::Date => json!("2026-02-01"),
                docview_core::OperatorCatalog::Select => json!("x"),
                docview_core::OperatorCatalog::MultiSelect => json!(["x", "y"]),
                _ => json!("needle"),
            };
            rule.with_value(value)
        })
    }
}
