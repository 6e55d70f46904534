//! Dynamic endpoint resolution
//!
//! Pure mapping from (module, operation, ids) to a REST path and verb. Module
//! differences live in one route table; operation shapes live in one
//! operation table. Adding a module is a data change.

use crate::enums::normalize_token;
use crate::{HttpMethod, ValidationError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Generic base template for modules without a route entry.
pub const GENERIC_BASE: &str = "/document-views/{module}";

/// Generic records template for modules without a route entry.
pub const GENERIC_RECORDS: &str = "/second-brain/{module}";

/// Default view for view-scoped property management in `people`.
pub const PEOPLE_DEFAULT_VIEW: &str = "all-people";

// ============================================================================
// OPERATIONS
// ============================================================================

/// Every operation the façade can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListViews,
    GetView,
    CreateView,
    UpdateView,
    DeleteView,
    DuplicateView,
    UpdateViewProperties,
    UpdatePropertyVisibility,
    UpdateViewFilters,
    UpdateViewSorts,
    ListProperties,
    AddProperty,
    UpdateProperty,
    DeleteProperty,
    FreezeProperty,
    InsertProperty,
    DuplicateProperty,
    ChangePropertyType,
    GetConfig,
    ListRecords,
    GetRecord,
    CreateRecord,
    UpdateRecord,
    DeleteRecord,
    BulkUpdateRecords,
    BulkDeleteRecords,
}

/// Where an operation's path is rooted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    /// `{base}`
    Base,
    /// `{base}` or `{base}/views/{viewId}`, per the module's property scope.
    Scoped,
    /// `{records}`
    Records,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Lit(&'static str),
    ViewId,
    PropertyId,
    RecordId,
}

use Segment::{Lit, PropertyId as Pid, RecordId as Rid, ViewId as Vid};

struct OperationShape {
    method: HttpMethod,
    root: Root,
    segments: &'static [Segment],
}

const fn shape(method: HttpMethod, root: Root, segments: &'static [Segment]) -> OperationShape {
    OperationShape {
        method,
        root,
        segments,
    }
}

impl Operation {
    pub const ALL: [Operation; 26] = [
        Operation::ListViews,
        Operation::GetView,
        Operation::CreateView,
        Operation::UpdateView,
        Operation::DeleteView,
        Operation::DuplicateView,
        Operation::UpdateViewProperties,
        Operation::UpdatePropertyVisibility,
        Operation::UpdateViewFilters,
        Operation::UpdateViewSorts,
        Operation::ListProperties,
        Operation::AddProperty,
        Operation::UpdateProperty,
        Operation::DeleteProperty,
        Operation::FreezeProperty,
        Operation::InsertProperty,
        Operation::DuplicateProperty,
        Operation::ChangePropertyType,
        Operation::GetConfig,
        Operation::ListRecords,
        Operation::GetRecord,
        Operation::CreateRecord,
        Operation::UpdateRecord,
        Operation::DeleteRecord,
        Operation::BulkUpdateRecords,
        Operation::BulkDeleteRecords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListViews => "listViews",
            Operation::GetView => "getView",
            Operation::CreateView => "createView",
            Operation::UpdateView => "updateView",
            Operation::DeleteView => "deleteView",
            Operation::DuplicateView => "duplicateView",
            Operation::UpdateViewProperties => "updateViewProperties",
            Operation::UpdatePropertyVisibility => "updatePropertyVisibility",
            Operation::UpdateViewFilters => "updateViewFilters",
            Operation::UpdateViewSorts => "updateViewSorts",
            Operation::ListProperties => "listProperties",
            Operation::AddProperty => "addProperty",
            Operation::UpdateProperty => "updateProperty",
            Operation::DeleteProperty => "deleteProperty",
            Operation::FreezeProperty => "freezeProperty",
            Operation::InsertProperty => "insertProperty",
            Operation::DuplicateProperty => "duplicateProperty",
            Operation::ChangePropertyType => "changePropertyType",
            Operation::GetConfig => "getConfig",
            Operation::ListRecords => "listRecords",
            Operation::GetRecord => "getRecord",
            Operation::CreateRecord => "createRecord",
            Operation::UpdateRecord => "updateRecord",
            Operation::DeleteRecord => "deleteRecord",
            Operation::BulkUpdateRecords => "bulkUpdateRecords",
            Operation::BulkDeleteRecords => "bulkDeleteRecords",
        }
    }

    fn shape(&self) -> OperationShape {
        use HttpMethod::*;
        use Root::*;
        match self {
            Operation::ListViews => shape(Get, Base, &[Lit("views")]),
            Operation::GetView => shape(Get, Base, &[Lit("views"), Vid]),
            Operation::CreateView => shape(Post, Base, &[Lit("views")]),
            Operation::UpdateView => shape(Put, Base, &[Lit("views"), Vid]),
            Operation::DeleteView => shape(Delete, Base, &[Lit("views"), Vid]),
            Operation::DuplicateView => shape(Post, Base, &[Lit("views"), Vid, Lit("duplicate")]),
            Operation::UpdateViewProperties => {
                shape(Patch, Base, &[Lit("views"), Vid, Lit("properties")])
            }
            Operation::UpdatePropertyVisibility => shape(
                Patch,
                Base,
                &[Lit("views"), Vid, Lit("properties"), Pid, Lit("visibility")],
            ),
            Operation::UpdateViewFilters => {
                shape(Patch, Base, &[Lit("views"), Vid, Lit("filters")])
            }
            Operation::UpdateViewSorts => shape(Patch, Base, &[Lit("views"), Vid, Lit("sorts")]),
            Operation::ListProperties => shape(Get, Base, &[Lit("properties")]),
            Operation::AddProperty => shape(Post, Scoped, &[Lit("properties")]),
            Operation::UpdateProperty => shape(Patch, Scoped, &[Lit("properties"), Pid]),
            Operation::DeleteProperty => shape(Delete, Scoped, &[Lit("properties"), Pid]),
            Operation::FreezeProperty => {
                shape(Patch, Scoped, &[Lit("properties"), Pid, Lit("freeze")])
            }
            Operation::InsertProperty => {
                shape(Post, Scoped, &[Lit("properties"), Pid, Lit("insert")])
            }
            Operation::DuplicateProperty => {
                shape(Post, Scoped, &[Lit("properties"), Pid, Lit("duplicate")])
            }
            Operation::ChangePropertyType => {
                shape(Patch, Base, &[Lit("properties"), Pid, Lit("change-type")])
            }
            Operation::GetConfig => shape(Get, Base, &[Lit("config")]),
            Operation::ListRecords => shape(Get, Records, &[]),
            Operation::GetRecord => shape(Get, Records, &[Rid]),
            Operation::CreateRecord => shape(Post, Records, &[]),
            Operation::UpdateRecord => shape(Patch, Records, &[Rid]),
            Operation::DeleteRecord => shape(Delete, Records, &[Rid]),
            Operation::BulkUpdateRecords => shape(Patch, Records, &[Lit("bulk")]),
            Operation::BulkDeleteRecords => shape(Post, Records, &[Lit("bulk-delete")]),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_token(s);
        Operation::ALL
            .iter()
            .copied()
            .find(|op| normalize_token(op.as_str()) == normalized)
            .ok_or_else(|| ValidationError::UnknownOperation(s.to_string()))
    }
}

// ============================================================================
// ROUTE TABLE
// ============================================================================

/// Where a module's property-management endpoints live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyScope {
    /// `{base}/properties/...`
    Database,
    /// `{base}/views/{viewId}/properties/...`; `default_view_id` is used when
    /// the caller supplies no view id.
    View { default_view_id: String },
}

/// Path templates for one module. `{module}` is replaced by the lower-cased
/// module id; `records` may also reference `{base}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRoute {
    pub base: String,
    pub records: String,
    pub property_scope: PropertyScope,
}

impl ModuleRoute {
    pub fn generic() -> Self {
        Self {
            base: GENERIC_BASE.to_string(),
            records: GENERIC_RECORDS.to_string(),
            property_scope: PropertyScope::Database,
        }
    }
}

/// Caller-supplied overrides. Take precedence over the route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEndpoints {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub records: Option<String>,
}

/// Ids available to fill path segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointIds {
    pub view_id: Option<String>,
    pub property_id: Option<String>,
    pub record_id: Option<String>,
}

impl EndpointIds {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn view(view_id: impl Into<String>) -> Self {
        Self::default().with_view(view_id)
    }

    pub fn property(property_id: impl Into<String>) -> Self {
        Self::default().with_property(property_id)
    }

    pub fn record(record_id: impl Into<String>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            ..Self::default()
        }
    }

    pub fn with_view(mut self, view_id: impl Into<String>) -> Self {
        self.view_id = Some(view_id.into());
        self
    }

    pub fn with_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }
}

/// A resolved endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    pub path: String,
}

/// Module id → route. Read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<String, ModuleRoute>,
}

static BUILTIN_ROUTES: Lazy<RouteTable> = Lazy::new(RouteTable::builtin);

impl RouteTable {
    /// Empty table: every module resolves through the generic templates.
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Table with the known module overrides.
    pub fn builtin() -> Self {
        let top_level = |records: &str| ModuleRoute {
            base: GENERIC_BASE.to_string(),
            records: records.to_string(),
            property_scope: PropertyScope::Database,
        };
        Self::empty()
            .with_route("tasks", top_level("/{module}"))
            .with_route("projects", top_level("/{module}"))
            .with_route("content", top_level("/{module}"))
            .with_route(
                "books",
                ModuleRoute {
                    base: "/second-brain/{module}/document-view".to_string(),
                    records: GENERIC_RECORDS.to_string(),
                    property_scope: PropertyScope::Database,
                },
            )
            .with_route(
                "people",
                ModuleRoute {
                    base: GENERIC_BASE.to_string(),
                    records: "{base}/records".to_string(),
                    property_scope: PropertyScope::View {
                        default_view_id: PEOPLE_DEFAULT_VIEW.to_string(),
                    },
                },
            )
            .with_route(
                "databases",
                ModuleRoute {
                    base: "/databases".to_string(),
                    records: "/databases".to_string(),
                    property_scope: PropertyScope::Database,
                },
            )
    }

    /// Shared instance of [`RouteTable::builtin`].
    pub fn shared() -> &'static RouteTable {
        &BUILTIN_ROUTES
    }

    /// Add or replace a route. Module ids are stored lower-cased.
    pub fn with_route(mut self, module: &str, route: ModuleRoute) -> Self {
        self.routes.insert(module.to_lowercase(), route);
        self
    }

    pub fn route(&self, module: &str) -> Option<&ModuleRoute> {
        self.routes.get(&module.to_lowercase())
    }

    /// Resolve an operation for a module.
    pub fn resolve(
        &self,
        module: &str,
        operation: Operation,
        ids: &EndpointIds,
        custom: Option<&CustomEndpoints>,
    ) -> Result<Endpoint, ValidationError> {
        let module_key = module.trim().to_lowercase();
        if module_key.is_empty() || module_key.contains('/') {
            return Err(ValidationError::InvalidValue {
                field: "module".to_string(),
                reason: format!("'{}' is not a module id", module),
            });
        }

        let generic = ModuleRoute::generic();
        let route = self.routes.get(&module_key).unwrap_or(&generic);

        let base_template = custom
            .and_then(|c| c.base.as_deref())
            .unwrap_or(route.base.as_str());
        let base = base_template.replace("{module}", &module_key);

        let records_template = custom
            .and_then(|c| c.records.as_deref())
            .unwrap_or(route.records.as_str());
        let records = records_template
            .replace("{base}", &base)
            .replace("{module}", &module_key);

        let shape = operation.shape();
        let mut path = match shape.root {
            Root::Base => base,
            Root::Records => records,
            Root::Scoped => match &route.property_scope {
                PropertyScope::Database => base,
                PropertyScope::View { default_view_id } => {
                    let view_id = match ids.view_id.as_deref() {
                        Some(id) => checked_id(operation, "viewId", id)?,
                        None => default_view_id.as_str(),
                    };
                    format!("{}/views/{}", base, view_id)
                }
            },
        };

        for segment in shape.segments {
            let part = match segment {
                Lit(text) => *text,
                Vid => required_id(operation, "viewId", ids.view_id.as_deref())?,
                Pid => required_id(operation, "propertyId", ids.property_id.as_deref())?,
                Rid => required_id(operation, "recordId", ids.record_id.as_deref())?,
            };
            path.push('/');
            path.push_str(part);
        }

        Ok(Endpoint {
            method: shape.method,
            path,
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn required_id<'a>(
    operation: Operation,
    name: &'static str,
    id: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match id {
        Some(id) => checked_id(operation, name, id),
        None => Err(ValidationError::MissingEndpointId {
            operation: operation.as_str(),
            id: name,
        }),
    }
}

fn checked_id<'a>(
    operation: Operation,
    name: &'static str,
    id: &'a str,
) -> Result<&'a str, ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::MissingEndpointId {
            operation: operation.as_str(),
            id: name,
        });
    }
    if id.contains('/') {
        return Err(ValidationError::InvalidValue {
            field: name.to_string(),
            reason: format!("'{}' contains a path separator", id),
        });
    }
    Ok(id)
}

/// Resolve against the built-in route table with no custom overrides.
pub fn resolve(
    module: &str,
    operation: Operation,
    ids: &EndpointIds,
) -> Result<Endpoint, ValidationError> {
    RouteTable::shared().resolve(module, operation, ids, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(module: &str, op: Operation, ids: EndpointIds) -> String {
        resolve(module, op, &ids).unwrap().path
    }

    #[test]
    fn test_people_properties_are_view_scoped() {
        let ep = resolve(
            "people",
            Operation::AddProperty,
            &EndpointIds::view("v1").with_property("p1"),
        )
        .unwrap();
        assert_eq!(ep.method, HttpMethod::Post);
        assert_eq!(ep.path, "/document-views/people/views/v1/properties");
    }

    #[test]
    fn test_people_defaults_to_all_people_view() {
        assert_eq!(
            path("people", Operation::FreezeProperty, EndpointIds::property("p1")),
            "/document-views/people/views/all-people/properties/p1/freeze"
        );
        assert_eq!(
            path("people", Operation::DuplicateProperty, EndpointIds::property("p1")),
            "/document-views/people/views/all-people/properties/p1/duplicate"
        );
    }

    #[test]
    fn test_people_change_type_stays_flat() {
        assert_eq!(
            path("people", Operation::ChangePropertyType, EndpointIds::property("p1")),
            "/document-views/people/properties/p1/change-type"
        );
    }

    #[test]
    fn test_tasks_properties_are_flat() {
        let p = path("tasks", Operation::AddProperty, EndpointIds::property("p1"));
        assert_eq!(p, "/document-views/tasks/properties");
        assert!(!p.contains("/views/"));
        assert_eq!(
            path("tasks", Operation::InsertProperty, EndpointIds::property("p1")),
            "/document-views/tasks/properties/p1/insert"
        );
    }

    #[test]
    fn test_records_roots() {
        assert_eq!(
            path("goals", Operation::ListRecords, EndpointIds::none()),
            "/second-brain/goals"
        );
        assert_eq!(path("tasks", Operation::ListRecords, EndpointIds::none()), "/tasks");
        assert_eq!(
            path("people", Operation::GetRecord, EndpointIds::record("r1")),
            "/document-views/people/records/r1"
        );
        assert_eq!(path("databases", Operation::ListRecords, EndpointIds::none()), "/databases");
        assert_eq!(
            path("databases", Operation::ListViews, EndpointIds::none()),
            "/databases/views"
        );
    }

    #[test]
    fn test_books_base_and_records_diverge() {
        assert_eq!(
            path("books", Operation::GetConfig, EndpointIds::none()),
            "/second-brain/books/document-view/config"
        );
        assert_eq!(
            path("books", Operation::CreateRecord, EndpointIds::none()),
            "/second-brain/books"
        );
    }

    #[test]
    fn test_unknown_module_uses_generic_template_lowercased() {
        assert_eq!(
            path("Habits", Operation::GetView, EndpointIds::view("weekly")),
            "/document-views/habits/views/weekly"
        );
    }

    #[test]
    fn test_custom_endpoints_take_precedence() {
        let custom = CustomEndpoints {
            base: Some("/v2/{module}/doc".to_string()),
            records: Some("/v2/{module}/items".to_string()),
        };
        let table = RouteTable::builtin();
        let ep = table
            .resolve("people", Operation::ListViews, &EndpointIds::none(), Some(&custom))
            .unwrap();
        assert_eq!(ep.path, "/v2/people/doc/views");
        let ep = table
            .resolve("people", Operation::ListRecords, &EndpointIds::none(), Some(&custom))
            .unwrap();
        assert_eq!(ep.path, "/v2/people/items");
    }

    #[test]
    fn test_operation_verbs() {
        let ids = EndpointIds::view("v").with_property("p");
        let ids = EndpointIds {
            record_id: Some("r".to_string()),
            ..ids
        };
        let method = |op| resolve("goals", op, &ids).unwrap().method;
        assert_eq!(method(Operation::UpdateView), HttpMethod::Put);
        assert_eq!(method(Operation::UpdateViewFilters), HttpMethod::Patch);
        assert_eq!(method(Operation::DuplicateView), HttpMethod::Post);
        assert_eq!(method(Operation::DeleteRecord), HttpMethod::Delete);
        assert_eq!(method(Operation::GetConfig), HttpMethod::Get);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = resolve("goals", Operation::GetView, &EndpointIds::none()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingEndpointId {
                operation: "getView",
                id: "viewId"
            }
        );
    }

    #[test]
    fn test_invalid_module_and_ids_rejected() {
        assert!(resolve("", Operation::ListViews, &EndpointIds::none()).is_err());
        assert!(resolve("goals", Operation::GetRecord, &EndpointIds::record("a/b")).is_err());
    }

    #[test]
    fn test_operation_parses_camel_case() {
        assert_eq!("addProperty".parse::<Operation>().unwrap(), Operation::AddProperty);
        assert_eq!(
            "bulk-delete-records".parse::<Operation>().unwrap(),
            Operation::BulkDeleteRecords
        );
        assert!("explode".parse::<Operation>().is_err());
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_config_route_added_at_startup() {
        let table = RouteTable::builtin().with_route(
            "Contacts",
            ModuleRoute {
                base: "/crm/{module}".to_string(),
                records: "{base}/entries".to_string(),
                property_scope: PropertyScope::View {
                    default_view_id: "everyone".to_string(),
                },
            },
        );
        let ep = table
            .resolve("contacts", Operation::DeleteProperty, &EndpointIds::property("p9"), None)
            .unwrap();
        assert_eq!(ep.path, "/crm/contacts/views/everyone/properties/p9");
        assert!(table.route("CONTACTS").is_some());
    }
}
