//! docview Core - Generic Document View Engine
//!
//! Pure building blocks shared by every content module:
//! - property type registry (client/server type tags, filter operator catalogs)
//! - endpoint resolver (module + operation → REST path and verb)
//! - filter and sort rule engine
//! - frozen/required-property policy
//!
//! Nothing in this crate performs I/O. The [`Transport`] trait is the seam
//! the client crate plugs a real HTTP stack into.

pub mod endpoint;
pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod identity;
pub mod layout;
pub mod policy;
pub mod query;
pub mod registry;
pub mod sort;
pub mod transport;

pub use endpoint::{
    resolve, CustomEndpoints, Endpoint, EndpointIds, ModuleRoute, Operation, PropertyScope,
    RouteTable, GENERIC_BASE, GENERIC_RECORDS, PEOPLE_DEFAULT_VIEW,
};
pub use entities::{
    FilterRule, FrozenProperty, FrozenPropertyConfig, NewProperty, PropertyDefinition,
    PropertyPatch, RecordEntity, SelectOption, SortRule, ViewContext, ViewDefinition,
    ViewPropertyUpdate,
};
pub use enums::{
    Combinator, FilterOperator, HttpMethod, MoveDirection, PropertyType, PropertyTypeParseError,
    SortDirection, ViewType,
};
pub use error::{
    DocViewError, DocViewResult, EntityKind, NotFoundError, PolicyAction, TransportError,
    ValidationError,
};
pub use identity::{new_entity_id, PropertyId, RecordId, Timestamp, ViewId};
pub use query::RecordQuery;
pub use registry::{
    default_operator, operators_for, operators_for_tag, supports_operator, to_server_type,
    OperatorCatalog, OperatorDescriptor,
};
pub use sort::SortEntry;
pub use transport::{ApiRequest, ApiResponse, Transport};
