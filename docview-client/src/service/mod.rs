//! Document view façade.
//!
//! One `DocumentViewService` per module. Every operation resolves its
//! endpoint, runs the local checks, issues exactly one transport call and
//! unwraps the envelope. Nothing is cached between calls.

mod properties;
mod records;
mod views;

pub use records::BulkOutcome;
pub use views::NewView;

use crate::envelope::unwrap_envelope;
use crate::error::{ApiClientError, ApiClientResult};
use docview_core::{
    ApiRequest, CustomEndpoints, Endpoint, EndpointIds, FrozenPropertyConfig, NotFoundError,
    Operation, PropertyDefinition, RouteTable, Transport, ViewContext,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DocumentViewService<T: Transport> {
    transport: Arc<T>,
    module: String,
    routes: Arc<RouteTable>,
    custom: Option<CustomEndpoints>,
}

impl<T: Transport> Clone for DocumentViewService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            module: self.module.clone(),
            routes: Arc::clone(&self.routes),
            custom: self.custom.clone(),
        }
    }
}

impl<T: Transport> DocumentViewService<T> {
    /// Service for `module` over the built-in route table.
    pub fn new(transport: Arc<T>, module: impl Into<String>) -> Self {
        Self {
            transport,
            module: module.into().to_lowercase(),
            routes: Arc::new(RouteTable::builtin()),
            custom: None,
        }
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = Arc::new(routes);
        self
    }

    pub fn with_custom_endpoints(mut self, custom: CustomEndpoints) -> Self {
        self.custom = Some(custom);
        self
    }

    /// Same transport and routes, different module. Custom endpoints are
    /// per-module and are not carried over.
    pub fn for_module(&self, module: impl Into<String>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            module: module.into().to_lowercase(),
            routes: Arc::clone(&self.routes),
            custom: None,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn endpoint(&self, operation: Operation, ids: &EndpointIds) -> ApiClientResult<Endpoint> {
        Ok(self
            .routes
            .resolve(&self.module, operation, ids, self.custom.as_ref())?)
    }

    /// Fetch the frozen/required-property policy for this module.
    pub async fn get_config(&self) -> ApiClientResult<FrozenPropertyConfig> {
        self.dispatch(Operation::GetConfig, &EndpointIds::none(), Vec::new(), None)
            .await
    }

    /// Fetch a view, the module's properties and its policy, as the
    /// snapshot gated operations take. Three calls.
    pub async fn load_context(&self, view_id: &str) -> ApiClientResult<ViewContext> {
        let view = self.get_view(view_id).await?;
        let properties = self.list_properties().await?;
        let frozen = self.get_config().await?;
        Ok(ViewContext {
            view,
            properties,
            frozen,
        })
    }

    async fn dispatch<R: DeserializeOwned>(
        &self,
        operation: Operation,
        ids: &EndpointIds,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> ApiClientResult<R> {
        let endpoint = self.endpoint(operation, ids)?;
        debug!(
            module = %self.module,
            operation = %operation,
            method = %endpoint.method,
            path = %endpoint.path,
            "Dispatching document view request"
        );

        let mut request = ApiRequest::new(endpoint.method, endpoint.path.clone()).with_query(query);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    module = %self.module,
                    operation = %operation,
                    path = %endpoint.path,
                    error = %err,
                    "Transport failure"
                );
                return Err(err.into());
            }
        };

        unwrap_envelope(&response).map_err(|err| {
            if err.is_server_rejection() {
                warn!(
                    module = %self.module,
                    operation = %operation,
                    status = response.status,
                    error = %err,
                    "Request rejected by server"
                );
            }
            err
        })
    }
}

/// Look up a property in a loaded context.
fn context_property<'a>(
    context: &'a ViewContext,
    property_id: &str,
) -> Result<&'a PropertyDefinition, ApiClientError> {
    context
        .property(property_id)
        .ok_or_else(|| NotFoundError::property(property_id).into())
}
