//! View management.

use super::{context_property, DocumentViewService};
use crate::error::ApiClientResult;
use docview_core::filter::prepare_filters;
use docview_core::policy::{check_invariants, coerce_batch, ensure_hideable};
use docview_core::sort::{sort_payload, validate_sorts};
use docview_core::{
    EndpointIds, FilterRule, FrozenPropertyConfig, NotFoundError, Operation, SortRule, Transport,
    ValidationError, ViewContext, ViewDefinition, ViewPropertyUpdate, ViewType,
};
use serde::de::IgnoredAny;
use serde::Serialize;
use serde_json::{json, Value};

/// Payload for creating a view. Filters and sorts are set afterwards
/// through their sub-resources, where they are validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewView {
    pub name: String,
    #[serde(rename = "type")]
    pub view_type: ViewType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub visible_properties: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

impl NewView {
    pub fn new(name: impl Into<String>, view_type: ViewType) -> Self {
        Self {
            name: name.into(),
            view_type,
            visible_properties: Vec::new(),
            group_by: None,
        }
    }
}

impl<T: Transport> DocumentViewService<T> {
    pub async fn list_views(&self) -> ApiClientResult<Vec<ViewDefinition>> {
        self.dispatch(Operation::ListViews, &EndpointIds::none(), Vec::new(), None)
            .await
    }

    pub async fn get_view(&self, view_id: &str) -> ApiClientResult<ViewDefinition> {
        self.dispatch(Operation::GetView, &EndpointIds::view(view_id), Vec::new(), None)
            .await
    }

    /// Create a view. An explicit visible list must keep every required
    /// property of `frozen`; an empty one leaves the server default.
    pub async fn create_view(
        &self,
        view: &NewView,
        frozen: &FrozenPropertyConfig,
    ) -> ApiClientResult<ViewDefinition> {
        ensure_name(&view.name)?;
        if !view.visible_properties.is_empty() {
            if let Some(missing) = frozen
                .required_properties
                .iter()
                .find(|required| !view.visible_properties.contains(required))
            {
                return Err(ValidationError::RequiredPropertyHidden {
                    view_id: view.name.clone(),
                    property_id: missing.clone(),
                }
                .into());
            }
        }
        let mut body = serde_json::to_value(view)?;
        if let Value::Object(map) = &mut body {
            map.insert("moduleType".to_string(), Value::String(self.module.clone()));
        }
        self.dispatch(Operation::CreateView, &EndpointIds::none(), Vec::new(), Some(body))
            .await
    }

    /// Replace the context's view wholesale. The replacement goes through
    /// the same checks as the filter, sort and visibility sub-resources.
    pub async fn update_view(
        &self,
        context: &ViewContext,
        view: &ViewDefinition,
    ) -> ApiClientResult<ViewDefinition> {
        if view.id != context.view.id {
            return Err(NotFoundError::view(view.id.as_str()).into());
        }
        ensure_name(&view.name)?;
        check_invariants(&ViewContext {
            view: view.clone(),
            properties: context.properties.clone(),
            frozen: context.frozen.clone(),
        })?;
        for hidden in context
            .view
            .visible_properties
            .difference(&view.visible_properties)
        {
            ensure_hideable(hidden, &context.frozen)?;
        }
        let filters = prepare_filters(&view.filters, &context.properties)?;
        validate_sorts(&view.sorts, &context.properties)?;

        let mut body = serde_json::to_value(view)?;
        if let Value::Object(map) = &mut body {
            map.insert("filters".to_string(), serde_json::to_value(filters)?);
            map.insert("sorts".to_string(), serde_json::to_value(sort_payload(&view.sorts))?);
        }
        self.dispatch(
            Operation::UpdateView,
            &EndpointIds::view(view.id.as_str()),
            Vec::new(),
            Some(body),
        )
        .await
    }

    /// Delete a view. Default views are refused locally.
    pub async fn delete_view(&self, view: &ViewDefinition) -> ApiClientResult<()> {
        if view.is_default {
            return Err(ValidationError::DefaultViewDeletion {
                view_id: view.id.clone(),
            }
            .into());
        }
        let _: IgnoredAny = self
            .dispatch(
                Operation::DeleteView,
                &EndpointIds::view(view.id.as_str()),
                Vec::new(),
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn duplicate_view(
        &self,
        view_id: &str,
        name: Option<&str>,
    ) -> ApiClientResult<ViewDefinition> {
        let body = match name {
            Some(name) => {
                ensure_name(name)?;
                json!({ "name": name })
            }
            None => json!({}),
        };
        self.dispatch(
            Operation::DuplicateView,
            &EndpointIds::view(view_id),
            Vec::new(),
            Some(body),
        )
        .await
    }

    /// Batch visibility/order/freeze update. Hiding a property its frozen
    /// entry pins is refused; required properties are coerced back to
    /// visible right before sending.
    pub async fn update_view_properties(
        &self,
        context: &ViewContext,
        updates: Vec<ViewPropertyUpdate>,
    ) -> ApiClientResult<ViewDefinition> {
        for update in &updates {
            context_property(context, &update.property_id)?;
            if update.visible == Some(false) && !context.frozen.is_required(&update.property_id) {
                ensure_hideable(&update.property_id, &context.frozen)?;
            }
        }
        let batch = coerce_batch(updates, &context.frozen);
        self.dispatch(
            Operation::UpdateViewProperties,
            &EndpointIds::view(context.view.id.as_str()),
            Vec::new(),
            Some(json!({ "properties": batch })),
        )
        .await
    }

    /// Show or hide one property in the context's view.
    pub async fn set_property_visibility(
        &self,
        context: &ViewContext,
        property_id: &str,
        visible: bool,
    ) -> ApiClientResult<ViewDefinition> {
        context_property(context, property_id)?;
        if !visible {
            ensure_hideable(property_id, &context.frozen)?;
        }
        self.dispatch(
            Operation::UpdatePropertyVisibility,
            &EndpointIds::view(context.view.id.as_str()).with_property(property_id),
            Vec::new(),
            Some(json!({ "visible": visible })),
        )
        .await
    }

    /// Replace the view's filter list.
    pub async fn update_view_filters(
        &self,
        context: &ViewContext,
        rules: &[FilterRule],
    ) -> ApiClientResult<ViewDefinition> {
        let filters = prepare_filters(rules, &context.properties)?;
        self.dispatch(
            Operation::UpdateViewFilters,
            &EndpointIds::view(context.view.id.as_str()),
            Vec::new(),
            Some(json!({ "filters": filters })),
        )
        .await
    }

    /// Replace the view's sort list. Priorities are list positions.
    pub async fn update_view_sorts(
        &self,
        context: &ViewContext,
        sorts: &[SortRule],
    ) -> ApiClientResult<ViewDefinition> {
        validate_sorts(sorts, &context.properties)?;
        self.dispatch(
            Operation::UpdateViewSorts,
            &EndpointIds::view(context.view.id.as_str()),
            Vec::new(),
            Some(json!({ "sorts": sort_payload(sorts) })),
        )
        .await
    }
}

fn ensure_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        });
    }
    Ok(())
}
