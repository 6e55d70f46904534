//! Property management. Gated operations check the caller's `ViewContext`
//! before anything is sent.

use super::{context_property, DocumentViewService};
use crate::error::ApiClientResult;
use docview_core::layout::{reorder_properties, sort_by_order};
use docview_core::policy::{coerce_batch, ensure_editable, ensure_removable};
use docview_core::{
    EndpointIds, NewProperty, Operation, PropertyDefinition, PropertyPatch, PropertyType,
    Transport, ValidationError, ViewContext, ViewDefinition, ViewPropertyUpdate,
};
use serde::de::IgnoredAny;
use serde_json::json;

impl<T: Transport> DocumentViewService<T> {
    pub async fn list_properties(&self) -> ApiClientResult<Vec<PropertyDefinition>> {
        self.dispatch(Operation::ListProperties, &EndpointIds::none(), Vec::new(), None)
            .await
    }

    /// Create a property. `view_id` only matters for view-scoped modules,
    /// which fall back to their default view without it.
    pub async fn add_property(
        &self,
        view_id: Option<&str>,
        property: &NewProperty,
    ) -> ApiClientResult<PropertyDefinition> {
        ensure_new_property(property)?;
        let ids = EndpointIds {
            view_id: view_id.map(str::to_string),
            ..EndpointIds::none()
        };
        self.dispatch(
            Operation::AddProperty,
            &ids,
            Vec::new(),
            Some(property.to_payload()),
        )
        .await
    }

    /// Create a property directly after `anchor_id`.
    pub async fn insert_property(
        &self,
        context: &ViewContext,
        anchor_id: &str,
        property: NewProperty,
    ) -> ApiClientResult<PropertyDefinition> {
        context_property(context, anchor_id)?;
        ensure_new_property(&property)?;
        let property = NewProperty {
            insert_after: Some(anchor_id.to_string()),
            ..property
        };
        self.dispatch(
            Operation::InsertProperty,
            &scoped(context, anchor_id),
            Vec::new(),
            Some(property.to_payload()),
        )
        .await
    }

    pub async fn update_property(
        &self,
        context: &ViewContext,
        property_id: &str,
        patch: &PropertyPatch,
    ) -> ApiClientResult<PropertyDefinition> {
        let existing = context_property(context, property_id)?;
        ensure_editable(property_id, &context.frozen)?;
        if let Some(name) = &patch.name {
            ensure_property_name(name)?;
        }
        if patch.options.is_some() && !existing.property_type.has_options() {
            return Err(ValidationError::InvalidValue {
                field: "options".to_string(),
                reason: format!("{} properties have no options", existing.property_type),
            }
            .into());
        }
        if patch.required == Some(false) && context.frozen.is_required(property_id) {
            return Err(ValidationError::InvalidValue {
                field: "required".to_string(),
                reason: format!("{} is required by the module", property_id),
            }
            .into());
        }
        let body = serde_json::to_value(patch)?;
        self.dispatch(
            Operation::UpdateProperty,
            &scoped(context, property_id),
            Vec::new(),
            Some(body),
        )
        .await
    }

    pub async fn delete_property(
        &self,
        context: &ViewContext,
        property_id: &str,
    ) -> ApiClientResult<()> {
        context_property(context, property_id)?;
        ensure_removable(property_id, &context.frozen)?;
        let _: IgnoredAny = self
            .dispatch(
                Operation::DeleteProperty,
                &scoped(context, property_id),
                Vec::new(),
                None,
            )
            .await?;
        Ok(())
    }

    pub async fn duplicate_property(
        &self,
        context: &ViewContext,
        property_id: &str,
    ) -> ApiClientResult<PropertyDefinition> {
        context_property(context, property_id)?;
        self.dispatch(
            Operation::DuplicateProperty,
            &scoped(context, property_id),
            Vec::new(),
            Some(json!({})),
        )
        .await
    }

    /// Freeze or unfreeze a column. Policy-frozen properties keep the state
    /// their frozen entry dictates.
    pub async fn freeze_property(
        &self,
        context: &ViewContext,
        property_id: &str,
        frozen: bool,
    ) -> ApiClientResult<PropertyDefinition> {
        context_property(context, property_id)?;
        let coerced = coerce_batch(
            vec![ViewPropertyUpdate::new(property_id).frozen(frozen)],
            &context.frozen,
        );
        let frozen = coerced
            .first()
            .and_then(|update| update.frozen)
            .unwrap_or(frozen);
        self.dispatch(
            Operation::FreezeProperty,
            &scoped(context, property_id),
            Vec::new(),
            Some(json!({ "frozen": frozen })),
        )
        .await
    }

    /// Retype a property. The server tag is sent, never the client tag.
    pub async fn change_property_type(
        &self,
        context: &ViewContext,
        property_id: &str,
        new_type: PropertyType,
    ) -> ApiClientResult<PropertyDefinition> {
        context_property(context, property_id)?;
        ensure_editable(property_id, &context.frozen)?;
        self.dispatch(
            Operation::ChangePropertyType,
            &EndpointIds::property(property_id),
            Vec::new(),
            Some(json!({ "type": new_type.server_type() })),
        )
        .await
    }

    /// Move the property at `from` to `to` in display order and persist the
    /// renumbered orders as one batch.
    pub async fn reorder_property(
        &self,
        context: &ViewContext,
        from: usize,
        to: usize,
    ) -> ApiClientResult<ViewDefinition> {
        let mut properties = context.properties.clone();
        sort_by_order(&mut properties);
        let updates = reorder_properties(&mut properties, from, to)?;
        let batch = coerce_batch(updates, &context.frozen);
        self.dispatch(
            Operation::UpdateViewProperties,
            &EndpointIds::view(context.view.id.as_str()),
            Vec::new(),
            Some(json!({ "properties": batch })),
        )
        .await
    }
}

/// Ids for a property operation: the context's view fills the scope of
/// view-scoped modules.
fn scoped(context: &ViewContext, property_id: &str) -> EndpointIds {
    EndpointIds::view(context.view.id.as_str()).with_property(property_id)
}

fn ensure_property_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "name".to_string(),
        });
    }
    Ok(())
}

fn ensure_new_property(property: &NewProperty) -> Result<(), ValidationError> {
    ensure_property_name(&property.name)?;
    if !property.options.is_empty() && !property.property_type.has_options() {
        return Err(ValidationError::InvalidValue {
            field: "options".to_string(),
            reason: format!("{} properties have no options", property.property_type),
        });
    }
    Ok(())
}
