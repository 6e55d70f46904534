//! Frozen/required-property policy
//!
//! Pure checks and coercions against a backend-declared
//! [`FrozenPropertyConfig`]. This is a client-side guard only; the server
//! stays authoritative and its rejections are surfaced to the caller.

use crate::{
    FrozenPropertyConfig, PolicyAction, ValidationError, ViewContext, ViewPropertyUpdate,
};
use std::collections::HashMap;

/// Required properties are never removable. Otherwise a frozen entry with
/// `allow_delete == false` forbids removal.
pub fn is_removable(property_id: &str, config: &FrozenPropertyConfig) -> bool {
    if config.is_required(property_id) {
        return false;
    }
    config
        .frozen_entry(property_id)
        .map_or(true, |entry| entry.allow_delete)
}

/// Required properties are never hideable.
pub fn is_hideable(property_id: &str, config: &FrozenPropertyConfig) -> bool {
    if config.is_required(property_id) {
        return false;
    }
    config
        .frozen_entry(property_id)
        .map_or(true, |entry| entry.allow_hide)
}

/// Required properties stay editable unless their frozen entry says otherwise.
pub fn is_editable(property_id: &str, config: &FrozenPropertyConfig) -> bool {
    config
        .frozen_entry(property_id)
        .map_or(true, |entry| entry.allow_edit)
}

fn violation(
    property_id: &str,
    action: PolicyAction,
    config: &FrozenPropertyConfig,
) -> ValidationError {
    let reason = config
        .frozen_entry(property_id)
        .and_then(|entry| entry.reason.clone())
        .or_else(|| {
            config
                .is_required(property_id)
                .then(|| "required property".to_string())
        });
    ValidationError::PolicyViolation {
        property_id: property_id.to_string(),
        action,
        reason,
    }
}

pub fn ensure_removable(
    property_id: &str,
    config: &FrozenPropertyConfig,
) -> Result<(), ValidationError> {
    if is_removable(property_id, config) {
        Ok(())
    } else {
        Err(violation(property_id, PolicyAction::Delete, config))
    }
}

pub fn ensure_hideable(
    property_id: &str,
    config: &FrozenPropertyConfig,
) -> Result<(), ValidationError> {
    if is_hideable(property_id, config) {
        Ok(())
    } else {
        Err(violation(property_id, PolicyAction::Hide, config))
    }
}

pub fn ensure_editable(
    property_id: &str,
    config: &FrozenPropertyConfig,
) -> Result<(), ValidationError> {
    if is_editable(property_id, config) {
        Ok(())
    } else {
        Err(violation(property_id, PolicyAction::Edit, config))
    }
}

/// Force a batch of visibility/order/freeze updates into compliance.
///
/// Required properties get `visible = true`; properties with a frozen entry
/// get `frozen = !allow_hide`. Requested values for those fields are ignored.
pub fn coerce_batch(
    updates: Vec<ViewPropertyUpdate>,
    config: &FrozenPropertyConfig,
) -> Vec<ViewPropertyUpdate> {
    updates
        .into_iter()
        .map(|mut update| {
            if config.is_required(&update.property_id) {
                update.visible = Some(true);
            }
            if let Some(entry) = config.frozen_entry(&update.property_id) {
                update.frozen = Some(!entry.allow_hide);
            }
            update
        })
        .collect()
}

/// Check the view-level invariants: every required property is visible, and
/// no two properties share an order.
pub fn check_invariants(context: &ViewContext) -> Result<(), ValidationError> {
    for required in &context.frozen.required_properties {
        if !context.view.visible_properties.contains(required) {
            return Err(ValidationError::RequiredPropertyHidden {
                view_id: context.view.id.clone(),
                property_id: required.clone(),
            });
        }
    }

    let mut seen: HashMap<i32, &str> = HashMap::new();
    for property in &context.properties {
        if let Some(first) = seen.insert(property.order, property.id.as_str()) {
            return Err(ValidationError::DuplicateOrder {
                first: first.to_string(),
                second: property.id.clone(),
                order: property.order,
            });
        }
    }
    Ok(())
}
