//! Property ordering within a view.

use crate::{PropertyDefinition, ValidationError, ViewPropertyUpdate};

/// Move the property at `from` to `to` and renumber `order` to `0..n`.
/// Returns the order updates for every property whose order changed, ready
/// for the policy's batch coercion.
pub fn reorder_properties(
    properties: &mut Vec<PropertyDefinition>,
    from: usize,
    to: usize,
) -> Result<Vec<ViewPropertyUpdate>, ValidationError> {
    let len = properties.len();
    if from >= len {
        return Err(ValidationError::IndexOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(ValidationError::IndexOutOfRange { index: to, len });
    }

    let moved = properties.remove(from);
    properties.insert(to, moved);

    let mut updates = Vec::new();
    for (position, property) in properties.iter_mut().enumerate() {
        let order = position as i32;
        if property.order != order {
            property.order = order;
            updates.push(ViewPropertyUpdate::new(property.id.clone()).order(order));
        }
    }
    Ok(updates)
}

/// Sort properties by `order`, ties broken by id for a stable layout.
pub fn sort_by_order(properties: &mut [PropertyDefinition]) {
    properties.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
}
