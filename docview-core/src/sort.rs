//! Sort rule engine
//!
//! Priority is the list position. Moving a rule re-prioritizes it; removing
//! one renumbers everything after it.

use crate::{
    DocViewResult, MoveDirection, NotFoundError, PropertyDefinition, SortDirection, SortRule,
    ValidationError,
};
use serde::{Deserialize, Serialize};

/// Wire form of a sort rule with its derived priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortEntry {
    pub property_id: String,
    pub direction: SortDirection,
    pub priority: usize,
}

/// Append a sort. A property can be sorted at most once.
pub fn add_sort(
    sorts: &mut Vec<SortRule>,
    property_id: &str,
    direction: SortDirection,
) -> Result<(), ValidationError> {
    if sorts.iter().any(|s| s.property_id == property_id) {
        return Err(ValidationError::DuplicateSort {
            property_id: property_id.to_string(),
        });
    }
    sorts.push(SortRule::new(property_id, direction));
    Ok(())
}

pub fn remove_sort(
    sorts: &mut Vec<SortRule>,
    index: usize,
) -> Result<SortRule, ValidationError> {
    if index >= sorts.len() {
        return Err(ValidationError::IndexOutOfRange {
            index,
            len: sorts.len(),
        });
    }
    Ok(sorts.remove(index))
}

/// Swap a sort with its neighbour. Moving past either end is a no-op.
pub fn move_sort(
    sorts: &mut [SortRule],
    index: usize,
    direction: MoveDirection,
) -> Result<(), ValidationError> {
    if index >= sorts.len() {
        return Err(ValidationError::IndexOutOfRange {
            index,
            len: sorts.len(),
        });
    }
    match direction {
        MoveDirection::Up if index > 0 => sorts.swap(index, index - 1),
        MoveDirection::Down if index + 1 < sorts.len() => sorts.swap(index, index + 1),
        _ => {}
    }
    Ok(())
}

pub fn set_sort_direction(
    sorts: &mut [SortRule],
    index: usize,
    direction: SortDirection,
) -> Result<(), ValidationError> {
    let len = sorts.len();
    let rule = sorts
        .get_mut(index)
        .ok_or(ValidationError::IndexOutOfRange { index, len })?;
    rule.direction = direction;
    Ok(())
}

/// Every sort must target a loaded property, each at most once.
pub fn validate_sorts(sorts: &[SortRule], properties: &[PropertyDefinition]) -> DocViewResult<()> {
    for (index, sort) in sorts.iter().enumerate() {
        if !properties.iter().any(|p| p.id == sort.property_id) {
            return Err(NotFoundError::property(&sort.property_id).into());
        }
        if sorts[..index].iter().any(|s| s.property_id == sort.property_id) {
            return Err(ValidationError::DuplicateSort {
                property_id: sort.property_id.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Serialize sorts with `priority` equal to list position.
pub fn sort_payload(sorts: &[SortRule]) -> Vec<SortEntry> {
    sorts
        .iter()
        .enumerate()
        .map(|(priority, sort)| SortEntry {
            property_id: sort.property_id.clone(),
            direction: sort.direction,
            priority,
        })
        .collect()
}
