//! Filter rule engine
//!
//! A view's filters are an ordered list. The first rule has no combinator;
//! every later rule combines with the result so far, strictly left to right.
//! There is no grouping.

use crate::registry::{default_operator, supports_operator, OperatorCatalog};
use crate::{
    Combinator, DocViewError, DocViewResult, FilterOperator, FilterRule, NotFoundError,
    PropertyDefinition, PropertyType, ValidationError,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

impl FilterRule {
    /// Create a rule with no value and no combinator.
    pub fn new(property_id: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            property_id: property_id.into(),
            operator,
            value: None,
            combinator: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        self.combinator = Some(combinator);
        self
    }
}

fn find_property<'a>(
    properties: &'a [PropertyDefinition],
    property_id: &str,
) -> Result<&'a PropertyDefinition, NotFoundError> {
    properties
        .iter()
        .find(|p| p.id == property_id)
        .ok_or_else(|| NotFoundError::property(property_id))
}

// ============================================================================
// BUILDING AND MUTATION
// ============================================================================

/// New rule on the first property with its default operator and no value.
pub fn build_filter(properties: &[PropertyDefinition]) -> DocViewResult<FilterRule> {
    let first = properties
        .first()
        .ok_or_else(|| ValidationError::RequiredFieldMissing {
            field: "properties".to_string(),
        })?;
    Ok(FilterRule::new(
        first.id.clone(),
        default_operator(first.property_type),
    ))
}

/// Retarget a rule. Operator resets to the new property's default and the
/// value is cleared, even when the new property has the same type.
pub fn set_filter_property(
    rule: &mut FilterRule,
    property_id: &str,
    properties: &[PropertyDefinition],
) -> Result<(), NotFoundError> {
    let property = find_property(properties, property_id)?;
    rule.property_id = property.id.clone();
    rule.operator = default_operator(property.property_type);
    rule.value = None;
    Ok(())
}

/// Change a rule's operator. Clears the value when the new operator takes none.
pub fn set_filter_operator(
    rule: &mut FilterRule,
    operator: FilterOperator,
    properties: &[PropertyDefinition],
) -> DocViewResult<()> {
    let property = find_property(properties, &rule.property_id)?;
    if !supports_operator(property.property_type, operator) {
        return Err(ValidationError::OperatorNotAllowed {
            property_id: property.id.clone(),
            property_type: property.property_type,
            operator,
        }
        .into());
    }
    rule.operator = operator;
    if !operator.requires_value() {
        rule.value = None;
    }
    Ok(())
}

/// Append a fresh rule combined with AND.
pub fn add_filter(
    rules: &mut Vec<FilterRule>,
    properties: &[PropertyDefinition],
) -> DocViewResult<()> {
    let mut rule = build_filter(properties)?;
    if !rules.is_empty() {
        rule.combinator = Some(Combinator::And);
    }
    rules.push(rule);
    Ok(())
}

/// Remove a rule. The new first rule loses its combinator.
pub fn remove_filter(
    rules: &mut Vec<FilterRule>,
    index: usize,
) -> Result<FilterRule, ValidationError> {
    if index >= rules.len() {
        return Err(ValidationError::IndexOutOfRange {
            index,
            len: rules.len(),
        });
    }
    let removed = rules.remove(index);
    if let Some(first) = rules.first_mut() {
        first.combinator = None;
    }
    Ok(removed)
}

/// Set the combinator of the rule at `index`. The first rule takes none.
pub fn set_combinator(
    rules: &mut [FilterRule],
    index: usize,
    combinator: Combinator,
) -> Result<(), ValidationError> {
    let len = rules.len();
    match rules.get_mut(index) {
        None => Err(ValidationError::IndexOutOfRange { index, len }),
        Some(_) if index == 0 => Err(ValidationError::InvalidValue {
            field: "combinator".to_string(),
            reason: "the first filter has no combinator".to_string(),
        }),
        Some(rule) => {
            rule.combinator = Some(combinator);
            Ok(())
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate one rule against the loaded properties and return the copy that
/// may be sent: valueless operators lose their value, multi-select arrays
/// are deduplicated, numeric strings become numbers. The combinator is
/// passed through untouched.
pub fn validate_filter(
    rule: &FilterRule,
    properties: &[PropertyDefinition],
) -> DocViewResult<FilterRule> {
    let property = find_property(properties, &rule.property_id)?;
    if !supports_operator(property.property_type, rule.operator) {
        return Err(ValidationError::OperatorNotAllowed {
            property_id: property.id.clone(),
            property_type: property.property_type,
            operator: rule.operator,
        }
        .into());
    }

    let mut normalized = rule.clone();
    if !rule.operator.requires_value() {
        normalized.value = None;
        return Ok(normalized);
    }

    let value = match rule.value.as_ref() {
        Some(value) if !value.is_null() => value,
        _ => {
            return Err(ValidationError::MissingFilterValue {
                property_id: property.id.clone(),
                operator: rule.operator,
            }
            .into())
        }
    };
    normalized.value = Some(normalize_value(property, rule.operator, value)?);
    Ok(normalized)
}

fn invalid(property: &PropertyDefinition, reason: impl Into<String>) -> DocViewError {
    ValidationError::InvalidFilterValue {
        property_id: property.id.clone(),
        reason: reason.into(),
    }
    .into()
}

fn normalize_value(
    property: &PropertyDefinition,
    operator: FilterOperator,
    value: &Value,
) -> DocViewResult<Value> {
    match property.property_type.operator_catalog() {
        OperatorCatalog::Select => {
            let option_id = value
                .as_str()
                .ok_or_else(|| invalid(property, "expected an option id"))?;
            if !property.has_option(option_id) {
                return Err(invalid(property, format!("unknown option '{}'", option_id)));
            }
            Ok(value.clone())
        }
        OperatorCatalog::MultiSelect => {
            let items = value
                .as_array()
                .ok_or_else(|| invalid(property, "expected an array of option ids"))?;
            let mut seen = HashSet::new();
            let mut unique = Vec::with_capacity(items.len());
            for item in items {
                let option_id = item
                    .as_str()
                    .ok_or_else(|| invalid(property, "expected an array of option ids"))?;
                if !property.has_option(option_id) {
                    return Err(invalid(property, format!("unknown option '{}'", option_id)));
                }
                if seen.insert(option_id) {
                    unique.push(Value::String(option_id.to_string()));
                }
            }
            if unique.is_empty() {
                return Err(invalid(
                    property,
                    format!("{} needs at least one option", operator),
                ));
            }
            Ok(Value::Array(unique))
        }
        OperatorCatalog::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| invalid(property, format!("'{}' is not a number", text))),
            _ => Err(invalid(property, "expected a number")),
        },
        OperatorCatalog::Date => match value {
            Value::String(text) if !text.trim().is_empty() => Ok(value.clone()),
            _ => Err(invalid(property, "expected a date string")),
        },
        OperatorCatalog::Text => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(invalid(property, "expected text")),
        },
        // Checkbox operators take no value.
        OperatorCatalog::Checkbox => Ok(value.clone()),
    }
}

/// Validate a whole rule list and normalize combinators. This is the only
/// path by which filters reach the wire.
pub fn prepare_filters(
    rules: &[FilterRule],
    properties: &[PropertyDefinition],
) -> DocViewResult<Vec<FilterRule>> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let mut normalized = validate_filter(rule, properties)?;
            normalized.combinator = if index == 0 {
                None
            } else {
                Some(rule.combinator.unwrap_or_default())
            };
            Ok(normalized)
        })
        .collect()
}

// ============================================================================
// LOCAL EVALUATION
// ============================================================================

/// Evaluate a rule list against a record's property map, left to right.
/// An empty list matches everything. Rules on unknown properties never match.
pub fn evaluate(
    record: &BTreeMap<String, Value>,
    rules: &[FilterRule],
    properties: &[PropertyDefinition],
) -> bool {
    let mut iter = rules.iter();
    let Some(first) = iter.next() else {
        return true;
    };
    let mut acc = rule_matches(record, first, properties);
    for rule in iter {
        let current = rule_matches(record, rule, properties);
        acc = match rule.combinator.unwrap_or_default() {
            Combinator::And => acc && current,
            Combinator::Or => acc || current,
        };
    }
    acc
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let day = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn string_set(value: &Value) -> HashSet<&str> {
    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => HashSet::from([s.as_str()]),
        _ => HashSet::new(),
    }
}

fn rule_matches(
    record: &BTreeMap<String, Value>,
    rule: &FilterRule,
    properties: &[PropertyDefinition],
) -> bool {
    let Some(property) = properties.iter().find(|p| p.id == rule.property_id) else {
        return false;
    };
    let actual = record.get(&rule.property_id);

    match rule.operator {
        FilterOperator::IsEmpty => return is_empty_value(actual),
        FilterOperator::IsNotEmpty => return !is_empty_value(actual),
        FilterOperator::Checked => return actual == Some(&Value::Bool(true)),
        FilterOperator::Unchecked => return actual != Some(&Value::Bool(true)),
        _ => {}
    }

    let (Some(actual), Some(expected)) = (actual, rule.value.as_ref()) else {
        return false;
    };

    match property.property_type {
        PropertyType::MultiSelect => {
            let have = string_set(actual);
            let want = string_set(expected);
            match rule.operator {
                FilterOperator::In => want.iter().any(|id| have.contains(id)),
                FilterOperator::NotIn => !want.iter().any(|id| have.contains(id)),
                FilterOperator::ContainsAll => want.iter().all(|id| have.contains(id)),
                _ => false,
            }
        }
        ty => match ty.operator_catalog() {
            OperatorCatalog::Number => match (as_number(actual), as_number(expected)) {
                (Some(a), Some(b)) => match rule.operator {
                    FilterOperator::Equals => a == b,
                    FilterOperator::NotEquals => a != b,
                    FilterOperator::GreaterThan => a > b,
                    FilterOperator::LessThan => a < b,
                    FilterOperator::GreaterThanOrEqual => a >= b,
                    FilterOperator::LessThanOrEqual => a <= b,
                    _ => false,
                },
                _ => false,
            },
            OperatorCatalog::Date => match (as_date(actual), as_date(expected)) {
                (Some(a), Some(b)) => match rule.operator {
                    FilterOperator::Equals => a == b,
                    FilterOperator::Before => a < b,
                    FilterOperator::After => a > b,
                    FilterOperator::OnOrBefore => a <= b,
                    FilterOperator::OnOrAfter => a >= b,
                    _ => false,
                },
                _ => false,
            },
            _ => match (as_text(actual), as_text(expected)) {
                (Some(a), Some(b)) => match rule.operator {
                    FilterOperator::Equals => a == b,
                    FilterOperator::NotEquals => a != b,
                    FilterOperator::Contains => a.contains(&b),
                    FilterOperator::NotContains => !a.contains(&b),
                    FilterOperator::StartsWith => a.starts_with(&b),
                    FilterOperator::EndsWith => a.ends_with(&b),
                    _ => false,
                },
                _ => false,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SelectOption;
    use serde_json::json;

    fn option(id: &str) -> SelectOption {
        SelectOption {
            id: id.to_string(),
            label: id.to_uppercase(),
            color: "gray".to_string(),
        }
    }

    fn properties() -> Vec<PropertyDefinition> {
        vec![
            PropertyDefinition::new("title", "Title", PropertyType::Text),
            PropertyDefinition::new("estimate", "Estimate", PropertyType::Number).with_order(1),
            PropertyDefinition::new("done", "Done", PropertyType::Checkbox).with_order(2),
            PropertyDefinition::new("status", "Status", PropertyType::Select)
                .with_order(3)
                .with_options(vec![option("todo"), option("doing")]),
            PropertyDefinition::new("tags", "Tags", PropertyType::MultiSelect)
                .with_order(4)
                .with_options(vec![option("x"), option("y"), option("z")]),
            PropertyDefinition::new("due", "Due", PropertyType::Date).with_order(5),
        ]
    }

    #[test]
    fn test_build_filter_uses_first_property() {
        let rule = build_filter(&properties()).unwrap();
        assert_eq!(rule.property_id, "title");
        assert_eq!(rule.operator, FilterOperator::Contains);
        assert!(rule.value.is_none());
        assert!(rule.combinator.is_none());
    }

    #[test]
    fn test_build_filter_without_properties_fails() {
        assert!(matches!(
            build_filter(&[]),
            Err(DocViewError::Validation(ValidationError::RequiredFieldMissing { .. }))
        ));
    }

    #[test]
    fn test_set_filter_property_resets_operator_and_value() {
        let props = properties();
        let mut rule = FilterRule::new("title", FilterOperator::StartsWith).with_value(json!("Q3"));
        set_filter_property(&mut rule, "done", &props).unwrap();
        assert_eq!(rule.operator, FilterOperator::Checked);
        assert!(rule.value.is_none());

        set_filter_property(&mut rule, "title", &props).unwrap();
        assert_eq!(rule.operator, FilterOperator::Contains);
        assert!(rule.value.is_none());
    }

    #[test]
    fn test_set_filter_property_unknown_id() {
        let mut rule = build_filter(&properties()).unwrap();
        let err = set_filter_property(&mut rule, "ghost", &properties()).unwrap_err();
        assert_eq!(err, NotFoundError::property("ghost"));
        assert_eq!(rule.property_id, "title");
    }

    #[test]
    fn test_set_filter_operator_checks_catalog() {
        let props = properties();
        let mut rule = FilterRule::new("estimate", FilterOperator::Equals).with_value(json!(3));
        set_filter_operator(&mut rule, FilterOperator::GreaterThan, &props).unwrap();
        assert_eq!(rule.value, Some(json!(3)));
        set_filter_operator(&mut rule, FilterOperator::IsEmpty, &props).unwrap();
        assert!(rule.value.is_none());
        assert!(set_filter_operator(&mut rule, FilterOperator::Contains, &props).is_err());
    }

    #[test]
    fn test_validate_rejects_foreign_operator() {
        let rule = FilterRule::new("done", FilterOperator::Contains).with_value(json!("a"));
        assert!(matches!(
            validate_filter(&rule, &properties()),
            Err(DocViewError::Validation(ValidationError::OperatorNotAllowed { .. }))
        ));
    }

    #[test]
    fn test_validate_unknown_property_is_not_found() {
        let rule = FilterRule::new("ghost", FilterOperator::Contains).with_value(json!("a"));
        assert!(matches!(
            validate_filter(&rule, &properties()),
            Err(DocViewError::NotFound(_))
        ));
    }

    #[test]
    fn test_validate_select_option_membership() {
        let props = properties();
        let ok = FilterRule::new("status", FilterOperator::Equals).with_value(json!("todo"));
        assert!(validate_filter(&ok, &props).is_ok());
        let bad =
            FilterRule::new("status", FilterOperator::NotEquals).with_value(json!("archived"));
        assert!(validate_filter(&bad, &props).is_err());
    }

    #[test]
    fn test_validate_multi_select_dedups() {
        let rule = FilterRule::new("tags", FilterOperator::In).with_value(json!(["x", "x", "y"]));
        let normalized = validate_filter(&rule, &properties()).unwrap();
        assert_eq!(normalized.value, Some(json!(["x", "y"])));
    }

    #[test]
    fn test_validate_multi_select_rejects_non_array_and_unknown() {
        let props = properties();
        let scalar = FilterRule::new("tags", FilterOperator::ContainsAll).with_value(json!("x"));
        assert!(validate_filter(&scalar, &props).is_err());
        let unknown = FilterRule::new("tags", FilterOperator::NotIn).with_value(json!(["x", "w"]));
        assert!(validate_filter(&unknown, &props).is_err());
    }

    #[test]
    fn test_validate_strips_value_from_valueless_operator() {
        let rule = FilterRule::new("title", FilterOperator::IsEmpty).with_value(json!("left over"));
        let normalized = validate_filter(&rule, &properties()).unwrap();
        assert!(normalized.value.is_none());
    }

    #[test]
    fn test_validate_missing_value() {
        let rule = FilterRule::new("title", FilterOperator::Contains).with_value(Value::Null);
        assert!(matches!(
            validate_filter(&rule, &properties()),
            Err(DocViewError::Validation(ValidationError::MissingFilterValue { .. }))
        ));
    }

    #[test]
    fn test_validate_number_coerces_numeric_strings() {
        let props = properties();
        let rule = FilterRule::new("estimate", FilterOperator::LessThan).with_value(json!(" 8 "));
        let normalized = validate_filter(&rule, &props).unwrap();
        assert_eq!(normalized.value.and_then(|v| v.as_f64()), Some(8.0));
        let bad = FilterRule::new("estimate", FilterOperator::LessThan).with_value(json!("soon"));
        assert!(validate_filter(&bad, &props).is_err());
    }

    #[test]
    fn test_prepare_filters_normalizes_combinators() {
        let rules = vec![
            FilterRule::new("title", FilterOperator::Contains)
                .with_value(json!("plan"))
                .with_combinator(Combinator::Or),
            FilterRule::new("done", FilterOperator::Unchecked),
            FilterRule::new("estimate", FilterOperator::IsNotEmpty).with_combinator(Combinator::Or),
        ];
        let prepared = prepare_filters(&rules, &properties()).unwrap();
        assert_eq!(prepared[0].combinator, None);
        assert_eq!(prepared[1].combinator, Some(Combinator::And));
        assert_eq!(prepared[2].combinator, Some(Combinator::Or));
    }

    #[test]
    fn test_list_mutations_keep_first_rule_bare() {
        let props = properties();
        let mut rules = Vec::new();
        add_filter(&mut rules, &props).unwrap();
        add_filter(&mut rules, &props).unwrap();
        assert_eq!(rules[0].combinator, None);
        assert_eq!(rules[1].combinator, Some(Combinator::And));

        set_combinator(&mut rules, 1, Combinator::Or).unwrap();
        assert!(set_combinator(&mut rules, 0, Combinator::Or).is_err());
        assert!(set_combinator(&mut rules, 5, Combinator::Or).is_err());

        remove_filter(&mut rules, 0).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].combinator, None);
        assert!(remove_filter(&mut rules, 3).is_err());
    }

    #[test]
    fn test_evaluate_left_to_right_without_precedence() {
        let props = properties();
        let record = BTreeMap::from([
            ("title".to_string(), json!("Quarterly plan")),
            ("done".to_string(), json!(false)),
            ("estimate".to_string(), json!(5)),
        ]);
        // (false OR true) AND false == false; with precedence it would be true.
        let rules = vec![
            FilterRule::new("title", FilterOperator::StartsWith).with_value(json!("zzz")),
            FilterRule::new("estimate", FilterOperator::GreaterThan)
                .with_value(json!(3))
                .with_combinator(Combinator::Or),
            FilterRule::new("done", FilterOperator::Checked).with_combinator(Combinator::And),
        ];
        assert!(!evaluate(&record, &rules, &props));
        // false AND false OR true == true
        let rules = vec![
            FilterRule::new("done", FilterOperator::Checked),
            FilterRule::new("title", FilterOperator::IsEmpty).with_combinator(Combinator::And),
            FilterRule::new("title", FilterOperator::Contains)
                .with_value(json!("PLAN"))
                .with_combinator(Combinator::Or),
        ];
        assert!(evaluate(&record, &rules, &props));
        assert!(evaluate(&record, &[], &props));
    }

    #[test]
    fn test_evaluate_typed_operators() {
        let props = properties();
        let record = BTreeMap::from([
            ("status".to_string(), json!("doing")),
            ("tags".to_string(), json!(["x", "z"])),
            ("due".to_string(), json!("2026-03-14T09:00:00Z")),
        ]);
        let check = |rule: FilterRule| evaluate(&record, &[rule], &props);
        let rule = |id: &str, op: FilterOperator, value: Value| {
            FilterRule::new(id, op).with_value(value)
        };
        assert!(check(rule("status", FilterOperator::Equals, json!("doing"))));
        assert!(check(rule("tags", FilterOperator::In, json!(["y", "z"]))));
        assert!(!check(rule("tags", FilterOperator::ContainsAll, json!(["x", "y"]))));
        assert!(check(rule("tags", FilterOperator::NotIn, json!(["y"]))));
        assert!(check(rule("due", FilterOperator::Before, json!("2026-04-01"))));
        assert!(check(rule("due", FilterOperator::Equals, json!("2026-03-14"))));
        assert!(check(FilterRule::new("estimate", FilterOperator::IsEmpty)));
        assert!(!check(FilterRule::new("ghost", FilterOperator::IsEmpty)));
    }
}
