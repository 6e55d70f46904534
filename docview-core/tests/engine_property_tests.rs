use docview_core::filter::{prepare_filters, set_filter_property, validate_filter};
use docview_core::policy::{coerce_batch, is_hideable, is_removable};
use docview_core::sort::{move_sort, remove_sort, sort_payload};
use docview_core::{
    operators_for, resolve, to_server_type, EndpointIds, FilterOperator, FilterRule,
    FrozenProperty, FrozenPropertyConfig, MoveDirection, Operation, PropertyDefinition,
    PropertyType, SelectOption, SortDirection, SortRule, ViewPropertyUpdate,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::{BTreeSet, HashSet};

fn arb_property_type() -> impl Strategy<Value = PropertyType> {
    prop::sample::select(PropertyType::ALL.to_vec())
}

fn arb_frozen_entry(property_id: String) -> impl Strategy<Value = FrozenProperty> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        move |(allow_edit, allow_hide, allow_delete)| FrozenProperty {
            property_id: property_id.clone(),
            reason: None,
            allow_edit,
            allow_hide,
            allow_delete,
        },
    )
}

fn tags_property() -> PropertyDefinition {
    PropertyDefinition::new("tags", "Tags", PropertyType::MultiSelect).with_options(option_ids())
}

fn option_ids() -> Vec<SelectOption> {
    ["x", "y", "z"]
        .iter()
        .map(|id| SelectOption {
            id: id.to_string(),
            label: id.to_uppercase(),
            color: "blue".to_string(),
        })
        .collect()
}

fn property_pair(a: PropertyType, b: PropertyType) -> Vec<PropertyDefinition> {
    vec![
        PropertyDefinition::new("a", "A", a).with_options(option_ids()),
        PropertyDefinition::new("b", "B", b)
            .with_order(1)
            .with_options(option_ids()),
    ]
}

#[test]
fn multi_select_in_value_is_deduplicated() {
    let properties = vec![tags_property()];
    let rules =
        vec![FilterRule::new("tags", FilterOperator::In).with_value(json!(["x", "x", "y"]))];
    let prepared = prepare_filters(&rules, &properties).unwrap();
    assert_eq!(prepared[0].value, Some(json!(["x", "y"])));
}

#[test]
fn move_sort_down_reprioritizes() {
    let mut sorts = vec![
        SortRule::new("a", SortDirection::Asc),
        SortRule::new("b", SortDirection::Desc),
    ];
    move_sort(&mut sorts, 0, MoveDirection::Down).unwrap();
    assert_eq!(
        sorts,
        vec![
            SortRule::new("b", SortDirection::Desc),
            SortRule::new("a", SortDirection::Asc),
        ]
    );
    let priorities: Vec<_> = sort_payload(&sorts).iter().map(|e| e.priority).collect();
    assert_eq!(priorities, vec![0, 1]);
}

#[test]
fn required_title_is_coerced_visible() {
    let config = FrozenPropertyConfig {
        required_properties: BTreeSet::from(["title".to_string()]),
        ..Default::default()
    };
    let batch = coerce_batch(vec![ViewPropertyUpdate::new("title").visible(false)], &config);
    let payload = serde_json::to_value(&batch).unwrap();
    assert_eq!(payload, json!([{"propertyId": "title", "visible": true}]));
}

#[test]
fn server_type_examples() {
    assert_eq!(to_server_type("MULTI_SELECT"), "multiSelect");
    assert_eq!(to_server_type("UNKNOWN_TYPE"), "unknown_type");
}

#[test]
fn people_vs_tasks_property_paths() {
    let people = resolve(
        "people",
        Operation::AddProperty,
        &EndpointIds::view("v1").with_property("p1"),
    )
    .unwrap();
    assert!(people.path.contains("/views/v1/properties"));

    let tasks = resolve("tasks", Operation::AddProperty, &EndpointIds::property("p1")).unwrap();
    assert!(tasks.path.ends_with("/properties"));
    assert!(!tasks.path.contains("/views/"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every type has a non-empty catalog without duplicates.
    #[test]
    fn catalogs_are_non_empty_and_unique(ty in arb_property_type()) {
        let ops = operators_for(ty);
        prop_assert!(!ops.is_empty());
        let unique: HashSet<_> = ops.iter().map(|d| d.operator).collect();
        prop_assert_eq!(unique.len(), ops.len());
    }

    // Valueless operators never serialize a value, whatever the caller left behind.
    #[test]
    fn valueless_rules_serialize_without_value(
        ty in arb_property_type(),
        leftover in prop::option::of(".{0,12}"),
    ) {
        let properties = vec![PropertyDefinition::new("p", "P", ty)];
        for descriptor in operators_for(ty).iter().filter(|d| !d.requires_value) {
            let mut rule = FilterRule::new("p", descriptor.operator);
            rule.value = leftover.clone().map(serde_json::Value::String);
            let normalized = validate_filter(&rule, &properties).unwrap();
            let wire = serde_json::to_value(&normalized).unwrap();
            prop_assert!(wire.get("value").is_none());
        }
    }

    // Retargeting always lands on the target's default operator with no value,
    // and going back does not restore the original state.
    #[test]
    fn set_filter_property_resets(a in arb_property_type(), b in arb_property_type()) {
        let properties = property_pair(a, b);
        let original = operators_for(a)
            .iter()
            .rev()
            .find(|d| d.requires_value)
            .map(|d| FilterRule::new("a", d.operator).with_value(json!("kept")))
            .unwrap_or_else(|| FilterRule::new("a", operators_for(a)[0].operator));

        let mut rule = original.clone();
        set_filter_property(&mut rule, "b", &properties).unwrap();
        prop_assert_eq!(rule.operator, operators_for(b)[0].operator);
        prop_assert!(rule.value.is_none());

        set_filter_property(&mut rule, "a", &properties).unwrap();
        prop_assert_eq!(rule.operator, operators_for(a)[0].operator);
        prop_assert!(rule.value.is_none());
    }

    // Required ids are never removable, whatever the frozen entry says.
    #[test]
    fn required_never_removable(entry in arb_frozen_entry("title".to_string())) {
        let config = FrozenPropertyConfig {
            required_properties: BTreeSet::from(["title".to_string()]),
            frozen_properties: vec![entry],
            ..Default::default()
        };
        prop_assert!(!is_removable("title", &config));
        prop_assert!(!is_hideable("title", &config));
    }

    // Coercion pins visible for required ids and frozen to !allow_hide.
    #[test]
    fn coerce_batch_enforces_policy(
        entry in arb_frozen_entry("status".to_string()),
        visible in prop::option::of(any::<bool>()),
        frozen in prop::option::of(any::<bool>()),
    ) {
        let allow_hide = entry.allow_hide;
        let config = FrozenPropertyConfig {
            required_properties: BTreeSet::from(["title".to_string()]),
            frozen_properties: vec![entry],
            ..Default::default()
        };
        let request = |id: &str| ViewPropertyUpdate {
            property_id: id.to_string(),
            visible,
            frozen,
            ..Default::default()
        };
        let batch = vec![request("title"), request("status"), request("notes")];
        let out = coerce_batch(batch, &config);
        prop_assert_eq!(out[0].visible, Some(true));
        prop_assert_eq!(out[1].frozen, Some(!allow_hide));
        prop_assert_eq!(out[2].visible, visible);
        prop_assert_eq!(out[2].frozen, frozen);
    }

    // Priorities always equal list positions after removals.
    #[test]
    fn priorities_follow_positions(len in 1usize..8, remove in 0usize..8) {
        let mut sorts: Vec<SortRule> = (0..len)
            .map(|i| SortRule::new(format!("p{}", i), SortDirection::Asc))
            .collect();
        let _ = remove_sort(&mut sorts, remove);
        for (index, entry) in sort_payload(&sorts).iter().enumerate() {
            prop_assert_eq!(entry.priority, index);
        }
    }

    // Duplicates never survive multi-select normalization.
    #[test]
    fn multi_select_values_unique(
        values in prop::collection::vec(prop::sample::select(vec!["x", "y", "z"]), 1..10),
    ) {
        let properties = vec![tags_property()];
        let rule = FilterRule::new("tags", FilterOperator::ContainsAll).with_value(json!(values));
        let normalized = validate_filter(&rule, &properties).unwrap();
        let sent = normalized.value.unwrap();
        let sent: Vec<&str> = sent.as_array().unwrap().iter().filter_map(|v| v.as_str()).collect();
        let unique: HashSet<_> = sent.iter().collect();
        prop_assert_eq!(unique.len(), sent.len());
    }

    // Unknown modules resolve through the generic templates.
    #[test]
    fn unknown_modules_use_generic_template(module in "[a-z]{3,12}") {
        let builtin = ["tasks", "projects", "books", "people", "content", "databases"];
        prop_assume!(!builtin.contains(&module.as_str()));
        let views = resolve(&module, Operation::ListViews, &EndpointIds::none()).unwrap();
        prop_assert_eq!(views.path, format!("/document-views/{}/views", module));
        let records = resolve(&module, Operation::ListRecords, &EndpointIds::none()).unwrap();
        prop_assert_eq!(records.path, format!("/second-brain/{}", module));
    }
}
