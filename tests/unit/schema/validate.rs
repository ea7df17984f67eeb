use super::*;
use crate::model::component::ComponentType;
use crate::schema::compose::SchemaSet;
use serde_json::json;

fn schema_for(kind: ComponentType) -> crate::schema::compose::Schema {
    SchemaSet::new().unwrap().schema(kind).unwrap().clone()
}

#[test]
fn unknown_fields_are_rejected_with_a_path() {
    let schema = schema_for(ComponentType::Block);
    let err = validate(&schema, &json!({"flavor": "vanilla"})).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("$.flavor"), "got: {rendered}");
    assert!(rendered.contains("unknown field"));
}

#[test]
fn pair_minimum_is_reported_per_element() {
    let schema = schema_for(ComponentType::Block);
    let err = validate(&schema, &json!({"dimension": [0, 50]})).unwrap_err();
    assert!(err.to_string().contains("$.dimension[0]: must be >= 1"));
}

#[test]
fn keyword_membership_is_enforced() {
    let schema = schema_for(ComponentType::Media);
    let err = validate(&schema, &json!({"tag": "scroll"})).unwrap_err();
    assert!(err.to_string().contains("$.tag"));
    assert!(validate(&schema, &json!({"tag": "video"})).is_ok());
}

#[test]
fn time_fields_must_be_non_negative() {
    let schema = schema_for(ComponentType::Page);
    let err = validate(&schema, &json!({"start-time": -1.0})).unwrap_err();
    assert!(err.to_string().contains("start-time"));
}

#[test]
fn animated_track_times_must_be_sorted() {
    let schema = schema_for(ComponentType::Image);
    let bad = json!({"opacity": {"animated": true, "value": [[5.0, 1.0], [2.0, 0.0]]}});
    assert!(validate(&schema, &bad).is_err());

    let good = json!({"opacity": {"animated": true, "value": [[2.0, 0.0], [5.0, 1.0]]}});
    assert!(validate(&schema, &good).is_ok());
}

#[test]
fn animated_channel_arity_is_checked() {
    let schema = schema_for(ComponentType::Image);
    let bad = json!({"translate": {"animated": false, "value": 3.0}});
    assert!(validate(&schema, &bad).is_err());

    let good = json!({"translate": {"animated": false, "value": [3.0, 4.0]}});
    assert!(validate(&schema, &good).is_ok());
}

#[test]
fn every_violation_is_collected() {
    let schema = schema_for(ComponentType::Block);
    let err = validate(
        &schema,
        &json!({"dimension": [0, 0], "hidden": "yes"}),
    )
    .unwrap_err();
    assert!(err.errors.len() >= 3, "got: {err}");
}

#[test]
fn defaults_fill_absent_fields_and_drop_nulls() {
    let schema = schema_for(ComponentType::Block);
    let mut payload = json!({"name": null}).as_object().unwrap().clone();
    apply_defaults(&schema, &mut payload);

    assert!(!payload.contains_key("name"));
    assert_eq!(payload.get("hidden"), Some(&json!(false)));
    assert_eq!(payload.get("position"), Some(&json!([0, 0])));
    assert_eq!(payload.get("dimension"), Some(&json!([50, 50])));
    assert_eq!(payload.get("pages_ids"), Some(&json!([])));
}

#[test]
fn id_and_type_keys_are_exempt_from_unknown_field_checks() {
    let schema = schema_for(ComponentType::Block);
    let ok = json!({"id": "8c8c98c5-2291-4d4d-bb0e-8657dcbc1c5e", "type": "Block"});
    assert!(validate(&schema, &ok).is_ok());
}
