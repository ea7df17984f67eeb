use super::*;
use serde_json::json;

#[test]
fn serde_uses_kebab_case_wire_names() {
    let c = Component {
        id: ComponentId::generate(),
        kind: ComponentType::Image,
        name: Some("logo".to_owned()),
        position: Some([10.0, 20.0]),
        dimension: Some([100.0, 80.0]),
        start_time: Some(2.5),
        end_time: Some(7.0),
        hidden: Some(false),
        background_color: Some("#fff".to_owned()),
        background_image: None,
        border_width: Some(1.0),
        border_color: None,
        border_radius: Some(4.0),
        opacity: None,
        translate: None,
        scale: None,
        tag: None,
        src: Some("logo.png".to_owned()),
        text: None,
        direction: None,
        form: None,
        reversed: None,
        children_ids: Vec::new(),
        pages_ids: Vec::new(),
        block_ids: Vec::new(),
    };

    let v = serde_json::to_value(&c).unwrap();
    assert_eq!(v["type"], json!("Image"));
    assert_eq!(v["start-time"], json!(2.5));
    assert_eq!(v["end-time"], json!(7.0));
    assert_eq!(v["background-color"], json!("#fff"));
    assert_eq!(v["border-width"], json!(1.0));
    assert!(v.get("pages_ids").is_none(), "empty lists are skipped");

    let back: Component = serde_json::from_value(v).unwrap();
    assert_eq!(back, c);
}

#[test]
fn svg_type_tag_is_uppercase() {
    assert_eq!(
        serde_json::to_value(ComponentType::Svg).unwrap(),
        json!("SVG")
    );
    let parsed: ComponentType = serde_json::from_value(json!("SVG")).unwrap();
    assert_eq!(parsed, ComponentType::Svg);
}

#[test]
fn owned_reference_fields_per_type() {
    assert_eq!(
        ComponentType::Scenario.owned_reference_field(),
        Some("children_ids")
    );
    assert_eq!(
        ComponentType::Block.owned_reference_field(),
        Some("pages_ids")
    );
    assert_eq!(ComponentType::Text.owned_reference_field(), None);
    assert_eq!(
        ComponentType::BlockToggler.association_reference_field(),
        Some("block_ids")
    );
    assert_eq!(ComponentType::Block.association_reference_field(), None);
}

#[test]
fn blocks_only_hold_pages() {
    assert_eq!(
        ComponentType::Block.allowed_children(),
        &[ComponentType::Page]
    );
    assert!(
        ComponentType::Scenario
            .allowed_children()
            .contains(&ComponentType::Block)
    );
    assert!(
        !ComponentType::Page
            .allowed_children()
            .contains(&ComponentType::Block)
    );
}
