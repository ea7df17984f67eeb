use super::*;
use crate::model::component::{ComponentId, ComponentType};
use crate::model::value::{Keyframe, Value};

fn component(kind: ComponentType) -> Component {
    Component {
        id: ComponentId::generate(),
        kind,
        name: None,
        position: None,
        dimension: None,
        start_time: None,
        end_time: None,
        hidden: None,
        background_color: None,
        background_image: None,
        border_width: None,
        border_color: None,
        border_radius: None,
        opacity: None,
        translate: None,
        scale: None,
        tag: None,
        src: None,
        text: None,
        direction: None,
        form: None,
        reversed: None,
        children_ids: Vec::new(),
        pages_ids: Vec::new(),
        block_ids: Vec::new(),
    }
}

#[test]
fn active_window_is_start_inclusive_end_exclusive() {
    let mut page = component(ComponentType::Page);
    page.start_time = Some(5.0);
    page.end_time = Some(10.0);

    assert!(!active(&page, 4.999));
    assert!(active(&page, 5.0));
    assert!(active(&page, 9.999));
    assert!(!active(&page, 10.0));
}

#[test]
fn active_with_only_a_start_bound() {
    let mut page = component(ComponentType::Page);
    page.start_time = Some(3.0);
    assert!(!active(&page, 2.999));
    assert!(active(&page, 3.0));
    assert!(active(&page, 1000.0));
}

#[test]
fn active_with_only_an_end_bound() {
    let mut page = component(ComponentType::Page);
    page.end_time = Some(3.0);
    assert!(active(&page, 0.0));
    assert!(active(&page, 2.999));
    assert!(!active(&page, 3.0));
}

#[test]
fn active_without_bounds_is_always_true() {
    let page = component(ComponentType::Page);
    assert!(active(&page, 0.0));
    assert!(active(&page, f64::MAX));
}

#[test]
fn non_timeable_types_are_always_active() {
    let mut block = component(ComponentType::Block);
    // Stale bounds on a non-timeable type are ignored, not interpreted.
    block.start_time = Some(5.0);
    assert!(active(&block, 0.0));
}

#[test]
fn opacity_defaults_to_one_for_animatable_types() {
    let image = component(ComponentType::Image);
    assert_eq!(opacity_at(&image, 0.0), Some(1.0));

    let block = component(ComponentType::Block);
    assert_eq!(opacity_at(&block, 0.0), None);
}

#[test]
fn opacity_samples_its_keyframes() {
    let mut image = component(ComponentType::Image);
    image.opacity = Some(AnimatedValue::keyframed(vec![
        Keyframe(0.0, Value::Scalar(0.0)),
        Keyframe(4.0, Value::Scalar(1.0)),
    ]));
    assert_eq!(opacity_at(&image, 2.0), Some(0.5));
    assert_eq!(opacity_at(&image, 9.0), Some(1.0));
}

#[test]
fn translate_and_scale_fall_back_to_identity() {
    let image = component(ComponentType::Image);
    assert_eq!(translate_at(&image, 0.0), Some([0.0, 0.0]));
    assert_eq!(scale_at(&image, 0.0), Some([1.0, 1.0]));
}

#[test]
fn geometry_projections_are_capability_gated() {
    let page = component(ComponentType::Page);
    assert_eq!(position(&page), None);
    assert_eq!(dimension(&page), None);
    assert_eq!(hidden(&page), None);

    let block = component(ComponentType::Block);
    assert_eq!(position(&block), Some([0.0, 0.0]));
    assert_eq!(dimension(&block), Some([50.0, 50.0]));
    assert_eq!(hidden(&block), Some(false));
}

#[test]
fn style_projections_return_defaults_not_errors() {
    let mut block = component(ComponentType::Block);
    block.background_color = Some("#222".to_owned());
    let bg = background(&block).unwrap();
    assert_eq!(bg.color.as_deref(), Some("#222"));
    assert_eq!(bg.image, None);

    let b = border(&block).unwrap();
    assert_eq!(b.width, 0.0);
    assert_eq!(b.radius, 0.0);

    // SVG composes no background capability.
    let svg = component(ComponentType::Svg);
    assert_eq!(background(&svg), None);
}

#[test]
fn derivations_do_not_mutate_the_component() {
    let mut image = component(ComponentType::Image);
    image.start_time = Some(1.0);
    image.opacity = Some(AnimatedValue::keyframed(vec![
        Keyframe(0.0, Value::Scalar(0.0)),
        Keyframe(4.0, Value::Scalar(1.0)),
    ]));
    let before = image.clone();
    let _ = active(&image, 2.0);
    let _ = opacity_at(&image, 2.0);
    let _ = opacity_at(&image, 2.0);
    assert_eq!(image, before);
}
