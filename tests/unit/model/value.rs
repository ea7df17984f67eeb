use super::*;
use serde_json::json;
use smallvec::smallvec;

fn track(pairs: &[(f64, f64)]) -> Vec<Keyframe> {
    pairs
        .iter()
        .map(|(t, v)| Keyframe(*t, Value::Scalar(*v)))
        .collect()
}

#[test]
fn linear_midpoint() {
    let keys = track(&[(0.0, 0.0), (10.0, 100.0)]);
    assert_eq!(sample_keyframes(&keys, 5.0), Some(Value::Scalar(50.0)));
}

#[test]
fn no_extrapolation_before_start() {
    let keys = track(&[(0.0, 0.0), (10.0, 100.0)]);
    assert_eq!(sample_keyframes(&keys, 0.0), Some(Value::Scalar(0.0)));
    assert_eq!(sample_keyframes(&keys, -3.0), Some(Value::Scalar(0.0)));
}

#[test]
fn no_extrapolation_past_end() {
    let keys = track(&[(0.0, 0.0), (10.0, 100.0)]);
    assert_eq!(sample_keyframes(&keys, 15.0), Some(Value::Scalar(100.0)));
}

#[test]
fn single_keyframe_is_unconditional() {
    let keys = track(&[(4.0, 7.0)]);
    assert_eq!(sample_keyframes(&keys, 0.0), Some(Value::Scalar(7.0)));
    assert_eq!(sample_keyframes(&keys, 100.0), Some(Value::Scalar(7.0)));
}

#[test]
fn exact_sample_point_skips_interpolation() {
    let keys = track(&[(0.0, 0.0), (5.0, 10.0), (10.0, 100.0)]);
    assert_eq!(sample_keyframes(&keys, 5.0), Some(Value::Scalar(10.0)));
}

#[test]
fn empty_track_has_no_value() {
    assert_eq!(sample_keyframes(&[], 1.0), None);
}

#[test]
fn vector_values_interpolate_per_channel() {
    let keys = vec![
        Keyframe(0.0, Value::Vector(smallvec![0.0, 100.0])),
        Keyframe(10.0, Value::Vector(smallvec![10.0, 0.0])),
    ];
    assert_eq!(
        sample_keyframes(&keys, 5.0),
        Some(Value::Vector(smallvec![5.0, 50.0]))
    );
}

#[test]
fn static_value_ignores_time() {
    let v = AnimatedValue::scalar(0.25);
    assert_eq!(v.value_at(0.0), Some(Value::Scalar(0.25)));
    assert_eq!(v.value_at(99.0), Some(Value::Scalar(0.25)));
}

#[test]
fn animated_value_samples_its_track() {
    let v = AnimatedValue::keyframed(track(&[(0.0, 0.0), (10.0, 1.0)]));
    assert_eq!(v.value_at(5.0), Some(Value::Scalar(0.5)));
}

#[test]
fn keyframe_wire_format_is_a_time_value_pair() {
    let k: Keyframe = serde_json::from_value(json!([2.0, [3.0, 4.0]])).unwrap();
    assert_eq!(k.time(), 2.0);
    assert_eq!(k.value().as_pair(), Some([3.0, 4.0]));
    assert_eq!(serde_json::to_value(&k).unwrap(), json!([2.0, [3.0, 4.0]]));

    let scalar: Keyframe = serde_json::from_value(json!([1.5, 0.75])).unwrap();
    assert_eq!(scalar.value().as_scalar(), Some(0.75));
}

#[test]
fn animated_payload_round_trips() {
    let v: AnimatedValue = serde_json::from_value(json!({
        "animated": true,
        "value": [[0.0, 0.0], [10.0, [1.0, 2.0]]]
    }))
    .unwrap();
    assert!(v.animated);
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["value"][1], json!([10.0, [1.0, 2.0]]));
}
