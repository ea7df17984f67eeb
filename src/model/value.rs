use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::foundation::math::remap;

/// Numeric channels of one animated sample, e.g. `[x, y]` for a translation.
pub type ValueVec = SmallVec<[f64; 2]>;

/// A scalar or fixed-arity numeric value carried by an animated property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Single scalar channel.
    Scalar(f64),
    /// Fixed-arity numeric channels.
    Vector(ValueVec),
}

impl Value {
    /// Number of channels.
    pub fn arity(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Vector(v) => v.len(),
        }
    }

    /// Scalar channel, if this is a scalar.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Vector(_) => None,
        }
    }

    /// Two-channel view, if this is a two-element vector.
    pub fn as_pair(&self) -> Option<[f64; 2]> {
        match self {
            Value::Vector(v) if v.len() == 2 => Some([v[0], v[1]]),
            _ => None,
        }
    }
}

/// One `[time, value]` keyframe sample. Serializes as a two-element array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe(pub f64, pub Value);

impl Keyframe {
    /// Sample time in media seconds.
    pub fn time(&self) -> f64 {
        self.0
    }

    /// Sample value.
    pub fn value(&self) -> &Value {
        &self.1
    }
}

/// Payload of an [`AnimatedValue`]: either one static value or an ordered
/// keyframe track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    /// Static value, used when `animated` is false.
    Static(Value),
    /// Ordered `[time, value]` keyframes, used when `animated` is true.
    Keyframes(Vec<Keyframe>),
}

/// A property that is either a plain value or a keyframed track:
/// `{animated: bool, value: scalar | [[time, value], ...]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatedValue {
    /// Whether `value` is a keyframe track.
    pub animated: bool,
    /// The static value or keyframe track.
    pub value: AnimValue,
}

impl AnimatedValue {
    /// Build a non-animated scalar.
    pub fn scalar(v: f64) -> Self {
        Self {
            animated: false,
            value: AnimValue::Static(Value::Scalar(v)),
        }
    }

    /// Build a keyframed track from `[time, value]` pairs.
    pub fn keyframed(keys: Vec<Keyframe>) -> Self {
        Self {
            animated: true,
            value: AnimValue::Keyframes(keys),
        }
    }

    /// The value at `time`, honoring the animated flag.
    ///
    /// A non-animated payload returns its static value for any `time`; an
    /// animated payload is sampled per [`sample_keyframes`]. Returns `None`
    /// only for an animated payload with an empty track.
    pub fn value_at(&self, time: f64) -> Option<Value> {
        match (&self.value, self.animated) {
            (AnimValue::Static(v), _) => Some(v.clone()),
            (AnimValue::Keyframes(keys), true) => sample_keyframes(keys, time),
            // Animated flag cleared but a track kept around: treat the first
            // sample as the static value.
            (AnimValue::Keyframes(keys), false) => keys.first().map(|k| k.1.clone()),
        }
    }
}

/// Sample an ordered keyframe track at `time`.
///
/// Semantics:
/// - a single keyframe is returned unconditionally;
/// - before the first keyframe, the first value is returned (no extrapolation);
/// - past the last keyframe, the last value is returned (no extrapolation);
/// - an exact time match returns that keyframe's value without interpolation;
/// - otherwise the bracketing pair is linearly interpolated per channel.
pub fn sample_keyframes(keys: &[Keyframe], time: f64) -> Option<Value> {
    if keys.is_empty() {
        return None;
    }
    if keys.len() == 1 {
        return Some(keys[0].1.clone());
    }

    let idx = keys.partition_point(|k| k.0 < time);
    if idx >= keys.len() {
        return Some(keys[keys.len() - 1].1.clone());
    }
    if idx == 0 {
        return Some(keys[0].1.clone());
    }
    if keys[idx].0 == time {
        return Some(keys[idx].1.clone());
    }

    let a = &keys[idx - 1];
    let b = &keys[idx];
    Some(lerp_value(&a.1, &b.1, time, a.0, b.0))
}

fn lerp_value(a: &Value, b: &Value, time: f64, t0: f64, t1: f64) -> Value {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => Value::Scalar(remap(time, t0, t1, *x, *y)),
        (Value::Vector(xs), Value::Vector(ys)) if xs.len() == ys.len() => Value::Vector(
            xs.iter()
                .zip(ys.iter())
                .map(|(x, y)| remap(time, t0, t1, *x, *y))
                .collect(),
        ),
        // Mismatched arities are rejected by schema validation; hold the
        // earlier sample if one slips through.
        _ => a.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/value.rs"]
mod tests;
