//! Pure derived-property functions.
//!
//! Every function maps `(component, media time)` to a display-facing value
//! without mutating the component; calling twice with identical inputs yields
//! identical output. Projections are gated by the owning type's capability
//! set and return `None` for types lacking the capability, never an error.

use crate::model::capability::{Capability, has_capability};
use crate::model::component::Component;
use crate::model::value::AnimatedValue;

/// Whether `component` is inside its active window at `time`.
///
/// Timeable semantics: no bounds means always active; only `end-time` means
/// active strictly before it; only `start-time` means active from it onward;
/// both bounds mean the half-open interval `[start-time, end-time)`. The
/// upper bound is exclusive so adjacent windows partition the timeline.
/// Types without the Timeable capability are always active.
pub fn active(component: &Component, time: f64) -> bool {
    if !has_capability(component.kind, Capability::Timeable) {
        return true;
    }
    match (component.start_time, component.end_time) {
        (None, None) => true,
        (Some(start), None) => time >= start,
        (None, Some(end)) => time < end,
        (Some(start), Some(end)) => time >= start && time < end,
    }
}

/// Opacity in `[0, 1]` at `time`, for Animatable types.
pub fn opacity_at(component: &Component, time: f64) -> Option<f64> {
    if !has_capability(component.kind, Capability::Animatable) {
        return None;
    }
    match &component.opacity {
        Some(v) => v.value_at(time).and_then(|v| v.as_scalar()),
        None => Some(1.0),
    }
}

/// `[x, y]` translation at `time`, for Animatable types.
pub fn translate_at(component: &Component, time: f64) -> Option<[f64; 2]> {
    sample_pair(component, component.translate.as_ref(), time, [0.0, 0.0])
}

/// `[x, y]` scale at `time`, for Animatable types.
pub fn scale_at(component: &Component, time: f64) -> Option<[f64; 2]> {
    sample_pair(component, component.scale.as_ref(), time, [1.0, 1.0])
}

fn sample_pair(
    component: &Component,
    value: Option<&AnimatedValue>,
    time: f64,
    fallback: [f64; 2],
) -> Option<[f64; 2]> {
    if !has_capability(component.kind, Capability::Animatable) {
        return None;
    }
    match value {
        Some(v) => v.value_at(time).and_then(|v| v.as_pair()),
        None => Some(fallback),
    }
}

/// Pixel position, for Positionable types.
pub fn position(component: &Component) -> Option<[f64; 2]> {
    if !has_capability(component.kind, Capability::Positionable) {
        return None;
    }
    Some(component.position.unwrap_or([0.0, 0.0]))
}

/// Pixel dimension, for Resizable types.
pub fn dimension(component: &Component) -> Option<[f64; 2]> {
    if !has_capability(component.kind, Capability::Resizable) {
        return None;
    }
    Some(component.dimension.unwrap_or([50.0, 50.0]))
}

/// Authored visibility toggle, for Hideable types.
pub fn hidden(component: &Component) -> Option<bool> {
    if !has_capability(component.kind, Capability::Hideable) {
        return None;
    }
    Some(component.hidden.unwrap_or(false))
}

/// Background projection of a Backgroundable component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackgroundStyle {
    /// CSS-style color, if set.
    pub color: Option<String>,
    /// Image source, if set.
    pub image: Option<String>,
}

/// Background style, for Backgroundable types.
pub fn background(component: &Component) -> Option<BackgroundStyle> {
    if !has_capability(component.kind, Capability::Backgroundable) {
        return None;
    }
    Some(BackgroundStyle {
        color: component.background_color.clone(),
        image: component.background_image.clone(),
    })
}

/// Border projection of a Borderable component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BorderStyle {
    /// Border width in pixels.
    pub width: f64,
    /// Border color, if set.
    pub color: Option<String>,
    /// Corner radius in pixels.
    pub radius: f64,
}

/// Border style, for Borderable types.
pub fn border(component: &Component) -> Option<BorderStyle> {
    if !has_capability(component.kind, Capability::Borderable) {
        return None;
    }
    Some(BorderStyle {
        width: component.border_width.unwrap_or(0.0),
        color: component.border_color.clone(),
        radius: component.border_radius.unwrap_or(0.0),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/eval/properties.rs"]
mod tests;
