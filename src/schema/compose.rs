use std::collections::BTreeMap;

use serde_json::{Value as Json, json};

use crate::foundation::error::{MetascoreError, MetascoreResult};
use crate::model::capability::{Capability, capabilities};
use crate::model::component::ComponentType;

/// Constraint class of one schema field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Boolean flag.
    Bool,
    /// Finite number with an optional inclusive minimum.
    Number {
        /// Inclusive lower bound, if any.
        min: Option<f64>,
    },
    /// Free-form string.
    Text,
    /// CSS-style color string.
    Color,
    /// Non-negative time in media seconds; may be absent (unbounded).
    TimeSeconds,
    /// Two-element numeric array with an optional per-element minimum.
    Pair {
        /// Inclusive per-element lower bound, if any.
        min: Option<f64>,
    },
    /// `{animated, value}` payload with the given channel arity.
    Animated {
        /// Channel count: 1 for a scalar track, 2 for an `[x, y]` track.
        arity: usize,
    },
    /// Ordered list of component-id strings.
    IdList,
    /// String restricted to a fixed keyword set.
    Keyword(&'static [&'static str]),
}

impl FieldKind {
    /// Whether `other` may override this spec on a field-name collision.
    ///
    /// Overriding is a shallow merge (later mixin wins wholesale); only specs
    /// of the same constraint class are allowed to collide.
    fn compatible(&self, other: &FieldKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// One field contributed to a composed schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// Constraint class.
    pub kind: FieldKind,
    /// Whether the field must be present after defaults are applied.
    pub required: bool,
    /// Default filled in when the field is absent.
    pub default: Option<Json>,
}

impl FieldSpec {
    fn optional(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
        }
    }

    fn with_default(kind: FieldKind, default: Json) -> Self {
        Self {
            kind,
            required: true,
            default: Some(default),
        }
    }
}

/// Conditional override applied when a discriminator field holds a value.
#[derive(Clone, Debug)]
pub(crate) struct Conditional {
    pub(crate) field: &'static str,
    pub(crate) equals: Json,
    pub(crate) overrides: Vec<(&'static str, FieldSpec)>,
}

/// Deterministic composed schema for one component type: the base field set
/// plus the contribution of each capability mixin, in composition order.
#[derive(Clone, Debug)]
pub struct Schema {
    pub(crate) fields: BTreeMap<&'static str, FieldSpec>,
    pub(crate) conditionals: Vec<Conditional>,
}

impl Schema {
    /// Spec of `field`, ignoring conditional overrides.
    pub fn field(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    /// Field names in the composed schema, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    pub(crate) fn merge(
        &mut self,
        contrib: Vec<(&'static str, FieldSpec)>,
    ) -> MetascoreResult<()> {
        for (name, spec) in contrib {
            if let Some(existing) = self.fields.get(name)
                && !existing.kind.compatible(&spec.kind)
            {
                return Err(MetascoreError::schema(format!(
                    "mixins contribute incompatible specs for field '{name}': {:?} vs {:?}",
                    existing.kind, spec.kind
                )));
            }
            self.fields.insert(name, spec);
        }
        Ok(())
    }

    /// Field specs effective for `payload`, with conditional overrides applied
    /// based on the payload's (or defaulted) discriminator values.
    pub(crate) fn effective_fields(
        &self,
        payload: &serde_json::Map<String, Json>,
    ) -> BTreeMap<&'static str, FieldSpec> {
        let mut fields = self.fields.clone();
        for cond in &self.conditionals {
            let actual = payload
                .get(cond.field)
                .cloned()
                .or_else(|| self.fields.get(cond.field).and_then(|s| s.default.clone()));
            if actual.as_ref() == Some(&cond.equals) {
                for (name, spec) in &cond.overrides {
                    fields.insert(name, spec.clone());
                }
            }
        }
        fields
    }
}

/// Composed schemas for every component type.
///
/// Built once per session and owned by the store; composition failures
/// (incompatible mixin contributions) surface here, at build time, never
/// during validation.
#[derive(Clone, Debug)]
pub struct SchemaSet {
    by_type: BTreeMap<ComponentType, Schema>,
}

impl SchemaSet {
    /// Compose the schema of every component type.
    pub fn new() -> MetascoreResult<Self> {
        let mut by_type = BTreeMap::new();
        for ty in ComponentType::ALL {
            by_type.insert(ty, compose_schema(ty)?);
        }
        Ok(Self { by_type })
    }

    /// The composed schema for `kind`.
    pub fn schema(&self, kind: ComponentType) -> Option<&Schema> {
        self.by_type.get(&kind)
    }
}

/// Compose the schema for one component type: base fields, then each
/// capability mixin's contribution in declared order, later mixins overriding
/// earlier ones on compatible field-name collisions.
pub(crate) fn compose_schema(kind: ComponentType) -> MetascoreResult<Schema> {
    let mut schema = Schema {
        fields: BTreeMap::new(),
        conditionals: Vec::new(),
    };

    schema.merge(base_fields(kind))?;
    for cap in capabilities(kind) {
        schema.merge(capability_fields(*cap))?;
    }

    if kind == ComponentType::Media {
        schema.conditionals.push(Conditional {
            field: "tag",
            equals: json!("video"),
            overrides: vec![(
                "dimension",
                FieldSpec::with_default(FieldKind::Pair { min: Some(1.0) }, json!([320, 240])),
            )],
        });
    }

    Ok(schema)
}

fn base_fields(kind: ComponentType) -> Vec<(&'static str, FieldSpec)> {
    let mut fields = vec![("name", FieldSpec::optional(FieldKind::Text))];

    match kind {
        ComponentType::Scenario | ComponentType::Page => {
            fields.push((
                "children_ids",
                FieldSpec::with_default(FieldKind::IdList, json!([])),
            ));
        }
        ComponentType::Block => {
            fields.push((
                "pages_ids",
                FieldSpec::with_default(FieldKind::IdList, json!([])),
            ));
        }
        ComponentType::BlockToggler => {
            fields.push((
                "block_ids",
                FieldSpec::with_default(FieldKind::IdList, json!([])),
            ));
        }
        ComponentType::Media => {
            fields.push((
                "tag",
                FieldSpec::with_default(FieldKind::Keyword(&["audio", "video"]), json!("audio")),
            ));
            fields.push(("src", FieldSpec::optional(FieldKind::Text)));
        }
        ComponentType::Image | ComponentType::Svg => {
            fields.push(("src", FieldSpec::optional(FieldKind::Text)));
        }
        ComponentType::Animation => {
            fields.push(("src", FieldSpec::optional(FieldKind::Text)));
            fields.push((
                "reversed",
                FieldSpec::with_default(FieldKind::Bool, json!(false)),
            ));
        }
        ComponentType::Text | ComponentType::Content => {
            fields.push(("text", FieldSpec::optional(FieldKind::Text)));
        }
        ComponentType::Cursor => {
            fields.push((
                "direction",
                FieldSpec::with_default(
                    FieldKind::Keyword(&["right", "left", "top", "bottom"]),
                    json!("right"),
                ),
            ));
            fields.push((
                "form",
                FieldSpec::with_default(FieldKind::Keyword(&["linear", "circular"]), json!("linear")),
            ));
        }
        ComponentType::Controller | ComponentType::VideoRenderer => {}
    }

    fields
}

fn capability_fields(cap: Capability) -> Vec<(&'static str, FieldSpec)> {
    match cap {
        Capability::Positionable => vec![(
            "position",
            FieldSpec::with_default(FieldKind::Pair { min: None }, json!([0, 0])),
        )],
        Capability::Resizable => vec![(
            "dimension",
            FieldSpec::with_default(FieldKind::Pair { min: Some(1.0) }, json!([50, 50])),
        )],
        Capability::Timeable => vec![
            ("start-time", FieldSpec::optional(FieldKind::TimeSeconds)),
            ("end-time", FieldSpec::optional(FieldKind::TimeSeconds)),
        ],
        Capability::Hideable => vec![(
            "hidden",
            FieldSpec::with_default(FieldKind::Bool, json!(false)),
        )],
        Capability::Backgroundable => vec![
            ("background-color", FieldSpec::optional(FieldKind::Color)),
            ("background-image", FieldSpec::optional(FieldKind::Text)),
        ],
        Capability::Borderable => vec![
            (
                "border-width",
                FieldSpec::with_default(FieldKind::Number { min: Some(0.0) }, json!(0)),
            ),
            ("border-color", FieldSpec::optional(FieldKind::Color)),
            (
                "border-radius",
                FieldSpec::with_default(FieldKind::Number { min: Some(0.0) }, json!(0)),
            ),
        ],
        Capability::Animatable => vec![
            (
                "opacity",
                FieldSpec::with_default(
                    FieldKind::Animated { arity: 1 },
                    json!({"animated": false, "value": 1.0}),
                ),
            ),
            ("translate", FieldSpec::optional(FieldKind::Animated { arity: 2 })),
            ("scale", FieldSpec::optional(FieldKind::Animated { arity: 2 })),
        ],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/compose.rs"]
mod tests;
