use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value as Json;
use uuid::Uuid;

use crate::schema::compose::{FieldKind, FieldSpec, Schema};

/// One element of a violation path, e.g. `$.dimension[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaPathElem {
    /// Named object field.
    Field(String),
    /// Array index.
    Index(usize),
}

/// One schema violation with the path it occurred at.
#[derive(Debug, Clone)]
pub struct SchemaViolation {
    /// Path from the payload root to the offending value.
    pub path: Vec<SchemaPathElem>,
    /// Human-readable constraint description.
    pub message: String,
}

impl SchemaViolation {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// All violations collected while validating one payload.
#[derive(Debug, Clone)]
pub struct SchemaErrors {
    /// The individual violations, in field order.
    pub errors: Vec<SchemaViolation>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

// Keys managed by the store rather than by composed schemas.
const RESERVED_KEYS: [&str; 3] = ["id", "type", "parent"];

/// Validate an object payload against a composed schema, collecting every
/// violation rather than stopping at the first.
pub fn validate(schema: &Schema, payload: &Json) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();

    let Some(obj) = payload.as_object() else {
        return Err(SchemaErrors {
            errors: vec![SchemaViolation::at(&[], "payload must be an object")],
        });
    };

    let fields = schema.effective_fields(obj);

    for key in obj.keys() {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !fields.contains_key(key.as_str()) {
            errors.push(SchemaViolation::at(
                &[SchemaPathElem::Field(key.clone())],
                "unknown field for this component type",
            ));
        }
    }

    for (name, spec) in &fields {
        let path = vec![SchemaPathElem::Field((*name).to_owned())];
        match obj.get(*name) {
            None | Some(Json::Null) => {
                if spec.required && spec.default.is_none() {
                    errors.push(SchemaViolation::at(&path, "required field is missing"));
                }
            }
            Some(value) => check_field(&path, spec, value, &mut errors),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

/// Fill schema defaults into `payload` for every absent field, honoring
/// conditional overrides, and drop explicit nulls.
pub fn apply_defaults(schema: &Schema, payload: &mut serde_json::Map<String, Json>) {
    payload.retain(|_, v| !v.is_null());
    let fields: BTreeMap<&'static str, FieldSpec> = schema.effective_fields(payload);
    for (name, spec) in fields {
        if payload.contains_key(name) {
            continue;
        }
        if let Some(default) = spec.default {
            payload.insert(name.to_owned(), default);
        }
    }
}

fn check_field(
    path: &[SchemaPathElem],
    spec: &FieldSpec,
    value: &Json,
    errors: &mut Vec<SchemaViolation>,
) {
    match &spec.kind {
        FieldKind::Bool => {
            if !value.is_boolean() {
                errors.push(SchemaViolation::at(path, "must be a boolean"));
            }
        }
        FieldKind::Number { min } => {
            check_number(path, value, *min, errors);
        }
        FieldKind::Text | FieldKind::Color => {
            if !value.is_string() {
                errors.push(SchemaViolation::at(path, "must be a string"));
            }
        }
        FieldKind::TimeSeconds => {
            check_number(path, value, Some(0.0), errors);
        }
        FieldKind::Pair { min } => {
            let Some(arr) = value.as_array() else {
                errors.push(SchemaViolation::at(path, "must be a two-element array"));
                return;
            };
            if arr.len() != 2 {
                errors.push(SchemaViolation::at(path, "must have exactly two elements"));
                return;
            }
            for (i, elem) in arr.iter().enumerate() {
                let mut elem_path = path.to_vec();
                elem_path.push(SchemaPathElem::Index(i));
                check_number(&elem_path, elem, *min, errors);
            }
        }
        FieldKind::Animated { arity } => {
            check_animated(path, value, *arity, errors);
        }
        FieldKind::IdList => {
            let Some(arr) = value.as_array() else {
                errors.push(SchemaViolation::at(path, "must be an array of ids"));
                return;
            };
            for (i, elem) in arr.iter().enumerate() {
                let mut elem_path = path.to_vec();
                elem_path.push(SchemaPathElem::Index(i));
                match elem.as_str() {
                    Some(s) if Uuid::parse_str(s).is_ok() => {}
                    _ => errors.push(SchemaViolation::at(&elem_path, "must be a UUID string")),
                }
            }
        }
        FieldKind::Keyword(allowed) => match value.as_str() {
            Some(s) if allowed.contains(&s) => {}
            _ => errors.push(SchemaViolation::at(
                path,
                format!("must be one of {allowed:?}"),
            )),
        },
    }
}

fn check_number(
    path: &[SchemaPathElem],
    value: &Json,
    min: Option<f64>,
    errors: &mut Vec<SchemaViolation>,
) {
    let Some(n) = value.as_f64() else {
        errors.push(SchemaViolation::at(path, "must be a number"));
        return;
    };
    if !n.is_finite() {
        errors.push(SchemaViolation::at(path, "must be finite"));
        return;
    }
    if let Some(min) = min
        && n < min
    {
        errors.push(SchemaViolation::at(path, format!("must be >= {min}")));
    }
}

fn check_animated(
    path: &[SchemaPathElem],
    value: &Json,
    arity: usize,
    errors: &mut Vec<SchemaViolation>,
) {
    let Some(obj) = value.as_object() else {
        errors.push(SchemaViolation::at(
            path,
            "must be an object with 'animated' and 'value'",
        ));
        return;
    };

    let animated = match obj.get("animated") {
        Some(Json::Bool(b)) => *b,
        _ => {
            let mut p = path.to_vec();
            p.push(SchemaPathElem::Field("animated".to_owned()));
            errors.push(SchemaViolation::at(&p, "must be a boolean"));
            return;
        }
    };

    let mut value_path = path.to_vec();
    value_path.push(SchemaPathElem::Field("value".to_owned()));
    let Some(payload) = obj.get("value") else {
        errors.push(SchemaViolation::at(&value_path, "required field is missing"));
        return;
    };

    if animated {
        let Some(keys) = payload.as_array() else {
            errors.push(SchemaViolation::at(
                &value_path,
                "must be an array of [time, value] keyframes",
            ));
            return;
        };
        let mut last_time = f64::NEG_INFINITY;
        for (i, key) in keys.iter().enumerate() {
            let mut key_path = value_path.clone();
            key_path.push(SchemaPathElem::Index(i));
            let Some(pair) = key.as_array().filter(|p| p.len() == 2) else {
                errors.push(SchemaViolation::at(
                    &key_path,
                    "must be a [time, value] pair",
                ));
                continue;
            };
            match pair[0].as_f64() {
                Some(t) if t.is_finite() && t >= last_time => last_time = t,
                Some(_) => errors.push(SchemaViolation::at(
                    &key_path,
                    "keyframe times must be finite and non-decreasing",
                )),
                None => errors.push(SchemaViolation::at(&key_path, "time must be a number")),
            }
            check_channels(&key_path, &pair[1], arity, errors);
        }
    } else {
        check_channels(&value_path, payload, arity, errors);
    }
}

fn check_channels(
    path: &[SchemaPathElem],
    value: &Json,
    arity: usize,
    errors: &mut Vec<SchemaViolation>,
) {
    match (arity, value) {
        (1, v) if v.is_number() => {}
        (n, Json::Array(arr)) if arr.len() == n && arr.iter().all(Json::is_number) => {}
        (1, _) => errors.push(SchemaViolation::at(path, "must be a number")),
        (n, _) => errors.push(SchemaViolation::at(
            path,
            format!("must be an array of {n} numbers"),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
