//! Declarative structural validation for untyped JSON payloads.
//!
//! A [`Schema`] is a whitelist of required checks: every declared field must
//! be present and pass its [`FieldRule`], undeclared fields are ignored.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Runtime kind of a JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
  Null,
  Boolean,
  Number,
  String,
  Array,
  Object,
}

impl JsonKind {
  pub fn of(value: &Value) -> Self {
    match value {
      Value::Null => Self::Null,
      Value::Bool(_) => Self::Boolean,
      Value::Number(_) => Self::Number,
      Value::String(_) => Self::String,
      Value::Array(_) => Self::Array,
      Value::Object(_) => Self::Object,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Boolean => "boolean",
      Self::Number => "number",
      Self::String => "string",
      Self::Array => "array",
      Self::Object => "object",
    }
  }
}

impl fmt::Display for JsonKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Check applied to a single declared field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
  /// Value must be one of the listed kinds
  Kinds(&'static [JsonKind]),
  /// Value must equal this literal exactly (kind and value)
  Exact(Value),
}

impl FieldRule {
  pub const fn kind(kind: &'static [JsonKind]) -> Self {
    Self::Kinds(kind)
  }

  fn check(&self, field: &str, value: &Value) -> Option<FieldError> {
    let actual = JsonKind::of(value);
    match self {
      Self::Kinds(accepted) => (!accepted.contains(&actual)).then(|| FieldError::TypeMismatch {
        field: field.to_string(),
        expected: accepted.to_vec(),
        actual,
      }),
      Self::Exact(expected) => (!same_value(expected, value)).then(|| FieldError::ValueMismatch {
        field: field.to_string(),
        expected_kind: JsonKind::of(expected),
        expected: expected.clone(),
        actual_kind: actual,
        actual: value.clone(),
      }),
    }
  }
}

/// Strict equality with a single number domain: `1` and `1.0` match.
fn same_value(expected: &Value, actual: &Value) -> bool {
  match (expected, actual) {
    (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
      (Some(x), Some(y)) => x == y,
      _ => match (a.as_u64(), b.as_u64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_f64() == b.as_f64(),
      },
    },
    _ => expected == actual,
  }
}

/// Ordered field-descriptor table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
  fields: Vec<(&'static str, FieldRule)>,
}

impl Schema {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn field(mut self, name: &'static str, rule: FieldRule) -> Self {
    self.fields.push((name, rule));
    self
  }

  pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldRule)> {
    self.fields.iter().map(|(name, rule)| (*name, rule))
  }

  /// Check `payload` against every declared field, collecting all failures.
  pub fn validate(&self, payload: &Value) -> Result<(), ValidationErrors> {
    let Some(object) = payload.as_object() else {
      return Err(ValidationErrors::from(vec![FieldError::NotAnObject {
        actual: JsonKind::of(payload),
      }]));
    };

    let errors: Vec<FieldError> = self
      .fields
      .iter()
      .filter_map(|(name, rule)| match object.get(*name) {
        None => Some(FieldError::Missing {
          field: name.to_string(),
        }),
        Some(value) => rule.check(name, value),
      })
      .collect();

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ValidationErrors::from(errors))
    }
  }
}

/// A single failed check
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
  #[error("expected an object, got {actual}")]
  NotAnObject { actual: JsonKind },

  #[error("missing property '{field}'")]
  Missing { field: String },

  #[error("property '{field}' must be of type {}, got {actual}", join_kinds(.expected))]
  TypeMismatch {
    field: String,
    expected: Vec<JsonKind>,
    actual: JsonKind,
  },

  #[error(
    "property '{field}' must be {expected_kind} {expected}, got {actual_kind} {actual}"
  )]
  ValueMismatch {
    field: String,
    expected_kind: JsonKind,
    expected: Value,
    actual_kind: JsonKind,
    actual: Value,
  },

  /// Passed the schema but could not be decoded into the typed DTO
  #[error("{0}")]
  Malformed(String),
}

impl FieldError {
  /// Name of the offending field, if the error concerns one
  pub fn field(&self) -> Option<&str> {
    match self {
      Self::Missing { field }
      | Self::TypeMismatch { field, .. }
      | Self::ValueMismatch { field, .. } => Some(field),
      Self::NotAnObject { .. } | Self::Malformed(_) => None,
    }
  }
}

fn join_kinds(kinds: &[JsonKind]) -> String {
  kinds
    .iter()
    .map(JsonKind::as_str)
    .collect::<Vec<_>>()
    .join(" | ")
}

fn join_messages(errors: &[FieldError]) -> String {
  errors
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

/// Every failure found in one payload
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
  errors: Vec<FieldError>,
}

impl ValidationErrors {
  pub fn errors(&self) -> &[FieldError] {
    &self.errors
  }

  pub fn messages(&self) -> Vec<String> {
    self.errors.iter().map(ToString::to_string).collect()
  }
}

impl From<Vec<FieldError>> for ValidationErrors {
  fn from(errors: Vec<FieldError>) -> Self {
    Self { errors }
  }
}

impl From<FieldError> for ValidationErrors {
  fn from(error: FieldError) -> Self {
    Self {
      errors: vec![error],
    }
  }
}
