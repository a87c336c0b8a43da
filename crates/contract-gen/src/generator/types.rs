use serde::Serialize;
use serde_json::Number;

use crate::generator::schema::DataKind;

/// Element-count bounds of a collection or map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeConstraints {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub max: Option<u64>,
}

impl SizeConstraints {
  /// `None` unless at least one bound is present.
  #[must_use]
  pub fn from_bounds(min: Option<u64>, max: Option<u64>) -> Option<Self> {
    (min.is_some() || max.is_some()).then_some(Self { min, max })
  }
}

/// A constraint attached to a builtin value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Validation {
  Minimum { value: Number, exclusive: bool },
  Maximum { value: Number, exclusive: bool },
  MinLength { value: u64 },
  MaxLength { value: u64 },
  Pattern { value: String },
}

/// The type a schema maps to in the compiled model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratedType {
  /// A standalone generated type. Objects are validated, enums are not.
  Named { name: String, validated: bool },
  Collection {
    element: Box<GeneratedType>,
    is_set: bool,
    validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<SizeConstraints>,
  },
  /// String-keyed map.
  Map {
    value: Box<GeneratedType>,
    validated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<SizeConstraints>,
  },
  Builtin {
    kind: DataKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    validations: Vec<Validation>,
  },
  /// Objects without properties.
  Untyped,
}

impl GeneratedType {
  /// Whether values of this type carry nested validation.
  #[must_use]
  pub fn is_validated(&self) -> bool {
    match self {
      Self::Named { validated, .. } | Self::Collection { validated, .. } | Self::Map { validated, .. } => *validated,
      Self::Builtin { .. } | Self::Untyped => false,
    }
  }

  #[must_use]
  pub fn name(&self) -> Option<&str> {
    match self {
      Self::Named { name, .. } => Some(name),
      _ => None,
    }
  }
}
