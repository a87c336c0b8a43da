use serde::Serialize;
use serde_json::Number;
use strum::{Display, EnumString};

use crate::generator::position::{Position, SchemaId};

/// Declared JSON Schema type of a primitive schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
  Boolean,
  Integer,
  Number,
  String,
}

/// Finer-grained kind of a primitive, derived from its `(type, format)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataKind {
  Boolean,
  Int32,
  Int64,
  BigInteger,
  Float32,
  Float64,
  Decimal,
  String,
  Date,
  DateTime,
  Binary,
}

impl DataKind {
  #[must_use]
  pub fn from_type_and_format(primitive_type: PrimitiveType, format: Option<&str>) -> Self {
    match (primitive_type, format) {
      (PrimitiveType::Boolean, _) => Self::Boolean,
      (PrimitiveType::Integer, Some("int32")) => Self::Int32,
      (PrimitiveType::Integer, Some("int64")) => Self::Int64,
      (PrimitiveType::Integer, _) => Self::BigInteger,
      (PrimitiveType::Number, Some("float")) => Self::Float32,
      (PrimitiveType::Number, Some("double")) => Self::Float64,
      (PrimitiveType::Number, _) => Self::Decimal,
      (PrimitiveType::String, Some("date")) => Self::Date,
      (PrimitiveType::String, Some("date-time")) => Self::DateTime,
      (PrimitiveType::String, Some("binary")) => Self::Binary,
      (PrimitiveType::String, _) => Self::String,
    }
  }
}

/// Documentation shared by every schema variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaDocs {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaProperty {
  pub name: String,
  pub required: bool,
  pub schema_id: SchemaId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSchema {
  #[serde(flatten)]
  pub docs: SchemaDocs,
  pub properties: Vec<SchemaProperty>,
  pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySchema {
  #[serde(flatten)]
  pub docs: SchemaDocs,
  pub items: SchemaId,
  pub unique_items: bool,
  pub min_items: Option<u64>,
  pub max_items: Option<u64>,
  pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSchema {
  #[serde(flatten)]
  pub docs: SchemaDocs,
  pub values: SchemaId,
  pub min_items: Option<u64>,
  pub max_items: Option<u64>,
  pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumSchema {
  #[serde(flatten)]
  pub docs: SchemaDocs,
  pub values: Vec<String>,
  pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveSchema {
  #[serde(flatten)]
  pub docs: SchemaDocs,
  pub primitive_type: PrimitiveType,
  pub format: Option<String>,
  pub data_kind: DataKind,
  pub minimum: Option<Number>,
  pub maximum: Option<Number>,
  pub exclusive_minimum: bool,
  pub exclusive_maximum: bool,
  pub min_length: Option<u64>,
  pub max_length: Option<u64>,
  pub pattern: Option<String>,
  pub position: Position,
}

/// A parsed schema. Children are referenced by [`SchemaId`] only, so cyclic
/// contracts form cycles of ids, never of owned values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schema {
  Object(ObjectSchema),
  Array(ArraySchema),
  Map(MapSchema),
  Enum(EnumSchema),
  Primitive(PrimitiveSchema),
}

impl Schema {
  pub fn position(&self) -> &Position {
    match self {
      Self::Object(s) => &s.position,
      Self::Array(s) => &s.position,
      Self::Map(s) => &s.position,
      Self::Enum(s) => &s.position,
      Self::Primitive(s) => &s.position,
    }
  }

  pub fn docs(&self) -> &SchemaDocs {
    match self {
      Self::Object(s) => &s.docs,
      Self::Array(s) => &s.docs,
      Self::Map(s) => &s.docs,
      Self::Enum(s) => &s.docs,
      Self::Primitive(s) => &s.docs,
    }
  }

  /// Whether this schema becomes a standalone generated type with its own name.
  pub fn requires_name(&self) -> bool {
    match self {
      Self::Object(object) => !object.properties.is_empty(),
      Self::Enum(_) => true,
      Self::Array(_) | Self::Map(_) | Self::Primitive(_) => false,
    }
  }

  /// Ids of the schemas this schema refers to, in declaration order.
  pub fn children(&self) -> Vec<&SchemaId> {
    match self {
      Self::Object(object) => object.properties.iter().map(|p| &p.schema_id).collect(),
      Self::Array(array) => vec![&array.items],
      Self::Map(map) => vec![&map.values],
      Self::Enum(_) | Self::Primitive(_) => vec![],
    }
  }
}
