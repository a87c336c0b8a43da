//! Converts one raw schema node into one [`Schema`] value.
//!
//! Child schemas are not parsed here. Each child node is handed to a
//! [`ChildSchemas`] sink that dereferences it, records it for later parsing and
//! returns its id.

use std::collections::BTreeSet;

use serde_json::{Number, Value};

use crate::generator::{
  document::Node,
  errors::{ContractError, ContractResult},
  metrics::{GenerationStats, GenerationWarning},
  position::SchemaId,
  schema::{
    ArraySchema, DataKind, EnumSchema, MapSchema, ObjectSchema, PrimitiveSchema, PrimitiveType, Schema, SchemaDocs,
    SchemaProperty,
  },
};

const IGNORED_KEYWORDS: [&str; 4] = ["allOf", "oneOf", "anyOf", "not"];

/// Receives the child schemas discovered while parsing a parent.
pub(crate) trait ChildSchemas {
  /// Registers the child found at `node` (possibly a `$ref`) and returns its id.
  fn child(&mut self, parent: &SchemaId, node: Node) -> ContractResult<SchemaId>;
}

pub(crate) fn parse_schema(
  node: &Node,
  children: &mut dyn ChildSchemas,
  stats: &mut GenerationStats,
) -> ContractResult<Schema> {
  let position = node.position();

  if node.is_reference() {
    return Err(ContractError::internal(format!(
      "schema at {position} must be dereferenced before parsing"
    )));
  }
  if node.value().is_boolean() {
    return Err(ContractError::not_supported(position, "boolean schemas are not supported"));
  }
  node.expect_object("schema")?;

  for keyword in IGNORED_KEYWORDS.into_iter().filter(|k| node.has_field(k)) {
    stats.record_warning(GenerationWarning::IgnoredKeyword {
      position: position.to_string(),
      keyword: keyword.to_string(),
    });
  }

  let id = SchemaId::new(position.clone());
  let docs = SchemaDocs {
    title: node.string_field("title"),
    description: node.string_field("description"),
  };
  let declared_type = declared_type(node)?;

  if let Some(values) = node.field("enum")
    && values.value().as_array().is_none_or(|items| !items.is_empty())
  {
    return parse_enum(node, &values, declared_type.as_deref(), docs);
  }

  match declared_type.as_deref() {
    Some("array") => parse_array(node, &id, children, docs),
    Some(primitive @ ("boolean" | "integer" | "number" | "string")) => {
      let primitive_type = primitive
        .parse::<PrimitiveType>()
        .map_err(|_| ContractError::internal(format!("unmapped primitive type '{primitive}'")))?;
      Ok(parse_primitive(node, primitive_type, docs))
    }
    None | Some("object") => parse_object(node, &id, children, docs),
    Some(other) => Err(ContractError::not_supported(
      position,
      format!("schema type '{other}' is not supported"),
    )),
  }
}

/// Reads `type`, accepting the OpenAPI 3.1 list form where `null` only marks nullability.
fn declared_type(node: &Node) -> ContractResult<Option<String>> {
  let position = node.position();
  match node.value().get("type") {
    None => Ok(None),
    Some(Value::String(t)) if t == "null" => Err(ContractError::not_supported(
      position,
      "schema type 'null' is not supported",
    )),
    Some(Value::String(t)) => Ok(Some(t.clone())),
    Some(Value::Array(types)) => {
      let mut non_null = Vec::new();
      for t in types {
        match t.as_str() {
          Some("null") => {}
          Some(t) => non_null.push(t.to_string()),
          None => return Err(ContractError::content(position, "'type' entries must be strings")),
        }
      }
      match non_null.as_slice() {
        [] => Err(ContractError::not_supported(position, "schema type 'null' is not supported")),
        [single] => Ok(Some(single.clone())),
        _ => Err(ContractError::not_supported(
          position,
          format!("multiple schema types {non_null:?} are not supported"),
        )),
      }
    }
    Some(_) => Err(ContractError::content(position, "'type' must be a string or an array")),
  }
}

fn parse_enum(node: &Node, values: &Node, declared_type: Option<&str>, docs: SchemaDocs) -> ContractResult<Schema> {
  let position = node.position();

  if let Some(t) = declared_type
    && t != "string"
  {
    return Err(ContractError::not_supported(
      position,
      format!("enums of type '{t}' are not supported, only string enums are"),
    ));
  }

  let Some(items) = values.value().as_array() else {
    return Err(ContractError::content(values.position(), "'enum' must be an array"));
  };

  let mut strings = Vec::with_capacity(items.len());
  for item in items {
    match item {
      Value::String(s) => strings.push(s.clone()),
      Value::Null => {}
      other => {
        return Err(ContractError::not_supported(
          position,
          format!("enum value {other} is not supported, only string enums are"),
        ));
      }
    }
  }

  Ok(Schema::Enum(EnumSchema {
    docs,
    values: strings,
    position: position.clone(),
  }))
}

fn parse_array(
  node: &Node,
  id: &SchemaId,
  children: &mut dyn ChildSchemas,
  docs: SchemaDocs,
) -> ContractResult<Schema> {
  let position = node.position();
  let Some(items) = node.field("items") else {
    return Err(ContractError::content(position, "array schema requires 'items'"));
  };
  if items.value().is_array() {
    return Err(ContractError::not_supported(
      items.position(),
      "tuple-style 'items' arrays are not supported",
    ));
  }

  Ok(Schema::Array(ArraySchema {
    docs,
    items: children.child(id, items)?,
    unique_items: node.bool_field("uniqueItems").unwrap_or(false),
    min_items: node.u64_field("minItems"),
    max_items: node.u64_field("maxItems"),
    position: position.clone(),
  }))
}

fn parse_primitive(node: &Node, primitive_type: PrimitiveType, docs: SchemaDocs) -> Schema {
  let format = node.string_field("format");
  let (minimum, exclusive_minimum) = numeric_bound(node, "minimum", "exclusiveMinimum");
  let (maximum, exclusive_maximum) = numeric_bound(node, "maximum", "exclusiveMaximum");

  Schema::Primitive(PrimitiveSchema {
    docs,
    primitive_type,
    data_kind: DataKind::from_type_and_format(primitive_type, format.as_deref()),
    format,
    minimum,
    maximum,
    exclusive_minimum,
    exclusive_maximum,
    min_length: node.u64_field("minLength"),
    max_length: node.u64_field("maxLength"),
    pattern: node.string_field("pattern"),
    position: node.position().clone(),
  })
}

/// Reads a bound in either the boolean (OpenAPI 3.0) or numeric (3.1) exclusive form.
fn numeric_bound(node: &Node, key: &str, exclusive_key: &str) -> (Option<Number>, bool) {
  match node.value().get(exclusive_key) {
    Some(Value::Number(limit)) => (Some(limit.clone()), true),
    Some(Value::Bool(exclusive)) => (node.number_field(key), *exclusive),
    _ => (node.number_field(key), false),
  }
}

fn parse_object(
  node: &Node,
  id: &SchemaId,
  children: &mut dyn ChildSchemas,
  docs: SchemaDocs,
) -> ContractResult<Schema> {
  let position = node.position();

  let properties = match node.field("properties") {
    Some(properties) => {
      properties.expect_object("'properties'")?;
      properties.fields()
    }
    None => vec![],
  };

  let additional = node.field("additionalProperties").filter(Node::is_object);

  match (properties.is_empty(), additional) {
    (false, Some(_)) => Err(ContractError::not_supported(
      position,
      "objects declaring both 'properties' and an 'additionalProperties' schema are not supported",
    )),
    (true, Some(values)) => Ok(Schema::Map(MapSchema {
      docs,
      values: children.child(id, values)?,
      min_items: node.u64_field("minProperties"),
      max_items: node.u64_field("maxProperties"),
      position: position.clone(),
    })),
    (_, None) => {
      let required = required_names(node)?;
      let properties = properties
        .into_iter()
        .map(|(name, schema)| {
          Ok(SchemaProperty {
            required: required.contains(name.as_str()),
            schema_id: children.child(id, schema)?,
            name,
          })
        })
        .collect::<ContractResult<Vec<_>>>()?;

      Ok(Schema::Object(ObjectSchema {
        docs,
        properties,
        position: position.clone(),
      }))
    }
  }
}

fn required_names(node: &Node) -> ContractResult<BTreeSet<String>> {
  match node.field("required") {
    None => Ok(BTreeSet::new()),
    Some(required) => match required.value() {
      Value::Array(names) => Ok(names.iter().filter_map(Value::as_str).map(String::from).collect()),
      // Pre-OpenAPI-3 style `required: true` on a property carries no names.
      Value::Bool(_) => Ok(BTreeSet::new()),
      _ => Err(ContractError::content(required.position(), "'required' must be an array")),
    },
  }
}
