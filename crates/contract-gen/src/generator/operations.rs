//! The operation graph: paths, methods, parameters, bodies and responses.

use contract_gen_support::ContentCategory;
use http::{Method, StatusCode};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

use crate::generator::{
  document::{HTTP_METHODS, Node},
  errors::{ContractError, ContractResult},
  metrics::{GenerationStats, GenerationWarning},
  operation_registry::{OperationFilter, OperationRegistry, parse_method},
  position::{Position, SchemaId},
  schema::{DataKind, Schema},
  schema_resolver::SchemaResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
  Query,
  Header,
  Path,
  Cookie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
  pub name: String,
  pub location: ParameterLocation,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub required: bool,
  pub deprecated: bool,
  pub schema_id: SchemaId,
  /// Where the parameter object itself is declared.
  pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
  pub media_type: String,
  pub schema_id: Option<SchemaId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormParameterKind {
  Primitive,
  Complex,
  Attachment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormParameter {
  pub name: String,
  pub required: bool,
  pub schema_id: SchemaId,
  pub kind: FormParameterKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyKind {
  Entity,
  /// Url-encoded or multipart body, one parameter per schema property.
  Form { parameters: Vec<FormParameter> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub required: bool,
  pub content: Vec<Content>,
  pub kind: BodyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
  Code(u16),
  Default,
}

impl ResponseStatus {
  #[must_use]
  pub fn is_success(self) -> bool {
    matches!(self, Self::Code(code) if (200..300).contains(&code))
  }
}

impl std::fmt::Display for ResponseStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Code(code) => write!(f, "{code}"),
      Self::Default => f.write_str("default"),
    }
  }
}

impl Serialize for ResponseStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
  pub status: ResponseStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub content: Vec<Content>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
  pub path: String,
  #[serde(serialize_with = "serialize_method")]
  pub method: Method,
  /// Method identifier assigned by the [`OperationRegistry`].
  pub name: String,
  pub tags: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub summary: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operation_id: Option<String>,
  pub deprecated: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_body: Option<RequestBody>,
  pub parameters: Vec<Parameter>,
  pub responses: Vec<Response>,
}

impl Operation {
  pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&Parameter> {
    self.parameters.iter().find(|p| p.name == name && p.location == location)
  }

  pub fn response(&self, status: ResponseStatus) -> Option<&Response> {
    self.responses.iter().find(|r| r.status == status)
  }
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_str(method.as_str())
}

type ParameterKey = (String, ParameterLocation);

/// A path item after dereferencing, with the `paths` key it is declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathItem {
  pub(crate) position: Position,
  pub(crate) path: String,
}

/// Walks the `paths` of a root document and builds one [`Operation`] per
/// accepted method, registering every schema it meets with the resolver.
pub(crate) struct OperationAssembler<'a, 's> {
  resolver: &'a mut SchemaResolver<'s>,
  registry: &'a OperationRegistry,
  filter: &'a OperationFilter,
  stats: &'a mut GenerationStats,
  path_items: Vec<PathItem>,
}

impl<'a, 's> OperationAssembler<'a, 's> {
  pub(crate) fn new(
    resolver: &'a mut SchemaResolver<'s>,
    registry: &'a OperationRegistry,
    filter: &'a OperationFilter,
    stats: &'a mut GenerationStats,
  ) -> Self {
    Self {
      resolver,
      registry,
      filter,
      stats,
      path_items: Vec::new(),
    }
  }

  /// Every path item met by [`Self::build_operations`], in declaration order.
  pub(crate) fn into_path_items(self) -> Vec<PathItem> {
    self.path_items
  }

  pub(crate) fn build_operations(&mut self, root: &Node) -> ContractResult<Vec<Operation>> {
    let mut operations = Vec::new();
    let Some(paths) = root.field("paths") else {
      return Ok(operations);
    };

    for (path, item) in paths.fields() {
      let item = self.resolver.cache().dereference(item)?;
      self.path_items.push(PathItem {
        position: item.position().clone(),
        path: path.clone(),
      });
      let methods = HTTP_METHODS
        .into_iter()
        .filter_map(|method| item.field(method).map(|node| (method, node)))
        .filter_map(|(method, node)| {
          let name = self.registry.name_for(method, &path)?;
          self.filter.accepts(name).then(|| (method, name.to_string(), node))
        })
        .collect::<Vec<_>>();

      if methods.is_empty() {
        continue;
      }

      let common = match item.field("parameters") {
        Some(parameters) => self.parse_parameters(&parameters, &path)?,
        None => IndexMap::new(),
      };

      for (method, name, node) in methods {
        let operation = self.build_operation(&path, method, name, &node, &common)?;
        operations.push(operation);
      }
    }

    self.stats.operations_converted = operations.len();
    Ok(operations)
  }

  fn build_operation(
    &mut self,
    path: &str,
    method: &str,
    name: String,
    node: &Node,
    common: &IndexMap<ParameterKey, Parameter>,
  ) -> ContractResult<Operation> {
    let mut parameters = common.clone();
    if let Some(own) = node.field("parameters") {
      for (key, parameter) in self.parse_parameters(&own, &name)? {
        parameters.insert(key, parameter);
      }
    }

    let request_body = node
      .field("requestBody")
      .map(|body| self.parse_request_body(body))
      .transpose()?;

    let responses = match node.field("responses") {
      Some(responses) => self.parse_responses(&responses, &name)?,
      None => vec![],
    };

    Ok(Operation {
      path: path.to_string(),
      method: parse_method(method)?,
      name,
      tags: node
        .field("tags")
        .map(|tags| tags.elements().iter().filter_map(|t| t.value().as_str().map(String::from)).collect())
        .unwrap_or_default(),
      summary: node.string_field("summary"),
      description: node.string_field("description"),
      operation_id: node.string_field("operationId"),
      deprecated: node.bool_field("deprecated").unwrap_or(false),
      request_body,
      parameters: parameters.into_values().collect(),
      responses,
    })
  }

  /// Parses a parameter list keyed by `(name, location)`. A later duplicate
  /// replaces an earlier one in place.
  fn parse_parameters(&mut self, list: &Node, owner: &str) -> ContractResult<IndexMap<ParameterKey, Parameter>> {
    if !list.value().is_array() {
      return Err(ContractError::content(list.position(), "'parameters' must be an array"));
    }

    let mut parameters = IndexMap::new();
    for element in list.elements() {
      let parameter = self.parse_parameter(element)?;
      let key = (parameter.name.clone(), parameter.location);
      if parameters.contains_key(&key) {
        self.stats.record_warning(GenerationWarning::DuplicateParameter {
          operation_id: owner.to_string(),
          name: parameter.name.clone(),
          location: parameter.location.to_string(),
        });
      }
      parameters.insert(key, parameter);
    }
    Ok(parameters)
  }

  fn parse_parameter(&mut self, node: Node) -> ContractResult<Parameter> {
    let node = self.resolver.cache().dereference(node)?;
    node.expect_object("parameter")?;
    let position = node.position();

    let Some(name) = node.string_field("name") else {
      return Err(ContractError::content(position, "parameter requires a 'name'"));
    };
    let location = node
      .str_field("in")
      .and_then(|location| location.parse::<ParameterLocation>().ok())
      .ok_or_else(|| ContractError::content(position, format!("parameter '{name}' has a missing or invalid 'in'")))?;

    let schema = match (node.field("schema"), node.has_field("content")) {
      (Some(_), true) => {
        return Err(ContractError::content(
          position,
          format!("parameter '{name}' declares both 'schema' and 'content'"),
        ));
      }
      (None, true) => {
        return Err(ContractError::not_supported(
          position,
          format!("parameter '{name}' uses 'content', which is not supported"),
        ));
      }
      (None, false) => {
        return Err(ContractError::not_supported(
          position,
          format!("parameter '{name}' without a 'schema' is not supported"),
        ));
      }
      (Some(schema), false) => schema,
    };

    Ok(Parameter {
      required: location == ParameterLocation::Path || node.bool_field("required").unwrap_or(false),
      description: node.string_field("description"),
      deprecated: node.bool_field("deprecated").unwrap_or(false),
      schema_id: self.resolver.register(schema)?,
      position: position.clone(),
      name,
      location,
    })
  }

  /// A body declaring no media type is a content error. More than one media
  /// type is reported as not supported.
  fn parse_request_body(&mut self, node: Node) -> ContractResult<RequestBody> {
    let node = self.resolver.cache().dereference(node)?;
    node.expect_object("request body")?;

    let mut content = match node.field("content") {
      Some(content) => self.parse_content(&content)?,
      None => vec![],
    };

    let entry = match content.len() {
      0 => {
        return Err(ContractError::content(
          node.position(),
          "request body must declare exactly one media type",
        ));
      }
      1 => content.remove(0),
      n => {
        return Err(ContractError::not_supported(
          node.position(),
          format!("request bodies with {n} media types are not supported"),
        ));
      }
    };

    let kind = if is_form_media_type(&entry.media_type) {
      if entry.schema_id.is_none() {
        return Err(ContractError::not_supported(
          node.position(),
          format!("'{}' body without a schema is not supported", entry.media_type),
        ));
      }
      BodyKind::Form { parameters: vec![] }
    } else {
      BodyKind::Entity
    };

    Ok(RequestBody {
      description: node.string_field("description"),
      required: node.bool_field("required").unwrap_or(false),
      content: vec![entry],
      kind,
    })
  }

  fn parse_responses(&mut self, responses: &Node, operation: &str) -> ContractResult<Vec<Response>> {
    responses.expect_object("'responses'")?;

    let mut parsed = Vec::new();
    for (key, node) in responses.fields() {
      let status = parse_status(&key, node.position())?;
      let node = self.resolver.cache().dereference(node)?;
      node.expect_object("response")?;

      let declares_content = node.field("content").is_some_and(|c| !c.fields().is_empty());
      let content = if status == ResponseStatus::Code(StatusCode::NO_CONTENT.as_u16()) {
        if declares_content {
          self.stats.record_warning(GenerationWarning::NoContentBodyDiscarded {
            operation_id: operation.to_string(),
          });
        }
        vec![]
      } else {
        match node.field("content") {
          Some(content) => self.parse_content(&content)?,
          None => vec![],
        }
      };

      parsed.push(Response {
        status,
        description: node.string_field("description"),
        content,
      });
    }
    Ok(parsed)
  }

  fn parse_content(&mut self, content: &Node) -> ContractResult<Vec<Content>> {
    content.expect_object("'content'")?;

    content
      .fields()
      .into_iter()
      .map(|(media_type, media)| {
        media.expect_object("media type")?;
        let schema_id = media.field("schema").map(|schema| self.resolver.register(schema)).transpose()?;
        Ok(Content { media_type, schema_id })
      })
      .collect()
  }
}

fn parse_status(key: &str, position: &Position) -> ContractResult<ResponseStatus> {
  if key == "default" {
    return Ok(ResponseStatus::Default);
  }

  if let Ok(code) = key.parse::<u16>()
    && StatusCode::from_u16(code).is_ok()
  {
    return Ok(ResponseStatus::Code(code));
  }

  Err(ContractError::not_supported(
    position,
    format!("response key '{key}' is not supported, only status codes and 'default' are"),
  ))
}

/// Whether bodies of this media type are sent as individual form fields.
pub fn is_form_media_type(media_type: &str) -> bool {
  ContentCategory::from_content_type(media_type).is_form()
}

/// Fills the parameters of every form body from its resolved object schema.
///
/// Returns the number of bodies exploded.
pub(crate) fn explode_form_bodies(
  operations: &mut [Operation],
  schemas: &IndexMap<SchemaId, Schema>,
) -> ContractResult<usize> {
  let mut exploded = 0;

  for operation in operations {
    let Some(body) = operation.request_body.as_mut() else {
      continue;
    };
    let BodyKind::Form { parameters } = &mut body.kind else {
      continue;
    };
    let Some(schema_id) = body.content.first().and_then(|c| c.schema_id.as_ref()) else {
      return Err(ContractError::internal(format!(
        "form body of '{}' has no schema",
        operation.name
      )));
    };

    let Schema::Object(object) = schema(schemas, schema_id)? else {
      return Err(ContractError::not_supported(
        schema_id.position(),
        format!(
          "form body of '{}' must be an object schema with properties",
          operation.name
        ),
      ));
    };

    *parameters = object
      .properties
      .iter()
      .map(|property| {
        Ok(FormParameter {
          name: property.name.clone(),
          required: property.required,
          schema_id: property.schema_id.clone(),
          kind: form_parameter_kind(schemas, &property.schema_id)?,
        })
      })
      .collect::<ContractResult<Vec<_>>>()?;
    exploded += 1;
  }

  Ok(exploded)
}

fn form_parameter_kind(schemas: &IndexMap<SchemaId, Schema>, id: &SchemaId) -> ContractResult<FormParameterKind> {
  Ok(match schema(schemas, id)? {
    Schema::Primitive(primitive) if primitive.data_kind == DataKind::Binary => FormParameterKind::Attachment,
    Schema::Primitive(_) | Schema::Enum(_) => FormParameterKind::Primitive,
    Schema::Object(_) | Schema::Map(_) => FormParameterKind::Complex,
    Schema::Array(array) => match schema(schemas, &array.items)? {
      Schema::Primitive(primitive) if primitive.data_kind == DataKind::Binary => FormParameterKind::Attachment,
      Schema::Primitive(_) | Schema::Enum(_) => FormParameterKind::Primitive,
      Schema::Object(_) | Schema::Map(_) | Schema::Array(_) => FormParameterKind::Complex,
    },
  })
}

fn schema<'m>(schemas: &'m IndexMap<SchemaId, Schema>, id: &SchemaId) -> ContractResult<&'m Schema> {
  schemas
    .get(id)
    .ok_or_else(|| ContractError::internal(format!("schema {id} was never resolved")))
}
