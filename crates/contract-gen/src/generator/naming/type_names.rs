//! Derives type names from the position a schema was declared at.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::generator::{
  document::HTTP_METHODS,
  errors::{ContractError, ContractResult},
  naming::{identifiers::to_type_name, registry::NameRegistry},
  operation_registry::OperationRegistry,
  operations::{Operation, PathItem},
  position::{Position, SchemaId},
  schema_resolver::ResolvedSchemas,
};

const PARAMETER_SUFFIX: &str = "Parameter";
const REQUEST_SUFFIX: &str = "Request";
const RESPONSE_SUFFIX: &str = "Response";
const ITEM_SUFFIX: &str = "Item";
const VALUE_SUFFIX: &str = "Value";

/// Lookup tables the structural patterns need.
pub(crate) struct NamingContext<'a> {
  resolved: &'a ResolvedSchemas,
  operations: &'a OperationRegistry,
  parameter_names: HashMap<Position, String>,
  path_items: Vec<PathItem>,
}

impl<'a> NamingContext<'a> {
  pub(crate) fn new(
    resolved: &'a ResolvedSchemas,
    operations: &'a OperationRegistry,
    assembled: &[Operation],
    path_items: Vec<PathItem>,
  ) -> Self {
    let parameter_names = assembled
      .iter()
      .flat_map(|operation| &operation.parameters)
      .map(|parameter| (parameter.position.clone(), parameter.name.clone()))
      .collect();

    Self {
      resolved,
      operations,
      parameter_names,
      path_items,
    }
  }
}

/// Assigns every named schema one unique type name, memoized per id.
pub(crate) struct TypeNameGenerator<'a> {
  context: NamingContext<'a>,
  registry: &'a mut NameRegistry,
  names: IndexMap<SchemaId, String>,
}

impl<'a> TypeNameGenerator<'a> {
  pub(crate) fn new(context: NamingContext<'a>, registry: &'a mut NameRegistry) -> Self {
    Self {
      context,
      registry,
      names: IndexMap::new(),
    }
  }

  pub(crate) fn name_for(&mut self, id: &SchemaId) -> ContractResult<String> {
    if let Some(name) = self.names.get(id) {
      return Ok(name.clone());
    }

    let raw = self.raw_name(id)?;
    let name = self.registry.claim(&raw);
    self.names.insert(id.clone(), name.clone());
    Ok(name)
  }

  pub(crate) fn into_names(self) -> IndexMap<SchemaId, String> {
    self.names
  }

  /// The name before uniqueness suffixes are applied.
  fn raw_name(&mut self, id: &SchemaId) -> ContractResult<String> {
    let resolved = self.context.resolved;

    if let Some(parent) = resolved.parent_of(id) {
      let parent_schema = resolved
        .get(parent)
        .ok_or_else(|| ContractError::internal(format!("parent schema {parent} was never resolved")))?;
      let parent_name = if parent_schema.requires_name() {
        self.name_for(parent)?
      } else {
        self.raw_name(parent)?
      };

      if let Some(rest) = id.position().relative_to(parent.position()) {
        let rest = rest.iter().map(String::as_str).collect::<Vec<_>>();
        return Ok(parent_name + &nesting_suffix(&rest));
      }
    }

    let position = id.position();
    let segments = position.segments().iter().map(String::as_str).collect::<Vec<_>>();
    let (base, consumed) = self.structural_name(position, &segments)?.unwrap_or_default();
    let name = base + &nesting_suffix(&segments[consumed..]);

    Ok(if name.is_empty() { to_type_name("") } else { name })
  }

  /// Matches the declaration patterns. Returns the base name and how many
  /// leading segments the pattern consumed.
  fn structural_name(&self, position: &Position, segments: &[&str]) -> ContractResult<Option<(String, usize)>> {
    if let Some((item, rest)) = self.path_item_of(position) {
      let offset = segments.len() - rest.len();
      let rest = rest.iter().map(String::as_str).collect::<Vec<_>>();
      if let Some((name, consumed)) = self.operation_scoped_name(item, position, offset, &rest)? {
        return Ok(Some((name, offset + consumed)));
      }
    }

    Ok(match segments {
      [] => Some((file_stem_name(position), 0)),
      ["components", "schemas", name, ..] => Some((to_type_name(name), 3)),
      ["definitions" | "$defs", name, ..] => Some((to_type_name(name), 2)),
      ["components", "parameters", name, "schema", ..] => Some((format!("{}{PARAMETER_SUFFIX}", to_type_name(name)), 4)),
      ["components", "requestBodies", name, "content", _, "schema", ..] => {
        Some((format!("{}{REQUEST_SUFFIX}", to_type_name(name)), 6))
      }
      ["components", "responses", name, "content", _, "schema", ..] => {
        Some((format!("{}{RESPONSE_SUFFIX}", to_type_name(name)), 6))
      }
      _ => None,
    })
  }

  /// The path item whose (dereferenced) position contains `position`, with
  /// the segments below it.
  fn path_item_of<'p>(&self, position: &'p Position) -> Option<(&PathItem, &'p [String])> {
    self
      .context
      .path_items
      .iter()
      .find_map(|item| position.relative_to(&item.position).map(|rest| (item, rest)))
  }

  /// Patterns below a path item. `offset` is the length of the path item position.
  fn operation_scoped_name(
    &self,
    item: &PathItem,
    position: &Position,
    offset: usize,
    rest: &[&str],
  ) -> ContractResult<Option<(String, usize)>> {
    let path = item.path.as_str();
    Ok(match rest {
      ["parameters", _, "schema", ..] => {
        let parameter = self.parameter_name(position, offset + 2);
        Some((format!("{}{PARAMETER_SUFFIX}{parameter}", to_type_name(path)), 3))
      }
      [method, "parameters", _, "schema", ..] if is_method(method) => {
        let operation = self.operation_name(method, path)?;
        let parameter = self.parameter_name(position, offset + 3);
        Some((format!("{operation}{PARAMETER_SUFFIX}{parameter}"), 4))
      }
      [method, "requestBody", "content", _, "schema", ..] if is_method(method) => {
        Some((format!("{}{REQUEST_SUFFIX}", self.operation_name(method, path)?), 5))
      }
      [method, "responses", status, "content", _, "schema", ..] if is_method(method) => {
        let operation = self.operation_name(method, path)?;
        let name = if status.starts_with('2') && status.len() == 3 {
          format!("{operation}{RESPONSE_SUFFIX}")
        } else {
          format!("{operation}{RESPONSE_SUFFIX}{}", status_suffix(status))
        };
        Some((name, 6))
      }
      _ => None,
    })
  }

  fn operation_name(&self, method: &str, path: &str) -> ContractResult<String> {
    self
      .context
      .operations
      .name_for(method, path)
      .map(to_type_name)
      .ok_or_else(|| ContractError::internal(format!("operation '{method} {path}' has no registered name")))
  }

  /// Name of the parameter declared by the first `declaration_len` segments of `position`.
  fn parameter_name(&self, position: &Position, declaration_len: usize) -> String {
    let declaration = Position::new(position.file(), &position.segments()[..declaration_len]);
    match self.context.parameter_names.get(&declaration) {
      Some(name) => to_type_name(name),
      None => to_type_name(&position.segments()[declaration_len - 1]),
    }
  }
}

/// Suffix contributed by the segments below a named position.
fn nesting_suffix(mut rest: &[&str]) -> String {
  let mut suffix = String::new();
  loop {
    rest = match rest {
      ["properties", name, tail @ ..] => {
        suffix.push_str(&to_type_name(name));
        tail
      }
      ["items", tail @ ..] => {
        suffix.push_str(ITEM_SUFFIX);
        tail
      }
      ["additionalProperties", tail @ ..] => {
        suffix.push_str(VALUE_SUFFIX);
        tail
      }
      [segment, tail @ ..] => {
        suffix.push_str(&to_type_name(segment));
        tail
      }
      [] => return suffix,
    };
  }
}

fn status_suffix(status: &str) -> String {
  if status == "default" {
    "Default".to_string()
  } else {
    status.to_string()
  }
}

fn file_stem_name(position: &Position) -> String {
  position
    .file()
    .file_stem()
    .map(|stem| to_type_name(&stem.to_string_lossy()))
    .unwrap_or_else(|| to_type_name(""))
}

fn is_method(segment: &str) -> bool {
  HTTP_METHODS.contains(&segment)
}
