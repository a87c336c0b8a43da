use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;

use crate::generator::{
  errors::{ContractError, ContractResult},
  metrics::{GenerationStats, GenerationWarning},
  naming::type_names::TypeNameGenerator,
  position::SchemaId,
  schema::{PrimitiveSchema, Schema},
  types::{GeneratedType, SizeConstraints, Validation},
};

/// Maps resolved schemas to generated types, memoized per [`SchemaId`].
pub(crate) struct TypeResolver<'a> {
  schemas: &'a IndexMap<SchemaId, Schema>,
  namer: TypeNameGenerator<'a>,
  stats: &'a mut GenerationStats,
  types: IndexMap<SchemaId, GeneratedType>,
  in_progress: HashSet<SchemaId>,
}

impl<'a> TypeResolver<'a> {
  pub(crate) fn new(
    schemas: &'a IndexMap<SchemaId, Schema>,
    namer: TypeNameGenerator<'a>,
    stats: &'a mut GenerationStats,
  ) -> Self {
    Self {
      schemas,
      namer,
      stats,
      types: IndexMap::new(),
      in_progress: HashSet::new(),
    }
  }

  /// Types every resolved schema in discovery order.
  pub(crate) fn resolve_all(mut self) -> ContractResult<(IndexMap<SchemaId, GeneratedType>, IndexMap<SchemaId, String>)> {
    let schemas = self.schemas;
    for id in schemas.keys() {
      self.type_for(id)?;
    }

    let types = schemas
      .keys()
      .filter_map(|id| self.types.swap_remove(id).map(|generated| (id.clone(), generated)))
      .collect::<IndexMap<_, _>>();
    for generated in types.values() {
      self.stats.record_generated_type(generated);
    }

    let mut names = self.namer.into_names();
    names.sort_by(|a, _, b, _| schemas.get_index_of(a).cmp(&schemas.get_index_of(b)));
    Ok((types, names))
  }

  pub(crate) fn type_for(&mut self, id: &SchemaId) -> ContractResult<GeneratedType> {
    if let Some(generated) = self.types.get(id) {
      return Ok(generated.clone());
    }

    // Named types break cycles, so only collection chains can come back here.
    if !self.in_progress.insert(id.clone()) {
      return Err(ContractError::content(
        id.position(),
        "schema contains itself through arrays or maps only",
      ));
    }

    let schemas = self.schemas;
    let schema = schemas
      .get(id)
      .ok_or_else(|| ContractError::internal(format!("schema {id} was never resolved")))?;

    let generated = match schema {
      Schema::Object(object) if object.properties.is_empty() => GeneratedType::Untyped,
      Schema::Object(_) => GeneratedType::Named {
        name: self.namer.name_for(id)?,
        validated: true,
      },
      Schema::Enum(_) => GeneratedType::Named {
        name: self.namer.name_for(id)?,
        validated: false,
      },
      Schema::Array(array) => {
        let element = self.type_for(&array.items)?;
        GeneratedType::Collection {
          validated: element.is_validated(),
          element: Box::new(element),
          is_set: array.unique_items,
          size: SizeConstraints::from_bounds(array.min_items, array.max_items),
        }
      }
      Schema::Map(map) => {
        let value = self.type_for(&map.values)?;
        GeneratedType::Map {
          validated: value.is_validated(),
          value: Box::new(value),
          size: SizeConstraints::from_bounds(map.min_items, map.max_items),
        }
      }
      Schema::Primitive(primitive) => GeneratedType::Builtin {
        kind: primitive.data_kind,
        validations: self.validations(primitive),
      },
    };

    self.in_progress.remove(id);
    self.types.insert(id.clone(), generated.clone());
    Ok(generated)
  }

  fn validations(&mut self, primitive: &PrimitiveSchema) -> Vec<Validation> {
    let mut validations = Vec::new();

    if let Some(value) = &primitive.minimum {
      validations.push(Validation::Minimum {
        value: value.clone(),
        exclusive: primitive.exclusive_minimum,
      });
    }
    if let Some(value) = &primitive.maximum {
      validations.push(Validation::Maximum {
        value: value.clone(),
        exclusive: primitive.exclusive_maximum,
      });
    }
    if let Some(value) = primitive.min_length {
      validations.push(Validation::MinLength { value });
    }
    if let Some(value) = primitive.max_length {
      validations.push(Validation::MaxLength { value });
    }
    if let Some(pattern) = &primitive.pattern {
      if let Err(error) = Regex::new(pattern) {
        self.stats.record_warning(GenerationWarning::InvalidPattern {
          position: primitive.position.to_string(),
          pattern: pattern.clone(),
          error: error.to_string(),
        });
      }
      validations.push(Validation::Pattern { value: pattern.clone() });
    }

    validations
  }
}
