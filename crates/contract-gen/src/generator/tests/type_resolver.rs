use serde_json::json;

use super::support::{MemoryLoader, compile, compile_with_config, petstore, schema_id};
use crate::generator::{
  errors::ErrorKind,
  metrics::GenerationWarning,
  orchestrator::GeneratorConfig,
  schema::DataKind,
  types::{GeneratedType, SizeConstraints, Validation},
};

fn components(schemas: serde_json::Value) -> MemoryLoader {
  MemoryLoader::new(json!({
    "openapi": "3.0.3",
    "info": { "title": "Test", "version": "1" },
    "paths": {},
    "components": { "schemas": schemas }
  }))
}

fn all_schemas() -> GeneratorConfig {
  GeneratorConfig::builder().all_schemas(true).build()
}

fn pet(segments: &[&str]) -> Vec<String> {
  ["components", "schemas", "Pet"]
    .iter()
    .chain(segments)
    .map(|segment| (*segment).to_string())
    .collect()
}

#[test]
fn test_petstore_types() {
  let model = compile(petstore()).unwrap();
  let type_at = |segments: Vec<String>| {
    let segments = segments.iter().map(String::as_str).collect::<Vec<_>>();
    model.type_of(&schema_id(&segments)).cloned().unwrap()
  };

  assert_eq!(
    type_at(pet(&[])),
    GeneratedType::Named {
      name: "Pet".to_string(),
      validated: true
    }
  );
  assert_eq!(
    type_at(pet(&["properties", "status"])),
    GeneratedType::Named {
      name: "PetStatus".to_string(),
      validated: false
    }
  );
  assert_eq!(
    type_at(pet(&["properties", "id"])),
    GeneratedType::Builtin {
      kind: DataKind::Int64,
      validations: vec![]
    }
  );
  assert_eq!(
    type_at(pet(&["properties", "name"])),
    GeneratedType::Builtin {
      kind: DataKind::String,
      validations: vec![Validation::MinLength { value: 1 }]
    }
  );
  assert_eq!(
    type_at(pet(&["properties", "tags"])),
    GeneratedType::Collection {
      element: Box::new(GeneratedType::Builtin {
        kind: DataKind::String,
        validations: vec![]
      }),
      is_set: true,
      validated: false,
      size: None,
    }
  );

  let pets = model
    .type_of(&schema_id(&["components", "schemas", "Owner", "properties", "pets"]))
    .unwrap();
  assert!(pets.is_validated(), "a list of objects carries nested validation");
  let GeneratedType::Collection { element, is_set, .. } = pets else {
    panic!("expected a collection");
  };
  assert_eq!(element.name(), Some("Pet"));
  assert!(!is_set);
}

#[test]
fn test_numeric_bounds_become_validations() {
  let model = compile(petstore()).unwrap();
  let limit = model
    .type_of(&schema_id(&["paths", "/pets", "get", "parameters", "0", "schema"]))
    .unwrap();

  let GeneratedType::Builtin { kind, validations } = limit else {
    panic!("expected a builtin");
  };
  assert_eq!(*kind, DataKind::Int32);
  let [Validation::Maximum { value, exclusive }] = validations.as_slice() else {
    panic!("expected a single maximum, got {validations:?}");
  };
  assert_eq!(value.to_string(), "100");
  assert!(!exclusive);
}

#[test]
fn test_type_statistics() {
  let model = compile(petstore()).unwrap();

  assert_eq!(model.stats.named_types_generated, 4);
  assert_eq!(model.stats.object_types_generated, 3);
  assert_eq!(model.stats.enum_types_generated, 1);
  assert_eq!(model.types.len(), model.specification.schemas().len());
}

#[test]
fn test_objects_without_properties_are_untyped() {
  let model = compile_with_config(
    components(json!({ "Anything": { "type": "object" }, "Free": {} })),
    all_schemas(),
  )
  .unwrap();

  assert_eq!(
    model.type_of(&schema_id(&["components", "schemas", "Anything"])),
    Some(&GeneratedType::Untyped)
  );
  assert_eq!(
    model.type_of(&schema_id(&["components", "schemas", "Free"])),
    Some(&GeneratedType::Untyped)
  );
  assert!(model.names.is_empty());
}

#[test]
fn test_map_sizes() {
  let model = compile_with_config(
    components(json!({
      "Counts": {
        "type": "object",
        "additionalProperties": { "type": "integer", "format": "int32" },
        "minProperties": 1
      }
    })),
    all_schemas(),
  )
  .unwrap();

  assert_eq!(
    model.type_of(&schema_id(&["components", "schemas", "Counts"])),
    Some(&GeneratedType::Map {
      value: Box::new(GeneratedType::Builtin {
        kind: DataKind::Int32,
        validations: vec![]
      }),
      validated: false,
      size: Some(SizeConstraints { min: Some(1), max: None }),
    })
  );
}

#[test]
fn test_invalid_pattern_is_kept_and_warned_about() {
  let model = compile_with_config(
    components(json!({
      "Code": { "type": "string", "pattern": "([a-z" }
    })),
    all_schemas(),
  )
  .unwrap();

  assert_eq!(
    model.type_of(&schema_id(&["components", "schemas", "Code"])),
    Some(&GeneratedType::Builtin {
      kind: DataKind::String,
      validations: vec![Validation::Pattern {
        value: "([a-z".to_string()
      }]
    })
  );
  assert!(matches!(
    model.stats.warnings.as_slice(),
    [GenerationWarning::InvalidPattern { pattern, .. }] if pattern == "([a-z"
  ));
}

#[test]
fn test_collection_containing_itself_is_content_error() {
  let error = compile_with_config(
    components(json!({
      "Loop": { "type": "array", "items": { "$ref": "#/components/schemas/Loop" } }
    })),
    all_schemas(),
  )
  .unwrap_err();

  assert_eq!(error.kind(), ErrorKind::Content);
}

#[test]
fn test_cycles_through_named_types_are_fine() {
  let model = compile_with_config(
    components(json!({
      "Tree": {
        "type": "object",
        "properties": {
          "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } }
        }
      }
    })),
    all_schemas(),
  )
  .unwrap();

  let children = model
    .type_of(&schema_id(&["components", "schemas", "Tree", "properties", "children"]))
    .unwrap();
  let GeneratedType::Collection { element, .. } = children else {
    panic!("expected a collection");
  };
  assert_eq!(element.name(), Some("Tree"));
  assert_eq!(model.stats.cycles_detected, 1);
}
