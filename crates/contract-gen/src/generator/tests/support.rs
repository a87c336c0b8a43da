use std::{
  collections::{HashMap, HashSet},
  path::{Path, PathBuf},
};

use serde_json::{Value, json};

use crate::generator::{
  document::{DocumentCache, DocumentLoader, Node},
  errors::{ContractError, ContractResult},
  orchestrator::{CompiledModel, GeneratorConfig, Orchestrator},
  position::{Position, SchemaId},
};

pub(super) const ROOT: &str = "/contracts/api.json";

/// Serves documents from memory, keyed by absolute path.
#[derive(Debug, Clone, Default)]
pub(super) struct MemoryLoader {
  files: HashMap<PathBuf, Value>,
}

impl MemoryLoader {
  pub(super) fn new(root: Value) -> Self {
    Self::default().with(ROOT, root)
  }

  pub(super) fn with(mut self, file: &str, document: Value) -> Self {
    self.files.insert(PathBuf::from(file), document);
    self
  }
}

impl DocumentLoader for MemoryLoader {
  fn load(&self, file: &Path) -> ContractResult<Value> {
    self.files.get(file).cloned().ok_or_else(|| ContractError::NotFound {
      file: file.to_path_buf(),
      reason: "not in memory".to_string(),
    })
  }
}

pub(super) fn compile(root: Value) -> ContractResult<CompiledModel> {
  compile_with_config(MemoryLoader::new(root), GeneratorConfig::default())
}

pub(super) fn compile_with_config(loader: MemoryLoader, config: GeneratorConfig) -> ContractResult<CompiledModel> {
  Orchestrator::new(ROOT, config).compile_with(loader)
}

pub(super) fn string_set(values: &[&str]) -> HashSet<String> {
  values.iter().map(|value| (*value).to_string()).collect::<HashSet<_>>()
}

pub(super) fn position(segments: &[&str]) -> Position {
  Position::new(ROOT, segments.iter().copied())
}

pub(super) fn schema_id(segments: &[&str]) -> SchemaId {
  SchemaId::new(position(segments))
}

pub(super) fn cache_for(root: Value) -> DocumentCache {
  DocumentCache::new(MemoryLoader::new(root))
}

pub(super) fn node_at(cache: &mut DocumentCache, segments: &[&str]) -> Node {
  cache.get(&position(segments)).expect("position should exist")
}

/// A petstore contract where `Pet` and `Owner` refer to each other.
pub(super) fn petstore() -> Value {
  json!({
    "openapi": "3.0.3",
    "info": { "title": "Petstore", "version": "1.0.0" },
    "paths": {
      "/pets": {
        "get": {
          "operationId": "listPets",
          "tags": ["pets"],
          "parameters": [
            {
              "name": "limit",
              "in": "query",
              "schema": { "type": "integer", "format": "int32", "maximum": 100 }
            }
          ],
          "responses": {
            "200": {
              "description": "A page of pets",
              "content": {
                "application/json": {
                  "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
                }
              }
            },
            "default": {
              "description": "Unexpected error",
              "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/Error" } }
              }
            }
          }
        },
        "post": {
          "operationId": "createPet",
          "requestBody": {
            "required": true,
            "content": {
              "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } }
            }
          },
          "responses": { "201": { "description": "Created" } }
        }
      },
      "/pets/{petId}": {
        "parameters": [
          { "name": "petId", "in": "path", "schema": { "type": "string" } }
        ],
        "get": {
          "operationId": "showPetById",
          "responses": {
            "200": {
              "description": "The pet",
              "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } }
              }
            }
          }
        },
        "delete": {
          "responses": { "204": { "description": "Deleted" } }
        }
      }
    },
    "components": {
      "schemas": {
        "Pet": {
          "type": "object",
          "required": ["id", "name"],
          "properties": {
            "id": { "type": "integer", "format": "int64" },
            "name": { "type": "string", "minLength": 1 },
            "status": { "type": "string", "enum": ["available", "sold"] },
            "owner": { "$ref": "#/components/schemas/Owner" },
            "tags": { "type": "array", "items": { "type": "string" }, "uniqueItems": true }
          }
        },
        "Owner": {
          "type": "object",
          "properties": {
            "name": { "type": "string" },
            "pets": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
          }
        },
        "Error": {
          "type": "object",
          "required": ["code"],
          "properties": {
            "code": { "type": "integer", "format": "int32" },
            "message": { "type": "string" }
          }
        },
        "Unused": {
          "type": "object",
          "properties": { "flag": { "type": "boolean" } }
        }
      }
    }
  })
}
