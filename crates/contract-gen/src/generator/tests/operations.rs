use http::Method;
use serde_json::{Map, Value, json};

use super::support::{compile, petstore, schema_id};
use crate::generator::{
  errors::ErrorKind,
  metrics::GenerationWarning,
  operations::{BodyKind, FormParameterKind, ParameterLocation, ResponseStatus, is_form_media_type},
};

fn contract(paths: Value) -> Value {
  json!({
    "openapi": "3.1.0",
    "info": { "title": "Test", "version": "1" },
    "paths": paths
  })
}

fn compile_err_kind(paths: Value) -> ErrorKind {
  compile(contract(paths)).unwrap_err().kind()
}

#[test]
fn test_petstore_operations() {
  let model = compile(petstore()).unwrap();
  let spec = &model.specification;

  assert_eq!(spec.operations.len(), 4);
  assert_eq!(model.stats.operations_converted, 4);

  let list = spec.operation(&Method::GET, "/pets").unwrap();
  assert_eq!(list.name, "listPets");
  assert_eq!(list.tags, ["pets"]);
  let limit = list.parameter("limit", ParameterLocation::Query).unwrap();
  assert!(!limit.required);
  assert_eq!(
    limit.schema_id,
    schema_id(&["paths", "/pets", "get", "parameters", "0", "schema"])
  );

  let statuses = list.responses.iter().map(|r| r.status).collect::<Vec<_>>();
  assert_eq!(statuses, [ResponseStatus::Code(200), ResponseStatus::Default]);
  let error = list.response(ResponseStatus::Default).unwrap();
  assert_eq!(
    error.content[0].schema_id,
    Some(schema_id(&["components", "schemas", "Error"]))
  );
}

#[test]
fn test_path_level_parameters_are_inherited() {
  let model = compile(petstore()).unwrap();

  for method in [Method::GET, Method::DELETE] {
    let operation = model.specification.operation(&method, "/pets/{petId}").unwrap();
    let pet_id = operation.parameter("petId", ParameterLocation::Path).unwrap();
    assert!(pet_id.required, "path parameters are always required");
  }
}

#[test]
fn test_entity_request_body() {
  let model = compile(petstore()).unwrap();
  let create = model.specification.operation(&Method::POST, "/pets").unwrap();

  let body = create.request_body.as_ref().unwrap();
  assert!(body.required);
  assert_eq!(body.kind, BodyKind::Entity);
  assert_eq!(body.content[0].media_type, "application/json");
  assert_eq!(
    body.content[0].schema_id,
    Some(schema_id(&["components", "schemas", "Pet"]))
  );
}

#[test]
fn test_operation_parameter_overrides_path_parameter() {
  let model = compile(contract(json!({
    "/items": {
      "parameters": [
        { "name": "page", "in": "query", "description": "shared", "schema": { "type": "integer" } },
        { "name": "trace", "in": "header", "schema": { "type": "string" } }
      ],
      "get": {
        "operationId": "listItems",
        "parameters": [
          { "name": "page", "in": "query", "required": true, "schema": { "type": "integer" } },
          { "name": "page", "in": "header", "schema": { "type": "integer" } }
        ],
        "responses": { "200": { "description": "ok" } }
      }
    }
  })))
  .unwrap();

  let operation = &model.specification.operations[0];
  let names = operation
    .parameters
    .iter()
    .map(|p| (p.name.as_str(), p.location))
    .collect::<Vec<_>>();
  assert_eq!(
    names,
    [
      ("page", ParameterLocation::Query),
      ("trace", ParameterLocation::Header),
      ("page", ParameterLocation::Header),
    ]
  );

  let page = operation.parameter("page", ParameterLocation::Query).unwrap();
  assert!(page.required);
  assert_eq!(page.description, None);
  assert!(model.stats.warnings.is_empty());
}

#[test]
fn test_duplicate_parameter_is_warned_about() {
  let model = compile(contract(json!({
    "/items": {
      "get": {
        "operationId": "listItems",
        "parameters": [
          { "name": "page", "in": "query", "schema": { "type": "integer" } },
          { "name": "page", "in": "query", "schema": { "type": "string" } }
        ],
        "responses": { "200": { "description": "ok" } }
      }
    }
  })))
  .unwrap();

  assert_eq!(model.specification.operations[0].parameters.len(), 1);
  assert_eq!(
    model.stats.warnings,
    [GenerationWarning::DuplicateParameter {
      operation_id: "listItems".to_string(),
      name: "page".to_string(),
      location: "query".to_string(),
    }]
  );
}

#[test]
fn test_no_content_response_discards_body() {
  let model = compile(contract(json!({
    "/items/{id}": {
      "delete": {
        "operationId": "deleteItem",
        "parameters": [{ "name": "id", "in": "path", "schema": { "type": "string" } }],
        "responses": {
          "204": {
            "description": "gone",
            "content": { "application/json": { "schema": { "type": "object" } } }
          }
        }
      }
    }
  })))
  .unwrap();

  let operation = &model.specification.operations[0];
  assert!(operation.response(ResponseStatus::Code(204)).unwrap().content.is_empty());
  assert_eq!(
    model.stats.warnings,
    [GenerationWarning::NoContentBodyDiscarded {
      operation_id: "deleteItem".to_string()
    }]
  );
  assert_eq!(model.specification.schemas().len(), 1);
}

#[test]
fn test_form_body_is_exploded_into_parameters() {
  let model = compile(contract(json!({
    "/uploads": {
      "post": {
        "operationId": "upload",
        "requestBody": {
          "content": {
            "multipart/form-data": {
              "schema": {
                "type": "object",
                "required": ["file"],
                "properties": {
                  "file": { "type": "string", "format": "binary" },
                  "pages": { "type": "array", "items": { "type": "string", "format": "binary" } },
                  "labels": { "type": "array", "items": { "type": "string" } },
                  "kind": { "type": "string", "enum": ["photo", "scan"] },
                  "meta": { "type": "object", "properties": { "source": { "type": "string" } } },
                  "grid": { "type": "array", "items": { "type": "array", "items": { "type": "string" } } }
                }
              }
            }
          }
        },
        "responses": { "201": { "description": "stored" } }
      }
    }
  })))
  .unwrap();

  let body = model.specification.operations[0].request_body.as_ref().unwrap();
  let BodyKind::Form { parameters } = &body.kind else {
    panic!("expected a form body");
  };
  let kinds = parameters
    .iter()
    .map(|p| (p.name.as_str(), p.required, p.kind))
    .collect::<Vec<_>>();
  assert_eq!(
    kinds,
    [
      ("file", true, FormParameterKind::Attachment),
      ("pages", false, FormParameterKind::Attachment),
      ("labels", false, FormParameterKind::Primitive),
      ("kind", false, FormParameterKind::Primitive),
      ("meta", false, FormParameterKind::Complex),
      ("grid", false, FormParameterKind::Complex),
    ]
  );
  assert_eq!(model.stats.form_bodies_exploded, 1);
}

#[test]
fn test_form_body_requires_an_object_schema() {
  let kind = compile_err_kind(json!({
    "/uploads": {
      "post": {
        "requestBody": {
          "content": {
            "application/x-www-form-urlencoded": { "schema": { "type": "string" } }
          }
        },
        "responses": { "200": { "description": "ok" } }
      }
    }
  }));
  assert_eq!(kind, ErrorKind::NotSupported);
}

#[test]
fn test_request_body_media_type_count() {
  let none = compile_err_kind(json!({
    "/items": {
      "post": { "requestBody": { "content": {} }, "responses": {} }
    }
  }));
  assert_eq!(none, ErrorKind::Content);

  let many = compile_err_kind(json!({
    "/items": {
      "post": {
        "requestBody": {
          "content": {
            "application/json": { "schema": { "type": "string" } },
            "application/xml": { "schema": { "type": "string" } }
          }
        },
        "responses": {}
      }
    }
  }));
  assert_eq!(many, ErrorKind::NotSupported);
}

#[test]
fn test_parameter_errors() {
  let parameter = |declared: Value| {
    compile_err_kind(json!({
      "/items": { "get": { "parameters": [declared], "responses": {} } }
    }))
  };

  assert_eq!(parameter(json!({ "in": "query", "schema": {} })), ErrorKind::Content);
  assert_eq!(
    parameter(json!({ "name": "q", "in": "body", "schema": {} })),
    ErrorKind::Content
  );
  assert_eq!(
    parameter(json!({ "name": "q", "in": "query", "schema": {}, "content": {} })),
    ErrorKind::Content
  );
  assert_eq!(
    parameter(json!({ "name": "q", "in": "query", "content": { "application/json": {} } })),
    ErrorKind::NotSupported
  );
  assert_eq!(parameter(json!({ "name": "q", "in": "query" })), ErrorKind::NotSupported);
}

#[test]
fn test_response_status_keys() {
  let status = |key: &str| {
    let mut responses = Map::new();
    responses.insert(key.to_string(), json!({ "description": "x" }));
    compile_err_kind(json!({
      "/items": { "get": { "responses": Value::Object(responses) } }
    }))
  };

  assert_eq!(status("2XX"), ErrorKind::NotSupported);
  assert_eq!(status("ok"), ErrorKind::NotSupported);
  assert_eq!(status("1000"), ErrorKind::NotSupported);
}

#[test]
fn test_referenced_path_item_and_response() {
  let model = compile(json!({
    "openapi": "3.0.3",
    "info": { "title": "Test", "version": "1" },
    "paths": {
      "/status": { "$ref": "#/x-shared/StatusPath" }
    },
    "x-shared": {
      "StatusPath": {
        "get": {
          "operationId": "getStatus",
          "parameters": [
            { "name": "limit", "in": "query", "schema": { "type": "string", "enum": ["all", "recent"] } }
          ],
          "responses": {
            "200": { "$ref": "#/components/responses/Status" },
            "404": {
              "description": "missing",
              "content": {
                "application/json": {
                  "schema": { "type": "object", "properties": { "reason": { "type": "string" } } }
                }
              }
            }
          }
        }
      }
    },
    "components": {
      "responses": {
        "Status": {
          "description": "status",
          "content": { "text/plain": { "schema": { "type": "string" } } }
        }
      }
    }
  }))
  .unwrap();

  let operation = model.specification.operation(&Method::GET, "/status").unwrap();
  assert_eq!(operation.name, "getStatus");
  let response = operation.response(ResponseStatus::Code(200)).unwrap();
  assert_eq!(response.description.as_deref(), Some("status"));
  assert_eq!(response.content[0].media_type, "text/plain");

  let detail = operation.response(ResponseStatus::Code(404)).unwrap();
  assert_eq!(
    model.name_of(detail.content[0].schema_id.as_ref().unwrap()),
    Some("GetStatusResponse404")
  );
  let limit = operation.parameter("limit", ParameterLocation::Query).unwrap();
  assert_eq!(model.name_of(&limit.schema_id), Some("GetStatusParameterLimit"));

  let mut names = model.names.values().cloned().collect::<Vec<_>>();
  names.sort();
  assert_eq!(names, ["GetStatusParameterLimit", "GetStatusResponse404"]);
}

#[test]
fn test_form_media_types() {
  assert!(is_form_media_type("application/x-www-form-urlencoded"));
  assert!(is_form_media_type("multipart/form-data"));
  assert!(!is_form_media_type("application/json"));
  assert!(!is_form_media_type("text/plain"));
}
