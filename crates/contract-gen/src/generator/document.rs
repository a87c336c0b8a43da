//! Parsed contract documents and the position-aware node view over them.

use std::{
  collections::{HashMap, HashSet},
  ffi::OsStr,
  path::{Path, PathBuf},
  rc::Rc,
};

use fmmap::{MmapFile, MmapFileExt};
use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::generator::{
  errors::{ContractError, ContractResult},
  position::{Position, canonical_file},
};

const REF_KEY: &str = "$ref";
pub(crate) const HTTP_METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }

  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(Self::default(), Self::from_extension)
  }
}

/// Turns a file into a generic document tree.
pub trait DocumentLoader {
  fn load(&self, file: &Path) -> ContractResult<Value>;
}

/// Loads JSON and YAML documents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl DocumentLoader for FsLoader {
  fn load(&self, file: &Path) -> ContractResult<Value> {
    if !file.is_file() {
      return Err(ContractError::NotFound {
        file: file.to_path_buf(),
        reason: "no such file".to_string(),
      });
    }

    let mapped = MmapFile::open(file).map_err(|error| ContractError::NotFound {
      file: file.to_path_buf(),
      reason: error.to_string(),
    })?;

    parse_document(file, SpecFormat::from_path(file), mapped.as_slice())
  }
}

/// Parses raw bytes into a document tree. YAML mapping keys that are scalars
/// (`200:` in a responses map) become strings, and YAML numbers keep their
/// written digits the way JSON numbers do.
pub fn parse_document(file: &Path, format: SpecFormat, bytes: &[u8]) -> ContractResult<Value> {
  let syntax_error = |message: String| ContractError::InvalidDocument {
    file: file.to_path_buf(),
    problems: vec![message],
  };

  match format {
    SpecFormat::Json => serde_json::from_slice(bytes).map_err(|e| syntax_error(e.to_string())),
    SpecFormat::Yaml => {
      let text = std::str::from_utf8(bytes).map_err(|e| syntax_error(e.to_string()))?;
      let documents = YamlLoader::load_from_str(text).map_err(|e| syntax_error(e.to_string()))?;
      match documents.into_iter().next() {
        Some(yaml) => yaml_to_json(yaml).map_err(syntax_error),
        None => Ok(Value::Null),
      }
    }
  }
}

fn yaml_to_json(value: Yaml) -> Result<Value, String> {
  Ok(match value {
    Yaml::Null => Value::Null,
    Yaml::Boolean(b) => Value::Bool(b),
    Yaml::Integer(i) => Value::Number(i.into()),
    Yaml::Real(text) => Value::Number(yaml_number(&text)?),
    Yaml::String(s) => Value::String(s),
    Yaml::Array(items) => Value::Array(items.into_iter().map(yaml_to_json).collect::<Result<_, _>>()?),
    Yaml::Hash(hash) => {
      let mut object = Map::with_capacity(hash.len());
      for (key, value) in hash {
        let key = match key {
          Yaml::String(s) | Yaml::Real(s) => s,
          Yaml::Integer(i) => i.to_string(),
          Yaml::Boolean(b) => b.to_string(),
          other => return Err(format!("unsupported mapping key {other:?}")),
        };
        object.insert(key, yaml_to_json(value)?);
      }
      Value::Object(object)
    }
    Yaml::Alias(_) | Yaml::BadValue => return Err("unresolvable alias or malformed value".to_string()),
  })
}

/// Real scalars are read from their text. Spellings JSON has no syntax for
/// (`+1.5`, `1_000.0`) go through `f64`.
fn yaml_number(text: &str) -> Result<Number, String> {
  if let Ok(number) = serde_json::from_str::<Number>(text) {
    return Ok(number);
  }
  text
    .replace('_', "")
    .parse::<f64>()
    .ok()
    .and_then(Number::from_f64)
    .ok_or_else(|| format!("number {text} cannot be represented"))
}

/// A node of a loaded document together with its position.
///
/// Nodes are only created for positions that exist, so [`Node::value`] always
/// refers to the value found at [`Node::position`].
#[derive(Debug, Clone)]
pub struct Node {
  position: Position,
  document: Rc<Value>,
}

impl Node {
  fn new(position: Position, document: Rc<Value>) -> Self {
    Self { position, document }
  }

  pub fn position(&self) -> &Position {
    &self.position
  }

  pub fn value(&self) -> &Value {
    lookup(&self.document, self.position.segments()).unwrap_or(&NULL)
  }

  pub fn is_object(&self) -> bool {
    self.value().is_object()
  }

  /// The `$ref` string when this node is a reference object.
  pub fn reference(&self) -> Option<&str> {
    self.value().get(REF_KEY).and_then(Value::as_str)
  }

  pub fn is_reference(&self) -> bool {
    self.reference().is_some()
  }

  pub fn field(&self, name: &str) -> Option<Node> {
    self
      .value()
      .as_object()
      .filter(|object| object.contains_key(name))
      .map(|_| self.descend(name))
  }

  pub fn has_field(&self, name: &str) -> bool {
    self.value().as_object().is_some_and(|object| object.contains_key(name))
  }

  /// Object members in declaration order. Empty for non-objects.
  pub fn fields(&self) -> Vec<(String, Node)> {
    self.value().as_object().map_or_else(Vec::new, |object| {
      object.keys().map(|key| (key.clone(), self.descend(key))).collect()
    })
  }

  /// Array elements in order. Empty for non-arrays.
  pub fn elements(&self) -> Vec<Node> {
    self.value().as_array().map_or_else(Vec::new, |items| {
      (0..items.len()).map(|index| self.descend(&index.to_string())).collect()
    })
  }

  pub fn str_field(&self, name: &str) -> Option<&str> {
    self.value().get(name).and_then(Value::as_str)
  }

  pub fn string_field(&self, name: &str) -> Option<String> {
    self.str_field(name).map(ToString::to_string)
  }

  pub fn bool_field(&self, name: &str) -> Option<bool> {
    self.value().get(name).and_then(Value::as_bool)
  }

  pub fn u64_field(&self, name: &str) -> Option<u64> {
    self.value().get(name).and_then(Value::as_u64)
  }

  pub fn number_field(&self, name: &str) -> Option<Number> {
    match self.value().get(name) {
      Some(Value::Number(number)) => Some(number.clone()),
      _ => None,
    }
  }

  /// Requires this node to be an object, failing with a content error otherwise.
  pub fn expect_object(&self, what: &str) -> ContractResult<()> {
    if self.is_object() {
      Ok(())
    } else {
      Err(ContractError::content(&self.position, format!("{what} must be an object")))
    }
  }

  fn descend(&self, segment: &str) -> Node {
    Node::new(self.position.child(segment), Rc::clone(&self.document))
  }
}

fn lookup<'v>(root: &'v Value, segments: &[String]) -> Option<&'v Value> {
  segments.iter().try_fold(root, |current, segment| match current {
    Value::Object(object) => object.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
    _ => None,
  })
}

/// Memoizes parsed documents per file and nodes per position for one run.
pub struct DocumentCache {
  loader: Box<dyn DocumentLoader>,
  documents: HashMap<PathBuf, Rc<Value>>,
  nodes: HashMap<Position, Node>,
}

impl DocumentCache {
  pub fn new(loader: impl DocumentLoader + 'static) -> Self {
    Self {
      loader: Box::new(loader),
      documents: HashMap::new(),
      nodes: HashMap::new(),
    }
  }

  /// Loads `path` and returns the root node of its document.
  pub fn open(&mut self, path: &Path) -> ContractResult<Node> {
    self.get(&Position::root(canonical_file(path)))
  }

  pub fn get(&mut self, position: &Position) -> ContractResult<Node> {
    if let Some(node) = self.nodes.get(position) {
      return Ok(node.clone());
    }

    let document = self.document(position.file())?;
    if lookup(&document, position.segments()).is_none() {
      return Err(ContractError::content(position, "reference target does not exist"));
    }

    let node = Node::new(position.clone(), document);
    self.nodes.insert(position.clone(), node.clone());
    Ok(node)
  }

  /// Follows `$ref` chains until a concrete node is reached.
  ///
  /// Fails when the chain revisits a position or a referenced file is missing.
  pub fn dereference(&mut self, node: Node) -> ContractResult<Node> {
    let origin = node.position().clone();
    let mut visited = HashSet::from([origin.clone()]);
    let mut current = node;

    while let Some(reference) = current.reference() {
      let reference = reference.to_string();
      let target = current.position().resolve(&reference)?;

      if !visited.insert(target.clone()) {
        return Err(ContractError::content(
          &origin,
          format!("reference cycle detected starting at '{reference}'"),
        ));
      }

      current = self
        .get(&target)
        .map_err(|error| error.attribute_to_reference(current.position(), &reference))?;
    }

    Ok(current)
  }

  /// Number of distinct files parsed so far.
  pub fn document_count(&self) -> usize {
    self.documents.len()
  }

  fn document(&mut self, file: &Path) -> ContractResult<Rc<Value>> {
    if let Some(document) = self.documents.get(file) {
      return Ok(Rc::clone(document));
    }
    let document = Rc::new(self.loader.load(file)?);
    self.documents.insert(file.to_path_buf(), Rc::clone(&document));
    Ok(document)
  }
}

/// Collects every structural problem of a root contract document at once.
pub fn check_contract_structure(root: &Node) -> ContractResult<()> {
  let file = root.position().file().to_path_buf();
  let mut problems = Vec::new();

  if !root.is_object() {
    problems.push("document root must be an object".to_string());
    return Err(ContractError::InvalidDocument { file, problems });
  }

  if root.has_field("openapi") && root.str_field("openapi").is_none() {
    problems.push("'openapi' must be a string".to_string());
  }

  if let Some(components) = root.field("components") {
    if !components.is_object() {
      problems.push("'components' must be an object".to_string());
    } else if let Some(schemas) = components.field("schemas")
      && !schemas.is_object()
    {
      problems.push("'components/schemas' must be an object".to_string());
    }
  }

  if let Some(paths) = root.field("paths") {
    if !paths.is_object() {
      problems.push("'paths' must be an object".to_string());
    }

    for (path, item) in paths.fields() {
      if !item.is_object() {
        problems.push(format!("path item '{path}' must be an object"));
        continue;
      }
      for method in HTTP_METHODS {
        if let Some(operation) = item.field(method)
          && !operation.is_object()
        {
          problems.push(format!("operation '{method} {path}' must be an object"));
        }
      }
      if let Some(parameters) = item.field("parameters")
        && !parameters.value().is_array()
      {
        problems.push(format!("parameters of path '{path}' must be an array"));
      }
    }
  }

  if problems.is_empty() {
    Ok(())
  } else {
    Err(ContractError::InvalidDocument { file, problems })
  }
}
