//! One generation session, from the root contract to the compiled model.
//!
//! ```no_run
//! use contract_gen::generator::orchestrator::{GeneratorConfig, Orchestrator};
//!
//! # fn example() -> Result<(), contract_gen::generator::errors::ContractError> {
//! let orchestrator = Orchestrator::new("openapi.yaml", GeneratorConfig::default());
//! let model = orchestrator.compile()?;
//!
//! println!("{} types, {} warnings", model.types.len(), model.stats.warnings.len());
//! # Ok(())
//! # }
//! ```

use std::{
  collections::HashSet,
  fmt,
  path::{Path, PathBuf},
};

use http::Method;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::generator::{
  document::{DocumentCache, DocumentLoader, FsLoader, Node, check_contract_structure},
  errors::{ContractError, ContractResult},
  metrics::GenerationStats,
  naming::{
    registry::NameRegistry,
    type_names::{NamingContext, TypeNameGenerator},
  },
  operation_registry::{OperationFilter, OperationRegistry},
  operations::{Operation, OperationAssembler, explode_form_bodies},
  position::SchemaId,
  schema::Schema,
  schema_graph::SchemaGraph,
  schema_resolver::{ResolvedSchemas, SchemaResolver},
  type_resolver::TypeResolver,
  types::GeneratedType,
};

#[derive(Debug, Clone, Default, bon::Builder)]
pub struct GeneratorConfig {
  /// Resolve every `components/schemas` entry, not only those operations reach.
  #[builder(default)]
  pub all_schemas: bool,
  pub only_operations: Option<HashSet<String>>,
  pub excluded_operations: Option<HashSet<String>>,
  /// Standalone JSON Schema files whose roots are resolved as well.
  #[builder(default)]
  pub schema_files: Vec<PathBuf>,
}

/// Title and version of the root contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractMetadata {
  pub source: PathBuf,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub openapi: Option<String>,
  pub title: String,
  pub version: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl ContractMetadata {
  fn from_root(root: &Node) -> Self {
    let info = root.field("info");
    let info_field = |name: &str| info.as_ref().and_then(|info| info.string_field(name));

    Self {
      source: root.position().file().to_path_buf(),
      openapi: root.string_field("openapi"),
      title: info_field("title").unwrap_or_default(),
      version: info_field("version").unwrap_or_default(),
      description: info_field("description"),
    }
  }
}

/// The resolved contract: operations plus every reachable schema.
#[derive(Debug, Clone, Serialize)]
pub struct Specification {
  pub metadata: ContractMetadata,
  pub operations: Vec<Operation>,
  #[serde(flatten)]
  pub resolved: ResolvedSchemas,
}

impl Specification {
  pub fn schemas(&self) -> &IndexMap<SchemaId, Schema> {
    &self.resolved.schemas
  }

  pub fn operation(&self, method: &Method, path: &str) -> Option<&Operation> {
    self.operations.iter().find(|op| op.method == *method && op.path == path)
  }
}

/// `(method, path)` key of an operation, displayed as `GET /pets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
  pub method: Method,
  pub path: String,
}

impl fmt::Display for OperationKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.method, self.path)
  }
}

impl Serialize for OperationKey {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Everything an emitter needs to write source code.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledModel {
  pub specification: Specification,
  pub types: IndexMap<SchemaId, GeneratedType>,
  pub names: IndexMap<SchemaId, String>,
  pub operation_names: IndexMap<OperationKey, String>,
  pub stats: GenerationStats,
}

impl CompiledModel {
  pub fn type_of(&self, id: &SchemaId) -> Option<&GeneratedType> {
    self.types.get(id)
  }

  pub fn name_of(&self, id: &SchemaId) -> Option<&str> {
    self.names.get(id).map(String::as_str)
  }

  /// The schema that was given the type name `name`.
  pub fn schema_named(&self, name: &str) -> Option<(&SchemaId, &Schema)> {
    let (id, _) = self.names.iter().find(|(_, n)| n.as_str() == name)?;
    self.specification.schemas().get_key_value(id)
  }
}

/// State owned by exactly one run: the document cache and the name registry.
pub struct GenerationSession {
  cache: DocumentCache,
  names: NameRegistry,
  stats: GenerationStats,
}

impl GenerationSession {
  pub fn new(loader: impl DocumentLoader + 'static) -> Self {
    Self {
      cache: DocumentCache::new(loader),
      names: NameRegistry::new(),
      stats: GenerationStats::default(),
    }
  }

  /// Runs the whole pipeline for the contract at `input`.
  pub fn compile(mut self, input: &Path, config: &GeneratorConfig) -> ContractResult<CompiledModel> {
    let root = self.cache.open(input)?;
    check_contract_structure(&root)?;

    let registry = OperationRegistry::from_document(&root, &mut self.cache)?;
    let filter = OperationFilter::new(config.only_operations.as_ref(), config.excluded_operations.as_ref());

    let mut resolver = SchemaResolver::new(&mut self.cache);
    let mut assembler = OperationAssembler::new(&mut resolver, &registry, &filter, &mut self.stats);
    let mut operations = assembler.build_operations(&root)?;
    let path_items = assembler.into_path_items();

    if config.all_schemas
      && let Some(schemas) = root.field("components").and_then(|c| c.field("schemas"))
    {
      for (_, schema) in schemas.fields() {
        resolver.register(schema)?;
      }
    }
    for file in &config.schema_files {
      let schema_root = resolver.cache().open(file)?;
      resolver.register(schema_root)?;
    }

    let resolved = resolver.resolve_all(&mut self.stats)?;
    self.stats.form_bodies_exploded = explode_form_bodies(&mut operations, &resolved.schemas)?;

    let context = NamingContext::new(&resolved, &registry, &operations, path_items);
    let namer = TypeNameGenerator::new(context, &mut self.names);
    let (types, names) = TypeResolver::new(&resolved.schemas, namer, &mut self.stats).resolve_all()?;

    let cycles = SchemaGraph::new(&resolved.schemas)
      .detect_cycles()
      .into_iter()
      .map(|cycle| {
        cycle
          .into_iter()
          .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
          .collect()
      })
      .collect();
    self.stats.record_cycles(cycles);
    self.stats.documents_loaded = self.cache.document_count();

    let operation_names = registry
      .operations()
      .filter(|entry| filter.accepts(&entry.stable_id))
      .map(|entry| {
        (
          OperationKey {
            method: entry.method.clone(),
            path: entry.path.clone(),
          },
          entry.stable_id.clone(),
        )
      })
      .collect();

    Ok(CompiledModel {
      specification: Specification {
        metadata: ContractMetadata::from_root(&root),
        operations,
        resolved,
      },
      types,
      names,
      operation_names,
      stats: self.stats,
    })
  }
}

/// Compiles one contract file into a [`CompiledModel`].
pub struct Orchestrator {
  input: PathBuf,
  config: GeneratorConfig,
}

impl Orchestrator {
  pub fn new(input: impl Into<PathBuf>, config: GeneratorConfig) -> Self {
    Self {
      input: input.into(),
      config,
    }
  }

  pub fn input(&self) -> &Path {
    &self.input
  }

  /// Compiles from the filesystem.
  ///
  /// # Errors
  ///
  /// Fails with the first content, not-supported or not-found error met.
  /// No partial model is returned.
  pub fn compile(&self) -> ContractResult<CompiledModel> {
    self.compile_with(FsLoader)
  }

  /// Compiles with a custom document loader.
  pub fn compile_with(&self, loader: impl DocumentLoader + 'static) -> ContractResult<CompiledModel> {
    if self.input.as_os_str().is_empty() {
      return Err(ContractError::NotFound {
        file: self.input.clone(),
        reason: "no input file given".to_string(),
      });
    }
    GenerationSession::new(loader).compile(&self.input, &self.config)
  }
}
