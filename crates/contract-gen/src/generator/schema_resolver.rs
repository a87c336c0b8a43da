//! Computes the closure of schemas reachable from a set of seed nodes.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::Serialize;

use crate::generator::{
  document::{DocumentCache, Node},
  errors::ContractResult,
  metrics::GenerationStats,
  position::SchemaId,
  schema::Schema,
  schema_parser::{ChildSchemas, parse_schema},
};

/// Every reachable schema in discovery order, plus the inline-parent side map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedSchemas {
  pub schemas: IndexMap<SchemaId, Schema>,
  /// Parent of each schema that was declared inline as a property, `items` or
  /// `additionalProperties` child. Schemas reached through `$ref` have no entry.
  pub embedded_in: IndexMap<SchemaId, SchemaId>,
}

impl ResolvedSchemas {
  pub fn get(&self, id: &SchemaId) -> Option<&Schema> {
    self.schemas.get(id)
  }

  pub fn parent_of(&self, id: &SchemaId) -> Option<&SchemaId> {
    self.embedded_in.get(id)
  }
}

/// FIFO worklist over schema nodes.
///
/// A schema id is marked as visited when it is enqueued, so it is parsed at
/// most once even when it refers to itself.
pub(crate) struct SchemaResolver<'s> {
  cache: &'s mut DocumentCache,
  worklist: VecDeque<Node>,
  visited: HashSet<SchemaId>,
  resolved: ResolvedSchemas,
}

impl<'s> SchemaResolver<'s> {
  pub(crate) fn new(cache: &'s mut DocumentCache) -> Self {
    Self {
      cache,
      worklist: VecDeque::new(),
      visited: HashSet::new(),
      resolved: ResolvedSchemas::default(),
    }
  }

  pub(crate) fn cache(&mut self) -> &mut DocumentCache {
    &mut *self.cache
  }

  /// Dereferences `node`, enqueues it when unseen and returns its id.
  pub(crate) fn register(&mut self, node: Node) -> ContractResult<SchemaId> {
    let concrete = self.cache.dereference(node)?;
    let id = SchemaId::new(concrete.position().clone());
    if self.visited.insert(id.clone()) {
      self.worklist.push_back(concrete);
    }
    Ok(id)
  }

  /// Drains the worklist, parsing each schema and following its children.
  pub(crate) fn resolve_all(mut self, stats: &mut GenerationStats) -> ContractResult<ResolvedSchemas> {
    while let Some(node) = self.worklist.pop_front() {
      let schema = parse_schema(&node, &mut self, stats)?;
      self.resolved.schemas.insert(SchemaId::new(node.position().clone()), schema);
    }

    stats.schemas_resolved = self.resolved.schemas.len();
    Ok(self.resolved)
  }
}

impl ChildSchemas for SchemaResolver<'_> {
  fn child(&mut self, parent: &SchemaId, node: Node) -> ContractResult<SchemaId> {
    let inline = !node.is_reference();
    let id = self.register(node)?;
    if inline {
      self.resolved.embedded_in.entry(id.clone()).or_insert_with(|| parent.clone());
    }
    Ok(id)
  }
}
