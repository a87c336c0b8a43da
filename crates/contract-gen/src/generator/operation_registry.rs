use std::collections::{BTreeSet, HashSet};

use http::Method;
use indexmap::IndexMap;

use crate::generator::{
  document::{DocumentCache, HTTP_METHODS, Node},
  errors::{ContractError, ContractResult},
  naming::{identifiers::ensure_unique, operations::compute_stable_id},
};

/// One operation of the contract and the method identifier it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationEntry {
  /// The unique lowerCamelCase identifier of the generated method.
  pub stable_id: String,
  pub method: Method,
  pub path: String,
  /// The `operationId` as written in the contract.
  pub operation_id: Option<String>,
}

/// Filter for including or excluding operations from generation.
///
/// Exclusion wins when an operation matches both sets.
#[derive(Debug, Clone, Default)]
pub struct OperationFilter {
  only: Option<HashSet<String>>,
  excluded: Option<HashSet<String>>,
}

impl OperationFilter {
  #[must_use]
  pub fn new(only: Option<&HashSet<String>>, excluded: Option<&HashSet<String>>) -> Self {
    Self {
      only: only.cloned(),
      excluded: excluded.cloned(),
    }
  }

  #[must_use]
  pub fn accepts<S>(&self, stable_id: S) -> bool
  where
    S: AsRef<str>,
  {
    if let Some(ref included) = self.only
      && !included.contains(stable_id.as_ref())
    {
      return false;
    }

    if let Some(ref excluded) = self.excluded
      && excluded.contains(stable_id.as_ref())
    {
      return false;
    }

    true
  }
}

/// Method identifiers of every operation in the contract, computed before any
/// schema is named so that operation-scoped type names can refer to them.
///
/// All operations are named, including those a filter later drops, so the
/// identifiers do not depend on the filter.
#[derive(Debug, Default)]
pub struct OperationRegistry {
  entries: IndexMap<(Method, String), OperationEntry>,
}

impl OperationRegistry {
  pub fn from_document(root: &Node, cache: &mut DocumentCache) -> ContractResult<Self> {
    let mut registry = Self::default();
    let mut used = BTreeSet::new();

    let Some(paths) = root.field("paths") else {
      return Ok(registry);
    };

    for (path, item) in paths.fields() {
      let item = cache.dereference(item)?;
      for method in HTTP_METHODS {
        let Some(operation) = item.field(method) else {
          continue;
        };

        let operation_id = operation.string_field("operationId");
        let base_id = compute_stable_id(method, path.as_str(), operation_id.as_deref());
        let stable_id = ensure_unique(&base_id, &used);
        used.insert(stable_id.clone());

        let method = parse_method(method)?;
        registry.entries.insert(
          (method.clone(), path.clone()),
          OperationEntry {
            stable_id,
            method,
            path: path.clone(),
            operation_id,
          },
        );
      }
    }

    Ok(registry)
  }

  /// The identifier of the operation at `method` (lowercase, as in the contract) and `path`.
  pub fn name_for(&self, method: &str, path: &str) -> Option<&str> {
    let method = parse_method(method).ok()?;
    self
      .entries
      .get(&(method, path.to_string()))
      .map(|entry| entry.stable_id.as_str())
  }

  /// Entries in document order.
  pub fn operations(&self) -> impl Iterator<Item = &OperationEntry> {
    self.entries.values()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

pub(crate) fn parse_method(method: &str) -> ContractResult<Method> {
  Method::from_bytes(method.to_ascii_uppercase().as_bytes())
    .map_err(|e| ContractError::internal(format!("invalid HTTP method '{method}': {e}")))
}
