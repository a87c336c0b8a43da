use std::collections::BTreeSet;

use crate::generator::naming::identifiers::ensure_unique;

/// Issues type names for one generation session.
///
/// Names are case-sensitive. A name that was already issued comes back with
/// the smallest free numeric suffix, starting at 2.
#[derive(Debug, Default)]
pub struct NameRegistry {
  issued: BTreeSet<String>,
}

impl NameRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn claim(&mut self, name: &str) -> String {
    let unique = ensure_unique(name, &self.issued);
    self.issued.insert(unique.clone());
    unique
  }

  #[must_use]
  pub fn is_issued(&self, name: &str) -> bool {
    self.issued.contains(name)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.issued.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.issued.is_empty()
  }
}
